//! Multi-call operations.
//!
//! Each operation here needs more than one upstream call to satisfy a single
//! request. Calls are issued strictly one after another, and nothing that has
//! already been created or moved is ever undone on a later failure: the result
//! carries enough IDs for the caller to clean up by hand.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::convert::{card_summary, display_name, entity_id, member_summary, str_field};
use crate::error::{McpError, Result};
use crate::fields;
use crate::upstream::{Fields, ResourceKind, Upstream};

/// Name prefix of cards created to host a board-level checklist.
pub const CHECKLIST_HOST_PREFIX: &str = "Checklist: ";

// =============================================================================
// create-checklist-on-board
// =============================================================================

/// Terminal outcome of [`create_checklist_on_board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistPhase {
    /// Host card and checklist both exist.
    Completed,
    /// Host card exists, checklist creation failed.
    PartiallyCompleted,
}

/// Result of creating a checklist on a board.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistOnBoard {
    /// False when the checklist step failed
    pub success: bool,
    /// How far the operation got
    pub phase: ChecklistPhase,
    /// Human-readable summary
    pub message: String,
    /// Board the host card was created on
    pub board_id: String,
    /// List holding the host card
    pub list_id: String,
    /// The host card
    pub card_id: String,
    /// The new checklist, when it was created
    pub checklist_id: Option<String>,
    /// Checklist name as requested
    pub checklist_name: String,
    /// Set when the host card was left behind without a checklist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphan_card_id: Option<String>,
    /// Why the checklist step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonValue>,
    /// Host card summary
    pub card: JsonValue,
    /// Checklist as returned by Trello
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checklist: Option<JsonValue>,
}

enum ChecklistStep {
    CardPending { list_id: String },
    ChecklistPending { list_id: String, card: JsonValue, card_id: String },
}

/// Create a checklist "on a board".
///
/// Trello only attaches checklists to cards, so a host card named
/// `Checklist: <name>` is created first, in `list_id` or else the board's
/// first open list. A given `list_id` must belong to `board_id`; this is
/// checked before anything is written. A failure before the card exists is
/// returned as `Err`; a failure after it, including a checklist response
/// without an id, is a `PartiallyCompleted` result naming the orphan.
///
/// # Cancellation
///
/// Dropping the future after the card request was sent leaves the host card
/// on the board with no orphan report. Callers that may cancel should look
/// for cards named `Checklist: <name>` afterwards.
pub async fn create_checklist_on_board(
    upstream: &dyn Upstream,
    board_id: &str,
    checklist_name: &str,
    list_id: Option<&str>,
) -> Result<ChecklistOnBoard> {
    if checklist_name.trim().is_empty() {
        return Err(McpError::MissingArg("name".to_string()));
    }

    let list_id = match list_id {
        Some(id) => {
            list_on_board(upstream, board_id, id).await?;
            id.to_string()
        }
        None => first_open_list(upstream, board_id).await?,
    };

    let mut step = ChecklistStep::CardPending { list_id };
    loop {
        step = match step {
            ChecklistStep::CardPending { list_id } => {
                let fields = fields! {
                    "idList" => list_id,
                    "name" => format!("{}{}", CHECKLIST_HOST_PREFIX, checklist_name),
                    "desc" => format!("Created automatically to hold the checklist '{}'.", checklist_name),
                };
                let card = upstream.create(ResourceKind::Card, None, &fields).await?;
                let card_id = entity_id(&card)
                    .ok_or_else(|| McpError::Upstream {
                        status: None,
                        message: "card creation returned no id".to_string(),
                    })?
                    .to_string();
                tracing::info!(board_id, card_id = %card_id, "created checklist host card");
                ChecklistStep::ChecklistPending { list_id, card, card_id }
            }

            ChecklistStep::ChecklistPending { list_id, card, card_id } => {
                let board_id = board_id.to_string();
                let result = upstream
                    .create(
                        ResourceKind::Checklist,
                        Some(ResourceKind::Card.of(&card_id)),
                        &fields! { "name" => checklist_name },
                    )
                    .await
                    .and_then(|checklist| match entity_id(&checklist).map(str::to_string) {
                        Some(id) => Ok((id, checklist)),
                        None => Err(McpError::Upstream {
                            status: None,
                            message: "checklist creation returned no id".to_string(),
                        }),
                    });

                return Ok(match result {
                    Ok((checklist_id, checklist)) => {
                        ChecklistOnBoard {
                            success: true,
                            phase: ChecklistPhase::Completed,
                            message: format!(
                                "Created checklist '{}' and its host card {} on board {}. \
                                 The checklist lives on an auto-created card because Trello \
                                 attaches checklists to cards, not boards.",
                                checklist_name, card_id, board_id
                            ),
                            board_id,
                            list_id,
                            card_id,
                            checklist_id: Some(checklist_id),
                            checklist_name: checklist_name.to_string(),
                            orphan_card_id: None,
                            error: None,
                            card: card_summary(&card),
                            checklist: Some(checklist),
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            board_id = %board_id,
                            card_id = %card_id,
                            error = %err,
                            "checklist creation failed, host card left in place"
                        );
                        ChecklistOnBoard {
                            success: false,
                            phase: ChecklistPhase::PartiallyCompleted,
                            message: format!(
                                "Created host card {} on board {} but failed to create checklist '{}': {}. \
                                 The card was not deleted; remove it manually if it is not wanted.",
                                card_id, board_id, checklist_name, err
                            ),
                            board_id,
                            list_id,
                            orphan_card_id: Some(card_id.clone()),
                            card_id,
                            checklist_id: None,
                            checklist_name: checklist_name.to_string(),
                            error: Some(partial_detail(&err)),
                            card: card_summary(&card),
                            checklist: None,
                        }
                    }
                });
            }
        };
    }
}

async fn list_on_board(upstream: &dyn Upstream, board_id: &str, list_id: &str) -> Result<()> {
    let list = upstream
        .get(&ResourceKind::List.path(list_id), &fields! { "fields" => "idBoard" })
        .await?;
    match str_field(&list, "idBoard") {
        Some(owner) if owner == board_id => Ok(()),
        owner => Err(McpError::InvalidArg {
            name: "id_list".to_string(),
            reason: format!(
                "list {} belongs to board {}, not {}",
                list_id,
                owner.unwrap_or("(unknown)"),
                board_id
            ),
        }),
    }
}

async fn first_open_list(upstream: &dyn Upstream, board_id: &str) -> Result<String> {
    let lists = upstream
        .list(ResourceKind::List, ResourceKind::Board.of(board_id), Some("open"))
        .await?;
    lists
        .iter()
        .find(|l| !l.get("closed").and_then(|v| v.as_bool()).unwrap_or(false))
        .and_then(entity_id)
        .map(str::to_string)
        .ok_or_else(|| {
            McpError::NotFound(format!(
                "board {} has no open list to hold a checklist card",
                board_id
            ))
        })
}

fn partial_detail(err: &McpError) -> JsonValue {
    let mut detail = err.detail();
    detail["code"] = JsonValue::String("PARTIAL_COMPLETION".to_string());
    detail["cause"] = JsonValue::String(err.code().to_string());
    detail
}

// =============================================================================
// move-all-cards
// =============================================================================

/// A card that reached the destination.
#[derive(Debug, Clone, Serialize)]
pub struct MovedCard {
    /// Card ID
    pub id: String,
    /// Card name, if known
    pub name: Option<String>,
}

/// A card whose move was rejected.
#[derive(Debug, Clone, Serialize)]
pub struct FailedCard {
    /// Card ID
    pub id: String,
    /// Card name, if known
    pub name: Option<String>,
    /// Upstream error detail
    pub error: JsonValue,
}

/// Result of moving every card out of a list.
#[derive(Debug, Clone, Serialize)]
pub struct MoveAllCards {
    /// True when every card moved
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// List the cards were taken from
    pub source_list_id: String,
    /// Board the cards were sent to
    pub destination_board_id: String,
    /// List the cards were sent to; Trello picks one when absent
    pub destination_list_id: Option<String>,
    /// Cards found in the source list, including skipped ones
    pub total_cards: usize,
    /// Number of cards moved
    pub moved_count: usize,
    /// Number of rejected moves (zero or one)
    pub failed_count: usize,
    /// Number of cards left untouched after the failure
    pub not_attempted_count: usize,
    /// Number of source entries without an id; these were not moved
    pub skipped_count: usize,
    /// Cards that reached the destination, in move order
    pub moved: Vec<MovedCard>,
    /// The move that stopped the run
    pub failed: Vec<FailedCard>,
    /// IDs of cards still in the source list
    pub not_attempted: Vec<String>,
    /// Whether the source list should now be empty
    pub source_list_empty: bool,
}

/// Move every card of `source_list_id` to another board, one card at a time.
///
/// Cards move in the order the source list returns them. The first rejected
/// move stops the run; the cards after it are reported as not attempted.
/// Entries without an id cannot be moved and are counted as skipped.
/// Nothing already moved is moved back, so a rerun picks up where this one
/// stopped.
///
/// # Cancellation
///
/// Dropping the future mid-run leaves every card moved so far at the
/// destination, and no result is produced. Rerunning lists the source again.
pub async fn move_all_cards(
    upstream: &dyn Upstream,
    source_list_id: &str,
    destination_board_id: &str,
    destination_list_id: Option<&str>,
) -> Result<MoveAllCards> {
    let cards = upstream
        .list(ResourceKind::Card, ResourceKind::List.of(source_list_id), None)
        .await?;

    let mut move_fields = fields! { "idBoard" => destination_board_id };
    if let Some(list_id) = destination_list_id {
        move_fields.insert("idList".to_string(), list_id.to_string());
    }

    let mut moved = Vec::new();
    let mut failed = Vec::new();
    let mut not_attempted = Vec::new();
    let mut skipped_count = 0;

    for card in &cards {
        let Some(card_id) = entity_id(card) else {
            tracing::warn!(source_list_id, "skipping card without id");
            skipped_count += 1;
            continue;
        };
        let name = str_field(card, "name").map(str::to_string);

        if !failed.is_empty() {
            not_attempted.push(card_id.to_string());
            continue;
        }

        match upstream.update(ResourceKind::Card, card_id, &move_fields).await {
            Ok(_) => moved.push(MovedCard {
                id: card_id.to_string(),
                name,
            }),
            Err(err) => {
                tracing::warn!(card_id, error = %err, "card move failed, stopping");
                failed.push(FailedCard {
                    id: card_id.to_string(),
                    name,
                    error: err.detail(),
                });
            }
        }
    }

    let total_cards = cards.len();
    let mut message = if total_cards == 0 {
        format!("List {} has no cards to move", source_list_id)
    } else if failed.is_empty() {
        format!(
            "Moved {} cards from list {} to board {}",
            moved.len(),
            source_list_id,
            destination_board_id
        )
    } else {
        format!(
            "Moved {} of {} cards from list {} to board {} before card {} failed; \
             {} cards were not attempted. Moved cards were left at the destination; \
             rerun to move the rest.",
            moved.len(),
            total_cards,
            source_list_id,
            destination_board_id,
            failed[0].id,
            not_attempted.len()
        )
    };
    if skipped_count > 0 {
        message.push_str(&format!(
            "; {} entries without an id were skipped and remain in the list",
            skipped_count
        ));
    }
    tracing::info!(
        source_list_id,
        moved = moved.len(),
        failed = failed.len(),
        not_attempted = not_attempted.len(),
        skipped = skipped_count,
        "move all cards finished"
    );

    Ok(MoveAllCards {
        success: failed.is_empty(),
        message,
        source_list_id: source_list_id.to_string(),
        destination_board_id: destination_board_id.to_string(),
        destination_list_id: destination_list_id.map(str::to_string),
        total_cards,
        moved_count: moved.len(),
        failed_count: failed.len(),
        not_attempted_count: not_attempted.len(),
        skipped_count,
        source_list_empty: failed.is_empty() && not_attempted.is_empty() && skipped_count == 0,
        moved,
        failed,
        not_attempted,
    })
}

// =============================================================================
// find-member
// =============================================================================

/// Which rule produced a member match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Exact email match
    Email,
    /// Exact username match
    Username,
    /// Display name contains the query
    DisplayName,
}

/// Result of a board member lookup.
#[derive(Debug, Clone, Serialize)]
pub struct FoundMember {
    /// Always true; no match is an error
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Board that was searched
    pub board_id: String,
    /// The query as given
    pub query: String,
    /// Rule that produced the match
    pub matched_by: MatchKind,
    /// More than one display name contained the query.
    pub ambiguous: bool,
    /// Members that matched the winning rule
    pub candidate_count: usize,
    /// ID of the returned member
    pub member_id: Option<String>,
    /// Member summary
    pub member: JsonValue,
    /// Member as returned by Trello
    pub data: JsonValue,
}

/// Member fields requested for matching; the members endpoint omits email otherwise.
const MEMBER_MATCH_FIELDS: &str = "email,username,fullName";

/// Find a board member by email, username, or display name.
///
/// Matching is case-insensitive: an exact email wins over an exact username,
/// which wins over a display-name substring. Among several display-name
/// matches the first in upstream order is returned and flagged ambiguous.
pub async fn find_member(upstream: &dyn Upstream, board_id: &str, query: &str) -> Result<FoundMember> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(McpError::MissingArg("query".to_string()));
    }

    let members = upstream
        .list_with(
            ResourceKind::Member,
            ResourceKind::Board.of(board_id),
            None,
            &fields! { "fields" => MEMBER_MATCH_FIELDS },
        )
        .await?;

    let equals = |field: &str| {
        members.iter().find(|m| {
            str_field(m, field)
                .map(|v| v.trim().to_lowercase() == needle)
                .unwrap_or(false)
        })
    };

    let (member, matched_by, candidate_count) = if let Some(m) = equals("email") {
        (m, MatchKind::Email, 1)
    } else if let Some(m) = equals("username") {
        (m, MatchKind::Username, 1)
    } else {
        let candidates: Vec<&JsonValue> = members
            .iter()
            .filter(|m| {
                display_name(m)
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .collect();
        match candidates.first() {
            Some(m) => (*m, MatchKind::DisplayName, candidates.len()),
            None => {
                return Err(McpError::MemberNotFound {
                    board_id: board_id.to_string(),
                    query: query.to_string(),
                })
            }
        }
    };

    let ambiguous = candidate_count > 1;
    let label = display_name(member)
        .or_else(|| str_field(member, "username"))
        .unwrap_or("member");
    let mut message = format!(
        "Found {} on board {} by {}",
        label,
        board_id,
        match matched_by {
            MatchKind::Email => "email",
            MatchKind::Username => "username",
            MatchKind::DisplayName => "display name",
        }
    );
    if ambiguous {
        message.push_str(&format!(
            "; {} members match '{}', returning the first",
            candidate_count, query
        ));
    }

    Ok(FoundMember {
        success: true,
        message,
        board_id: board_id.to_string(),
        query: query.to_string(),
        matched_by,
        ambiguous,
        candidate_count,
        member_id: entity_id(member).map(str::to_string),
        member: member_summary(member),
        data: member.clone(),
    })
}

// =============================================================================
// batch-get
// =============================================================================

/// Outcome of one path in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// Requested path
    pub url: String,
    /// Whether the GET succeeded
    pub success: bool,
    /// Response body, null on failure
    pub data: JsonValue,
    /// Error detail on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonValue>,
}

/// Result of a batch of GETs.
#[derive(Debug, Clone, Serialize)]
pub struct BatchGet {
    /// True when every request succeeded
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Number of paths requested
    pub total_urls: usize,
    /// Requests that succeeded
    pub successful_requests: usize,
    /// Requests that failed
    pub failed_requests: usize,
    /// One entry per path, in request order
    pub results: Vec<BatchEntry>,
}

/// GET each relative path in turn, recording every outcome.
///
/// All paths are validated before the first request.
pub async fn batch_get(upstream: &dyn Upstream, urls: &[String]) -> Result<BatchGet> {
    let invalid: Vec<&str> = urls
        .iter()
        .filter(|u| !u.starts_with('/') || u.contains("://"))
        .map(String::as_str)
        .collect();
    if !invalid.is_empty() {
        return Err(McpError::InvalidArg {
            name: "urls".to_string(),
            reason: format!(
                "paths must be relative and start with '/': {}",
                invalid.join(", ")
            ),
        });
    }

    let mut results = Vec::with_capacity(urls.len());
    for url in urls {
        let entry = match upstream.get(url, &Fields::new()).await {
            Ok(data) => BatchEntry {
                url: url.clone(),
                success: true,
                data,
                error: None,
            },
            Err(err) => BatchEntry {
                url: url.clone(),
                success: false,
                data: JsonValue::Null,
                error: Some(err.detail()),
            },
        };
        results.push(entry);
    }

    let successful_requests = results.iter().filter(|r| r.success).count();
    let failed_requests = results.len() - successful_requests;
    Ok(BatchGet {
        success: failed_requests == 0,
        message: format!(
            "Batch completed: {}/{} requests successful",
            successful_requests,
            results.len()
        ),
        total_urls: results.len(),
        successful_requests,
        failed_requests,
        results,
    })
}
