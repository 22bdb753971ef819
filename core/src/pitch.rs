//! Pitch status report.
//!
//! Secondary read/report feature: scan the pitch board's "In Progress"
//! column for issues carrying the pitch label with at least one owner,
//! render a markdown summary, and rewrite the status note card in the
//! main board's Notes column. Reuses the same card/column primitives
//! and completeness checks as the reconciler.

use std::collections::HashMap;

use crate::api::BoardApi;
use crate::config::{PitchConfig, SyncConfig};
use crate::error::BoardError;
use crate::paginate::ensure_complete;
use crate::reconcile::{NOTES_COLUMN, fetch_tracked_items, find_column};
use crate::types::{Issue, Project, TrackedItem};

/// Collect the issues in the pitch board's "In Progress" column that
/// carry `label` and have at least one assignee. `issues` must be the
/// fully paginated issue list for the pitch repositories; card-content
/// projections lack labels and assignees, so the lookup goes through it.
pub fn active_pitches<'a>(
    pitch_board: &Project,
    issues: &'a [Issue],
    label: &str,
) -> Result<Vec<&'a Issue>, BoardError> {
    ensure_complete(&pitch_board.columns, "pitch board columns")?;
    let by_id: HashMap<&str, &Issue> = issues.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut pitches = Vec::new();
    for column in &pitch_board.columns.nodes {
        if !column.name.trim().eq_ignore_ascii_case("in progress") {
            continue;
        }
        ensure_complete(&column.cards, &format!("{} cards", column.name))?;
        for card in &column.cards.nodes {
            let Some(TrackedItem::Issue(content)) = &card.content else {
                continue;
            };
            let issue = by_id.get(content.id.as_str()).ok_or_else(|| {
                BoardError::MalformedResponse(format!(
                    "card {} references issue {} outside the fetched repositories",
                    card.id, content.id
                ))
            })?;
            let labels = issue.labels.as_ref().ok_or_else(|| {
                BoardError::MalformedResponse(format!("issue {} has no labels connection", issue.id))
            })?;
            ensure_complete(labels, &format!("labels of issue {}", issue.id))?;
            if labels.nodes.iter().any(|l| l.name == label) && issue.is_assigned() {
                pitches.push(*issue);
            }
        }
    }
    Ok(pitches)
}

/// Render the summary: one `[title](url)` block per pitch with its
/// owners' logins.
pub fn render_message(pitches: &[&Issue]) -> String {
    let blocks: Vec<String> = pitches
        .iter()
        .map(|issue| {
            let owners = issue
                .assignees
                .as_ref()
                .map(|a| {
                    a.nodes
                        .iter()
                        .map(|u| u.login.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            format!("[{}]({})\nOwners: {}", issue.title, issue.url, owners)
        })
        .collect();
    blocks.join("\n\n")
}

/// Rewrite every note card in the Notes column whose text starts with
/// `heading`. Returns the number of cards updated.
pub async fn publish(
    api: &dyn BoardApi,
    main_board: &Project,
    heading: &str,
    message: &str,
) -> Result<usize, BoardError> {
    let notes = find_column(main_board, NOTES_COLUMN)?;
    ensure_complete(&notes.cards, "Notes cards")?;

    let mut updated = 0;
    for card in &notes.cards.nodes {
        let Some(text) = &card.note else { continue };
        if text.starts_with(heading) {
            api.update_note(&card.id, &format!("{heading}\n\n{message}"))
                .await?;
            updated += 1;
        }
    }
    Ok(updated)
}

/// Full pitch-status run: scan the pitch board, render the summary,
/// publish it onto the main board. Returns the rendered message.
pub async fn run_pitch_status(
    api: &dyn BoardApi,
    cfg: &SyncConfig,
    pitch: &PitchConfig,
) -> Result<String, BoardError> {
    let (pitch_board, repos) = api.fetch_board(pitch.project_number, &pitch.repos).await?;
    let (issues, _) = fetch_tracked_items(api, repos).await?;
    let pitches = active_pitches(&pitch_board, &issues, &pitch.label)?;
    tracing::info!(pitches = pitches.len(), "scanned pitch board");
    let message = render_message(&pitches);

    let (main_board, _) = api.fetch_board(cfg.project_number, &[]).await?;
    let updated = publish(api, &main_board, &pitch.heading, &message).await?;
    tracing::info!(updated, "pitch status note updated");
    Ok(message)
}
