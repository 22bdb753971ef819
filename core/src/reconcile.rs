//! The reconciliation pass.
//!
//! One invocation: fetch a complete snapshot, verify the complete-view
//! invariant, index existing cards, restore note ordering, then walk
//! every tracked item through the per-item state machine (no-op, move,
//! add-then-move, delete). Structural problems abort the run; a single
//! item's mutation failure is logged and counted, and the pass
//! continues, so one bad card never blocks the board's convergence.
//!
//! The snapshot is never updated from mutation results. The only state
//! threaded between mutations is each column's note anchor, which is
//! known from the pure plan before any move executes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::api::BoardApi;
use crate::classify::{IssuePrLinks, Target, classify_issue, classify_pull_request, issue_pr_links};
use crate::config::SyncConfig;
use crate::error::BoardError;
use crate::index::CardIndex;
use crate::notes::plan_note_moves;
use crate::paginate::{collect_all, ensure_complete};
use crate::types::{Column, Issue, Project, PullRequest, Repo};

/// Canonical column names; lookup by name is authoritative.
pub const TODO_COLUMN: &str = "To Do";
pub const IN_PROGRESS_COLUMN: &str = "In Progress";
pub const DONE_COLUMN: &str = "Done";
pub const NOTES_COLUMN: &str = "Notes";

/// Counts reported at the end of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub issues: usize,
    pub pull_requests: usize,
    pub note_moves: usize,
    pub added: usize,
    pub moved: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Per-item mutation failures; they do not fail the run.
    pub failed: usize,
}

/// Resolve a column by its exact name.
pub fn find_column<'a>(project: &'a Project, name: &str) -> Result<&'a Column, BoardError> {
    project
        .columns
        .nodes
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| BoardError::MissingColumn(name.to_string()))
}

/// Drain every tracked repository's issue and pull-request connections.
pub async fn fetch_tracked_items(
    api: &dyn BoardApi,
    repos: Vec<Repo>,
) -> Result<(Vec<Issue>, Vec<PullRequest>), BoardError> {
    let mut issues = Vec::new();
    let mut pull_requests = Vec::new();

    for repo in repos {
        let name = repo.name;
        let first_issues = repo.issues.ok_or_else(|| {
            BoardError::MalformedResponse(format!("repository {name} has no issues connection"))
        })?;
        let repo_issues = collect_all(first_issues, |cursor| {
            let name = name.clone();
            async move { api.more_issues(&name, &cursor).await }
        })
        .await?;

        let first_prs = repo.pull_requests.ok_or_else(|| {
            BoardError::MalformedResponse(format!(
                "repository {name} has no pullRequests connection"
            ))
        })?;
        let repo_prs = collect_all(first_prs, |cursor| {
            let name = name.clone();
            async move { api.more_pull_requests(&name, &cursor).await }
        })
        .await?;

        tracing::info!(
            repo = %name,
            issues = repo_issues.len(),
            pull_requests = repo_prs.len(),
            "fetched repository"
        );
        issues.extend(repo_issues);
        pull_requests.extend(repo_prs);
    }

    Ok((issues, pull_requests))
}

/// Verify the complete-view invariant for the board snapshot.
fn ensure_board_complete(project: &Project) -> Result<(), BoardError> {
    ensure_complete(&project.columns, "columns")?;
    ensure_complete(&project.pending_cards, "pending cards")?;
    for column in &project.columns.nodes {
        ensure_complete(&column.cards, &format!("{} cards", column.name))?;
    }
    Ok(())
}

/// Restore note-cards-first ordering in every column. Returns each
/// column's content anchor. Move failures are isolated: the anchor
/// comes from the pure plan, so later placements still aim at the
/// right card even if an individual move did not apply.
async fn reorder_notes(
    api: &dyn BoardApi,
    project: &Project,
    report: &mut SyncReport,
) -> HashMap<String, Option<String>> {
    let mut anchors = HashMap::new();
    for column in &project.columns.nodes {
        let plan = plan_note_moves(&column.cards.nodes);
        for mv in &plan.moves {
            tracing::info!(
                column = %column.name,
                card_id = %mv.card_id,
                "moving note card above content"
            );
            match api
                .move_card(&mv.card_id, &column.id, mv.after.as_deref())
                .await
            {
                Ok(()) => report.note_moves += 1,
                Err(err) => {
                    tracing::warn!(card_id = %mv.card_id, error = %err, "note move failed");
                    report.failed += 1;
                }
            }
        }
        anchors.insert(column.id.clone(), plan.anchor);
    }
    anchors
}

struct ItemRef<'a> {
    id: &'a str,
    kind: &'static str,
    title: &'a str,
}

/// The per-item state machine: exactly one of no-op, add, move, delete.
/// All mutation failures here are isolated to the item.
async fn reconcile_item(
    api: &dyn BoardApi,
    item: ItemRef<'_>,
    target: Target,
    todo: &Column,
    in_progress: &Column,
    done: &Column,
    anchors: &HashMap<String, Option<String>>,
    index: &CardIndex,
    report: &mut SyncReport,
) {
    let column = match target {
        Target::ToDo => todo,
        Target::InProgress => in_progress,
        Target::Done => done,
        Target::Expire => {
            match index.get(item.id) {
                Some(card) => {
                    tracing::info!(
                        kind = item.kind,
                        id = item.id,
                        title = item.title,
                        "removing aged-out card"
                    );
                    match api.delete_card(&card.card_id).await {
                        Ok(()) => report.removed += 1,
                        Err(err) => {
                            tracing::warn!(id = item.id, error = %err, "delete failed");
                            report.failed += 1;
                        }
                    }
                }
                None => report.unchanged += 1,
            }
            return;
        }
    };

    let anchor = anchors.get(&column.id).cloned().flatten();
    match index.get(item.id) {
        Some(card) if card.column_id.as_deref() == Some(column.id.as_str()) => {
            report.unchanged += 1;
        }
        Some(card) => {
            tracing::info!(
                kind = item.kind,
                id = item.id,
                title = item.title,
                column = %column.name,
                "moving card"
            );
            match api
                .move_card(&card.card_id, &column.id, anchor.as_deref())
                .await
            {
                Ok(()) => report.moved += 1,
                Err(err) => {
                    tracing::warn!(id = item.id, error = %err, "move failed");
                    report.failed += 1;
                }
            }
        }
        None => {
            tracing::info!(
                kind = item.kind,
                id = item.id,
                title = item.title,
                column = %column.name,
                "adding card"
            );
            // Two-step: the creation API accepts no position, so the
            // fresh card is immediately moved below the column's notes.
            let placed = async {
                let card_id = api.add_card(&column.id, item.id).await?;
                api.move_card(&card_id, &column.id, anchor.as_deref()).await
            }
            .await;
            match placed {
                Ok(()) => report.added += 1,
                Err(err) => {
                    tracing::warn!(id = item.id, error = %err, "add failed");
                    report.failed += 1;
                }
            }
        }
    }
}

/// Run one full reconciliation pass against the board described by
/// `cfg`. Structural errors abort; per-item mutation failures are
/// counted in the returned [`SyncReport`].
pub async fn sync_board(
    api: &dyn BoardApi,
    cfg: &SyncConfig,
    now: DateTime<Utc>,
) -> Result<SyncReport, BoardError> {
    let mut report = SyncReport::default();

    let (project, repos) = api.fetch_board(cfg.project_number, &cfg.repos).await?;
    tracing::info!(board = %project.name, repos = repos.len(), "fetched board");

    let (issues, pull_requests) = fetch_tracked_items(api, repos).await?;
    report.issues = issues.len();
    report.pull_requests = pull_requests.len();
    tracing::info!(
        issues = issues.len(),
        pull_requests = pull_requests.len(),
        "fetched tracked items"
    );

    ensure_board_complete(&project)?;

    let todo = find_column(&project, TODO_COLUMN)?;
    let in_progress = find_column(&project, IN_PROGRESS_COLUMN)?;
    let done = find_column(&project, DONE_COLUMN)?;

    let index = CardIndex::merge([
        CardIndex::from_cards(&todo.cards.nodes, Some(&todo.id)),
        CardIndex::from_cards(&in_progress.cards.nodes, Some(&in_progress.id)),
        CardIndex::from_cards(&done.cards.nodes, Some(&done.id)),
        CardIndex::from_cards(&project.pending_cards.nodes, None),
    ]);
    tracing::info!(cards = index.len(), "indexed content cards");

    let anchors = reorder_notes(api, &project, &mut report).await;
    let links: IssuePrLinks = issue_pr_links(&pull_requests);

    for issue in &issues {
        let target = classify_issue(issue, &links, cfg.done_age_out_days, now)?;
        reconcile_item(
            api,
            ItemRef {
                id: &issue.id,
                kind: "issue",
                title: &issue.title,
            },
            target,
            todo,
            in_progress,
            done,
            &anchors,
            &index,
            &mut report,
        )
        .await;
    }

    for pr in &pull_requests {
        let target = classify_pull_request(pr, cfg.done_age_out_days, now)?;
        reconcile_item(
            api,
            ItemRef {
                id: &pr.id,
                kind: "pull request",
                title: &pr.title,
            },
            target,
            todo,
            in_progress,
            done,
            &anchors,
            &index,
            &mut report,
        )
        .await;
    }

    tracing::info!(?report, "reconciliation pass complete");
    Ok(report)
}
