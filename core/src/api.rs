//! The transport seam.
//!
//! The engine never speaks HTTP or GraphQL itself; it consumes these
//! abstract capabilities. The production implementation lives in
//! `boardsync-github`; tests use an in-memory double; [`DryRunApi`]
//! wraps any implementation to log mutations instead of issuing them.

use async_trait::async_trait;

use crate::error::BoardError;
use crate::types::{Connection, Issue, Project, PullRequest, Repo};

/// Query and mutation capabilities the reconciler depends on.
///
/// Mutations are order-sensitive within a column (an insert anchored
/// "after card X" must observe X in its final position), so callers
/// await each call before issuing the next. An absent `after_card_id`
/// must reach the wire as an explicit null, never as an empty string.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Fetch the board (columns, cards, pending cards) and the first
    /// page of each tracked repository's issues and pull requests.
    async fn fetch_board(
        &self,
        project_number: u64,
        repos: &[String],
    ) -> Result<(Project, Vec<Repo>), BoardError>;

    /// Fetch the next page of a repository's issues.
    async fn more_issues(
        &self,
        repo: &str,
        after: &str,
    ) -> Result<Connection<Issue>, BoardError>;

    /// Fetch the next page of a repository's pull requests.
    async fn more_pull_requests(
        &self,
        repo: &str,
        after: &str,
    ) -> Result<Connection<PullRequest>, BoardError>;

    /// Create a card for `content_id` in `column_id`; returns the new
    /// card's id. The creation API accepts no position, which is why
    /// placement is a separate move.
    async fn add_card(&self, column_id: &str, content_id: &str) -> Result<String, BoardError>;

    /// Move a card into `column_id`, after `after_card_id` or to the top.
    async fn move_card(
        &self,
        card_id: &str,
        column_id: &str,
        after_card_id: Option<&str>,
    ) -> Result<(), BoardError>;

    /// Delete a card from the board.
    async fn delete_card(&self, card_id: &str) -> Result<(), BoardError>;

    /// Replace the text of a note card.
    async fn update_note(&self, card_id: &str, note: &str) -> Result<(), BoardError>;
}

/// Pass-through for reads, logging no-op for mutations.
pub struct DryRunApi<A> {
    inner: A,
}

impl<A> DryRunApi<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: BoardApi> BoardApi for DryRunApi<A> {
    async fn fetch_board(
        &self,
        project_number: u64,
        repos: &[String],
    ) -> Result<(Project, Vec<Repo>), BoardError> {
        self.inner.fetch_board(project_number, repos).await
    }

    async fn more_issues(&self, repo: &str, after: &str) -> Result<Connection<Issue>, BoardError> {
        self.inner.more_issues(repo, after).await
    }

    async fn more_pull_requests(
        &self,
        repo: &str,
        after: &str,
    ) -> Result<Connection<PullRequest>, BoardError> {
        self.inner.more_pull_requests(repo, after).await
    }

    async fn add_card(&self, column_id: &str, content_id: &str) -> Result<String, BoardError> {
        tracing::info!(column_id, content_id, "dry-run: would add card");
        Ok(format!("dry-run-card-{content_id}"))
    }

    async fn move_card(
        &self,
        card_id: &str,
        column_id: &str,
        after_card_id: Option<&str>,
    ) -> Result<(), BoardError> {
        tracing::info!(card_id, column_id, ?after_card_id, "dry-run: would move card");
        Ok(())
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), BoardError> {
        tracing::info!(card_id, "dry-run: would delete card");
        Ok(())
    }

    async fn update_note(&self, card_id: &str, note: &str) -> Result<(), BoardError> {
        tracing::info!(card_id, chars = note.len(), "dry-run: would update note");
        Ok(())
    }
}
