//! Domain model mirroring the GraphQL wire shape.
//!
//! Everything here is an immutable snapshot: the reconciler reads the
//! board once per run and never writes mutation results back into these
//! structures. Field names follow the API's camelCase via serde renames.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Cursor state for a paginated connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Cursor of the last node; absent on an empty connection.
    pub end_cursor: Option<String>,
}

/// A paginated collection: total count, cursor state, fetched nodes.
///
/// `total_count` reports the server-side size of the whole collection,
/// not of this page. The two disagreeing is how we detect a partial
/// view (see [`crate::paginate::ensure_complete`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub total_count: usize,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    pub nodes: Vec<T>,
}

impl<T> Connection<T> {
    /// True when every node of the server-side collection is present.
    pub fn is_complete(&self) -> bool {
        self.nodes.len() == self.total_count && !self.has_next_page()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|p| p.has_next_page)
    }

    /// Empty connection, used by tests and dry-run stubs.
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            page_info: None,
            nodes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub url: String,
    pub title: String,
    pub closed: bool,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Possibly absent: card-content projections omit assignees.
    #[serde(default)]
    pub assignees: Option<Connection<User>>,
    #[serde(default)]
    pub labels: Option<Connection<Label>>,
}

impl Issue {
    /// Whether at least one assignee exists. Trusts `total_count` so an
    /// unpaginated assignee list still answers correctly.
    pub fn is_assigned(&self) -> bool {
        self.assignees.as_ref().is_some_and(|a| a.total_count > 0)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: String,
    pub title: String,
    pub closed: bool,
    pub merged: bool,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    /// Bounded list of issues this PR closes; used to infer that an
    /// issue has work in flight.
    #[serde(default)]
    pub closing_issues_references: Option<Connection<Issue>>,
}

/// A tracked item: the content side of a card and the unit the
/// classifier operates on. Resolved from the API's `__typename`
/// discriminator at deserialization time; nothing downstream ever
/// inspects the raw tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum TrackedItem {
    Issue(Issue),
    PullRequest(PullRequest),
}

impl TrackedItem {
    pub fn id(&self) -> &str {
        match self {
            TrackedItem::Issue(i) => &i.id,
            TrackedItem::PullRequest(p) => &p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            TrackedItem::Issue(i) => &i.title,
            TrackedItem::PullRequest(p) => &p.title,
        }
    }

    pub fn closed(&self) -> bool {
        match self {
            TrackedItem::Issue(i) => i.closed,
            TrackedItem::PullRequest(p) => p.closed,
        }
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TrackedItem::Issue(i) => i.closed_at,
            TrackedItem::PullRequest(p) => p.closed_at,
        }
    }

    /// Item kind for log lines and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackedItem::Issue(_) => "issue",
            TrackedItem::PullRequest(_) => "pull request",
        }
    }
}

/// A board entry: either a free-text note or a reference to a tracked
/// item, never both.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub is_archived: bool,
    pub url: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub content: Option<TrackedItem>,
}

impl Card {
    pub fn is_note(&self) -> bool {
        self.note.is_some()
    }
}

/// A board column. Card order is the board's visual order and is
/// semantically significant to the note-ordering pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub name: String,
    pub cards: Connection<Card>,
}

/// The board: ordered columns plus the bucket of cards added to the
/// project but not yet placed in any column.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub pending_cards: Connection<Card>,
    pub columns: Connection<Column>,
}

/// One tracked repository with its independently paginated issue and
/// pull-request collections.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    pub name: String,
    #[serde(default)]
    pub issues: Option<Connection<Issue>>,
    #[serde(default)]
    pub pull_requests: Option<Connection<PullRequest>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tracked_item_resolves_typename_tag() {
        let json = serde_json::json!({
            "__typename": "PullRequest",
            "id": "PR_1",
            "title": "Fix pagination",
            "closed": true,
            "merged": true,
            "closedAt": "2026-08-20T12:00:00Z"
        });
        let item: TrackedItem =
            serde_json::from_value(json).unwrap_or_else(|e| panic!("deserialize: {e}"));
        match &item {
            TrackedItem::PullRequest(pr) => {
                assert!(pr.merged);
                assert_eq!(item.id(), "PR_1");
            }
            TrackedItem::Issue(_) => panic!("expected a pull request"),
        }
    }

    #[test]
    fn card_note_and_content_are_distinguished() {
        let note: Card = serde_json::from_value(serde_json::json!({
            "id": "C_1",
            "isArchived": false,
            "url": "https://example.test/c1",
            "note": "standup reminders",
            "content": null
        }))
        .unwrap_or_else(|e| panic!("deserialize: {e}"));
        assert!(note.is_note());
        assert!(note.content.is_none());

        let content: Card = serde_json::from_value(serde_json::json!({
            "id": "C_2",
            "isArchived": false,
            "url": "https://example.test/c2",
            "content": {
                "__typename": "Issue",
                "id": "I_1",
                "url": "https://example.test/i1",
                "title": "Ship it",
                "closed": false
            }
        }))
        .unwrap_or_else(|e| panic!("deserialize: {e}"));
        assert!(!content.is_note());
        assert_eq!(
            content.content.as_ref().map(TrackedItem::id),
            Some("I_1")
        );
    }

    #[test]
    fn connection_completeness_accounts_for_cursor() {
        let complete: Connection<Label> = serde_json::from_value(serde_json::json!({
            "totalCount": 1,
            "pageInfo": { "hasNextPage": false, "endCursor": "a" },
            "nodes": [ { "name": "DS" } ]
        }))
        .unwrap_or_else(|e| panic!("deserialize: {e}"));
        assert!(complete.is_complete());

        let truncated: Connection<Label> = serde_json::from_value(serde_json::json!({
            "totalCount": 5,
            "pageInfo": { "hasNextPage": true, "endCursor": "a" },
            "nodes": [ { "name": "DS" } ]
        }))
        .unwrap_or_else(|e| panic!("deserialize: {e}"));
        assert!(!truncated.is_complete());
    }
}
