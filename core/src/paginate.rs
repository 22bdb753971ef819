//! Cursor pagination and the complete-view invariant.
//!
//! Issue and pull-request collections can span many pages; the engine
//! must never reconcile against a partial view, because a card whose
//! item fell on an unfetched page would be re-added. [`collect_all`]
//! drains a connection page by page, and [`ensure_complete`] rejects
//! single-shot connections (columns, cards, labels) that the initial
//! query did not fully cover.

use std::future::Future;

use crate::error::BoardError;
use crate::types::Connection;

/// Drain a cursor-paginated connection, preserving node order.
///
/// `fetch_next` receives the previous page's end cursor and returns the
/// next page. Any fetch failure is fatal for the collection: a partial
/// result is worse than none.
pub async fn collect_all<T, F, Fut>(
    first: Connection<T>,
    mut fetch_next: F,
) -> Result<Vec<T>, BoardError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Connection<T>, BoardError>>,
{
    let mut nodes = first.nodes;
    let mut page_info = first.page_info;

    while page_info.as_ref().is_some_and(|p| p.has_next_page) {
        let cursor = page_info
            .as_ref()
            .and_then(|p| p.end_cursor.clone())
            .ok_or_else(|| {
                BoardError::MalformedResponse(
                    "connection reports hasNextPage without an endCursor".to_string(),
                )
            })?;
        tracing::debug!(cursor = %cursor, "fetching next page");
        let page = fetch_next(cursor).await?;
        nodes.extend(page.nodes);
        page_info = page.page_info;
    }

    Ok(nodes)
}

/// Reject a connection whose fetched nodes do not cover its reported
/// total. Single-shot connections must satisfy this before the card
/// index or the reconciler may trust them.
pub fn ensure_complete<T>(conn: &Connection<T>, what: &str) -> Result<(), BoardError> {
    if conn.is_complete() {
        Ok(())
    } else {
        Err(BoardError::IncompleteConnection {
            connection: what.to_string(),
            have: conn.nodes.len(),
            total: conn.total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageInfo;
    use pretty_assertions::assert_eq;

    fn page(nodes: Vec<u32>, total: usize, next: Option<&str>) -> Connection<u32> {
        Connection {
            total_count: total,
            page_info: Some(PageInfo {
                has_next_page: next.is_some(),
                end_cursor: next.map(str::to_string).or(Some("end".to_string())),
            }),
            nodes,
        }
    }

    #[tokio::test]
    async fn collect_all_preserves_order_across_pages() {
        let first = page(vec![1, 2], 5, Some("c1"));
        let collected = collect_all(first, |cursor| async move {
            match cursor.as_str() {
                "c1" => Ok(page(vec![3, 4], 5, Some("c2"))),
                "c2" => Ok(page(vec![5], 5, None)),
                other => panic!("unexpected cursor {other}"),
            }
        })
        .await
        .unwrap_or_else(|e| panic!("collect_all: {e}"));
        assert_eq!(collected, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn collect_all_single_page_makes_no_calls() {
        let first = page(vec![7], 1, None);
        let collected = collect_all(first, |_cursor| async move {
            panic!("no further fetch expected")
        })
        .await
        .unwrap_or_else(|e| panic!("collect_all: {e}"));
        assert_eq!(collected, vec![7]);
    }

    #[tokio::test]
    async fn collect_all_missing_cursor_is_malformed() {
        let first = Connection {
            total_count: 2,
            page_info: Some(PageInfo {
                has_next_page: true,
                end_cursor: None,
            }),
            nodes: vec![1],
        };
        let err = collect_all(first, |_cursor| async move { Ok(Connection::empty()) })
            .await
            .err();
        assert!(matches!(err, Some(BoardError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn collect_all_propagates_fetch_failure() {
        let first = page(vec![1], 3, Some("c1"));
        let err = collect_all(first, |_cursor| async move {
            Err::<Connection<u32>, _>(BoardError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            })
        })
        .await
        .err();
        assert!(matches!(err, Some(BoardError::Api { status: 502, .. })));
    }

    #[test]
    fn ensure_complete_reports_have_and_total() {
        let conn = page(vec![1], 4, None);
        match ensure_complete(&conn, "To Do cards") {
            Err(BoardError::IncompleteConnection {
                connection,
                have,
                total,
            }) => {
                assert_eq!(connection, "To Do cards");
                assert_eq!(have, 1);
                assert_eq!(total, 4);
            }
            other => panic!("expected IncompleteConnection, got {other:?}"),
        }
    }

    #[test]
    fn ensure_complete_accepts_full_view() {
        let conn = page(vec![1, 2], 2, None);
        assert!(ensure_complete(&conn, "columns").is_ok());
    }
}
