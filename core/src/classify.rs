//! Status policy: maps a tracked item's observable state to a target
//! column, or to expiry.
//!
//! Pure and total over the item's fields, the issue→PR link map, the
//! age-out threshold, and an injected `now`. The one deliberate
//! asymmetry, taken from the observed board behavior: a closed unmerged
//! pull request expires immediately, while closed issues and merged
//! pull requests linger in Done for the age-out window.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::BoardError;
use crate::types::{Issue, PullRequest, TrackedItem};

/// Target placement for a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    ToDo,
    InProgress,
    Done,
    /// Remove the item's card from the board entirely.
    Expire,
}

/// Map from issue id to the pull requests that close it, built once per
/// run from every fetched PR's bounded `closingIssuesReferences` list.
pub type IssuePrLinks = HashMap<String, Vec<String>>;

/// Group pull requests by the issues they close. An issue may be
/// referenced by several PRs; a PR may reference several issues.
pub fn issue_pr_links(pull_requests: &[PullRequest]) -> IssuePrLinks {
    let mut links: IssuePrLinks = HashMap::new();
    for pr in pull_requests {
        let Some(refs) = &pr.closing_issues_references else {
            continue;
        };
        if refs.total_count == 0 {
            continue;
        }
        for issue in &refs.nodes {
            links.entry(issue.id.clone()).or_default().push(pr.id.clone());
        }
    }
    links
}

fn closed_days(
    kind: &'static str,
    id: &str,
    closed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<i64, BoardError> {
    let closed_at = closed_at.ok_or_else(|| BoardError::ClosedWithoutTimestamp {
        kind,
        id: id.to_string(),
    })?;
    Ok((now - closed_at).num_days())
}

/// Classify an issue. `closed` without `closedAt` is a data-integrity
/// error, never defaulted.
pub fn classify_issue(
    issue: &Issue,
    links: &IssuePrLinks,
    done_age_out_days: i64,
    now: DateTime<Utc>,
) -> Result<Target, BoardError> {
    if issue.closed {
        let age = closed_days("issue", &issue.id, issue.closed_at, now)?;
        if age > done_age_out_days {
            return Ok(Target::Expire);
        }
        return Ok(Target::Done);
    }
    if issue.is_assigned() || links.contains_key(&issue.id) {
        Ok(Target::InProgress)
    } else {
        Ok(Target::ToDo)
    }
}

/// Classify a pull request. Open PRs are always in progress; a closed
/// unmerged PR expires regardless of age.
pub fn classify_pull_request(
    pr: &PullRequest,
    done_age_out_days: i64,
    now: DateTime<Utc>,
) -> Result<Target, BoardError> {
    if !pr.closed {
        return Ok(Target::InProgress);
    }
    let age = closed_days("pull request", &pr.id, pr.closed_at, now)?;
    if !pr.merged || age > done_age_out_days {
        Ok(Target::Expire)
    } else {
        Ok(Target::Done)
    }
}

/// Classify any tracked item.
pub fn classify(
    item: &TrackedItem,
    links: &IssuePrLinks,
    done_age_out_days: i64,
    now: DateTime<Utc>,
) -> Result<Target, BoardError> {
    match item {
        TrackedItem::Issue(issue) => classify_issue(issue, links, done_age_out_days, now),
        TrackedItem::PullRequest(pr) => classify_pull_request(pr, done_age_out_days, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Connection, User};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        "2026-08-28T00:00:00Z"
            .parse()
            .unwrap_or_else(|e| panic!("timestamp: {e}"))
    }

    fn open_issue(id: &str) -> Issue {
        Issue {
            id: id.to_string(),
            url: format!("https://example.test/{id}"),
            title: id.to_string(),
            closed: false,
            closed_at: None,
            assignees: None,
            labels: None,
        }
    }

    fn closed_issue(id: &str, days_ago: i64) -> Issue {
        Issue {
            closed: true,
            closed_at: Some(now() - Duration::days(days_ago)),
            ..open_issue(id)
        }
    }

    fn pr(id: &str, closed: bool, merged: bool, closed_days_ago: Option<i64>) -> PullRequest {
        PullRequest {
            id: id.to_string(),
            title: id.to_string(),
            closed,
            merged,
            closed_at: closed_days_ago.map(|d| now() - Duration::days(d)),
            url: None,
            closing_issues_references: None,
        }
    }

    fn assigned(mut issue: Issue) -> Issue {
        issue.assignees = Some(Connection {
            total_count: 1,
            page_info: None,
            nodes: vec![User {
                login: "dev".to_string(),
                name: None,
            }],
        });
        issue
    }

    fn links_for(issue_id: &str) -> IssuePrLinks {
        let mut links = IssuePrLinks::new();
        links.insert(issue_id.to_string(), vec!["PR_x".to_string()]);
        links
    }

    #[test]
    fn open_unassigned_unlinked_issue_is_todo() {
        let target = classify_issue(&open_issue("I_1"), &IssuePrLinks::new(), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::ToDo);
    }

    #[test]
    fn open_assigned_issue_is_in_progress() {
        let target = classify_issue(&assigned(open_issue("I_1")), &IssuePrLinks::new(), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::InProgress);
    }

    #[test]
    fn open_issue_with_linked_pr_is_in_progress() {
        let target = classify_issue(&open_issue("I_1"), &links_for("I_1"), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::InProgress);
    }

    #[test]
    fn closed_issue_within_window_is_done() {
        let target = classify_issue(&closed_issue("I_1", 2), &IssuePrLinks::new(), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::Done);
    }

    #[test]
    fn closed_issue_beyond_window_expires() {
        let target = classify_issue(&closed_issue("I_1", 10), &IssuePrLinks::new(), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::Expire);
    }

    #[test]
    fn closed_issue_without_timestamp_is_a_data_error() {
        let mut issue = open_issue("I_1");
        issue.closed = true;
        let err = classify_issue(&issue, &IssuePrLinks::new(), 7, now()).err();
        assert!(matches!(
            err,
            Some(BoardError::ClosedWithoutTimestamp { kind: "issue", .. })
        ));
    }

    #[test]
    fn open_pr_is_always_in_progress() {
        let target = classify_pull_request(&pr("PR_1", false, false, None), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::InProgress);
    }

    #[test]
    fn closed_unmerged_pr_expires_regardless_of_age() {
        let target = classify_pull_request(&pr("PR_1", true, false, Some(0)), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::Expire);
    }

    #[test]
    fn merged_pr_within_window_is_done() {
        let target = classify_pull_request(&pr("PR_1", true, true, Some(2)), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::Done);
    }

    #[test]
    fn merged_pr_beyond_window_expires() {
        let target = classify_pull_request(&pr("PR_1", true, true, Some(10)), 7, now())
            .unwrap_or_else(|e| panic!("classify: {e}"));
        assert_eq!(target, Target::Expire);
    }

    #[test]
    fn closed_pr_without_timestamp_is_a_data_error() {
        let err = classify_pull_request(&pr("PR_1", true, true, None), 7, now()).err();
        assert!(matches!(
            err,
            Some(BoardError::ClosedWithoutTimestamp {
                kind: "pull request",
                ..
            })
        ));
    }

    #[test]
    fn issue_pr_links_groups_by_issue() {
        let mut pr_a = pr("PR_a", false, false, None);
        pr_a.closing_issues_references = Some(Connection {
            total_count: 2,
            page_info: None,
            nodes: vec![open_issue("I_1"), open_issue("I_2")],
        });
        let mut pr_b = pr("PR_b", false, false, None);
        pr_b.closing_issues_references = Some(Connection {
            total_count: 1,
            page_info: None,
            nodes: vec![open_issue("I_1")],
        });

        let links = issue_pr_links(&[pr_a, pr_b]);
        assert_eq!(links.len(), 2);
        assert_eq!(
            links.get("I_1"),
            Some(&vec!["PR_a".to_string(), "PR_b".to_string()])
        );
        assert_eq!(links.get("I_2"), Some(&vec!["PR_a".to_string()]));
    }

    // Exhaustive sweep: every combination yields exactly one target and
    // never panics.
    #[test]
    fn classifier_is_total() {
        let links = links_for("I_t");
        for closed in [false, true] {
            for days in [0, 2, 7, 8, 30] {
                for has_assignee in [false, true] {
                    let mut issue = if closed {
                        closed_issue("I_t", days)
                    } else {
                        open_issue("I_t")
                    };
                    if has_assignee {
                        issue = assigned(issue);
                    }
                    for l in [&IssuePrLinks::new(), &links] {
                        let target = classify_issue(&issue, l, 7, now())
                            .unwrap_or_else(|e| panic!("classify: {e}"));
                        assert!(matches!(
                            target,
                            Target::ToDo | Target::InProgress | Target::Done | Target::Expire
                        ));
                    }
                    for merged in [false, true] {
                        let p = pr("PR_t", closed, merged, closed.then_some(days));
                        let target = classify_pull_request(&p, 7, now())
                            .unwrap_or_else(|e| panic!("classify: {e}"));
                        assert!(matches!(
                            target,
                            Target::InProgress | Target::Done | Target::Expire
                        ));
                    }
                }
            }
        }
    }
}
