//! GraphQL documents.
//!
//! Connection page sizes mirror the API's pagination behavior: 100 for
//! cards/issues/PRs, 15 for columns, 10 for assignees/labels, 5 for a
//! PR's closing-issue references (a bounded hint, not a full listing).

use boardsync_core::AccountKind;

/// Shared card selection, spread into the board query.
const CARD_FRAGMENT: &str = r#"
fragment cardFields on ProjectCard {
  id
  isArchived
  url
  note
  content {
    __typename
    ... on Issue {
      id
      url
      title
      closed
      closedAt
    }
    ... on PullRequest {
      id
      title
      closed
      closedAt
      merged
      closingIssuesReferences(first: 5) {
        totalCount
        nodes {
          id
          url
          title
          closed
          closedAt
        }
      }
    }
  }
}
"#;

/// Board query body; `__ACCOUNT__` is replaced with `user` or
/// `organization` from [`AccountKind`], the only non-variable part of
/// any document.
const BOARD_QUERY: &str = r#"
query Board($owner: String!, $number: Int!) {
  __ACCOUNT__(login: $owner) {
    project(number: $number) {
      id
      name
      pendingCards(first: 100) {
        totalCount
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          ...cardFields
        }
      }
      columns(first: 15) {
        totalCount
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          id
          name
          cards(first: 100) {
            totalCount
            pageInfo {
              hasNextPage
              endCursor
            }
            nodes {
              ...cardFields
            }
          }
        }
      }
    }
  }
}
"#;

pub fn board_query(kind: AccountKind) -> String {
    let mut doc = BOARD_QUERY.replace("__ACCOUNT__", kind.query_field());
    doc.push_str(CARD_FRAGMENT);
    doc
}

const ISSUE_CONNECTION: &str = r#"
    issues(first: 100, after: $after) {
      totalCount
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        id
        url
        title
        closed
        closedAt
        assignees(first: 10) {
          totalCount
          pageInfo {
            hasNextPage
            endCursor
          }
          nodes {
            login
            name
          }
        }
        labels(first: 10) {
          totalCount
          pageInfo {
            hasNextPage
            endCursor
          }
          nodes {
            name
          }
        }
      }
    }
"#;

const PULL_REQUEST_CONNECTION: &str = r#"
    pullRequests(first: 100, after: $after) {
      totalCount
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        id
        title
        closed
        closedAt
        merged
        closingIssuesReferences(first: 5) {
          totalCount
          pageInfo {
            hasNextPage
            endCursor
          }
          nodes {
            id
            url
            title
            closed
            closedAt
          }
        }
      }
    }
"#;

/// Initial repository fetch: first page of both collections.
pub fn repo_query() -> String {
    format!(
        r#"
query Repo($owner: String!, $name: String!, $after: String) {{
  repository(owner: $owner, name: $name) {{
    name
{ISSUE_CONNECTION}
{PULL_REQUEST_CONNECTION}
  }}
}}
"#
    )
}

/// Follow-up page of a repository's issues.
pub fn more_issues_query() -> String {
    format!(
        r#"
query MoreIssues($owner: String!, $name: String!, $after: String) {{
  repository(owner: $owner, name: $name) {{
    name
{ISSUE_CONNECTION}
  }}
}}
"#
    )
}

/// Follow-up page of a repository's pull requests.
pub fn more_pull_requests_query() -> String {
    format!(
        r#"
query MorePullRequests($owner: String!, $name: String!, $after: String) {{
  repository(owner: $owner, name: $name) {{
    name
{PULL_REQUEST_CONNECTION}
  }}
}}
"#
    )
}

pub const ADD_CARD: &str = r#"
mutation AddCard($columnId: ID!, $contentId: ID!, $clientMutationId: String) {
  addProjectCard(input: {
    projectColumnId: $columnId,
    contentId: $contentId,
    clientMutationId: $clientMutationId
  }) {
    clientMutationId
    cardEdge {
      node {
        id
      }
    }
  }
}
"#;

pub const MOVE_CARD: &str = r#"
mutation MoveCard($cardId: ID!, $columnId: ID!, $afterCardId: ID, $clientMutationId: String) {
  moveProjectCard(input: {
    cardId: $cardId,
    columnId: $columnId,
    afterCardId: $afterCardId,
    clientMutationId: $clientMutationId
  }) {
    clientMutationId
  }
}
"#;

pub const DELETE_CARD: &str = r#"
mutation DeleteCard($cardId: ID!, $clientMutationId: String) {
  deleteProjectCard(input: {
    cardId: $cardId,
    clientMutationId: $clientMutationId
  }) {
    clientMutationId
  }
}
"#;

pub const UPDATE_NOTE: &str = r#"
mutation UpdateNote($cardId: ID!, $note: String!, $clientMutationId: String) {
  updateProjectCard(input: {
    projectCardId: $cardId,
    note: $note,
    clientMutationId: $clientMutationId
  }) {
    clientMutationId
  }
}
"#;
