//! The GraphQL client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use boardsync_core::api::BoardApi;
use boardsync_core::config::{AccountKind, SecretToken};
use boardsync_core::error::BoardError;
use boardsync_core::types::{Connection, Issue, Project, PullRequest, Repo};

use crate::queries;

/// `BoardApi` implementation against the GitHub GraphQL endpoint.
///
/// Holds one `reqwest::Client` for the process. The token lives inside
/// a [`SecretToken`], so deriving nothing and a manual `Debug`-free
/// struct keep it out of logs.
pub struct GithubClient {
    http: reqwest::Client,
    endpoint: String,
    owner: String,
    account_kind: AccountKind,
    token: SecretToken,
}

impl GithubClient {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.github.com/graphql";

    pub fn new(owner: impl Into<String>, account_kind: AccountKind, token: SecretToken) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            owner: owner.into(),
            account_kind,
            token,
        }
    }

    /// Point the client at a different endpoint. Used by tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// POST one GraphQL document with its variables and return the
    /// `data` value. HTTP failures, GraphQL `errors`, and a missing
    /// `data` field each map to their own [`BoardError`] variant.
    async fn graphql(&self, document: &str, variables: Value) -> Result<Value, BoardError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.token.reveal())
            .header(reqwest::header::USER_AGENT, "boardsync")
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await
            .map_err(BoardError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BoardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(BoardError::transport)?;
        if let Some(errors) = body.get("errors").and_then(Value::as_array)
            && !errors.is_empty()
        {
            let message = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(BoardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        match body.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(BoardError::MalformedResponse(
                "response has no data field".to_string(),
            )),
        }
    }

    fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, BoardError> {
        serde_json::from_value(value)
            .map_err(|e| BoardError::MalformedResponse(format!("{what}: {e}")))
    }

    /// Extract a non-null value at `pointer`, or fail with the shape
    /// description.
    fn extract(data: &Value, pointer: &str, what: &str) -> Result<Value, BoardError> {
        match data.pointer(pointer) {
            Some(value) if !value.is_null() => Ok(value.clone()),
            _ => Err(BoardError::MalformedResponse(format!(
                "expected {what} at {pointer}"
            ))),
        }
    }

    async fn fetch_repo(&self, name: &str) -> Result<Repo, BoardError> {
        let data = self
            .graphql(
                &queries::repo_query(),
                json!({ "owner": self.owner, "name": name, "after": null }),
            )
            .await?;
        let value = Self::extract(&data, "/repository", &format!("repository {name}"))?;
        Self::decode(value, &format!("repository {name}"))
    }
}

#[async_trait]
impl BoardApi for GithubClient {
    async fn fetch_board(
        &self,
        project_number: u64,
        repos: &[String],
    ) -> Result<(Project, Vec<Repo>), BoardError> {
        let data = self
            .graphql(
                &queries::board_query(self.account_kind),
                json!({ "owner": self.owner, "number": project_number }),
            )
            .await?;
        let pointer = format!("/{}/project", self.account_kind.query_field());
        let value = Self::extract(&data, &pointer, &format!("project {project_number}"))?;
        let project: Project = Self::decode(value, "project")?;
        tracing::debug!(board = %project.name, "fetched project");

        let mut fetched = Vec::with_capacity(repos.len());
        for name in repos {
            fetched.push(self.fetch_repo(name).await?);
        }
        Ok((project, fetched))
    }

    async fn more_issues(&self, repo: &str, after: &str) -> Result<Connection<Issue>, BoardError> {
        let data = self
            .graphql(
                &queries::more_issues_query(),
                json!({ "owner": self.owner, "name": repo, "after": after }),
            )
            .await?;
        let value = Self::extract(
            &data,
            "/repository/issues",
            &format!("issues of {repo}"),
        )?;
        Self::decode(value, &format!("issues of {repo}"))
    }

    async fn more_pull_requests(
        &self,
        repo: &str,
        after: &str,
    ) -> Result<Connection<PullRequest>, BoardError> {
        let data = self
            .graphql(
                &queries::more_pull_requests_query(),
                json!({ "owner": self.owner, "name": repo, "after": after }),
            )
            .await?;
        let value = Self::extract(
            &data,
            "/repository/pullRequests",
            &format!("pull requests of {repo}"),
        )?;
        Self::decode(value, &format!("pull requests of {repo}"))
    }

    async fn add_card(&self, column_id: &str, content_id: &str) -> Result<String, BoardError> {
        let data = self
            .graphql(
                queries::ADD_CARD,
                json!({
                    "columnId": column_id,
                    "contentId": content_id,
                    "clientMutationId": content_id,
                }),
            )
            .await?;
        let value = Self::extract(
            &data,
            "/addProjectCard/cardEdge/node/id",
            "new card id",
        )?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BoardError::MalformedResponse("card id is not a string".to_string()))
    }

    async fn move_card(
        &self,
        card_id: &str,
        column_id: &str,
        after_card_id: Option<&str>,
    ) -> Result<(), BoardError> {
        // serde renders a None here as a JSON null, which is exactly the
        // "no anchor, place at top" the mutation expects.
        self.graphql(
            queries::MOVE_CARD,
            json!({
                "cardId": card_id,
                "columnId": column_id,
                "afterCardId": after_card_id,
                "clientMutationId": card_id,
            }),
        )
        .await?;
        Ok(())
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), BoardError> {
        self.graphql(
            queries::DELETE_CARD,
            json!({ "cardId": card_id, "clientMutationId": card_id }),
        )
        .await?;
        Ok(())
    }

    async fn update_note(&self, card_id: &str, note: &str) -> Result<(), BoardError> {
        self.graphql(
            queries::UPDATE_NOTE,
            json!({ "cardId": card_id, "note": note, "clientMutationId": card_id }),
        )
        .await?;
        Ok(())
    }
}
