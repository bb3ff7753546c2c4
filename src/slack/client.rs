use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{FileListPage, InfoResponse};

const API_BASE: &str = "https://slack.com/api";

/// Thin transport over the Slack Web API.
///
/// Every API method is a form-encoded POST carrying the token as a `token`
/// form field, the classic Web API convention. File content lives on
/// per-file private URLs and is fetched with a bearer header instead; see
/// [`SlackClient::get_download`].
#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    token: String,
    api_base: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SlackClient {
    /// Create a client with the given per-request timeout. The timeout
    /// covers the whole request including the body, so it also bounds how
    /// long a stalled content download can hang.
    pub fn new(token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            token: token.to_string(),
            api_base: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_api_base(token: &str, api_base: &str) -> Self {
        Self {
            http: Client::new(),
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// One page of `files.list`, optionally restricted to files uploaded
    /// at or after `ts_from` (inclusive).
    pub async fn list_files(
        &self,
        page: u64,
        ts_from: Option<u64>,
    ) -> Result<FileListPage, ApiError> {
        let mut params = vec![("page", page.to_string())];
        if let Some(ts) = ts_from {
            params.push(("ts_from", ts.to_string()));
        }
        let page: FileListPage = self.call("files.list", &params).await?;
        tracing::trace!(
            ok = page.ok,
            files = page.files.len(),
            error = ?page.error,
            "files.list payload"
        );
        Ok(page)
    }

    pub async fn user_name(&self, id: &str) -> Result<String, ApiError> {
        self.lookup("users.info", "user", id).await
    }

    pub async fn channel_name(&self, id: &str) -> Result<String, ApiError> {
        self.lookup("channels.info", "channel", id).await
    }

    /// `groups.info` takes the group id under the `channel` key.
    pub async fn group_name(&self, id: &str) -> Result<String, ApiError> {
        self.lookup("groups.info", "channel", id).await
    }

    /// Authorized GET for a descriptor's private download URL. Content URLs
    /// ignore the `token` form field and want a bearer header instead.
    pub(crate) fn get_download(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.token))
    }

    async fn lookup(
        &self,
        method: &'static str,
        key: &'static str,
        id: &str,
    ) -> Result<String, ApiError> {
        let response: InfoResponse = self.call(method, &[(key, id.to_string())]).await?;
        tracing::trace!(
            method,
            ok = response.ok,
            error = ?response.error,
            named = response
                .record
                .as_ref()
                .is_some_and(|record| record.name.is_some()),
            "lookup payload"
        );
        if !response.ok {
            return Err(ApiError::Api {
                method: method.to_string(),
                reason: response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        response
            .record
            .and_then(|record| record.name)
            .ok_or_else(|| ApiError::MissingField {
                method: method.to_string(),
                field: "name",
            })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.api_base, method);
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        form.push(("token", self.token.as_str()));
        for (key, value) in params {
            form.push((key, value.as_str()));
        }

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|source| ApiError::Http {
                method: method.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| ApiError::Http {
            method: method.to_string(),
            source,
        })
    }
}
