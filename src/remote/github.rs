//! GitHub Contents API store.
//!
//! `GET /repos/{owner}/{repo}/contents/{path}` reads the file and its blob
//! sha; `PUT` on the same path writes it, carrying the sha read earlier so
//! GitHub rejects the write if someone else committed in between.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::{Committed, FileKey, RemoteFile};

use super::{RemoteStore, RepoAccess};

/// REST API version header value.
pub const API_VERSION: &str = "2022-11-28";

/// GitHub rejects requests without a user agent.
pub const USER_AGENT: &str = concat!("review-checklist-sync/", env!("CARGO_PKG_VERSION"));

const MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub-backed remote store.
pub struct GitHubStore {
    client: reqwest::Client,
}

impl GitHubStore {
    /// Create a store with a fresh HTTP client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: reqwest::Url,
        settings: &Settings,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(settings.token.trim())
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .timeout(settings.request_timeout())
    }
}

/// Contents API response for a file.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Contents API request body for create/update.
#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

/// Repository endpoint response (subset).
#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    permissions: Option<RepoPermissions>,
}

#[derive(Debug, Deserialize)]
struct RepoPermissions {
    #[serde(default)]
    push: bool,
}

/// Build `{api_base}/repos/{owner}/{repo}[/contents/{path}]`.
///
/// Segments are pushed individually so names with spaces or `#` are
/// percent-encoded while `/` in the file path still separates segments.
fn api_url(settings: &Settings, contents_path: Option<&str>) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(settings.api_base.trim())
        .map_err(|e| Error::Config(format!("Invalid api_base '{}': {e}", settings.api_base)))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| Error::Config(format!("Invalid api_base '{}'", settings.api_base)))?;
        segments
            .pop_if_empty()
            .push("repos")
            .push(settings.owner.trim())
            .push(settings.repo.trim());
        if let Some(path) = contents_path {
            segments
                .push("contents")
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
    }

    Ok(url)
}

/// Decode the base64 body of a Contents API response.
///
/// GitHub wraps the payload at 60 columns, so whitespace is stripped first.
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::Decode(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::Decode(format!("file is not UTF-8: {e}")))
}

fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Map a failed write response to the error taxonomy.
///
/// 409 is GitHub's answer to a stale sha. 422 with a message about the sha
/// happens when the file was created after we saw it missing.
fn classify_write_failure(status: u16, body: String, file: &FileKey) -> Error {
    let sha_complaint = body.to_lowercase().contains("sha");
    if status == 409 || (status == 422 && sha_complaint) {
        Error::Conflict {
            file: file.to_string(),
        }
    } else {
        Error::Remote { status, body }
    }
}

fn transport_error(err: &reqwest::Error, operation: &str, settings: &Settings) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            operation: operation.to_string(),
            seconds: settings.request_timeout().as_secs(),
        }
    } else {
        Error::Transport(format!("{operation} failed: {err}"))
    }
}

impl RemoteStore for GitHubStore {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch(&self, settings: &Settings) -> Result<RemoteFile> {
        let key = settings.file_key();
        let url = api_url(settings, Some(&key.path))?;
        debug!(file = %key, "GET contents");

        let response = self
            .request(reqwest::Method::GET, url, settings)
            .send()
            .await
            .map_err(|e| transport_error(&e, "fetching file", settings))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(file = %key, "file does not exist yet");
            return Ok(RemoteFile::missing());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let data: ContentsResponse = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("unexpected contents response: {e}")))?;

        if data.encoding.as_deref().is_some_and(|enc| enc != "base64") {
            return Err(Error::Decode(format!(
                "{key} is too large for the contents API (encoding: {})",
                data.encoding.unwrap_or_default()
            )));
        }

        Ok(RemoteFile {
            content: decode_content(&data.content)?,
            sha: Some(data.sha),
        })
    }

    async fn write(
        &self,
        settings: &Settings,
        content: &str,
        base_sha: Option<&str>,
    ) -> Result<Committed> {
        let key = settings.file_key();
        let url = api_url(settings, Some(&key.path))?;
        debug!(file = %key, base_sha = ?base_sha, bytes = content.len(), "PUT contents");

        let body = PutRequest {
            message: &settings.commit_message,
            content: encode_content(content),
            sha: base_sha,
        };

        let response = self
            .request(reqwest::Method::PUT, url, settings)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, "writing file", settings))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_write_failure(status.as_u16(), body, &key));
        }

        let data: PutResponse = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("unexpected write response: {e}")))?;

        Ok(Committed {
            sha: data.content.sha,
        })
    }

    async fn check_access(&self, settings: &Settings) -> Result<RepoAccess> {
        let url = api_url(settings, None)?;

        let response = self
            .request(reqwest::Method::GET, url, settings)
            .send()
            .await
            .map_err(|e| transport_error(&e, "checking repository", settings))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let data: RepoResponse = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("unexpected repository response: {e}")))?;

        Ok(RepoAccess {
            full_name: data.full_name,
            default_branch: data.default_branch,
            private: data.private,
            can_push: data.permissions.is_some_and(|p| p.push),
        })
    }
}
