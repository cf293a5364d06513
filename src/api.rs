// API client module: a small blocking HTTP client for the GitHub releases
// API. Every operation is a single request. Ordinary API failures come back
// as values (`Reply::Err`); only bad credentials, transport problems and
// unreadable asset files are errors.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ClientError;

/// Default JSON REST API host.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default host for release asset uploads.
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com";

/// Content type used when the asset extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// Asset uploads can take arbitrarily long on slow links.
const REQUEST_TIMEOUT: Option<Duration> = None;

const CLIENT_USER_AGENT: &str = concat!("release-me/", env!("CARGO_PKG_VERSION"));

/// Base URLs of the two hosts the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api: String,
    pub uploads: String,
}

impl Endpoints {
    pub fn new(api: impl Into<String>, uploads: impl Into<String>) -> Self {
        Endpoints {
            api: api.into().trim_end_matches('/').to_string(),
            uploads: uploads.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints::new(DEFAULT_API_URL, DEFAULT_UPLOAD_URL)
    }
}

/// Body of a failed response. GitHub normally answers with JSON, but not
/// every failure mode does, so undecodable bodies are kept as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    fn from_body(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Json(value) => write!(f, "{value:#}"),
            Payload::Text(text) => f.write_str(text),
        }
    }
}

/// A response whose status was not the one the operation expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub status: StatusCode,
    pub payload: Payload,
}

/// Outcome of a request that reached the API.
pub type Reply<T> = Result<T, Failure>;

/// Release metadata. Fields the client does not use are kept in `extra`
/// so the full remote object can be printed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Asset attached to a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize)]
struct NewRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
}

/// Authenticated client. Construction validates the token, so every
/// instance holds a session the API accepted.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    api: Url,
    uploads: Url,
}

impl ApiClient {
    /// Build a client and probe the API root with the token.
    ///
    /// Fails with [`ClientError::Auth`] unless the probe answers 200.
    pub fn new(token: &str, endpoints: Endpoints) -> Result<Self, ClientError> {
        let client = Client::builder()
            .default_headers(session_headers(token)?)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let api = ApiClient {
            client,
            api: base_url(&endpoints.api)?,
            uploads: base_url(&endpoints.uploads)?,
        };
        api.validate_token()?;
        Ok(api)
    }

    fn validate_token(&self) -> Result<(), ClientError> {
        let res = self.client.get(self.api.clone()).send()?;
        if res.status() != StatusCode::OK {
            debug!(status = %res.status(), "token probe rejected");
            return Err(ClientError::Auth("Invalid token".into()));
        }
        debug!(api = %self.api, "token accepted");
        Ok(())
    }

    /// Fetch repository metadata for `owner/name`.
    pub fn repository_exists(&self, repo: &str) -> Result<Reply<Value>, ClientError> {
        let url = repo_url(&self.api, repo, &[]);
        let res = self.client.get(url).send()?;
        decode_reply(res, StatusCode::OK)
    }

    /// Look up the release attached to `tag`.
    pub fn get_release(&self, repo: &str, tag: &str) -> Result<Reply<Release>, ClientError> {
        let url = repo_url(&self.api, repo, &["releases", "tags", tag]);
        let res = self.client.get(url).send()?;
        decode_reply(res, StatusCode::OK)
    }

    pub fn create_release(
        &self,
        repo: &str,
        tag: &str,
        name: &str,
        notes: &str,
    ) -> Result<Reply<Release>, ClientError> {
        let url = repo_url(&self.api, repo, &["releases"]);
        let body = NewRelease {
            tag_name: tag,
            name,
            body: notes,
        };
        let res = self.client.post(url).json(&body).send()?;
        decode_reply(res, StatusCode::CREATED)
    }

    pub fn delete_release(&self, repo: &str, release_id: u64) -> Result<Reply<()>, ClientError> {
        let id = release_id.to_string();
        let url = repo_url(&self.api, repo, &["releases", id.as_str()]);
        let res = self.client.delete(url).send()?;
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(Ok(()));
        }
        Ok(Err(failure(res)?))
    }

    /// Upload a local file as a release asset.
    ///
    /// The whole file is read into memory before the request is sent. The
    /// remote asset name is the file's basename.
    pub fn upload_asset(
        &self,
        repo: &str,
        release_id: u64,
        path: &Path,
    ) -> Result<Reply<Asset>, ClientError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::InvalidAssetPath(path.to_path_buf()))?;
        let content_type = content_type_for(path);
        let data = fs::read(path).map_err(|source| ClientError::AssetRead {
            path: path.to_path_buf(),
            source,
        })?;

        let id = release_id.to_string();
        let url = repo_url(&self.uploads, repo, &["releases", id.as_str(), "assets"]);
        debug!(asset = %name, content_type, bytes = data.len(), "uploading asset");
        let res = self
            .client
            .post(url)
            .query(&[("name", name.as_str())])
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()?;
        decode_reply(res, StatusCode::CREATED)
    }
}

/// Guess the content type of an asset from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

fn base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl {
            url: raw.to_string(),
            reason: "not a base URL".into(),
        });
    }
    Ok(url)
}

/// `{base}/repos/{owner}/{name}/{segments..}` with every segment
/// percent-encoded, so a tag such as `v1#rc` stays one path segment.
fn repo_url(base: &Url, repo: &str, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty()
            .push("repos")
            .extend(repo.split('/'))
            .extend(segments);
    }
    url
}

fn session_headers(token: &str) -> Result<HeaderMap, ClientError> {
    let mut auth = HeaderValue::from_str(&format!("token {token}"))
        .map_err(|_| ClientError::Auth("Invalid token: not a valid header value".into()))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

fn failure(res: Response) -> Result<Failure, ClientError> {
    let status = res.status();
    let payload = Payload::from_body(res.text()?);
    debug!(%status, "request failed");
    Ok(Failure { status, payload })
}

fn decode_reply<T: DeserializeOwned>(
    res: Response,
    expected: StatusCode,
) -> Result<Reply<T>, ClientError> {
    if res.status() != expected {
        return Ok(Err(failure(res)?));
    }
    let url = res.url().to_string();
    let text = res.text()?;
    serde_json::from_str(&text)
        .map(Ok)
        .map_err(|source| ClientError::Decode { url, source })
}
