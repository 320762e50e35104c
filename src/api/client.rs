//! Blocking HTTP implementation of [`Remote`]

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use reqwest::blocking::{Client, Response};
use reqwest::cookie::Jar;
use serde_json::Value;
use tracing::{debug, info};

use super::session;
use super::{ApiError, ExportFormat, ObjectKind, QueryMethod, RawResponse, Record, Remote, Summary};

type Result<T> = std::result::Result<T, ApiError>;

/// Production service endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.gaiagps.com";

/// Upper bound requested from list endpoints (the service pages otherwise)
const LIST_PAGE_SIZE: &str = "5000";

/// Remote backed by the service's JSON API and a cookie session
pub struct HttpRemote {
    base_url: String,
    client: Client,
    jar: Arc<Jar>,
    session_path: Option<PathBuf>,
}

impl HttpRemote {
    /// Build a client, restoring cookies from `session_path` if present
    ///
    /// # Errors
    /// Returns `ApiError` if the base URL is invalid, the session file cannot
    /// be read, or the HTTP client cannot be constructed.
    pub fn new(base_url: &str, session_path: Option<PathBuf>) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let jar = Arc::new(Jar::default());
        if let Some(path) = &session_path {
            session::restore(&jar, &base_url, path)?;
        }
        let client = Client::builder()
            .user_agent(concat!("trailhead/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        Ok(Self {
            base_url,
            client,
            jar,
            session_path,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in with a username and password, then persist the session
    ///
    /// # Errors
    /// Returns `ApiError::Unauthorized` if the credentials are refused.
    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        info!(username, "logging in");
        let resp = self
            .client
            .post(self.url(&["login"]))
            .form(&[("username", username), ("password", password)])
            .send()?;
        debug!(status = %resp.status(), url = %resp.url(), "login response");
        if !self.test_auth() {
            return Err(ApiError::Unauthorized(format!(
                "login failed for user '{username}'"
            )));
        }
        self.save_session()
    }

    /// Write the current cookies to the session file, if one is configured
    ///
    /// # Errors
    /// Returns `ApiError::Io` if the file cannot be written.
    pub fn save_session(&self) -> Result<()> {
        match &self.session_path {
            Some(path) => session::save(&self.jar, &self.base_url, path),
            None => Ok(()),
        }
    }

    fn url(&self, parts: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for part in parts {
            url.push('/');
            url.push_str(part);
        }
        url
    }

    fn objects_url(&self, kind: ObjectKind) -> String {
        self.url(&["api", "objects", kind.as_str()])
    }

    fn object_url(&self, kind: ObjectKind, id: &str) -> String {
        self.url(&["api", "objects", kind.as_str(), id])
    }

    fn ensure_ok(resp: Response, context: &str) -> Result<Response> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized(format!(
                "{context}: session missing or expired (log in with --user)"
            )));
        }
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                context: context.to_string(),
            });
        }
        Ok(resp)
    }

    fn read_record(resp: Response) -> Result<Record> {
        let value: Value = resp.json()?;
        Record::from_value(value)
    }
}

impl Remote for HttpRemote {
    fn list_objects(&self, kind: ObjectKind, archived: bool) -> Result<Vec<Summary>> {
        debug!(%kind, archived, "listing objects");
        let show_archived = if archived { "true" } else { "false" };
        let resp = self
            .client
            .get(self.objects_url(kind))
            .query(&[
                ("count", LIST_PAGE_SIZE),
                ("page", "1"),
                ("routepoints", "false"),
                ("show_archived", show_archived),
                ("show_filed", "true"),
                ("sort_direction", "desc"),
            ])
            .send()?;
        let resp = Self::ensure_ok(resp, &format!("list {}", kind.plural()))?;
        let value: Value = resp.json()?;
        Ok(serde_json::from_value(value)?)
    }

    fn get_object(&self, kind: ObjectKind, id: &str) -> Result<Record> {
        debug!(%kind, id, "fetching object");
        let resp = self.client.get(self.object_url(kind, id)).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                kind,
                field: "id",
                value: id.to_string(),
            });
        }
        Self::read_record(Self::ensure_ok(resp, &format!("get {kind} {id}"))?)
    }

    fn create_object(&self, kind: ObjectKind, body: &Value) -> Result<Record> {
        debug!(%kind, "creating object");
        let resp = self.client.post(self.objects_url(kind)).json(body).send()?;
        Self::read_record(Self::ensure_ok(resp, &format!("create {kind}"))?)
    }

    fn put_object(&self, kind: ObjectKind, record: &Record) -> Result<Record> {
        let id = record
            .id()
            .ok_or_else(|| ApiError::Decode(format!("{kind} record has no id")))?;
        debug!(%kind, id, "writing object");
        let resp = self
            .client
            .put(self.object_url(kind, id))
            .json(record)
            .send()?;
        Self::read_record(Self::ensure_ok(resp, &format!("put {kind} {id}"))?)
    }

    fn delete_object(&self, kind: ObjectKind, id: &str) -> Result<()> {
        debug!(%kind, id, "deleting object");
        let resp = self.client.delete(self.object_url(kind, id)).send()?;
        Self::ensure_ok(resp, &format!("delete {kind} {id}"))?;
        Ok(())
    }

    fn set_objects_archive(&self, kind: ObjectKind, ids: &[String], archive: bool) -> Result<()> {
        debug!(%kind, count = ids.len(), archive, "setting archive flag");
        let body = serde_json::json!({ "deleted": archive, "ids": ids });
        let resp = self.client.put(self.objects_url(kind)).json(&body).send()?;
        Self::ensure_ok(resp, &format!("archive {}", kind.plural()))?;
        Ok(())
    }

    fn export_object(&self, kind: ObjectKind, id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        debug!(%kind, id, %format, "exporting object");
        let document = format!("{id}.{}", format.extension());
        let resp = self
            .client
            .get(self.url(&["api", "objects", kind.as_str(), document.as_str()]))
            .send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                kind,
                field: "id",
                value: id.to_string(),
            });
        }
        let resp = Self::ensure_ok(resp, &format!("export {kind} {id} as {format}"))?;
        Ok(resp.bytes()?.to_vec())
    }

    fn raw_request(
        &self,
        method: QueryMethod,
        path: &str,
        params: &[(String, String)],
    ) -> Result<RawResponse> {
        let url = self.url(&[path.trim_start_matches('/')]);
        debug!(method = method.as_str(), %url, "raw query");
        let method = Method::from_bytes(method.as_str().as_bytes())
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let resp = self.client.request(method, url).query(params).send()?;
        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: resp.bytes()?.to_vec(),
        })
    }

    fn test_auth(&self) -> bool {
        let resp = self
            .client
            .get(self.objects_url(ObjectKind::Folder))
            .query(&[("count", "1"), ("page", "1")])
            .send();
        match resp {
            Ok(r) => {
                debug!(status = %r.status(), "auth check");
                r.status().is_success()
            }
            Err(e) => {
                debug!(error = %e, "auth check failed");
                false
            }
        }
    }
}
