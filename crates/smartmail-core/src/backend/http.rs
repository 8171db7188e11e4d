//! HTTP implementation of the backend collaborator.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{Backend, BackendError, BackendResult};
use crate::model::{AuthStatus, EmailRecord, HealthStatus, LoginRedirect, LogoutAck};

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// API root, e.g. `http://localhost:8000/api`.
    pub base_url: Url,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout. Processing today's mail can be slow.
    pub request_timeout: Duration,
}

impl HttpSettings {
    /// Creates settings with default timeouts.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// FastAPI error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Backend reached over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &HttpSettings) -> BackendResult<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;

        // Join relative paths under the API root rather than replacing its last segment.
        let mut base_url = settings.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Returns the API root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> BackendResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    Err(BackendError::Status {
        status: status.as_u16(),
        detail,
    })
}

impl Backend for HttpBackend {
    async fn auth_status(&self) -> BackendResult<AuthStatus> {
        self.get_json("auth/status").await
    }

    async fn begin_login(&self) -> BackendResult<LoginRedirect> {
        self.get_json("auth/google/login").await
    }

    async fn logout(&self) -> BackendResult<LogoutAck> {
        let url = self.endpoint("auth/logout")?;
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(LogoutAck::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn todays_emails(&self) -> BackendResult<Vec<EmailRecord>> {
        self.get_json("emails/today").await
    }

    async fn health(&self) -> BackendResult<HealthStatus> {
        self.get_json("health").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::{Command, Event};
    use crate::request::RequestId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        let base = Url::parse(&format!("{}/api", server.uri())).unwrap();
        HttpBackend::new(&HttpSettings::new(base)).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let backend =
            HttpBackend::new(&HttpSettings::new(Url::parse("http://localhost:8000/api").unwrap()))
                .unwrap();
        assert_eq!(backend.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            backend.endpoint("auth/status").unwrap().as_str(),
            "http://localhost:8000/api/auth/status"
        );
    }

    #[tokio::test]
    async fn test_auth_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "authenticated": false,
                "message": "No authentication token found."
            })))
            .mount(&server)
            .await;

        let status = backend_for(&server).auth_status().await.unwrap();
        assert_eq!(
            status,
            AuthStatus::new(false, "No authentication token found.")
        );
    }

    #[tokio::test]
    async fn test_begin_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/google/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "authorization_url": "https://accounts.google.com/o/oauth2/auth?state=s1"
            })))
            .mount(&server)
            .await;

        let redirect = backend_for(&server).begin_login().await.unwrap();
        assert_eq!(
            redirect.authorization_url,
            "https://accounts.google.com/o/oauth2/auth?state=s1"
        );
    }

    #[tokio::test]
    async fn test_server_error_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/google/login"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "detail": "Google client secrets file not found."
            })))
            .mount(&server)
            .await;

        let err = backend_for(&server).begin_login().await.unwrap_err();
        match err {
            BackendError::Status { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "Google client secrets file not found.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_logout_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Logged out successfully."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = backend_for(&server).logout().await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("Logged out successfully."));
    }

    #[tokio::test]
    async fn test_logout_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let ack = backend_for(&server).logout().await.unwrap();
        assert_eq!(ack, LogoutAck::default());
    }

    #[tokio::test]
    async fn test_todays_emails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/emails/today"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": "a1", "sender": "alice@example.com", "subject": "Urgent: invoice",
                    "date": "Fri, 8 Aug 2025 09:15:00 +0000", "summary": "Invoice overdue.",
                    "replied": false, "draftReply": "Paying today.", "priority": "High",
                    "threadId": "t-a"
                },
                {
                    "id": "b2", "sender": "bob@example.com", "subject": "Lunch?",
                    "date": "N/A", "summary": "Lunch invite.", "replied": true,
                    "draftReply": "", "priority": "Low", "threadId": "t-b"
                }
            ])))
            .mount(&server)
            .await;

        let records = backend_for(&server).todays_emails().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a1");
        assert!(records[0].date.timestamp().is_some());
        assert!(records[1].replied);
    }

    #[tokio::test]
    async fn test_execute_wraps_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/emails/today"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let id = RequestId::next();
        let event = crate::backend::execute(&backend_for(&server), Command::FetchRecords(id)).await;
        match event {
            Event::RecordsLoaded(got, Err(BackendError::Status { status, detail })) => {
                assert_eq!(got, id);
                assert_eq!(status, 502);
                assert_eq!(detail, "bad gateway");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok", "message": "API is running"
            })))
            .mount(&server)
            .await;

        let health = backend_for(&server).health().await.unwrap();
        assert!(health.is_ok());
    }
}
