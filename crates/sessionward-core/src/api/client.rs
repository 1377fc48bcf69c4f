//! HTTP implementation of the authentication port.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::{AuthClient, AuthError, AuthResult, Credentials, Identity};
use crate::config::Config;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Envelope code the service uses to reject a login
const FAILURE_CODE: i64 = -1;

/// Message shown when the service rejects a login without saying why
const DEFAULT_FAILURE_MESSAGE: &str = "Login failed";

/// Field of the authentication object carrying the token
const TOKEN_FIELD: &str = "token";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "$")]
    status: EnvelopeStatus,
    #[serde(rename = "$authentication", default)]
    authentication: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeStatus {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
}

/// Auth service client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpAuthClient {
    client: Client,
    base_url: String,
    login_endpoint: String,
    logout_endpoint: String,
    token_header: header::HeaderName,
}

impl HttpAuthClient {
    /// Build a client from configuration. Fails when no base URL is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No auth service base URL configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let token_header = header::HeaderName::from_bytes(config.token_header.as_bytes())
            .with_context(|| format!("Invalid token header name: {}", config.token_header))?;

        Ok(Self {
            client,
            base_url,
            login_endpoint: config.login_endpoint.clone(),
            logout_endpoint: config.logout_endpoint.clone(),
            token_header,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Interpret the login envelope
    fn interpret(envelope: Envelope) -> Result<AuthResult, ApiError> {
        if envelope.status.code == FAILURE_CODE {
            let message = envelope
                .status
                .msg
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            return Ok(AuthResult::Failure { message });
        }

        let mut authentication = envelope.authentication.ok_or_else(|| {
            ApiError::InvalidResponse("missing authentication object".to_string())
        })?;

        let token = match authentication.remove(TOKEN_FIELD) {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => {
                return Err(ApiError::InvalidResponse(
                    "authentication object has no token".to_string(),
                ))
            }
        };

        let identity: Identity = serde_json::from_value(Value::Object(authentication))
            .map_err(|e| ApiError::InvalidResponse(format!("bad identity: {}", e)))?;

        Ok(AuthResult::Success { identity, token })
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResult, AuthError> {
        let url = self.url(&self.login_endpoint);
        debug!(%url, username = credentials.username(), "Sending authentication request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("username", credentials.username()),
                ("password", credentials.password()),
            ])
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("bad auth envelope: {}", e)))?;

        Ok(Self::interpret(envelope)?)
    }

    async fn invalidate(&self, token: Option<&str>) -> Result<(), AuthError> {
        let url = self.url(&self.logout_endpoint);
        debug!(%url, has_token = token.is_some(), "Sending logout request");

        let mut request = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&Map::new());
        if let Some(token) = token {
            request = request.header(self.token_header.clone(), token);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        Self::check_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpAuthClient {
        let config = Config {
            base_url: Some(server.uri()),
            request_timeout_secs: 5,
            ..Config::default()
        };
        HttpAuthClient::from_config(&config).unwrap()
    }

    #[test]
    fn test_from_config_requires_base_url() {
        assert!(HttpAuthClient::from_config(&Config::default()).is_err());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = Config {
            base_url: Some("http://svc.local/".to_string()),
            ..Config::default()
        };
        let client = HttpAuthClient::from_config(&config).unwrap();
        assert_eq!(client.url("/a/b"), "http://svc.local/a/b");
    }

    #[tokio::test]
    async fn test_authenticate_success_splits_token_from_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/aooms/rbac/loginService/login"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("password=x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$": { "code": 0, "msg": "ok" },
                "$authentication": { "token": "abc", "name": "alice", "id": "u-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .authenticate(&Credentials::new("alice", "x"))
            .await
            .unwrap();

        match result {
            AuthResult::Success { identity, token } => {
                assert_eq!(token, "abc");
                assert_eq!(identity.name.as_deref(), Some("alice"));
                assert!(!identity.attributes.contains_key("token"));
                assert_eq!(identity.attributes.get("id"), Some(&json!("u-1")));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_application_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$": { "code": -1, "msg": "bad password" }
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .authenticate(&Credentials::new("alice", "wrong"))
            .await
            .unwrap();

        assert_eq!(
            result,
            AuthResult::Failure {
                message: "bad password".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_authenticate_failure_without_message_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$": { "code": -1 }
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .authenticate(&Credentials::new("", ""))
            .await
            .unwrap();

        assert_eq!(
            result,
            AuthResult::Failure {
                message: DEFAULT_FAILURE_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_authenticate_missing_token_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$": { "code": 0 },
                "$authentication": { "name": "alice" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .authenticate(&Credentials::new("alice", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_authenticate_server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .authenticate(&Credentials::new("alice", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Transport(_)));
    }

    #[tokio::test]
    async fn test_invalidate_sends_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/aooms/rbac/loginService/logout"))
            .and(header_eq("AoomsToken", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$": { "code": 0 } })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).invalidate(Some("abc")).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidate_surfaces_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client_for(&server).invalidate(None).await.is_err());
    }
}
