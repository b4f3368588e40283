//! OAuth refresh-token credentials.
//!
//! The secret store holds a JSON document with a long-lived refresh token and
//! the client registration it belongs to. Before every publish the refresh
//! token is exchanged for a short-lived access token at `token_uri`.

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{PublishError, PublishResult};

/// Fallback lifetime when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Refresh-token credential bundle.
#[derive(Clone, Deserialize)]
pub struct OAuthCredentials {
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

impl OAuthCredentials {
    /// Parse and validate the secret document.
    ///
    /// All four fields must be present and non-empty and `token_uri` must be
    /// an absolute URL.
    pub fn from_secret_json(raw: &str) -> PublishResult<Self> {
        let creds: OAuthCredentials = serde_json::from_str(raw)
            .map_err(|e| PublishError::malformed_credentials(e.to_string()))?;

        for (field, value) in [
            ("refresh_token", &creds.refresh_token),
            ("client_id", &creds.client_id),
            ("client_secret", &creds.client_secret),
            ("token_uri", &creds.token_uri),
        ] {
            if value.trim().is_empty() {
                return Err(PublishError::malformed_credentials(format!(
                    "field `{}` is empty",
                    field
                )));
            }
        }

        Url::parse(&creds.token_uri).map_err(|e| {
            PublishError::malformed_credentials(format!("token_uri is not a URL: {}", e))
        })?;

        Ok(creds)
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .field("refresh_token", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Short-lived bearer token.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    pub expires_in: Duration,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            token: token.into(),
            expires_in,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange the refresh token for an access token.
pub async fn refresh_access_token(
    http: &Client,
    credentials: &OAuthCredentials,
) -> PublishResult<AccessToken> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "refresh_token")
        .append_pair("refresh_token", &credentials.refresh_token)
        .append_pair("client_id", &credentials.client_id)
        .append_pair("client_secret", &credentials.client_secret)
        .finish();

    let response = http
        .post(&credentials.token_uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<TokenErrorResponse>(&text)
            .map(|e| match e.error_description {
                Some(desc) => format!("{}: {}", e.error, desc),
                None => e.error,
            })
            .unwrap_or(text);
        return Err(PublishError::AuthFailed(format!(
            "token refresh returned HTTP {}: {}",
            status.as_u16(),
            message
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| PublishError::invalid_response(format!("token response: {}", e)))?;

    if token.access_token.is_empty() {
        return Err(PublishError::AuthFailed(
            "token endpoint returned an empty access token".to_string(),
        ));
    }

    let expires_in = token
        .expires_in
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_TTL);
    debug!("Refreshed upload access token, valid for {:?}", expires_in);

    Ok(AccessToken::new(token.access_token, expires_in))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secret(token_uri: &str) -> String {
        json!({
            "refresh_token": "1//refresh",
            "client_id": "client.apps.googleusercontent.com",
            "client_secret": "shh",
            "token_uri": token_uri,
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_secret() {
        let creds = OAuthCredentials::from_secret_json(&secret("https://oauth2.googleapis.com/token")).unwrap();
        assert_eq!(creds.client_id, "client.apps.googleusercontent.com");
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let raw = json!({"refresh_token": "r", "client_id": "c", "client_secret": "s"}).to_string();
        assert!(matches!(
            OAuthCredentials::from_secret_json(&raw),
            Err(PublishError::MalformedCredentials(_))
        ));
    }

    #[test]
    fn test_empty_field_is_malformed() {
        let raw = json!({
            "refresh_token": "",
            "client_id": "c",
            "client_secret": "s",
            "token_uri": "https://oauth2.googleapis.com/token"
        })
        .to_string();
        let err = OAuthCredentials::from_secret_json(&raw).unwrap_err();
        assert!(err.to_string().contains("refresh_token"));
    }

    #[test]
    fn test_not_json_is_malformed() {
        assert!(matches!(
            OAuthCredentials::from_secret_json("refresh_token=abc"),
            Err(PublishError::MalformedCredentials(_))
        ));
    }

    #[test]
    fn test_relative_token_uri_is_malformed() {
        assert!(matches!(
            OAuthCredentials::from_secret_json(&secret("/token")),
            Err(PublishError::MalformedCredentials(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = OAuthCredentials::from_secret_json(&secret("https://oauth2.googleapis.com/token")).unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("shh"));
        assert!(!printed.contains("1//refresh"));
    }

    #[tokio::test]
    async fn test_refresh_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_secret=shh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let creds = OAuthCredentials::from_secret_json(&secret(&format!("{}/token", server.uri()))).unwrap();
        let token = refresh_access_token(&Client::new(), &creds).await.unwrap();

        assert_eq!(token.as_str(), "ya29.token");
        assert_eq!(token.expires_in, Duration::from_secs(3599));
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })))
            .mount(&server)
            .await;

        let creds = OAuthCredentials::from_secret_json(&secret(&format!("{}/token", server.uri()))).unwrap();
        let err = refresh_access_token(&Client::new(), &creds).await.unwrap_err();

        assert!(matches!(err, PublishError::AuthFailed(ref m) if m.contains("invalid_grant")));
    }
}
