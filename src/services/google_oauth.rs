// src/services/google_oauth.rs

use reqwest::Url;
use serde::Deserialize;

use crate::{common::error::AppError, models::auth::GoogleProfile};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SCOPE: &str = "openid email profile";

#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl From<UserInfo> for GoogleProfile {
    fn from(info: UserInfo) -> Self {
        Self {
            google_id: info.sub,
            email: info.email.unwrap_or_default(),
            first_name: info.given_name,
            last_name: info.family_name,
            profile_picture: info.picture,
        }
    }
}

/// Fluxo "authorization code" do Google. Sem credenciais, tudo responde
/// `OAuthNotConfigured`.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    credentials: Option<GoogleCredentials>,
}

impl GoogleOAuthClient {
    pub fn new(http: reqwest::Client, credentials: Option<GoogleCredentials>) -> Self {
        Self { http, credentials }
    }

    fn credentials(&self) -> Result<&GoogleCredentials, AppError> {
        self.credentials.as_ref().ok_or(AppError::OAuthNotConfigured)
    }

    /// URL da tela de consentimento.
    pub fn authorization_url(&self) -> Result<Url, AppError> {
        let creds = self.credentials()?;
        Url::parse_with_params(
            AUTH_URL,
            [
                ("client_id", creds.client_id.as_str()),
                ("redirect_uri", creds.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
            ],
        )
        .map_err(|e| anyhow::anyhow!("URL de autorização inválida: {}", e).into())
    }

    /// Troca o `code` do callback pelo perfil do usuário.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, AppError> {
        let creds = self.credentials()?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", creds.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Google recusou o código ({}): {}", status, body);
            return Err(AppError::OAuthFailed(format!(
                "token exchange failed with status {status}"
            )));
        }
        let token: TokenResponse = response.json().await?;

        let info: UserInfo = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if info.email.as_deref().unwrap_or_default().is_empty() {
            return Err(AppError::OAuthFailed("Google profile has no e-mail".into()));
        }

        Ok(info.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(credentials: Option<GoogleCredentials>) -> GoogleOAuthClient {
        GoogleOAuthClient::new(reqwest::Client::new(), credentials)
    }

    #[test]
    fn authorization_url_carries_client_and_scope() {
        let url = client(Some(GoogleCredentials {
            client_id: "abc.apps.googleusercontent.com".into(),
            client_secret: "shh".into(),
            callback_url: "http://localhost:3001/api/auth/google/callback".into(),
        }))
        .authorization_url()
        .unwrap();

        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert!(params.contains(&("client_id".into(), "abc.apps.googleusercontent.com".into())));
        assert!(params.contains(&("scope".into(), "openid email profile".into())));
        assert!(params.contains(&("response_type".into(), "code".into())));
        assert!(!url.as_str().contains("shh"));
    }

    #[test]
    fn missing_credentials_is_reported() {
        assert!(matches!(
            client(None).authorization_url(),
            Err(AppError::OAuthNotConfigured)
        ));
    }

    #[test]
    fn userinfo_maps_to_profile() {
        let info: UserInfo = serde_json::from_value(serde_json::json!({
            "sub": "1234",
            "email": "ana@gmail.com",
            "given_name": "Ana",
            "picture": "https://pics/ana.png"
        }))
        .unwrap();

        let profile = GoogleProfile::from(info);

        assert_eq!(profile.google_id, "1234");
        assert_eq!(profile.email, "ana@gmail.com");
        assert_eq!(profile.first_name.as_deref(), Some("Ana"));
        assert_eq!(profile.last_name, None);
    }
}
