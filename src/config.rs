// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{GymRepository, LeadRepository, UserRepository},
    services::{
        auth::AuthService,
        google_oauth::{GoogleCredentials, GoogleOAuthClient},
        gym_service::GymService,
        lead_service::{LeadService, PgLeadService},
        phone_verification::{PhoneVerificationService, TwilioCredentials},
        user_service::UserService,
    },
};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_JWT_EXPIRATION: &str = "7d";

/// Tudo o que vem do ambiente (.env).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub port: u16,
    pub frontend_url: String,
    pub production: bool,
    pub google: Option<GoogleCredentials>,
    pub twilio: Option<TwilioCredentials>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let expiration =
            optional("JWT_EXPIRATION").unwrap_or_else(|| DEFAULT_JWT_EXPIRATION.to_string());
        let jwt_ttl = parse_ttl(&expiration)
            .with_context(|| format!("JWT_EXPIRATION inválido: '{expiration}'"))?;

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT inválida: '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let environment = optional("APP_ENV").or_else(|| optional("NODE_ENV"));

        let google = match (
            optional("GOOGLE_CLIENT_ID"),
            optional("GOOGLE_CLIENT_SECRET"),
            optional("GOOGLE_CALLBACK_URL"),
        ) {
            (Some(client_id), Some(client_secret), Some(callback_url)) => Some(GoogleCredentials {
                client_id,
                client_secret,
                callback_url,
            }),
            _ => None,
        };

        let twilio = match (
            optional("TWILIO_ACCOUNT_SID"),
            optional("TWILIO_AUTH_TOKEN"),
            optional("TWILIO_VERIFY_SID"),
        ) {
            (Some(account_sid), Some(auth_token), Some(verify_sid)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                verify_sid,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl,
            port,
            frontend_url: optional("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            production: environment.as_deref() == Some("production"),
            google,
            twilio,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// "7d", "12h", "30m", "45s" ou segundos puros.
pub fn parse_ttl(raw: &str) -> Option<chrono::Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&raw[..i], Some(c)),
        _ => (raw, None),
    };
    let amount: i64 = digits.trim().parse().ok().filter(|n| *n > 0)?;

    match unit {
        Some('d') => chrono::Duration::try_days(amount),
        Some('h') => chrono::Duration::try_hours(amount),
        Some('m') => chrono::Duration::try_minutes(amount),
        Some('s') | None => chrono::Duration::try_seconds(amount),
        _ => None,
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub lead_service: Arc<dyn LeadService>,
    pub gym_service: GymService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub phone_service: PhoneVerificationService,
    pub google_oauth: GoogleOAuthClient,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(db_pool, config)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let lead_repo = LeadRepository::new(db_pool.clone());
        let gym_repo = GymRepository::new(db_pool.clone());
        let user_repo = UserRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            gym_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl,
            db_pool.clone(),
        );

        Ok(Self {
            lead_service: Arc::new(PgLeadService::new(lead_repo)),
            gym_service: GymService::new(gym_repo),
            user_service: UserService::new(user_repo),
            auth_service,
            phone_service: PhoneVerificationService::new(http.clone(), config.twilio.clone()),
            google_oauth: GoogleOAuthClient::new(http, config.google.clone()),
            config: Arc::new(config),
            db_pool,
        })
    }

    /// Troca o serviço de leads (usado nos testes com mock).
    pub fn with_lead_service(mut self, lead_service: Arc<dyn LeadService>) -> Self {
        self.lead_service = lead_service;
        self
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/wellvantage_test".into(),
            jwt_secret: "test-secret".into(),
            jwt_ttl: chrono::Duration::days(7),
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.into(),
            production: false,
            google: None,
            twilio: None,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Estado com pool preguiçoso: nada toca o banco até alguém consultar.
    pub fn for_tests(lead_service: Arc<dyn LeadService>) -> Self {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("URL de teste válida");
        Self::from_pool(pool, config)
            .expect("estado de teste")
            .with_lead_service(lead_service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_accepts_units_and_plain_seconds() {
        assert_eq!(parse_ttl("7d"), Some(chrono::Duration::days(7)));
        assert_eq!(parse_ttl("12h"), Some(chrono::Duration::hours(12)));
        assert_eq!(parse_ttl("30m"), Some(chrono::Duration::minutes(30)));
        assert_eq!(parse_ttl("45s"), Some(chrono::Duration::seconds(45)));
        assert_eq!(parse_ttl("3600"), Some(chrono::Duration::seconds(3600)));
    }

    #[test]
    fn ttl_rejects_garbage() {
        assert_eq!(parse_ttl(""), None);
        assert_eq!(parse_ttl("d"), None);
        assert_eq!(parse_ttl("0d"), None);
        assert_eq!(parse_ttl("7w"), None);
        assert_eq!(parse_ttl("seven days"), None);
    }
}
