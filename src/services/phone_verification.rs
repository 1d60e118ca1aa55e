// src/services/phone_verification.rs
//
// Twilio Verify v2: envia e confere códigos por SMS.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::common::error::AppError;

const TWILIO_VERIFY_BASE: &str = "https://verify.twilio.com/v2/Services";

static E164: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[1-9]\d{7,14}$").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4,8}$").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub verify_sid: String,
}

#[derive(Debug, Deserialize)]
struct VerificationResponse {
    status: String,
}

/// Prefixo de discagem dos países aceitos.
pub fn dial_code(country: &str) -> Option<&'static str> {
    match country.trim().to_ascii_uppercase().as_str() {
        "IN" => Some("+91"),
        "US" => Some("+1"),
        "GB" => Some("+44"),
        _ => None,
    }
}

/// Normaliza para E.164. Número com `+` é usado como veio; sem `+`, recebe o
/// prefixo do país (zeros à esquerda removidos).
pub fn normalize_to_e164(raw: &str, country: Option<&str>) -> Result<String, AppError> {
    let cleaned = WHITESPACE.replace_all(raw.trim(), "");
    let cleaned = cleaned.replace(['-', '(', ')'], "");

    let candidate = if cleaned.starts_with('+') {
        cleaned
    } else {
        match country.and_then(dial_code) {
            Some(prefix) => format!("{prefix}{}", cleaned.trim_start_matches('0')),
            None => format!("+{cleaned}"),
        }
    };

    if E164.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(AppError::BadRequest("Invalid phone number format".into()))
    }
}

#[derive(Clone)]
pub struct PhoneVerificationService {
    http: reqwest::Client,
    credentials: Option<TwilioCredentials>,
}

impl PhoneVerificationService {
    pub fn new(http: reqwest::Client, credentials: Option<TwilioCredentials>) -> Self {
        Self { http, credentials }
    }

    fn credentials(&self) -> Result<&TwilioCredentials, AppError> {
        self.credentials
            .as_ref()
            .ok_or(AppError::PhoneVerificationNotConfigured)
    }

    /// Dispara o SMS. Devolve o status do Twilio (normalmente "pending").
    pub async fn send_code(&self, phone: &str, country: Option<&str>) -> Result<String, AppError> {
        let creds = self.credentials()?;
        let to = normalize_to_e164(phone, country)?;

        let response: VerificationResponse = self
            .http
            .post(format!("{TWILIO_VERIFY_BASE}/{}/Verifications", creds.verify_sid))
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&[("To", to.as_str()), ("Channel", "sms")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!("Código enviado para {} (status {})", mask(&to), response.status);
        Ok(response.status)
    }

    /// Confere o código. Devolve o status do Twilio ("approved" quando bate).
    pub async fn check_code(
        &self,
        phone: &str,
        code: &str,
        country: Option<&str>,
    ) -> Result<String, AppError> {
        let creds = self.credentials()?;
        let to = normalize_to_e164(phone, country)?;
        if !CODE.is_match(code) {
            return Err(AppError::BadRequest("Invalid code".into()));
        }

        let response: VerificationResponse = self
            .http
            .post(format!("{TWILIO_VERIFY_BASE}/{}/VerificationCheck", creds.verify_sid))
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&[("To", to.as_str()), ("Code", code)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!("Verificação de {}: {}", mask(&to), response.status);
        Ok(response.status)
    }
}

// Nunca logar o número inteiro.
fn mask(phone: &str) -> String {
    let visible = phone.len().saturating_sub(4);
    format!("{}{}", "*".repeat(visible), &phone[visible..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_with_plus_is_kept() {
        assert_eq!(
            normalize_to_e164("+91 98765 43210", Some("US")).unwrap(),
            "+919876543210"
        );
    }

    #[test]
    fn country_prefix_is_applied_without_leading_zero() {
        assert_eq!(
            normalize_to_e164("098765 43210", Some("IN")).unwrap(),
            "+919876543210"
        );
        assert_eq!(
            normalize_to_e164("07911 123456", Some("gb")).unwrap(),
            "+447911123456"
        );
        assert_eq!(
            normalize_to_e164("(415) 555-2671", Some("US")).unwrap(),
            "+14155552671"
        );
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        for raw in ["123", "+0123456789", "abcdefghij", ""] {
            assert!(
                matches!(normalize_to_e164(raw, Some("IN")), Err(AppError::BadRequest(_))),
                "{raw} deveria ser rejeitado"
            );
        }
    }

    #[test]
    fn unknown_country_has_no_dial_code() {
        assert_eq!(dial_code("BR"), None);
        assert_eq!(dial_code("in"), Some("+91"));
    }

    #[tokio::test]
    async fn missing_twilio_config_is_reported_before_validation() {
        let service = PhoneVerificationService::new(reqwest::Client::new(), None);

        assert!(matches!(
            service.send_code("garbage", None).await,
            Err(AppError::PhoneVerificationNotConfigured)
        ));
        assert!(matches!(
            service.check_code("+919876543210", "12", None).await,
            Err(AppError::PhoneVerificationNotConfigured)
        ));
    }

    #[test]
    fn mask_keeps_last_four_digits() {
        assert_eq!(mask("+919876543210"), "*********3210");
    }
}
