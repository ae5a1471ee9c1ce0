use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use courtside_types::AccountId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountClaims {
    pub sub: String,
    pub exp: u64,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// The signed-in coach. Gates every remote read and write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
}

impl From<AccountClaims> for Account {
    fn from(claims: AccountClaims) -> Self {
        Account {
            email: claims.email.unwrap_or_default(),
            display_name: claims.name.unwrap_or_else(|| "Coach".to_string()),
            id: claims.sub,
        }
    }
}

pub struct AuthService {
    decoding_key: Option<DecodingKey>,
    dev_mode: bool,
}

impl AuthService {
    /// Validates HS256 tokens signed with `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: Some(DecodingKey::from_secret(secret.as_bytes())),
            dev_mode: false,
        }
    }

    pub fn new_dev_mode() -> Self {
        Self {
            decoding_key: None,
            dev_mode: true,
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn validate_token(&self, token: &str) -> Result<Account, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        if self.dev_mode {
            return self.validate_dev_token(token);
        }

        let key = self.decoding_key.as_ref().ok_or(AuthError::MissingSecret)?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<AccountClaims>(token, key, &validation).map_err(|e| {
            tracing::warn!("Token validation failed: {:?}", e.kind());
            AuthError::from(e)
        })?;
        Ok(token_data.claims.into())
    }

    fn validate_dev_token(&self, token: &str) -> Result<Account, AuthError> {
        tracing::debug!(
            "Validating dev token (first 20 chars): {}",
            token.chars().take(20).collect::<String>()
        );

        // Unsigned JWT: only the payload is read
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 3 {
            let payload = URL_SAFE_NO_PAD
                .decode(parts[1].trim_end_matches('='))
                .map_err(|e| {
                    tracing::warn!("Failed to decode JWT payload in dev mode: {:?}", e);
                    AuthError::InvalidToken
                })?;

            #[derive(Deserialize)]
            struct DevClaims {
                sub: String,
                email: Option<String>,
                name: Option<String>,
            }

            let claims: DevClaims = serde_json::from_slice(&payload).map_err(|e| {
                tracing::warn!("Failed to parse JWT claims in dev mode: {:?}", e);
                AuthError::InvalidToken
            })?;
            return Ok(Account {
                id: claims.sub,
                email: claims.email.unwrap_or_else(|| "dev@example.com".to_string()),
                display_name: claims.name.unwrap_or_else(|| "Dev Coach".to_string()),
            });
        }

        // Simple string format: "account_id:email:name"
        let fields: Vec<&str> = token.splitn(3, ':').collect();
        match fields.as_slice() {
            [id, email, name] if !id.is_empty() => Ok(Account {
                id: id.to_string(),
                email: email.to_string(),
                display_name: name.to_string(),
            }),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("No signing secret configured")]
    MissingSecret,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn signed_token(secret: &str, exp: u64) -> String {
        let claims = AccountClaims {
            sub: "coach-42".to_string(),
            exp,
            email: Some("coach@example.com".to_string()),
            name: Some("Coach Carter".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn test_valid_signed_token() {
        let auth = AuthService::new("secret");
        let account = auth.validate_token(&signed_token("secret", far_future())).unwrap();
        assert_eq!(account.id, "coach-42");
        assert_eq!(account.display_name, "Coach Carter");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let auth = AuthService::new("secret");
        let result = auth.validate_token(&signed_token("other", far_future()));
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let auth = AuthService::new("secret");
        let result = auth.validate_token(&signed_token("secret", 1_000));
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token_validation() {
        let auth = AuthService::new("secret");
        assert!(matches!(
            auth.validate_token("invalid-token"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(auth.validate_token("  "), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_dev_mode_tokens() {
        let auth = AuthService::new_dev_mode();

        let account = auth.validate_token("coach-1:c@example.com:Coach One").unwrap();
        assert_eq!(account.id, "coach-1");
        assert_eq!(account.display_name, "Coach One");

        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"coach-2","name":"Two"}"#);
        let jwt = format!("e30.{}.sig", payload);
        let account = auth.validate_token(&jwt).unwrap();
        assert_eq!(account.id, "coach-2");
        assert_eq!(account.email, "dev@example.com");

        assert!(auth.validate_token("just-a-name").is_err());
    }
}
