//! # quill-auth-simple
//!
//! Argon2-based credentials plus stateless JWT bearer tokens.
//!
//! Login accepts either a username or an email address in the same field; an
//! "@" in the identifier selects the email lookup. Unknown identifiers and
//! wrong passwords both come back as `None`, so the caller cannot leak which
//! accounts exist.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use quill_core::error::{AppError, Result};
use quill_core::models::{TokenPair, User};
use quill_core::traits::{Authenticator, TokenService, UserRepo};

pub struct SimpleAuthenticator {
    users: Arc<dyn UserRepo>,
}

impl SimpleAuthenticator {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Authenticator for SimpleAuthenticator {
    fn hash_password(&self, raw: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|err| AppError::internal(anyhow::anyhow!("argon2: {err}")))?;
        Ok(hash.to_string())
    }

    async fn authenticate(&self, identifier: &str, password: &str) -> Result<Option<User>> {
        let user = if identifier.contains('@') {
            self.users.find_by_email(identifier).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        let Some(user) = user else { return Ok(None) };
        let Ok(parsed) = PasswordHash::new(&user.password_hash) else {
            return Ok(None);
        };
        if Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok() {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    exp: i64,
    token_type: String,
}

/// HS256 access/refresh pairs. Both lifetimes default to 15 days; rotation
/// is not implemented (a refresh keeps its original expiry).
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &str, access_ttl_days: i64, refresh_ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::days(access_ttl_days),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    fn issue(&self, user_id: i64, token_type: &str, ttl: Duration) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            exp: (Utc::now() + ttl).timestamp(),
            token_type: token_type.to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AppError::internal(anyhow::anyhow!("jwt encode: {err}")))
    }

    fn decode_claims(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated)
    }
}

impl TokenService for JwtTokenService {
    fn issue_pair(&self, user_id: i64) -> Result<TokenPair> {
        Ok(TokenPair {
            refresh: self.issue(user_id, TOKEN_TYPE_REFRESH, self.refresh_ttl)?,
            access: self.issue(user_id, TOKEN_TYPE_ACCESS, self.access_ttl)?,
        })
    }

    fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.decode_claims(refresh_token)?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(AppError::Unauthenticated);
        }
        self.issue(claims.sub, TOKEN_TYPE_ACCESS, self.access_ttl)
    }

    fn verify(&self, access_token: &str) -> Result<i64> {
        let claims = self.decode_claims(access_token)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::Unauthenticated);
        }
        Ok(claims.sub)
    }

    fn validate(&self, token: &str) -> Result<()> {
        self.decode_claims(token).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::models::NewUser;
    use quill_db_sqlite::SqliteStore;

    async fn fixture() -> (Arc<SqliteStore>, SimpleAuthenticator) {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let auth = SimpleAuthenticator::new(store.clone());
        let hash = auth.hash_password("correct horse").unwrap();
        UserRepo::insert(
            store.as_ref(),
            NewUser {
                username: "author".to_string(),
                email: "author@example.com".to_string(),
                password_hash: hash,
                first_name: None,
                last_name: None,
            },
        )
        .await
        .unwrap();
        (store, auth)
    }

    #[tokio::test]
    async fn login_works_with_username_or_email() {
        let (_store, auth) = fixture().await;
        let by_name = auth.authenticate("author", "correct horse").await.unwrap();
        assert!(by_name.is_some());
        let by_email = auth.authenticate("author@example.com", "correct horse").await.unwrap();
        assert!(by_email.is_some());
        assert_eq!(by_name.unwrap().id, by_email.unwrap().id);
    }

    #[tokio::test]
    async fn failures_are_uniform() {
        let (_store, auth) = fixture().await;
        assert!(auth.authenticate("author", "wrong").await.unwrap().is_none());
        assert!(auth.authenticate("nobody", "correct horse").await.unwrap().is_none());
        assert!(auth.authenticate("nobody@example.com", "x").await.unwrap().is_none());
    }

    #[test]
    fn access_token_roundtrip() {
        let tokens = JwtTokenService::new("secret", 15, 15);
        let pair = tokens.issue_pair(7).unwrap();
        assert_eq!(tokens.verify(&pair.access).unwrap(), 7);
        tokens.validate(&pair.access).unwrap();
        tokens.validate(&pair.refresh).unwrap();
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let tokens = JwtTokenService::new("secret", 15, 15);
        let pair = tokens.issue_pair(7).unwrap();
        assert!(matches!(tokens.verify(&pair.refresh), Err(AppError::Unauthenticated)));

        let access = tokens.refresh(&pair.refresh).unwrap();
        assert_eq!(tokens.verify(&access).unwrap(), 7);
        // And an access token cannot be refreshed.
        assert!(matches!(tokens.refresh(&pair.access), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let tokens = JwtTokenService::new("secret", 15, 15);
        let other = JwtTokenService::new("other-secret", 15, 15);
        let pair = tokens.issue_pair(7).unwrap();
        assert!(matches!(other.verify(&pair.access), Err(AppError::Unauthenticated)));
        assert!(matches!(tokens.verify("garbage"), Err(AppError::Unauthenticated)));
    }
}
