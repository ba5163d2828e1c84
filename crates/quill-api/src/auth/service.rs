//! Session service
//!
//! Sign-up, sign-in, refresh-token rotation and logout. Each account holds a
//! single refresh-token slot storing the SHA-256 digest of the last issued
//! refresh token; a refresh only succeeds for the token currently in the slot.

use super::jwt::{IssuedTokens, JwtError, TokenIssuer};
use super::middleware::{AuthError, Identity};
use super::password::{
    hash_password_with_config, validate_password_length, verify_password, PasswordConfig,
    PasswordError,
};
use quill_core::{AccountPublic, AccountRepository, StoreError};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

/// Session operation failures
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed input or an email that is already registered
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Cannot log out a different account")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Failed to issue token: {0}")]
    Token(#[from] JwtError),
}

/// SHA-256 hex digest of a token, as kept in the refresh slot
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Authentication service
pub struct SessionService {
    accounts: Arc<dyn AccountRepository>,
    tokens: TokenIssuer,
    password: PasswordConfig,
    /// Well-formed hash verified against when the email is unknown
    dummy_hash: String,
}

impl SessionService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tokens: TokenIssuer,
        password: PasswordConfig,
    ) -> Self {
        let dummy_hash = format!(
            "$argon2id$v=19$m={},t={},p={}$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            password.memory_cost, password.time_cost, password.parallelism
        );
        Self {
            accounts,
            tokens,
            password,
            dummy_hash,
        }
    }

    /// Register a new account
    ///
    /// The stored account starts with an empty refresh slot.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AccountPublic, SessionError> {
        if !email.validate_email() {
            return Err(SessionError::Invalid("Invalid email format".to_string()));
        }
        validate_password_length(password).map_err(SessionError::Invalid)?;

        let password_hash = hash_password_with_config(password, &self.password)?;

        let account = self
            .accounts
            .create_account(email, &password_hash)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    SessionError::Invalid("Email already registered".to_string())
                }
                other => SessionError::Store(other),
            })?;

        info!(account_id = %account.id, "account registered");
        Ok(account.to_public())
    }

    /// Authenticate with email and password
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedTokens, SessionError> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            let _ = verify_password(password, &self.dummy_hash);
            warn!("sign-in rejected");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password, &account.password_hash)? {
            warn!(account_id = %account.id, "sign-in rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.tokens.issue_pair(account.id, &account.email)?;
        self.accounts
            .set_refresh_token_hash(account.id, Some(&hash_token(&tokens.refresh_token)))
            .await?;

        info!(account_id = %account.id, "signed in");
        Ok(tokens)
    }

    /// Exchange the current refresh token for a new pair, rotating the slot
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, SessionError> {
        let claims = self.tokens.verify_refresh(refresh_token).map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AuthError::InvalidRefreshToken
        })?;
        let account_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let presented = hash_token(refresh_token);
        if account.refresh_token_hash.as_deref() != Some(presented.as_str()) {
            warn!(account_id = %account.id, "stale or revoked refresh token presented");
            return Err(AuthError::InvalidRefreshToken.into());
        }

        let tokens = self.tokens.issue_pair(account.id, &account.email)?;
        let next = hash_token(&tokens.refresh_token);
        let rotated = self
            .accounts
            .rotate_refresh_token_hash(account.id, &presented, &next)
            .await?;
        if !rotated {
            warn!(account_id = %account.id, "refresh slot changed before rotation");
            return Err(AuthError::InvalidRefreshToken.into());
        }

        debug!(account_id = %account.id, "refresh token rotated");
        Ok(tokens)
    }

    /// Clear the refresh slot of the caller's own account
    pub async fn logout(&self, identity: &Identity, email: &str) -> Result<(), SessionError> {
        if identity.email != email {
            warn!(account_id = %identity.account_id, "logout for another account refused");
            return Err(SessionError::Forbidden);
        }

        self.accounts
            .set_refresh_token_hash(identity.account_id, None)
            .await?;

        info!(account_id = %identity.account_id, "logged out");
        Ok(())
    }
}
