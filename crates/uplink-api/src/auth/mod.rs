//! Push notification authentication.
//!
//! The notification route is gated by a bearer identity token minted by the
//! push subscription. [`PushAuthenticator`] runs the full check; signature
//! verification itself sits behind the [`TokenVerifier`] trait so tests can
//! substitute a deterministic implementation.

pub mod verifier;

pub use verifier::{GoogleTokenVerifier, TokenVerifier};

use std::sync::Arc;
use uplink_core::models::IdentityClaim;
use uplink_core::AppError;

/// Precondition gate for the push notification pipeline.
///
/// Checks, in order: the `Bearer <token>` header shape, the token's
/// signature/issuer/audience/expiry (via the verifier), the presence of an
/// identity claim, the `email_verified` flag, and an exact match of the
/// subject email against the expected notifier identity. Every failure
/// rejects the request with 401 and stops the pipeline; nothing downstream
/// runs on an unauthenticated request. No side effects.
#[derive(Clone)]
pub struct PushAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
    expected_email: String,
}

impl PushAuthenticator {
    pub fn new(verifier: Arc<dyn TokenVerifier>, expected_email: impl Into<String>) -> Self {
        Self {
            verifier,
            expected_email: expected_email.into(),
        }
    }

    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<IdentityClaim, AppError> {
        let header = authorization.ok_or_else(|| {
            AppError::Unauthorized("Missing authorization header".to_string())
        })?;

        let token = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Invalid authorization header format".to_string())
            })?;

        let claim = self.verifier.verify(token).await?;

        let email = claim.email.as_deref().ok_or_else(|| {
            tracing::warn!("Push token carried no identity claims");
            AppError::Unauthorized("Token has no identity claims".to_string())
        })?;

        if !claim.email_verified {
            tracing::warn!(email = %email, "Push token email is not verified");
            return Err(AppError::Unauthorized(
                "Token email is not verified".to_string(),
            ));
        }

        if email != self.expected_email {
            tracing::warn!(
                email = %email,
                expected = %self.expected_email,
                "Push token identity does not match expected notifier"
            );
            return Err(AppError::Unauthorized(
                "Token identity does not match expected notifier".to_string(),
            ));
        }

        Ok(claim)
    }
}
