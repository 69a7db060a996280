//! Verified bearer-token claims.

use serde::Deserialize;

/// Payload of a verified push identity token. Used only within the scope of
/// one authentication check; never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaim {
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub aud: Option<String>,
    pub iss: Option<String>,
    pub sub: Option<String>,
    pub exp: Option<i64>,
}
