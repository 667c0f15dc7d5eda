//! Application implementation with JWT-based authorization.

use ev_core::ports::{Application, ContestRepository};
use headers::{Authorization, authorization::Bearer};
use jwt_simple::{
    claims::{Claims, JWTClaims},
    prelude::{Duration, HS256Key, MACLike},
};
use serde::{Deserialize, Serialize};

/// The deployed application: a backend plus the key admin tokens are signed
/// with.
#[derive(Clone)]
pub struct DemoApp<R> {
    /// The persistence backend
    pub db: R,
    /// HMAC key for JWT token verification
    pub key: HS256Key,
}

impl<R> DemoApp<R> {
    /// Extract and verify JWT claims from the authorization header.
    fn claims(&self, context: &Authorization<Bearer>) -> Option<JWTClaims<CustomJWTClaims>> {
        let token = context.0.token();
        self.key.verify_token::<CustomJWTClaims>(token, None).ok()
    }
}

impl<R: ContestRepository> Application for DemoApp<R> {
    type Context = Authorization<Bearer>;
    type Repository = R;

    fn database(&self) -> &Self::Repository {
        &self.db
    }

    async fn is_admin(&self, context: &Self::Context) -> bool {
        // managing the contest requires an `admin: true` custom claim
        self.claims(context)
            .map(|claims| claims.custom.admin)
            .unwrap_or(false)
    }
}

/// Custom claims structure for JWT tokens.
///
/// Contains application-specific claims beyond standard JWT claims.
#[derive(Serialize, Deserialize)]
pub struct CustomJWTClaims {
    /// Indicates whether the token holder has admin privileges.
    #[serde(default)]
    pub admin: bool,
}

/// Sign a token carrying the given rights, valid for `hours`.
pub fn mint_token(key: &HS256Key, admin: bool, hours: u64) -> anyhow::Result<String> {
    let claims = Claims::with_custom_claims(CustomJWTClaims { admin }, Duration::from_hours(hours));
    key.authenticate(claims).map_err(|err| anyhow::anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_local::LocalStore;

    fn app(secret: &str) -> DemoApp<LocalStore> {
        DemoApp {
            db: LocalStore::empty(),
            key: HS256Key::from_bytes(secret.as_bytes()),
        }
    }

    fn bearer(token: &str) -> Authorization<Bearer> {
        Authorization::bearer(token).unwrap()
    }

    #[tokio::test]
    async fn admin_claim_is_required() -> anyhow::Result<()> {
        let app = app("hunter2");

        let admin = mint_token(&app.key, true, 1)?;
        assert!(app.is_admin(&bearer(&admin)).await);

        let visitor = mint_token(&app.key, false, 1)?;
        assert!(!app.is_admin(&bearer(&visitor)).await);

        Ok(())
    }

    #[tokio::test]
    async fn foreign_signatures_are_refused() -> anyhow::Result<()> {
        let app = app("hunter2");
        let forged = mint_token(&HS256Key::from_bytes(b"letmein"), true, 1)?;
        assert!(!app.is_admin(&bearer(&forged)).await);
        assert!(!app.is_admin(&bearer("not-a-jwt")).await);
        Ok(())
    }
}
