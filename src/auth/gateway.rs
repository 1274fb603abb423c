use crate::auth::credentials::CredentialService;
use crate::auth::tokens::TokenError;
use crate::db::models::UserProfile;
use crate::error::{AppError, AppResult};

/// Who is calling. Resolved once per request and passed to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Resolved(UserProfile),
}

impl Identity {
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Identity::Anonymous => None,
            Identity::Resolved(user) => Some(user),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|u| u.id.as_str())
    }

    /// The resolved user, or `Unauthenticated` for anonymous callers.
    pub fn require(&self) -> AppResult<&UserProfile> {
        self.user().ok_or(AppError::Unauthenticated)
    }
}

/// Pull the token out of a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Result<&str, TokenError> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(TokenError::InvalidAuthHeader)
}

/// Resolve the caller from an optional `Authorization` header value.
///
/// No header means anonymous. A header that does not verify fails the whole
/// request. A verified token whose user has since disappeared is anonymous.
pub async fn resolve(
    authorization: Option<&str>,
    credentials: &CredentialService,
) -> AppResult<Identity> {
    let Some(header) = authorization else {
        return Ok(Identity::Anonymous);
    };

    let token = bearer_token(header)?;
    let user_id = credentials.verify(token)?;

    match credentials.find_user(&user_id).await? {
        Some(user) => Ok(Identity::Resolved(user.profile())),
        None => {
            tracing::debug!(user_id = %user_id, "Token refers to unknown user");
            Ok(Identity::Anonymous)
        }
    }
}
