use thiserror::Error;

use super::BoxFuture;
use crate::identity::UserInfo;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider rejected the token")]
    Unauthorized,
    #[error("identity provider transport error: {0}")]
    Transport(String),
    #[error("identity provider response decode error: {0}")]
    InvalidResponse(String),
}

pub trait IdentityProvider: Send + Sync {
    fn user_info(&self, bearer: &str) -> BoxFuture<'_, Result<UserInfo, IdentityError>>;
}
