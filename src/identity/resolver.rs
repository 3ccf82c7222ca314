//! Per-request identity resolution: bearer token -> validated subject ->
//! fresh user lookup. The store is the source of truth; nothing is cached
//! between calls, so a deleted account invalidates its outstanding tokens
//! immediately even though the tokens themselves stay well-formed.

use crate::error::{AppError, AppResult};
use crate::model::User;
use crate::store::Store;

use super::token::TokenService;

#[derive(Clone)]
pub struct IdentityResolver {
    tokens: TokenService,
}

impl IdentityResolver {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.tokens
    }

    /// Resolve a presented bearer token to a user, or `Unauthenticated`.
    ///
    /// Both token failures (malformed, expired) and a missing subject map to
    /// 401; a valid token is a reference to an account, not a cached copy of
    /// one.
    pub fn resolve(&self, store: &Store, token: &str) -> AppResult<User> {
        let subject = self
            .tokens
            .validate(token)
            .map_err(|_| AppError::unauthenticated("invalid_token", "Invalid token"))?;
        store
            .find_user(&subject)
            .ok_or_else(|| AppError::unauthenticated("user_not_found", "User not found"))
    }
}
