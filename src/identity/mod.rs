//! Central identity handling: token issuance/validation, per-request
//! resolution and access scoping. Keep the public surface thin and split
//! implementation across sub-modules.

mod resolver;
mod scope;
mod token;

pub use resolver::IdentityResolver;
pub use scope::{authorize_lead_parent, require_admin, scope_for, Decision, DenyReason, LeadScope, Resource, ScopePredicate};
pub use token::{TokenError, TokenService, DEFAULT_TTL_MINUTES};
