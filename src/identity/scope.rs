//! Access scoping: role + ownership decide which records an identity may
//! observe. The scope predicate is applied inside the store's query methods,
//! so out-of-scope records are absent from result sets rather than fetched
//! and rejected. A scoped lookup that finds nothing reports `NotFound`
//! whether the record is missing or merely not owned.

use crate::error::{AppError, AppResult};
use crate::model::{Customer, User};

/// Filter constraining which records an identity may observe.
/// Produced fresh per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePredicate {
    Unrestricted,
    OwnedBy(String),
}

impl ScopePredicate {
    /// Whether a record owned by `owner_id` is visible under this scope.
    pub fn allows_owner(&self, owner_id: &str) -> bool {
        match self {
            ScopePredicate::Unrestricted => true,
            ScopePredicate::OwnedBy(id) => id == owner_id,
        }
    }
}

/// Resource classes the scope engine knows about. Leads are scoped through
/// their parent customer; the lead record itself carries no owner field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Customer,
    Lead,
}

/// Scope filter for lead queries. `ParentIn` is an explicit closed set: an
/// owner with zero customers gets `ParentIn(vec![])`, never an open filter,
/// so an empty scope cannot widen into an unrestricted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadScope {
    All,
    ParentIn(Vec<String>),
}

impl LeadScope {
    pub fn contains(&self, customer_id: &str) -> bool {
        match self {
            LeadScope::All => true,
            LeadScope::ParentIn(ids) => ids.iter().any(|id| id == customer_id),
        }
    }
}

/// Outcome of a single-record authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotFound,
    Forbidden,
}

/// The policy table. Deterministic and O(1); exhaustive over roles so a new
/// role is a compile-time change here.
pub fn scope_for(user: &User, resource: Resource) -> ScopePredicate {
    use crate::model::Role;
    match (user.role, resource) {
        (Role::Admin, _) => ScopePredicate::Unrestricted,
        // A user's lead scope is ownership of the parent customer.
        (Role::User, Resource::Customer) | (Role::User, Resource::Lead) => {
            ScopePredicate::OwnedBy(user.id.clone())
        }
    }
}

/// Authorize an operation on a lead via its parent customer.
///
/// The lead was necessarily looked up unscoped (leads carry no owner field),
/// so its existence is already known to the caller; the denial is still
/// reported as `NotFound` to keep the failure shape identical across paths
/// and avoid confirming tenancy of the parent.
pub fn authorize_lead_parent(user: &User, parent: &Customer) -> Decision {
    match scope_for(user, Resource::Lead) {
        ScopePredicate::Unrestricted => Decision::Allowed,
        ScopePredicate::OwnedBy(owner) => {
            if parent.owner_id == owner {
                Decision::Allowed
            } else {
                Decision::Denied(DenyReason::NotFound)
            }
        }
    }
}

/// Gate for admin-only surfaces. The caller is authenticated, so the denial
/// is a plain `Forbidden` here, not an existence question.
pub fn require_admin(user: &User) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("admin_required", "Admin access required"))
    }
}
