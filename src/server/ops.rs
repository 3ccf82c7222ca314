//! Operations layer: every API behavior, HTTP-free.
//!
//! Handlers in `server.rs` parse the request and delegate here; integration
//! tests call these functions directly. Each operation takes the resolved
//! caller identity, derives its scope predicate, and runs scoped store
//! queries, so the scoping rules live in exactly one place per operation.

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::identity::{authorize_lead_parent, scope_for, Decision, DenyReason, Resource, ScopePredicate, TokenService};
use crate::model::{
    Customer, CustomerCreate, CustomerUpdate, Lead, LeadCreate, LeadStatus, LeadUpdate, LoginPayload, PublicUser,
    RegisterPayload, TokenResponse, User,
};
use crate::security;
use crate::stats::{aggregate, DashboardStats};
use crate::store::Store;

// --- auth ---

/// Register a new account and issue its first token. Duplicate email is a
/// `Conflict` and leaves the store untouched.
pub fn register(store: &Store, tokens: &TokenService, payload: RegisterPayload) -> AppResult<TokenResponse> {
    let hash = security::hash_password(&payload.password)?;
    let user = store.insert_user(User::new(payload.name, payload.email, payload.role, hash))?;
    let token = tokens.issue(&user.id)?;
    info!("auth.register user={} role={:?}", user.id, user.role);
    Ok(TokenResponse::bearer(token, PublicUser::from(&user)))
}

/// Verify credentials and issue a token. Unknown email, wrong password and a
/// corrupted stored hash all surface as the same 401; the corruption detail
/// stays in the log.
pub fn login(store: &Store, tokens: &TokenService, payload: LoginPayload) -> AppResult<TokenResponse> {
    let invalid = || AppError::unauthenticated("invalid_credentials", "Invalid credentials");
    let Some(user) = store.find_user_by_email(&payload.email) else {
        return Err(invalid());
    };
    match security::verify_password(&user.password_hash, &payload.password) {
        Ok(true) => {}
        Ok(false) => return Err(invalid()),
        Err(e) => {
            warn!("auth.login user={} stored hash unusable: {}", user.id, e);
            return Err(invalid());
        }
    }
    let token = tokens.issue(&user.id)?;
    info!("auth.login user={}", user.id);
    Ok(TokenResponse::bearer(token, PublicUser::from(&user)))
}

// --- customers ---

pub fn create_customer(store: &Store, user: &User, data: CustomerCreate) -> Customer {
    // owner_id is always the caller; the payload cannot assign ownership
    let customer = store.insert_customer(Customer::new(data, user.id.clone()));
    info!("customer.create id={} owner={}", customer.id, customer.owner_id);
    customer
}

pub fn list_customers(store: &Store, user: &User, search: Option<&str>, skip: usize, limit: usize) -> Vec<Customer> {
    let scope = scope_for(user, Resource::Customer);
    store.list_customers(&scope, search, skip, limit)
}

pub fn get_customer(store: &Store, user: &User, id: &str) -> AppResult<Customer> {
    let scope = scope_for(user, Resource::Customer);
    store
        .find_customer(id, &scope)
        .ok_or_else(customer_not_found)
}

pub fn update_customer(store: &Store, user: &User, id: &str, patch: CustomerUpdate) -> AppResult<Customer> {
    let scope = scope_for(user, Resource::Customer);
    store
        .update_customer(id, &scope, &patch)
        .ok_or_else(customer_not_found)
}

/// Scoped delete with lead cascade. The cascade is a second store call with
/// no rollback; a failure between the two leaves orphaned leads behind.
pub fn delete_customer(store: &Store, user: &User, id: &str) -> AppResult<usize> {
    let scope = scope_for(user, Resource::Customer);
    if !store.delete_customer(id, &scope) {
        return Err(customer_not_found());
    }
    let cascaded = store.delete_leads_of_customer(id);
    info!("customer.delete id={} cascaded_leads={}", id, cascaded);
    Ok(cascaded)
}

// --- leads ---

pub fn create_lead(store: &Store, user: &User, customer_id: &str, data: LeadCreate) -> AppResult<Lead> {
    // Scoped parent lookup: creating under another tenant's customer reads
    // the same as creating under a nonexistent one.
    let scope = scope_for(user, Resource::Lead);
    let parent = store.find_customer(customer_id, &scope).ok_or_else(customer_not_found)?;
    let lead = store.insert_lead(Lead::new(data, parent.id));
    info!("lead.create id={} customer={}", lead.id, lead.customer_id);
    Ok(lead)
}

pub fn list_customer_leads(store: &Store, user: &User, customer_id: &str, status: Option<LeadStatus>) -> AppResult<Vec<Lead>> {
    let scope = scope_for(user, Resource::Lead);
    let parent = store.find_customer(customer_id, &scope).ok_or_else(customer_not_found)?;
    Ok(store.leads_of_customer(&parent.id, status))
}

pub fn list_leads(store: &Store, user: &User, status: Option<LeadStatus>) -> Vec<Lead> {
    let scope = scope_for(user, Resource::Lead);
    store.list_leads(&store.lead_scope(&scope), status)
}

pub fn update_lead(store: &Store, user: &User, id: &str, patch: LeadUpdate) -> AppResult<Lead> {
    let lead = store.find_lead(id).ok_or_else(lead_not_found)?;
    check_lead_parent(store, user, &lead)?;
    store.update_lead(&lead.id, &patch).ok_or_else(lead_not_found)
}

pub fn delete_lead(store: &Store, user: &User, id: &str) -> AppResult<()> {
    let lead = store.find_lead(id).ok_or_else(lead_not_found)?;
    check_lead_parent(store, user, &lead)?;
    if !store.delete_lead(&lead.id) {
        return Err(lead_not_found());
    }
    info!("lead.delete id={}", id);
    Ok(())
}

// --- dashboard ---

pub fn dashboard(store: &Store, user: &User) -> DashboardStats {
    aggregate(store, &scope_for(user, Resource::Customer))
}

// --- helpers ---

fn customer_not_found() -> AppError {
    AppError::not_found("customer_not_found", "Customer not found")
}

fn lead_not_found() -> AppError {
    AppError::not_found("lead_not_found", "Lead not found")
}

/// Authorize a direct lead operation against its parent customer's scope.
/// Denials read as the same `NotFound` a missing lead produces; see DESIGN.md
/// for the disclosure-gap decision.
fn check_lead_parent(store: &Store, user: &User, lead: &Lead) -> AppResult<()> {
    let decision = match store.find_customer(&lead.customer_id, &ScopePredicate::Unrestricted) {
        Some(parent) => authorize_lead_parent(user, &parent),
        // Parent vanished between lookups; only an unrestricted view may
        // still touch the orphaned lead.
        None => match scope_for(user, Resource::Lead) {
            ScopePredicate::Unrestricted => Decision::Allowed,
            ScopePredicate::OwnedBy(_) => Decision::Denied(DenyReason::NotFound),
        },
    };
    match decision {
        Decision::Allowed => Ok(()),
        Decision::Denied(_) => Err(lead_not_found()),
    }
}
