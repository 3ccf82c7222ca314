//!
//! corral HTTP server
//! ------------------
//! This module defines the Axum-based HTTP API for corral.
//!
//! Responsibilities:
//! - Bearer-token authentication on every data route (Authorization header).
//! - Auth endpoints (register/login) backed by the `security` and `identity`
//!   modules.
//! - Customer and lead CRUD delegating to the operations layer in `ops`.
//! - Dashboard statistics under the caller's scope.
//! - First-run sample dataset seeding.
//!
//! Handlers stay thin: parse the request, resolve the caller, call `ops`.

use std::net::SocketAddr;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::identity::{IdentityResolver, TokenService, DEFAULT_TTL_MINUTES};
use crate::model::{
    Customer, CustomerCreate, CustomerUpdate, Lead, LeadCreate, LeadStatus, LeadUpdate, LoginPayload, RegisterPayload,
    Role, TokenResponse, User,
};
use crate::stats::DashboardStats;
use crate::store::Store;

pub mod ops;

/// Shared server state injected into all handlers.
///
/// Holds the record store handle and the identity resolver (token service +
/// per-request user lookup). Both are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub resolver: IdentityResolver,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenService) -> Self {
        Self { store, resolver: IdentityResolver::new(tokens) }
    }
}

/// Convenience entry point reading configuration from the environment:
/// `CORRAL_HTTP_PORT` (default 8000), `CORRAL_TOKEN_SECRET` (dev default),
/// `CORRAL_TOKEN_TTL_MIN` (default 1440).
pub async fn run() -> anyhow::Result<()> {
    let http_port: u16 = std::env::var("CORRAL_HTTP_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8000);
    let secret = std::env::var("CORRAL_TOKEN_SECRET")
        .unwrap_or_else(|_| "corral-dev-secret-change-in-production".to_string());
    let ttl_min: i64 = std::env::var("CORRAL_TOKEN_TTL_MIN").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_TTL_MINUTES);
    run_with_port(http_port, &secret, ttl_min).await
}

/// Start the corral HTTP server bound to the given port with an explicit
/// signing secret and token TTL.
pub async fn run_with_port(http_port: u16, secret: &str, ttl_min: i64) -> anyhow::Result<()> {
    let store = Store::new();
    let state = AppState::new(store, TokenService::with_ttl_minutes(secret, ttl_min));

    let app = router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {} (token ttl {}min)", addr, ttl_min);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Mount all routes onto a state. Split out so tests can drive the router
/// without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "corral ok" }))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/customers", post(create_customer).get(list_customers))
        .route("/api/customers/{id}", get(get_customer).put(update_customer).delete(delete_customer))
        .route("/api/customers/{id}/leads", post(create_lead).get(list_customer_leads))
        .route("/api/leads", get(list_leads))
        .route("/api/leads/{id}", put(update_lead).delete(delete_lead))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/seed-data", post(seed_data))
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get("authorization").or_else(|| headers.get("Authorization"))?;
    let s = auth.to_str().ok()?;
    let (scheme, token) = s.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token.to_string()) }
}

/// Resolve the caller from the Authorization header, fresh per request.
fn current_user(state: &AppState, headers: &HeaderMap) -> AppResult<User> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::unauthenticated("missing_token", "Missing bearer token"))?;
    state.resolver.resolve(&state.store, &token)
}

// --- auth handlers ---

async fn register(State(state): State<AppState>, Json(payload): Json<RegisterPayload>) -> AppResult<Json<TokenResponse>> {
    ops::register(&state.store, state.resolver.token_service(), payload).map(Json)
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> AppResult<Json<TokenResponse>> {
    ops::login(&state.store, state.resolver.token_service(), payload).map(Json)
}

// --- customer handlers ---

#[derive(Debug, Deserialize)]
struct CustomerListQuery {
    #[serde(default)]
    skip: usize,
    #[serde(default = "CustomerListQuery::default_limit")]
    limit: usize,
    #[serde(default)]
    search: Option<String>,
}

impl CustomerListQuery {
    fn default_limit() -> usize { 10 }
}

async fn create_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    let user = current_user(&state, &headers)?;
    Ok(Json(ops::create_customer(&state.store, &user, payload)))
}

async fn list_customers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<CustomerListQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let user = current_user(&state, &headers)?;
    Ok(Json(ops::list_customers(&state.store, &user, q.search.as_deref(), q.skip, q.limit)))
}

async fn get_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    let user = current_user(&state, &headers)?;
    ops::get_customer(&state.store, &user, &id).map(Json)
}

async fn update_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    let user = current_user(&state, &headers)?;
    ops::update_customer(&state.store, &user, &id, patch).map(Json)
}

async fn delete_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers)?;
    ops::delete_customer(&state.store, &user, &id)?;
    Ok(Json(json!({"message": "Customer deleted successfully"})))
}

// --- lead handlers ---

#[derive(Debug, Deserialize)]
struct LeadListQuery {
    #[serde(default)]
    status: Option<LeadStatus>,
}

async fn create_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(customer_id): Path<String>,
    Json(payload): Json<LeadCreate>,
) -> AppResult<Json<Lead>> {
    let user = current_user(&state, &headers)?;
    ops::create_lead(&state.store, &user, &customer_id, payload).map(Json)
}

async fn list_customer_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(customer_id): Path<String>,
    Query(q): Query<LeadListQuery>,
) -> AppResult<Json<Vec<Lead>>> {
    let user = current_user(&state, &headers)?;
    ops::list_customer_leads(&state.store, &user, &customer_id, q.status).map(Json)
}

async fn list_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<LeadListQuery>,
) -> AppResult<Json<Vec<Lead>>> {
    let user = current_user(&state, &headers)?;
    Ok(Json(ops::list_leads(&state.store, &user, q.status)))
}

async fn update_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<LeadUpdate>,
) -> AppResult<Json<Lead>> {
    let user = current_user(&state, &headers)?;
    ops::update_lead(&state.store, &user, &id, patch).map(Json)
}

async fn delete_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers)?;
    ops::delete_lead(&state.store, &user, &id)?;
    Ok(Json(json!({"message": "Lead deleted successfully"})))
}

// --- dashboard handler ---

async fn dashboard_stats(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<DashboardStats>> {
    let user = current_user(&state, &headers)?;
    Ok(Json(ops::dashboard(&state.store, &user)))
}

// --- sample data ---

async fn seed_data(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let message = seed_sample_data(&state.store)?;
    Ok(Json(json!({"message": message})))
}

/// Create the sample dataset on an empty store: one admin, one regular user,
/// four customers and six leads across all statuses. Idempotent; reports and
/// changes nothing when users already exist.
pub fn seed_sample_data(store: &Store) -> AppResult<&'static str> {
    if store.user_count() > 0 {
        return Ok("Sample data already exists");
    }

    let admin = store.insert_user(User::new(
        "Admin User".into(),
        "admin@minicrm.com".into(),
        Role::Admin,
        crate::security::hash_password("admin123")?,
    ))?;
    let john = store.insert_user(User::new(
        "John Doe".into(),
        "john@minicrm.com".into(),
        Role::User,
        crate::security::hash_password("user123")?,
    ))?;

    let customers = [
        ("Alice Johnson", "alice@techcorp.com", "+1-555-0101", "TechCorp Inc", &john),
        ("Bob Smith", "bob@innovate.co", "+1-555-0102", "Innovate Solutions", &john),
        ("Carol Wilson", "carol@startupx.io", "+1-555-0103", "StartupX", &admin),
        ("David Brown", "david@enterprise.com", "+1-555-0104", "Enterprise LLC", &admin),
    ];
    let mut ids = Vec::with_capacity(customers.len());
    for (name, email, phone, company, owner) in customers {
        let c = store.insert_customer(Customer::new(
            CustomerCreate { name: name.into(), email: email.into(), phone: phone.into(), company: company.into() },
            owner.id.clone(),
        ));
        ids.push(c.id);
    }

    let leads = [
        (0, "Website Redesign", "Complete website overhaul", LeadStatus::New, 15000.0),
        (0, "Mobile App", "iOS and Android app development", LeadStatus::Contacted, 25000.0),
        (1, "CRM Integration", "Integrate with existing CRM", LeadStatus::Converted, 8000.0),
        (1, "Data Migration", "Migrate legacy data", LeadStatus::Lost, 5000.0),
        (2, "Cloud Setup", "AWS cloud infrastructure", LeadStatus::New, 12000.0),
        (3, "Security Audit", "Complete security assessment", LeadStatus::Contacted, 10000.0),
    ];
    for (ci, title, description, status, value) in leads {
        store.insert_lead(Lead::new(
            LeadCreate { title: title.into(), description: description.into(), status, value },
            ids[ci].clone(),
        ));
    }

    info!("seed: created 2 users, {} customers, {} leads", ids.len(), leads.len());
    Ok("Sample data created successfully")
}
