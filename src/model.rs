//! Typed records and request/response payloads for the corral API.
//! All ids are opaque UUID strings; timestamps are UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn new_id() -> String { Uuid::new_v4().to_string() }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Default for Role {
    fn default() -> Self { Role::User }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    Converted,
    Lost,
}

impl LeadStatus {
    /// The fixed enumeration used wherever stats are grouped by status, so
    /// zero-count statuses still appear in results.
    pub const ALL: [LeadStatus; 4] = [LeadStatus::New, LeadStatus::Contacted, LeadStatus::Converted, LeadStatus::Lost];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }
}

impl Default for LeadStatus {
    fn default() -> Self { LeadStatus::New }
}

/// A registered account. The password hash lives on the stored record only;
/// `PublicUser` is the shape that leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub password_hash: String,
}

impl User {
    pub fn new(name: String, email: String, role: Role, password_hash: String) -> Self {
        Self { id: new_id(), name, email, role, created_at: Utc::now(), password_hash }
    }

    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

/// User shape safe for client responses (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self { id: u.id.clone(), name: u.name.clone(), email: u.email.clone(), role: u.role, created_at: u.created_at }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    /// Owning user's id. Set at creation from the caller; indexed for scoping.
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(data: CustomerCreate, owner_id: String) -> Self {
        Self {
            id: new_id(),
            name: data.name,
            email: data.email,
            phone: data.phone,
            company: data.company,
            owner_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub customer_id: String,
    pub title: String,
    pub description: String,
    pub status: LeadStatus,
    pub value: f64,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(data: LeadCreate, customer_id: String) -> Self {
        Self {
            id: new_id(),
            customer_id,
            title: data.title,
            description: data.description,
            status: data.status,
            value: data.value,
            created_at: Utc::now(),
        }
    }
}

// --- Request payloads ---

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeadCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: LeadStatus,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub value: Option<f64>,
}

// --- Response shapes ---

/// Login/registration response: bearer token plus the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: PublicUser,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user: PublicUser) -> Self {
        Self { access_token, token_type: "bearer".to_string(), user }
    }
}
