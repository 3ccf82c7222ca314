//!
//! corral record store
//! -------------------
//! In-process, typed record store: one key-indexed collection per record type
//! (users, customers, leads) behind a single `parking_lot::RwLock`. The handle
//! is cheap to clone and shared across request handlers.
//!
//! Scope filtering happens inside the query methods. A caller holding an
//! `OwnedBy` predicate never receives (or pays for) records outside its scope,
//! which is what makes the existence-hiding invariant hold at the query layer:
//! out-of-scope records are simply absent from every result set.
//!
//! Durability is intentionally out of scope; each method takes and releases
//! the lock once, so individual operations are atomic but sequences of
//! operations (e.g. delete + cascade) are not transactional.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{AppError, AppResult};
use crate::identity::{LeadScope, ScopePredicate};
use crate::model::{Customer, CustomerUpdate, Lead, LeadStatus, LeadUpdate, User};

#[derive(Default)]
struct Collections {
    users: HashMap<String, User>,
    customers: HashMap<String, Customer>,
    /// Insertion order for stable listing/pagination.
    customer_order: Vec<String>,
    leads: HashMap<String, Lead>,
    lead_order: Vec<String>,
}

/// Shared handle to the record collections. Clone freely; all clones address
/// the same underlying store.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<Collections>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // --- users (credential store adapter) ---

    /// Insert a user, enforcing email uniqueness (case-insensitive).
    pub fn insert_user(&self, user: User) -> AppResult<User> {
        let mut g = self.inner.write();
        if g.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::conflict("email_taken", "Email already registered"));
        }
        g.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn find_user(&self, id: &str) -> Option<User> {
        self.inner.read().users.get(id).cloned()
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.inner.read().users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned()
    }

    pub fn remove_user(&self, id: &str) -> bool {
        self.inner.write().users.remove(id).is_some()
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }

    // --- customers ---

    pub fn insert_customer(&self, customer: Customer) -> Customer {
        let mut g = self.inner.write();
        g.customer_order.push(customer.id.clone());
        g.customers.insert(customer.id.clone(), customer.clone());
        customer
    }

    /// Scoped single-record fetch. Out-of-scope and nonexistent are the same
    /// `None` here.
    pub fn find_customer(&self, id: &str, scope: &ScopePredicate) -> Option<Customer> {
        self.inner
            .read()
            .customers
            .get(id)
            .filter(|c| scope.allows_owner(&c.owner_id))
            .cloned()
    }

    /// List customers under a scope in insertion order, with optional
    /// case-insensitive substring search over name/email/company and
    /// skip/limit pagination.
    pub fn list_customers(&self, scope: &ScopePredicate, search: Option<&str>, skip: usize, limit: usize) -> Vec<Customer> {
        let g = self.inner.read();
        let needle = search.map(|s| s.to_lowercase()).filter(|s| !s.is_empty());
        g.customer_order
            .iter()
            .filter_map(|id| g.customers.get(id))
            .filter(|c| scope.allows_owner(&c.owner_id))
            .filter(|c| match &needle {
                None => true,
                Some(n) => {
                    c.name.to_lowercase().contains(n)
                        || c.email.to_lowercase().contains(n)
                        || c.company.to_lowercase().contains(n)
                }
            })
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn count_customers(&self, scope: &ScopePredicate) -> usize {
        self.inner.read().customers.values().filter(|c| scope.allows_owner(&c.owner_id)).count()
    }

    /// Ids of all customers visible under a scope; the input to lead scoping.
    pub fn customer_ids(&self, scope: &ScopePredicate) -> Vec<String> {
        let g = self.inner.read();
        g.customer_order
            .iter()
            .filter_map(|id| g.customers.get(id))
            .filter(|c| scope.allows_owner(&c.owner_id))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Translate a customer scope into a lead scope. `OwnedBy` becomes an
    /// explicit `ParentIn` set over the owner's customer ids. An owner with
    /// no customers gets an empty set, which must stay closed rather than
    /// widening into an unrestricted lead query.
    pub fn lead_scope(&self, scope: &ScopePredicate) -> LeadScope {
        match scope {
            ScopePredicate::Unrestricted => LeadScope::All,
            ScopePredicate::OwnedBy(_) => LeadScope::ParentIn(self.customer_ids(scope)),
        }
    }

    /// Scoped partial update; only provided fields change. Returns the
    /// updated record, or `None` when the target is absent from the scope.
    pub fn update_customer(&self, id: &str, scope: &ScopePredicate, patch: &CustomerUpdate) -> Option<Customer> {
        let mut g = self.inner.write();
        let c = g.customers.get_mut(id).filter(|c| scope.allows_owner(&c.owner_id))?;
        if let Some(name) = &patch.name {
            c.name = name.clone();
        }
        if let Some(email) = &patch.email {
            c.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            c.phone = phone.clone();
        }
        if let Some(company) = &patch.company {
            c.company = company.clone();
        }
        Some(c.clone())
    }

    /// Scoped delete. Does NOT cascade; callers pair this with
    /// `delete_leads_of_customer`.
    pub fn delete_customer(&self, id: &str, scope: &ScopePredicate) -> bool {
        let mut g = self.inner.write();
        let in_scope = g.customers.get(id).map(|c| scope.allows_owner(&c.owner_id)).unwrap_or(false);
        if !in_scope {
            return false;
        }
        g.customers.remove(id);
        g.customer_order.retain(|cid| cid != id);
        true
    }

    // --- leads ---

    pub fn insert_lead(&self, lead: Lead) -> Lead {
        let mut g = self.inner.write();
        g.lead_order.push(lead.id.clone());
        g.leads.insert(lead.id.clone(), lead.clone());
        lead
    }

    /// Unscoped lead lookup. Leads carry no owner field; authorization runs
    /// against the parent customer afterwards.
    pub fn find_lead(&self, id: &str) -> Option<Lead> {
        self.inner.read().leads.get(id).cloned()
    }

    /// List leads whose parent customer falls in `scope`, optionally filtered
    /// by status, in insertion order.
    pub fn list_leads(&self, scope: &LeadScope, status: Option<LeadStatus>) -> Vec<Lead> {
        let g = self.inner.read();
        g.lead_order
            .iter()
            .filter_map(|id| g.leads.get(id))
            .filter(|l| scope.contains(&l.customer_id))
            .filter(|l| status.map(|s| l.status == s).unwrap_or(true))
            .cloned()
            .collect()
    }

    pub fn leads_of_customer(&self, customer_id: &str, status: Option<LeadStatus>) -> Vec<Lead> {
        self.list_leads(&LeadScope::ParentIn(vec![customer_id.to_string()]), status)
    }

    pub fn count_leads_of_customer(&self, customer_id: &str) -> usize {
        self.inner.read().leads.values().filter(|l| l.customer_id == customer_id).count()
    }

    pub fn update_lead(&self, id: &str, patch: &LeadUpdate) -> Option<Lead> {
        let mut g = self.inner.write();
        let l = g.leads.get_mut(id)?;
        if let Some(title) = &patch.title {
            l.title = title.clone();
        }
        if let Some(description) = &patch.description {
            l.description = description.clone();
        }
        if let Some(status) = patch.status {
            l.status = status;
        }
        if let Some(value) = patch.value {
            l.value = value;
        }
        Some(l.clone())
    }

    pub fn delete_lead(&self, id: &str) -> bool {
        let mut g = self.inner.write();
        let removed = g.leads.remove(id).is_some();
        if removed {
            g.lead_order.retain(|lid| lid != id);
        }
        removed
    }

    /// Cascade step: remove every lead referencing `customer_id`. Returns the
    /// number removed.
    pub fn delete_leads_of_customer(&self, customer_id: &str) -> usize {
        let mut g = self.inner.write();
        let doomed: Vec<String> = g
            .leads
            .values()
            .filter(|l| l.customer_id == customer_id)
            .map(|l| l.id.clone())
            .collect();
        for id in &doomed {
            g.leads.remove(id);
        }
        g.lead_order.retain(|lid| !doomed.contains(lid));
        doomed.len()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
