//! Dashboard aggregation over a scope predicate. Counts and totals are
//! computed from the same scoped queries the CRUD surface uses, so the
//! dashboard can never show records its caller could not list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::ScopePredicate;
use crate::model::LeadStatus;
use crate::store::Store;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_customers: usize,
    pub total_leads: usize,
    /// Always carries all four statuses, zero-count ones included, so clients
    /// render a stable set of keys.
    pub leads_by_status: HashMap<String, usize>,
    pub total_value: f64,
}

/// Compute dashboard statistics for the records visible under `scope`.
pub fn aggregate(store: &Store, scope: &ScopePredicate) -> DashboardStats {
    let total_customers = store.count_customers(scope);
    let leads = store.list_leads(&store.lead_scope(scope), None);

    let mut leads_by_status: HashMap<String, usize> =
        LeadStatus::ALL.iter().map(|s| (s.as_str().to_string(), 0)).collect();
    let mut total_value = 0.0;
    for lead in &leads {
        *leads_by_status.entry(lead.status.as_str().to_string()).or_insert(0) += 1;
        total_value += lead.value;
    }

    DashboardStats { total_customers, total_leads: leads.len(), leads_by_status, total_value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, CustomerCreate, Lead, LeadCreate, Role, User};

    fn seed_owner(store: &Store) -> User {
        store
            .insert_user(User::new("A".into(), "a@x.io".into(), Role::User, "phc".into()))
            .expect("insert user")
    }

    fn seed_customer(store: &Store, owner: &User) -> Customer {
        store.insert_customer(Customer::new(
            CustomerCreate { name: "Acme".into(), email: "c@acme.io".into(), phone: "1".into(), company: "Acme".into() },
            owner.id.clone(),
        ))
    }

    fn seed_lead(store: &Store, customer: &Customer, status: LeadStatus, value: f64) {
        store.insert_lead(Lead::new(
            LeadCreate { title: "t".into(), description: "d".into(), status, value },
            customer.id.clone(),
        ));
    }

    #[test]
    fn all_four_statuses_present_even_at_zero() {
        let store = Store::new();
        let owner = seed_owner(&store);
        let c = seed_customer(&store, &owner);
        seed_lead(&store, &c, LeadStatus::New, 100.0);
        seed_lead(&store, &c, LeadStatus::Converted, 50.0);

        let stats = aggregate(&store, &ScopePredicate::Unrestricted);
        assert_eq!(stats.total_leads, 2);
        assert_eq!(stats.total_value, 150.0);
        assert_eq!(stats.leads_by_status.len(), 4);
        assert_eq!(stats.leads_by_status["New"], 1);
        assert_eq!(stats.leads_by_status["Contacted"], 0);
        assert_eq!(stats.leads_by_status["Converted"], 1);
        assert_eq!(stats.leads_by_status["Lost"], 0);
    }

    #[test]
    fn empty_owned_scope_yields_zeroes_not_everything() {
        let store = Store::new();
        let owner = seed_owner(&store);
        let c = seed_customer(&store, &owner);
        seed_lead(&store, &c, LeadStatus::New, 100.0);

        // A different user with no customers sees nothing
        let stranger = store
            .insert_user(User::new("B".into(), "b@x.io".into(), Role::User, "phc".into()))
            .unwrap();
        let stats = aggregate(&store, &ScopePredicate::OwnedBy(stranger.id.clone()));
        assert_eq!(stats.total_customers, 0);
        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.total_value, 0.0);
        assert_eq!(stats.leads_by_status.values().sum::<usize>(), 0);
    }

    #[test]
    fn owned_scope_counts_only_own_records() {
        let store = Store::new();
        let a = seed_owner(&store);
        let b = store
            .insert_user(User::new("B".into(), "b@x.io".into(), Role::User, "phc".into()))
            .unwrap();
        let ca = seed_customer(&store, &a);
        let cb = store.insert_customer(Customer::new(
            CustomerCreate { name: "Bx".into(), email: "x@bx.io".into(), phone: "2".into(), company: "Bx".into() },
            b.id.clone(),
        ));
        seed_lead(&store, &ca, LeadStatus::New, 10.0);
        seed_lead(&store, &cb, LeadStatus::New, 99.0);

        let stats = aggregate(&store, &ScopePredicate::OwnedBy(a.id.clone()));
        assert_eq!(stats.total_customers, 1);
        assert_eq!(stats.total_leads, 1);
        assert_eq!(stats.total_value, 10.0);
    }
}
