use super::*;
use crate::model::{CustomerCreate, LeadCreate, Role};

fn user(name: &str, email: &str, role: Role) -> User {
    User::new(name.into(), email.into(), role, "phc".into())
}

fn customer_for(owner: &User, name: &str) -> Customer {
    Customer::new(
        CustomerCreate { name: name.into(), email: format!("{}@corp.io", name.to_lowercase()), phone: "+1-555-0100".into(), company: format!("{} Inc", name) },
        owner.id.clone(),
    )
}

fn lead_for(customer: &Customer, title: &str, status: LeadStatus, value: f64) -> Lead {
    Lead::new(
        LeadCreate { title: title.into(), description: "d".into(), status, value },
        customer.id.clone(),
    )
}

#[test]
fn test_duplicate_email_is_conflict_and_inserts_nothing() {
    let store = Store::new();
    store.insert_user(user("Alice", "alice@example.com", Role::User)).unwrap();
    let err = store.insert_user(user("Imposter", "ALICE@example.com", Role::User)).unwrap_err();
    assert_eq!(err.http_status(), 409);
    assert_eq!(store.user_count(), 1);
}

#[test]
fn test_email_lookup_is_case_insensitive() {
    let store = Store::new();
    let u = store.insert_user(user("Alice", "alice@example.com", Role::User)).unwrap();
    assert_eq!(store.find_user_by_email("Alice@Example.COM").unwrap().id, u.id);
    assert!(store.find_user_by_email("bob@example.com").is_none());
}

#[test]
fn test_scoped_find_hides_other_owners() {
    let store = Store::new();
    let a = store.insert_user(user("A", "a@x.io", Role::User)).unwrap();
    let b = store.insert_user(user("B", "b@x.io", Role::User)).unwrap();
    let c = store.insert_customer(customer_for(&a, "Acme"));

    let a_scope = ScopePredicate::OwnedBy(a.id.clone());
    let b_scope = ScopePredicate::OwnedBy(b.id.clone());
    assert!(store.find_customer(&c.id, &a_scope).is_some());
    // Not owned and nonexistent are the same None
    assert!(store.find_customer(&c.id, &b_scope).is_none());
    assert!(store.find_customer("no-such-id", &b_scope).is_none());
    assert!(store.find_customer(&c.id, &ScopePredicate::Unrestricted).is_some());
}

#[test]
fn test_list_customers_order_search_and_pagination() {
    let store = Store::new();
    let a = store.insert_user(user("A", "a@x.io", Role::User)).unwrap();
    for i in 0..5 {
        store.insert_customer(customer_for(&a, &format!("Cust{}", i)));
    }
    let scope = ScopePredicate::OwnedBy(a.id.clone());
    let all = store.list_customers(&scope, None, 0, 10);
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].name, "Cust0", "insertion order expected");

    let page = store.list_customers(&scope, None, 2, 2);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name, "Cust2");

    let hits = store.list_customers(&scope, Some("cust3"), 0, 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Cust3");
}

#[test]
fn test_scoped_update_and_delete() {
    let store = Store::new();
    let a = store.insert_user(user("A", "a@x.io", Role::User)).unwrap();
    let b = store.insert_user(user("B", "b@x.io", Role::User)).unwrap();
    let c = store.insert_customer(customer_for(&a, "Acme"));

    let b_scope = ScopePredicate::OwnedBy(b.id.clone());
    let patch = CustomerUpdate { name: Some("Hacked".into()), ..Default::default() };
    assert!(store.update_customer(&c.id, &b_scope, &patch).is_none());
    assert!(!store.delete_customer(&c.id, &b_scope));

    let a_scope = ScopePredicate::OwnedBy(a.id.clone());
    let updated = store.update_customer(&c.id, &a_scope, &patch).unwrap();
    assert_eq!(updated.name, "Hacked");
    // Untouched fields survive a partial patch
    assert_eq!(updated.company, "Acme Inc");
    assert!(store.delete_customer(&c.id, &a_scope));
    assert!(store.find_customer(&c.id, &ScopePredicate::Unrestricted).is_none());
}

#[test]
fn test_lead_cascade_delete() {
    let store = Store::new();
    let a = store.insert_user(user("A", "a@x.io", Role::User)).unwrap();
    let c1 = store.insert_customer(customer_for(&a, "One"));
    let c2 = store.insert_customer(customer_for(&a, "Two"));
    store.insert_lead(lead_for(&c1, "L1", LeadStatus::New, 100.0));
    store.insert_lead(lead_for(&c1, "L2", LeadStatus::Lost, 50.0));
    store.insert_lead(lead_for(&c2, "L3", LeadStatus::New, 10.0));

    assert_eq!(store.delete_leads_of_customer(&c1.id), 2);
    assert_eq!(store.count_leads_of_customer(&c1.id), 0);
    assert_eq!(store.count_leads_of_customer(&c2.id), 1);
}

#[test]
fn test_lead_listing_respects_closed_empty_scope() {
    let store = Store::new();
    let a = store.insert_user(user("A", "a@x.io", Role::User)).unwrap();
    let c = store.insert_customer(customer_for(&a, "Acme"));
    store.insert_lead(lead_for(&c, "L1", LeadStatus::New, 100.0));

    assert_eq!(store.list_leads(&LeadScope::All, None).len(), 1);
    // An empty ParentIn set matches nothing, never everything
    assert!(store.list_leads(&LeadScope::ParentIn(vec![]), None).is_empty());
    let filtered = store.list_leads(&LeadScope::All, Some(LeadStatus::Contacted));
    assert!(filtered.is_empty());
}

#[test]
fn test_lead_partial_update() {
    let store = Store::new();
    let a = store.insert_user(user("A", "a@x.io", Role::User)).unwrap();
    let c = store.insert_customer(customer_for(&a, "Acme"));
    let l = store.insert_lead(lead_for(&c, "L1", LeadStatus::New, 100.0));

    let patch = LeadUpdate { status: Some(LeadStatus::Converted), ..Default::default() };
    let updated = store.update_lead(&l.id, &patch).unwrap();
    assert_eq!(updated.status, LeadStatus::Converted);
    assert_eq!(updated.title, "L1");
    assert_eq!(updated.value, 100.0);
}
