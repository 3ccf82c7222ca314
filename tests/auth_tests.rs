//! Authentication integration tests: registration, credential verification
//! and token-based identity resolution across the library surface.

use corral::identity::{IdentityResolver, TokenService};
use corral::model::{LoginPayload, RegisterPayload, Role, User};
use corral::server::ops;
use corral::store::Store;

fn setup() -> (Store, TokenService) {
    (Store::new(), TokenService::new("test-secret"))
}

fn register_payload(name: &str, email: &str, role: Role) -> RegisterPayload {
    RegisterPayload { name: name.into(), email: email.into(), password: "s3cr3t!".into(), role }
}

#[test]
fn register_issues_a_token_that_resolves_back() {
    let (store, tokens) = setup();
    let resp = ops::register(&store, &tokens, register_payload("Alice", "alice@example.com", Role::User))
        .expect("register should succeed");
    assert_eq!(resp.token_type, "bearer");
    assert_eq!(resp.user.email, "alice@example.com");

    let resolver = IdentityResolver::new(tokens);
    let resolved = resolver.resolve(&store, &resp.access_token).expect("token should resolve");
    assert_eq!(resolved.id, resp.user.id);
}

#[test]
fn duplicate_email_is_conflict_and_creates_no_second_record() {
    let (store, tokens) = setup();
    ops::register(&store, &tokens, register_payload("Alice", "alice@example.com", Role::User)).expect("first register");
    let err = ops::register(&store, &tokens, register_payload("Mallory", "alice@example.com", Role::User)).unwrap_err();
    assert_eq!(err.http_status(), 409);
    assert_eq!(store.user_count(), 1, "conflict must not create a second record");
}

#[test]
fn login_accepts_correct_and_rejects_wrong_password() {
    let (store, tokens) = setup();
    ops::register(&store, &tokens, register_payload("Alice", "alice@example.com", Role::User)).expect("register");

    let ok = ops::login(&store, &tokens, LoginPayload { email: "alice@example.com".into(), password: "s3cr3t!".into() });
    assert!(ok.is_ok(), "login with correct password should succeed");

    let bad = ops::login(&store, &tokens, LoginPayload { email: "alice@example.com".into(), password: "wrong".into() });
    assert_eq!(bad.unwrap_err().http_status(), 401, "login with wrong password must fail");

    let unknown = ops::login(&store, &tokens, LoginPayload { email: "nobody@example.com".into(), password: "s3cr3t!".into() });
    assert_eq!(unknown.unwrap_err().http_status(), 401, "unknown email must fail the same way");
}

#[test]
fn unknown_email_and_wrong_password_are_indistinguishable() {
    let (store, tokens) = setup();
    ops::register(&store, &tokens, register_payload("Alice", "alice@example.com", Role::User)).expect("register");

    let wrong_pw = ops::login(&store, &tokens, LoginPayload { email: "alice@example.com".into(), password: "nope".into() }).unwrap_err();
    let no_user = ops::login(&store, &tokens, LoginPayload { email: "ghost@example.com".into(), password: "nope".into() }).unwrap_err();
    assert_eq!(wrong_pw.code_str(), no_user.code_str());
    assert_eq!(wrong_pw.message(), no_user.message());
}

#[test]
fn corrupted_stored_hash_surfaces_as_generic_auth_failure() {
    let (store, tokens) = setup();
    // Bypass registration to plant a credential the hasher cannot parse
    store
        .insert_user(User::new("Broken".into(), "broken@example.com".into(), Role::User, "###not-a-phc###".into()))
        .expect("insert");

    let err = ops::login(&store, &tokens, LoginPayload { email: "broken@example.com".into(), password: "whatever".into() }).unwrap_err();
    assert_eq!(err.http_status(), 401);
    assert_eq!(err.code_str(), "invalid_credentials", "corruption detail must not leak to the caller");
}

#[test]
fn expired_token_does_not_resolve() {
    let store = Store::new();
    let tokens = TokenService::with_ttl_minutes("test-secret", 0);
    let resp = ops::register(&store, &tokens, register_payload("Alice", "alice@example.com", Role::User)).expect("register");

    let resolver = IdentityResolver::new(tokens);
    let err = resolver.resolve(&store, &resp.access_token).unwrap_err();
    assert_eq!(err.http_status(), 401);
}

#[test]
fn deleting_the_subject_invalidates_outstanding_tokens() {
    let (store, tokens) = setup();
    let resp = ops::register(&store, &tokens, register_payload("Alice", "alice@example.com", Role::User)).expect("register");

    let resolver = IdentityResolver::new(tokens);
    assert!(resolver.resolve(&store, &resp.access_token).is_ok());
    store.remove_user(&resp.user.id);
    let err = resolver.resolve(&store, &resp.access_token).unwrap_err();
    assert_eq!(err.http_status(), 401, "tokens reference accounts, they do not cache them");
}
