use super::*;
use serde_json::json;

#[test]
fn credentials_serialize_with_camel_case_remember_me() {
    let creds = Credentials { email: "a@b.com".to_owned(), password: "secret1".to_owned(), remember_me: true };
    let value = serde_json::to_value(&creds).unwrap();
    assert_eq!(value, json!({ "email": "a@b.com", "password": "secret1", "rememberMe": true }));
}

#[test]
fn credentials_debug_redacts_password() {
    let creds = Credentials { email: "a@b.com".to_owned(), password: "hunter22".to_owned(), remember_me: false };
    let printed = format!("{creds:?}");
    assert!(printed.contains("a@b.com"));
    assert!(!printed.contains("hunter22"));
}

#[test]
fn user_keeps_payload_verbatim() {
    let body = json!({ "id": 1, "name": "A", "extra": { "nested": [1, 2] } });
    let user: User = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(user.id(), Some(&json!(1)));
    assert_eq!(user.name(), Some("A"));
    assert_eq!(serde_json::to_value(&user).unwrap(), body);
}

#[test]
fn user_accessors_tolerate_missing_fields() {
    let user = User::new(json!({ "email": "x@y.z" }));
    assert_eq!(user.id(), None);
    assert_eq!(user.name(), None);
}
