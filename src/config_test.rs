use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_uses_defaults_when_unset() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        HttpTimeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_lookup_parses_overrides_and_trims_trailing_slash() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("SESSION_BASE_URL", "https://api.example.test/"),
        ("SESSION_REQUEST_TIMEOUT_SECS", "42"),
        ("SESSION_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.base_url, "https://api.example.test");
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn from_lookup_rejects_base_url_without_scheme() {
    let err = ClientConfig::from_lookup(lookup_from(&[("SESSION_BASE_URL", "localhost:7777")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidBaseUrl("localhost:7777".to_owned()));
}

#[test]
fn from_lookup_rejects_zero_or_garbage_timeouts() {
    let err = ClientConfig::from_lookup(lookup_from(&[("SESSION_REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidNumber { var: "SESSION_REQUEST_TIMEOUT_SECS", .. }));

    let err = ClientConfig::from_lookup(lookup_from(&[("SESSION_CONNECT_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidNumber { var: "SESSION_CONNECT_TIMEOUT_SECS", value: "soon".to_owned() }
    );
}

#[test]
fn with_base_url_keeps_timeouts() {
    let cfg = ClientConfig { base_url: DEFAULT_BASE_URL.to_owned(), timeouts: HttpTimeouts { request_secs: 5, connect_secs: 2 } }
        .with_base_url("http://127.0.0.1:9000//")
        .unwrap();
    assert_eq!(cfg.base_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.timeouts.request_secs, 5);
}
