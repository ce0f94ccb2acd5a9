//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use castline_core::{Cause, Envelope, Kind};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn parse_user_message() {
    let env = Envelope::decode(&load("user_message.json")).unwrap();
    assert_eq!(env.kind, Kind::User);
    assert_eq!(env.sender, "alice");
    assert_eq!(env.body, "hi");
}

#[test]
fn parse_connect() {
    let env = Envelope::decode(&load("connect.json")).unwrap();
    assert_eq!(env, Envelope::connect("alice"));
}

#[test]
fn parse_server_conflict() {
    let env = Envelope::decode(&load("server_conflict.json")).unwrap();
    assert_eq!(env.kind, Kind::Server);
    assert_eq!(env.cause(), Some(Cause::Conflict));
    assert_eq!(env.body, "username already in chat");
}

#[test]
fn missing_message_defaults_to_empty() {
    let env = Envelope::decode(&load("disconnect_no_message.json")).unwrap();
    assert_eq!(env, Envelope::disconnect("bob"));
}

#[test]
fn round_trip_all_kinds() {
    let envelopes = [
        Envelope::user("alice", "hi"),
        Envelope::user("alice", ""),
        Envelope::connect("alice"),
        Envelope::disconnect("alice"),
        Envelope::server(Cause::Shutdown, "the server is shutting down..."),
        Envelope::server(Cause::Error, "upgrade failed"),
    ];
    for env in envelopes {
        let decoded = Envelope::decode(&env.encode().unwrap()).unwrap();
        assert_eq!(decoded, env);
    }
}

#[test]
fn kind_tag_is_a_stable_string() {
    let wire = Envelope::user("alice", "hi").encode().unwrap();
    let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(value["type"], "user");
    assert_eq!(value["name"], "alice");
    assert_eq!(value["message"], "hi");
}

#[test]
fn unknown_kind_is_a_decode_error() {
    let err = Envelope::decode(r#"{"type": "presence", "name": "alice"}"#).expect_err("must fail");
    assert!(err.to_string().contains("invalid envelope"));
}

#[test]
fn missing_name_is_a_decode_error() {
    Envelope::decode(r#"{"type": "user", "message": "hi"}"#).expect_err("must fail");
}

#[test]
fn unknown_field_is_a_decode_error() {
    Envelope::decode(r#"{"type": "user", "name": "a", "message": "m", "room": "x"}"#)
        .expect_err("must fail");
}

#[test]
fn garbage_is_a_decode_error() {
    Envelope::decode("not json at all").expect_err("must fail");
    Envelope::decode("").expect_err("must fail");
}

#[test]
fn unknown_cause_still_decodes() {
    let env = Envelope::decode(r#"{"type": "server", "name": "MAINTENANCE", "message": "soon"}"#)
        .unwrap();
    assert_eq!(env.kind, Kind::Server);
    assert_eq!(env.cause(), None);
}
