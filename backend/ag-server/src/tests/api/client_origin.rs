use crate::ClientOrigin;
use crate::api::extractors::client_origin::UNKNOWN_ORIGIN;

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use googletest::prelude::*;
use http::Request;
use http::request::Parts;

fn parts(headers: &[(&str, &str)], peer: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/auth/login");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let (mut parts, _) = builder.body(()).unwrap().into_parts();
    if let Some(peer) = peer {
        let addr: SocketAddr = peer.parse().unwrap();
        parts.extensions.insert(ConnectInfo(addr));
    }
    parts
}

#[test]
fn given_forwarded_header_and_trust_when_extracted_then_first_hop_used() {
    let parts = parts(
        &[("x-forwarded-for", "198.51.100.9, 10.0.0.1")],
        Some("10.0.0.1:5000"),
    );

    let origin = ClientOrigin::from_parts(&parts, true);

    assert_that!(origin.ip, eq("198.51.100.9"));
}

#[test]
fn given_forwarded_header_without_trust_when_extracted_then_peer_used() {
    let parts = parts(
        &[("x-forwarded-for", "198.51.100.9")],
        Some("10.0.0.1:5000"),
    );

    let origin = ClientOrigin::from_parts(&parts, false);

    assert_that!(origin.ip, eq("10.0.0.1"));
}

#[test]
fn given_no_peer_and_no_header_when_extracted_then_unknown() {
    let origin = ClientOrigin::from_parts(&parts(&[], None), true);

    assert_that!(origin.ip, eq(UNKNOWN_ORIGIN));
}

#[test]
fn given_user_agent_when_extracted_then_carried_into_fingerprint() {
    let parts = parts(&[("user-agent", "curl/8.0")], Some("192.0.2.1:443"));

    let fingerprint = ClientOrigin::from_parts(&parts, false).fingerprint();

    assert_that!(fingerprint.ip_address, eq("192.0.2.1"));
    assert_that!(fingerprint.user_agent, some(eq("curl/8.0")));
}
