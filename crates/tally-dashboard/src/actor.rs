//! Reduces an incoming request to the audit [`Actor`] the core services expect.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tally_core::Actor;

const REMOTE_USER_HEADER: &str = "x-remote-user";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const ANONYMOUS: &str = "anonymous";

/// Extractor wrapping the [`Actor`] behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestActor(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for RequestActor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(actor_from_headers(&parts.headers, peer)))
    }
}

fn actor_from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Actor {
    let user = header_text(headers, REMOTE_USER_HEADER).unwrap_or_else(|| ANONYMOUS.to_string());

    let forwarded = header_text(headers, FORWARDED_FOR_HEADER).and_then(|value| {
        value
            .split(',')
            .next()
            .map(str::trim)
            .filter(|first| !first.is_empty())
            .map(ToString::to_string)
    });
    let ip_address = forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()));

    Actor::new(user, ip_address)
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    use super::*;

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::from(([192, 168, 1, 20], 51_000)))
    }

    #[test]
    fn defaults_to_anonymous_and_peer_address() {
        let actor = actor_from_headers(&HeaderMap::new(), peer());
        assert_eq!(actor, Actor::new("anonymous", Some("192.168.1.20".to_string())));
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert("x-remote-user", HeaderValue::from_static("alice"));

        let actor = actor_from_headers(&headers, peer());
        assert_eq!(actor, Actor::new("alice", Some("203.0.113.9".to_string())));
    }

    #[test]
    fn missing_peer_leaves_ip_empty() {
        let actor = actor_from_headers(&HeaderMap::new(), None);
        assert_eq!(actor.ip_address, None);
    }
}
