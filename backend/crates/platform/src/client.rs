//! Client identification utilities
//!
//! Derives the key that partitions per-client state (rate limiting) from
//! request metadata. Every input here is untrusted and resolution never
//! fails: a malformed header simply falls through to the next source.

use axum::http::HeaderMap;
use std::borrow::Borrow;
use std::fmt;
use std::net::IpAddr;

/// Proxy-appended client chain, first entry is the original client
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
/// Single client address set by a reverse proxy
pub const X_REAL_IP: &str = "x-real-ip";
/// Key used when no transport address is available at all
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Opaque, non-empty identity of a requester.
///
/// Two requesters sharing an apparent address (e.g. behind the same NAT or
/// proxy) share a key. That is a property of IP-based identity, not a bug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey(String);

impl ClientKey {
    /// Build a key from an arbitrary string; empty input maps to
    /// [`UNKNOWN_CLIENT`].
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.is_empty() {
            Self(UNKNOWN_CLIENT.to_string())
        } else {
            Self(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<IpAddr> for ClientKey {
    fn from(ip: IpAddr) -> Self {
        Self(ip.to_string())
    }
}

impl Borrow<str> for ClientKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the client key for a request.
///
/// Priority, first match wins:
/// 1. First token of `X-Forwarded-For`, if it is an IP address
/// 2. `X-Real-IP`, if it is an IP address
/// 3. The transport remote address with its port stripped, or verbatim if
///    it cannot be split
/// 4. [`UNKNOWN_CLIENT`]
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `remote_addr` - Transport-level peer address, usually `SocketAddr` text
pub fn resolve_client_key(headers: &HeaderMap, remote_addr: Option<&str>) -> ClientKey {
    if let Some(ip) = forwarded_for(headers) {
        return ip.into();
    }
    if let Some(ip) = real_ip(headers) {
        return ip.into();
    }
    match remote_addr {
        Some(raw) => ClientKey::new(strip_port(raw).unwrap_or(raw)),
        None => ClientKey::new(UNKNOWN_CLIENT),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    header_str(headers, X_FORWARDED_FOR)?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    header_str(headers, X_REAL_IP)?.trim().parse().ok()
}

/// Split `host:port` or `[v6]:port`, returning the host.
///
/// A bare IPv6 address has colons but no port, so an unbracketed host that
/// still contains a colon is rejected rather than cut at its last group.
fn strip_port(raw: &str) -> Option<&str> {
    let host = if let Some(rest) = raw.strip_prefix('[') {
        rest.split_once("]:")?.0
    } else {
        let (host, _port) = raw.rsplit_once(':')?;
        if host.contains(':') {
            return None;
        }
        host
    };
    (!host.is_empty()).then_some(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(*value));
        }
        headers
    }

    #[test]
    fn test_resolution_precedence() {
        let cases: Vec<(&str, HeaderMap, Option<&str>, &str)> = vec![
            (
                "x-forwarded-for wins",
                headers(&[("x-forwarded-for", "203.0.113.1"), ("x-real-ip", "203.0.113.2")]),
                Some("192.168.1.1:12345"),
                "203.0.113.1",
            ),
            (
                "first forwarded token",
                headers(&[("x-forwarded-for", "192.168.1.1, 10.0.0.1")]),
                Some("127.0.0.1:1"),
                "192.168.1.1",
            ),
            (
                "x-real-ip",
                headers(&[("x-real-ip", "203.0.113.2")]),
                Some("192.168.1.1:12345"),
                "203.0.113.2",
            ),
            (
                "remote addr fallback",
                HeaderMap::new(),
                Some("192.168.1.1:12345"),
                "192.168.1.1",
            ),
            (
                "remote addr without port",
                HeaderMap::new(),
                Some("192.168.1.1"),
                "192.168.1.1",
            ),
            (
                "bracketed v6 remote addr",
                HeaderMap::new(),
                Some("[::1]:8080"),
                "::1",
            ),
            (
                "bare v6 remote addr is kept verbatim",
                HeaderMap::new(),
                Some("2001:db8::1"),
                "2001:db8::1",
            ),
            ("no address at all", HeaderMap::new(), None, UNKNOWN_CLIENT),
        ];

        for (name, headers, remote, expected) in cases {
            let key = resolve_client_key(&headers, remote);
            assert_eq!(key.as_str(), expected, "case: {name}");
        }
    }

    #[test]
    fn test_malformed_headers_fall_through() {
        let h = headers(&[("x-forwarded-for", "not-an-ip, 10.0.0.1"), ("x-real-ip", "garbage")]);
        let key = resolve_client_key(&h, Some("192.168.1.7:443"));
        assert_eq!(key.as_str(), "192.168.1.7");
    }

    #[test]
    fn test_forwarded_token_is_trimmed() {
        let h = headers(&[("x-forwarded-for", "  10.0.0.9  ,10.0.0.1")]);
        assert_eq!(resolve_client_key(&h, None).as_str(), "10.0.0.9");
    }

    #[test]
    fn test_empty_port_host_uses_raw_value() {
        let key = resolve_client_key(&HeaderMap::new(), Some(":8080"));
        assert_eq!(key.as_str(), ":8080");
    }

    #[test]
    fn test_empty_key_is_never_produced() {
        let key = resolve_client_key(&HeaderMap::new(), Some(""));
        assert_eq!(key.as_str(), UNKNOWN_CLIENT);
    }
}
