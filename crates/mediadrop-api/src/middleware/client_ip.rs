//! Client address resolution for per-client limits.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Resolve the client address: first valid entry of `X-Forwarded-For`, then
/// `X-Real-IP`, then the peer address of the connection.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').find_map(|ip| ip.trim().parse().ok()));
    if forwarded.is_some() {
        return forwarded;
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok());
    if real_ip.is_some() {
        return real_ip;
    }

    peer.map(|addr| addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_forwarded_for_takes_first_valid_entry() {
        let h = headers(&[("x-forwarded-for", "garbage, 192.168.1.1, 10.0.0.1")]);
        assert_eq!(client_ip(&h, None), Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_real_ip_used_without_forwarded_for() {
        let h = headers(&[("x-real-ip", " 2001:db8::1 ")]);
        assert_eq!(client_ip(&h, None), Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_falls_back_to_peer() {
        let peer = SocketAddr::from(([127, 0, 0, 1], 8080));
        let h = headers(&[("x-forwarded-for", "not.an.ip")]);
        assert_eq!(client_ip(&h, Some(peer)), Some(peer.ip()));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
