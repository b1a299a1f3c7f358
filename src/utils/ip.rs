//! Client IP extraction
//!
//! Webhook attribution and click records store the originating address for
//! later reconciliation; proxies put the real client in X-Forwarded-For.

use actix_web::HttpRequest;

/// Extract the client IP from a request.
///
/// Order: first entry of `X-Forwarded-For`, then `X-Real-IP`, then the
/// peer address of the connection.
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let candidate = first.trim();
            if !candidate.is_empty() {
                return Some(candidate.to_string());
            }
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        let candidate = real_ip.trim();
        if !candidate.is_empty() {
            return Some(candidate.to_string());
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn forwarded_for_takes_first_entry() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.7, 10.0.0.1"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn real_ip_is_fallback() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "198.51.100.4"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn empty_headers_fall_through() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", " "))
            .to_http_request();
        // TestRequest has no peer address either
        assert_eq!(extract_client_ip(&req), None);
    }
}
