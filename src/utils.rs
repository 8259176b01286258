use axum::http::{HeaderMap, HeaderValue};
use sha2::{Digest, Sha256};
use std::net::IpAddr;

/// Creates a salted, truncated hash of an identifier for safe logging.
///
/// # Arguments
/// * `id` - The identifier to hash (e.g., a requester address).
/// * `salt` - A salt value from the application's configuration.
///
/// # Returns
/// A short, hexadecimal string representing the salted hash.
pub fn log_safe_id(id: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(id.as_bytes());
    let hash = hasher.finalize();

    hex::encode(&hash[..4])
}

/// Adds the standard API security headers to a response
pub fn add_security_headers(headers: &mut HeaderMap, is_https: bool) {
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    // JSON-only API: nothing should ever execute
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none';"),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    if is_https {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
}

/// Extracts the client IP address used as the rate-limit key
///
/// Order of precedence:
/// 1. First hop of `X-Forwarded-For`
/// 2. `X-Real-IP`
/// 3. The socket peer address, if known
///
/// # Returns
/// IP address as a string (normalized, without brackets for IPv6)
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
    {
        return normalize_ip(ip);
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
    {
        return normalize_ip(ip);
    }

    match direct_ip {
        Some(ip) => normalize_ip(ip),
        None => "unknown".to_string(),
    }
}

fn normalize_ip(ip: IpAddr) -> String {
    ip.to_string()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}
