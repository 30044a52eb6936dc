//! Two-factor verification routes
//!
//! - `POST /api/auth/send-2fa-code` issues a code and emails it
//! - `POST /api/auth/verify-2fa-code` checks a submitted code

pub mod send_code;
pub mod verify_code;

use std::net::IpAddr;

use actix_web::{web, HttpRequest};

pub use send_code::send_code;
pub use verify_code::verify_code;

/// Register the verification routes under `/api/auth`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/send-2fa-code", web::post().to(send_code))
            .route("/verify-2fa-code", web::post().to(verify_code)),
    );
}

/// Extract client IP address from request
///
/// Forwarding headers are only read when the direct peer is a trusted proxy.
/// Anyone else could set them to anything, so the peer address is used.
pub fn extract_client_ip(req: &HttpRequest, trusted_proxies: &[IpAddr]) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip());

    if peer.is_some_and(|ip| trusted_proxies.contains(&ip)) {
        if let Some(ip) = forwarded_client(req, trusted_proxies) {
            return Some(ip.to_string());
        }
        if let Some(ip) = header_ip(req, "X-Real-IP") {
            return Some(ip.to_string());
        }
    }

    peer.map(|ip| ip.to_string())
}

/// Nearest untrusted hop in `X-Forwarded-For`, read right to left
///
/// Entries left of it were written by the client and are ignored. A
/// malformed entry discards the header.
fn forwarded_client(req: &HttpRequest, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    let header = req.headers().get("X-Forwarded-For")?.to_str().ok()?;

    let mut outermost = None;
    for hop in header.rsplit(',').map(str::trim).filter(|s| !s.is_empty()) {
        let ip = hop.parse::<IpAddr>().ok()?;
        if !trusted_proxies.contains(&ip) {
            return Some(ip);
        }
        outermost = Some(ip);
    }
    outermost
}

fn header_ip(req: &HttpRequest, name: &str) -> Option<IpAddr> {
    req.headers().get(name)?.to_str().ok()?.trim().parse().ok()
}
