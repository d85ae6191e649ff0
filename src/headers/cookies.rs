//! Set-Cookie rewriting for the proxy domain.
//!
//! # Responsibilities
//! - Re-scope upstream cookies to the client-observed host
//! - Relax attributes that only make sense on the upstream's own origin
//!
//! # Design Decisions
//! - `Domain` is replaced only when present; a host-only cookie already binds
//!   to the proxy host
//! - `Secure` is stripped: the gateway may be reached over plain http in
//!   development deployments
//! - A present `SameSite` is normalized to `Lax` (`None` without `Secure`
//!   would be rejected by browsers)

/// Rewrite one Set-Cookie value for the client host. Pure and total.
pub fn rewrite_set_cookie(cookie: &str, client_host: &str) -> String {
    let mut parts = Vec::new();
    for (i, raw) in cookie.split(';').enumerate() {
        let attr = raw.trim();
        if attr.is_empty() {
            continue;
        }
        if i == 0 {
            // name=value pair
            parts.push(attr.to_string());
            continue;
        }
        let name = attr.split('=').next().unwrap_or("").trim();
        if name.eq_ignore_ascii_case("domain") {
            parts.push(format!("Domain={}", client_host));
        } else if name.eq_ignore_ascii_case("secure") {
            continue;
        } else if name.eq_ignore_ascii_case("samesite") {
            parts.push("SameSite=Lax".to_string());
        } else {
            parts.push(attr.to_string());
        }
    }
    parts.join("; ")
}
