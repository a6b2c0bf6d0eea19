//! SSRF checks for fetch targets.
//!
//! Link-card URLs come from article content, so before the service requests
//! anything on their behalf the target must be HTTPS and must not point at
//! loopback, private or link-local addresses.
use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;
use url::{Host, Url};

/// Hostnames that always resolve to the local machine.
const BLOCKED_HOSTNAMES: &[&str] = &["localhost"];

/// IPv6 prefixes of unique-local (`fc00::/7`) and link-local (`fe80::/10`)
/// addresses, matched against the canonical lowercase text form.
const BLOCKED_IPV6_PREFIXES: &[&str] = &["fc", "fd", "fe8", "fe9", "fea", "feb"];

/// Why a fetch target was refused.
///
/// The reason is for logs only. Every variant is reported to HTTP clients
/// as the same `Invalid URL` error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlRejection {
  #[error("not a valid URL: {0}")]
  Parse(#[from] url::ParseError),

  #[error("scheme '{0}' is not allowed, only https")]
  Scheme(String),

  #[error("URL has no host")]
  MissingHost,

  #[error("host '{0}' is loopback, private or link-local")]
  BlockedHost(String),
}

/// Validate a candidate fetch target.
///
/// Checks run in order: the URL must parse, the scheme must be exactly
/// `https`, and the host must not be blocked (see [`is_blocked_host`]).
///
/// # Errors
///
/// Returns the first [`UrlRejection`] that applies.
pub fn validate_target(candidate: &str) -> Result<Url, UrlRejection> {
  let url = Url::parse(candidate)?;

  if url.scheme() != "https" {
    return Err(UrlRejection::Scheme(url.scheme().to_string()));
  }

  let host = url.host().ok_or(UrlRejection::MissingHost)?;
  if is_blocked_host(&host) {
    return Err(UrlRejection::BlockedHost(host.to_string()));
  }

  Ok(url)
}

/// Whether `host` points at the local machine or a private network.
#[must_use]
pub fn is_blocked_host(host: &Host<&str>) -> bool {
  match host {
    Host::Domain(domain) => {
      let domain = domain.trim_end_matches('.').to_ascii_lowercase();
      BLOCKED_HOSTNAMES.contains(&domain.as_str())
    },
    Host::Ipv4(ip) => is_blocked_ipv4(*ip),
    Host::Ipv6(ip) => is_blocked_ipv6(*ip),
  }
}

fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
  let [first, second, ..] = ip.octets();
  ip.is_unspecified()
    || ip.is_loopback()
    || first == 10
    || first == 172
    || (first == 192 && second == 168)
    || (first == 169 && second == 254)
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
  if let Some(mapped) = ip.to_ipv4_mapped() {
    return is_blocked_ipv4(mapped);
  }
  if ip.is_loopback() || ip.is_unspecified() {
    return true;
  }

  let text = ip.to_string();
  BLOCKED_IPV6_PREFIXES
    .iter()
    .any(|prefix| text.starts_with(prefix))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_accepts_public_https() {
    let url = validate_target("https://example.com/post?id=1").expect("valid");
    assert_eq!(url.host_str(), Some("example.com"));
    assert!(validate_target("https://93.184.216.34/").is_ok());
    assert!(validate_target("https://[2606:2800:220:1::1]/").is_ok());
  }

  #[test]
  fn test_rejects_unparseable() {
    assert!(matches!(
      validate_target("not a url"),
      Err(UrlRejection::Parse(_))
    ));
    assert!(matches!(validate_target(""), Err(UrlRejection::Parse(_))));
  }

  #[test]
  fn test_rejects_other_schemes() {
    for candidate in [
      "http://example.com/",
      "ftp://example.com/",
      "file:///etc/passwd",
      "javascript:alert(1)",
    ] {
      assert!(
        matches!(validate_target(candidate), Err(UrlRejection::Scheme(_))),
        "{candidate} should be rejected for its scheme"
      );
    }
  }

  #[test]
  fn test_rejects_internal_hosts() {
    for candidate in [
      "https://localhost/x",
      "https://LOCALHOST./x",
      "https://127.0.0.1/x",
      "https://127.1.2.3/x",
      "https://0.0.0.0/x",
      "https://10.0.0.1/x",
      "https://172.16.0.1/x",
      "https://172.31.255.255/x",
      "https://192.168.1.1/x",
      "https://169.254.169.254/latest/meta-data",
      "https://[::1]/x",
      "https://[::]/x",
      "https://[fc00::1]/x",
      "https://[FD12:3456::1]/x",
      "https://[fe80::1]/x",
      "https://[febf::1]/x",
      "https://[::ffff:127.0.0.1]/x",
      "https://[::ffff:192.168.0.1]/x",
    ] {
      assert!(
        matches!(
          validate_target(candidate),
          Err(UrlRejection::BlockedHost(_))
        ),
        "{candidate} should be rejected as internal"
      );
    }
  }

  #[test]
  fn test_numeric_host_spellings_are_normalized() {
    // Both parse to 127.0.0.1.
    for candidate in ["https://0x7f.1/", "https://2130706433/"] {
      assert!(matches!(
        validate_target(candidate),
        Err(UrlRejection::BlockedHost(_))
      ));
    }
  }

  #[test]
  fn test_lookalike_domains_are_allowed() {
    for candidate in [
      "https://localhost.example.com/",
      "https://fcbarcelona.com/",
      "https://10.example.com/",
    ] {
      assert!(validate_target(candidate).is_ok(), "{candidate}");
    }
  }
}
