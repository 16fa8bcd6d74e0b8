//! URL and e-mail validation, including the SSRF guard for callback URLs.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use url::{Host, Url};

use crate::domain::ValidationError;

/// Hostnames rejected before any DNS lookup.
const BLOCKED_HOSTNAMES: &[&str] = &["localhost", "localhost.localdomain"];

/// Loopback, private, link-local (cloud metadata) and "this network" ranges.
const PRIVATE_IPV4_RANGES: &[(Ipv4Addr, Ipv4Addr)] = &[
    (Ipv4Addr::new(127, 0, 0, 0), Ipv4Addr::new(127, 255, 255, 255)),
    (Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 255, 255, 255)),
    (Ipv4Addr::new(172, 16, 0, 0), Ipv4Addr::new(172, 31, 255, 255)),
    (Ipv4Addr::new(192, 168, 0, 0), Ipv4Addr::new(192, 168, 255, 255)),
    (Ipv4Addr::new(169, 254, 0, 0), Ipv4Addr::new(169, 254, 255, 255)),
    (Ipv4Addr::new(0, 0, 0, 0), Ipv4Addr::new(0, 255, 255, 255)),
];

/// Default upper bound on a single DNS lookup.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(500);

/// Upper bound on lookup threads alive at once, including abandoned ones.
pub const MAX_PENDING_LOOKUPS: usize = 16;

static PENDING_LOOKUPS: AtomicUsize = AtomicUsize::new(0);

/// Counts one lookup thread against a shared limit until dropped.
struct LookupSlot {
    pending: &'static AtomicUsize,
}

impl LookupSlot {
    fn acquire(pending: &'static AtomicUsize, limit: usize) -> Option<Self> {
        pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < limit).then_some(count + 1)
            })
            .ok()
            .map(|_| Self { pending })
    }
}

impl Drop for LookupSlot {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Parse `url` and require an absolute `http`/`https` URL.
pub fn validate_url(url: &str, field: &'static str) -> Result<Url, ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let parsed = Url::parse(url).map_err(|_| ValidationError::InvalidUrl {
        field,
        url: url.to_owned(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme {
            field,
            url: url.to_owned(),
        });
    }

    Ok(parsed)
}

/// Non-failing form of [`validate_url`].
pub fn is_valid_url(url: &str) -> bool {
    validate_url(url, "url").is_ok()
}

/// Validate an e-mail address: one `@`, a non-empty local part and a dotted domain.
pub fn validate_email(email: &str, field: &'static str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            field,
            email: email.to_owned(),
        })
    }
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels = domain.split('.').collect::<Vec<_>>();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Resolves a hostname to one address for the SSRF check.
///
/// `None` means "could not resolve"; the guard treats that as safe.
pub trait HostResolver: Send + Sync {
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// Resolver backed by the system resolver, bounded by a timeout.
///
/// The lookup runs on a helper thread; a lookup that outlives the timeout is
/// abandoned and reported as unresolved. An abandoned thread lives until the
/// OS resolver returns, so at most [`MAX_PENDING_LOOKUPS`] threads exist at
/// once; past that, lookups are skipped and reported as unresolved.
#[derive(Debug, Clone, Copy)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HostResolver for SystemResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        let Some(slot) = LookupSlot::acquire(&PENDING_LOOKUPS, MAX_PENDING_LOOKUPS) else {
            tracing::warn!(host, "too many pending callback host lookups; skipping");
            return None;
        };

        let (tx, rx) = mpsc::channel();
        let owned = host.to_owned();
        thread::spawn(move || {
            let _slot = slot;
            let addrs = (owned.as_str(), 0)
                .to_socket_addrs()
                .map(|addrs| addrs.map(|addr| addr.ip()).collect::<Vec<_>>());
            // The receiver may already have timed out.
            let _ = tx.send(addrs);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(addrs)) => {
                let picked = addrs
                    .iter()
                    .find(|ip| ip.is_ipv4())
                    .or_else(|| addrs.first())
                    .copied();
                tracing::debug!(host, resolved = ?picked, "resolved callback host");
                picked
            }
            Ok(Err(err)) => {
                tracing::debug!(host, error = %err, "callback host did not resolve");
                None
            }
            Err(_) => {
                tracing::debug!(host, timeout = ?self.timeout, "callback host lookup timed out");
                None
            }
        }
    }
}

/// SSRF guard for callback URLs.
///
/// Rejects URLs that are not http(s), that name `localhost`, or whose host is
/// (or resolves to) a loopback, private, link-local or "this network" IPv4
/// address. IPv6 hosts other than `::1` are accepted. Hosts that cannot be
/// resolved are accepted.
#[derive(Debug, Clone, Default)]
pub struct UrlSafetyChecker<R = SystemResolver> {
    resolver: R,
}

impl UrlSafetyChecker<SystemResolver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: HostResolver> UrlSafetyChecker<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }

    /// Whether `url` is a well-formed http(s) URL that does not target an internal host.
    pub fn is_safe(&self, url: &str) -> bool {
        let Ok(parsed) = validate_url(url, "callback_url") else {
            return false;
        };
        self.is_safe_url(&parsed)
    }

    /// Validate `url`, returning `FIELD_EMPTY`, `FIELD_INVALID` or `FIELD_UNSAFE` errors.
    pub fn validate(&self, url: &str, field: &'static str) -> Result<Url, ValidationError> {
        let parsed = validate_url(url, field)?;
        if !self.is_safe_url(&parsed) {
            tracing::warn!(field, url, "rejected callback url pointing at an internal host");
            return Err(ValidationError::UnsafeUrl {
                field,
                url: url.to_owned(),
            });
        }
        Ok(parsed)
    }

    fn is_safe_url(&self, url: &Url) -> bool {
        let ip = match url.host() {
            None => return false,
            Some(Host::Domain(domain)) => {
                let domain = domain.to_ascii_lowercase();
                if domain.is_empty()
                    || BLOCKED_HOSTNAMES.contains(&domain.as_str())
                    || domain == "::1"
                    || domain == "[::1]"
                {
                    return false;
                }
                match self.resolver.resolve(&domain) {
                    Some(ip) => ip,
                    None => return true,
                }
            }
            Some(Host::Ipv4(ip)) => IpAddr::V4(ip),
            Some(Host::Ipv6(ip)) => IpAddr::V6(ip),
        };
        !is_private_ip(ip)
    }
}

/// Whether `ip` falls in a blocked range. Only `::1` is blocked for IPv6.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V6(ip) => ip == Ipv6Addr::LOCALHOST,
        IpAddr::V4(ip) => {
            let value = u32::from(ip);
            PRIVATE_IPV4_RANGES
                .iter()
                .any(|(start, end)| (u32::from(*start)..=u32::from(*end)).contains(&value))
        }
    }
}

/// [`UrlSafetyChecker::is_safe`] with the system resolver.
pub fn is_callback_url_safe(url: &str) -> bool {
    UrlSafetyChecker::new().is_safe(url)
}

/// [`UrlSafetyChecker::validate`] with the system resolver.
pub fn validate_callback_url(url: &str, field: &'static str) -> Result<Url, ValidationError> {
    UrlSafetyChecker::new().validate(url, field)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::ValidationKind;

    #[derive(Debug, Default)]
    struct FakeResolver {
        answers: HashMap<String, IpAddr>,
        lookups: Mutex<Vec<String>>,
    }

    impl FakeResolver {
        fn with(host: &str, ip: IpAddr) -> Self {
            let mut answers = HashMap::new();
            answers.insert(host.to_owned(), ip);
            Self {
                answers,
                lookups: Mutex::new(Vec::new()),
            }
        }

        fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }
    }

    impl HostResolver for FakeResolver {
        fn resolve(&self, host: &str) -> Option<IpAddr> {
            self.lookups.lock().unwrap().push(host.to_owned());
            self.answers.get(host).copied()
        }
    }

    fn checker() -> UrlSafetyChecker<FakeResolver> {
        UrlSafetyChecker::with_resolver(FakeResolver::with(
            "example.com",
            IpAddr::from([93, 184, 216, 34]),
        ))
    }

    #[test]
    fn validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com/webhook", "url").is_ok());
        assert!(validate_url("http://example.com:8080/webhook?token=abc", "url").is_ok());
    }

    #[test]
    fn validate_url_error_kinds() {
        let err = validate_url("", "dlr_callback").unwrap_err();
        assert_eq!(err.kind(), ValidationKind::FieldEmpty);

        let err = validate_url("not-a-url", "dlr_callback").unwrap_err();
        assert_eq!(err.kind(), ValidationKind::FieldInvalid);
        assert!(err.to_string().contains("dlr_callback"));

        for url in ["ftp://example.com/file", "file:///etc/passwd", "mailto:test@example.com"] {
            let err = validate_url(url, "url").unwrap_err();
            assert!(matches!(err, ValidationError::UnsupportedScheme { .. }), "{url}");
        }
        assert!(!is_valid_url("ftp://example.com"));
        assert!(is_valid_url("https://example.com"));
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("test+tag@mail.example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("test@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("test@localhost"));

        assert_eq!(
            validate_email("", "replies_to_email").unwrap_err().code(),
            "FIELD_EMPTY"
        );
        let err = validate_email("invalid", "replies_to_email").unwrap_err();
        assert!(err.to_string().contains("replies_to_email"));
    }

    #[test]
    fn blocks_localhost_and_loopback_literals() {
        let checker = checker();
        assert!(!checker.is_safe("http://localhost/x"));
        assert!(!checker.is_safe("http://LOCALHOST/x"));
        assert!(!checker.is_safe("http://localhost.localdomain/x"));
        assert!(!checker.is_safe("http://127.0.0.1/x"));
        assert!(!checker.is_safe("http://[::1]/x"));
        assert!(checker.resolver.lookups().is_empty());
    }

    #[test]
    fn blocks_private_ipv4_ranges() {
        let checker = checker();
        for url in [
            "http://10.0.0.5/x",
            "http://172.16.0.1/x",
            "http://172.31.255.255/x",
            "http://192.168.1.1/x",
            "http://169.254.169.254/x",
            "http://0.0.0.0/x",
        ] {
            assert!(!checker.is_safe(url), "{url}");
        }
        assert!(checker.is_safe("http://172.32.0.1/x"));
        assert!(checker.is_safe("http://8.8.8.8/x"));
    }

    #[test]
    fn accepts_public_hosts() {
        let checker = checker();
        assert!(checker.is_safe("https://example.com/x"));
        assert_eq!(checker.resolver.lookups(), vec!["example.com"]);
    }

    #[test]
    fn hostnames_resolving_to_private_addresses_are_blocked() {
        let checker = UrlSafetyChecker::with_resolver(FakeResolver::with(
            "metadata.internal",
            IpAddr::from([169, 254, 169, 254]),
        ));
        assert!(!checker.is_safe("http://metadata.internal/latest"));
    }

    #[test]
    fn unresolvable_hosts_fail_open() {
        let checker = UrlSafetyChecker::with_resolver(FakeResolver::default());
        assert!(checker.is_safe("https://does-not-resolve.invalid/x"));
    }

    #[test]
    fn ipv6_outside_loopback_is_accepted() {
        let checker = checker();
        assert!(checker.is_safe("http://[2001:db8::1]/x"));
    }

    #[test]
    fn validate_reports_unsafe_kind() {
        let checker = checker();
        let err = checker
            .validate("http://192.168.0.10/hook", "callback_url")
            .unwrap_err();
        assert_eq!(err.kind(), ValidationKind::FieldUnsafe);

        let err = checker.validate("not-a-url", "callback_url").unwrap_err();
        assert_eq!(err.kind(), ValidationKind::FieldInvalid);

        assert!(checker.validate("https://example.com/hook", "callback_url").is_ok());
    }

    #[test]
    fn private_ip_ranges_use_inclusive_bounds() {
        assert!(is_private_ip(IpAddr::from([127, 255, 255, 255])));
        assert!(is_private_ip(IpAddr::from([172, 16, 0, 0])));
        assert!(!is_private_ip(IpAddr::from([172, 15, 255, 255])));
        assert!(!is_private_ip(IpAddr::from([1, 0, 0, 0])));
        assert!(is_private_ip(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[test]
    fn lookup_slots_are_capped_and_released() {
        static PENDING: AtomicUsize = AtomicUsize::new(0);

        let first = LookupSlot::acquire(&PENDING, 2).unwrap();
        let second = LookupSlot::acquire(&PENDING, 2).unwrap();
        assert!(LookupSlot::acquire(&PENDING, 2).is_none());
        assert_eq!(PENDING.load(Ordering::Acquire), 2);

        drop(first);
        let third = LookupSlot::acquire(&PENDING, 2);
        assert!(third.is_some());

        drop(second);
        drop(third);
        assert_eq!(PENDING.load(Ordering::Acquire), 0);
    }

    #[test]
    fn system_resolver_answers_ip_literals_without_dns() {
        let resolver = SystemResolver::with_timeout(Duration::from_secs(2));
        assert_eq!(
            resolver.resolve("127.0.0.1"),
            Some(IpAddr::from([127, 0, 0, 1]))
        );
    }
}
