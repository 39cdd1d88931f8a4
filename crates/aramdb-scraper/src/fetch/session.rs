//! In-process session cookie cache for the direct tier.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, SET_COOKIE};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct CachedCookie {
    value: String,
    expires_at: Instant,
}

/// Session cookie string reused across direct fetches until it expires.
#[derive(Debug)]
pub struct SessionCookies {
    ttl: Duration,
    cached: Mutex<Option<CachedCookie>>,
}

impl SessionCookies {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached cookie, or runs `bootstrap` and caches its result.
    ///
    /// The lock is held across `bootstrap`, so concurrent callers wait for one
    /// bootstrap rather than each issuing their own. A `None` from `bootstrap`
    /// is not cached.
    pub async fn get_or_bootstrap<F, Fut>(&self, bootstrap: F) -> Option<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<String>>,
    {
        let mut cached = self.cached.lock().await;
        if let Some(cookie) = cached.as_ref() {
            if cookie.expires_at > Instant::now() {
                return Some(cookie.value.clone());
            }
            tracing::debug!("session cookie expired");
        }

        let value = bootstrap().await?;
        *cached = Some(CachedCookie {
            value: value.clone(),
            expires_at: Instant::now() + self.ttl,
        });
        Some(value)
    }

    /// Drops the cached cookie so the next fetch bootstraps again.
    pub async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}

/// Joins the `name=value` part of every `Set-Cookie` header into a single
/// `Cookie` header value. Returns `None` when no cookie was set.
pub(crate) fn cookie_header_from(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();

    (!pairs.is_empty()).then(|| pairs.join("; "))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use reqwest::header::HeaderValue;

    use super::*;

    #[tokio::test]
    async fn bootstrap_runs_once_within_ttl() {
        let cookies = SessionCookies::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cookies
                .get_or_bootstrap(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("session=abc".to_owned())
                })
                .await;
            assert_eq!(value.as_deref(), Some("session=abc"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_cookie_bootstraps_again() {
        let cookies = SessionCookies::new(Duration::ZERO);
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            cookies
                .get_or_bootstrap(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("session=abc".to_owned())
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_bootstrap_is_not_cached() {
        let cookies = SessionCookies::new(Duration::from_secs(60));
        assert!(cookies.get_or_bootstrap(|| async { None }).await.is_none());
        let value = cookies
            .get_or_bootstrap(|| async { Some("a=1".to_owned()) })
            .await;
        assert_eq!(value.as_deref(), Some("a=1"));
    }

    #[tokio::test]
    async fn invalidate_forces_new_bootstrap() {
        let cookies = SessionCookies::new(Duration::from_secs(60));
        cookies
            .get_or_bootstrap(|| async { Some("a=1".to_owned()) })
            .await;
        cookies.invalidate().await;
        let value = cookies
            .get_or_bootstrap(|| async { Some("b=2".to_owned()) })
            .await;
        assert_eq!(value.as_deref(), Some("b=2"));
    }

    #[test]
    fn cookie_header_joins_name_value_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("session=abc; Path=/; HttpOnly"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("wikia_beacon=xyz; Secure"));
        assert_eq!(
            cookie_header_from(&headers).as_deref(),
            Some("session=abc; wikia_beacon=xyz")
        );
    }

    #[test]
    fn no_set_cookie_yields_none() {
        assert!(cookie_header_from(&HeaderMap::new()).is_none());
    }
}
