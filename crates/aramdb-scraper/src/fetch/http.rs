//! Request plumbing shared by the direct and relay tiers.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;

use crate::error::TierError;

/// Header set a desktop browser sends for a top-level navigation.
pub(crate) fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(header::USER_AGENT, value);
    }
    headers
}

/// GETs `url` with browser headers and returns the body if it is usable.
///
/// Non-2xx, empty bodies and bot-challenge pages are tier errors.
pub(crate) async fn get_page(
    client: &Client,
    url: &str,
    user_agent: &str,
    cookie: Option<&str>,
    referer: Option<&str>,
) -> Result<String, TierError> {
    let mut request = client.get(url).headers(browser_headers(user_agent));
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    if let Some(referer) = referer {
        request = request.header(header::REFERER, referer);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TierError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    let body = response.text().await?;
    check_body(url, body)
}

pub(crate) fn check_body(url: &str, body: String) -> Result<String, TierError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(TierError::EmptyBody {
            url: url.to_owned(),
        });
    }
    if !contains_data_hint(trimmed) && looks_like_bot_challenge(trimmed) {
        return Err(TierError::Challenge {
            url: url.to_owned(),
        });
    }
    Ok(body)
}

pub(crate) fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    let has_cloudflare_banner = lowered.contains("attention required! | cloudflare");
    let has_challenge_platform = lowered.contains("/cdn-cgi/challenge-platform/");
    let has_just_a_moment = lowered.contains("just a moment...");
    let has_cookie_gate = lowered.contains("please enable cookies");
    let has_cf_chl = lowered.contains("cf-chl-");
    let has_captcha = lowered.contains("captcha-delivery.com") || lowered.contains("g-recaptcha");

    has_cloudflare_banner
        || has_challenge_platform
        || has_captcha
        || (has_just_a_moment && has_cookie_gate)
        || (has_just_a_moment && has_cf_chl)
}

/// The edit page for the data module always carries the edit textarea.
fn contains_data_hint(body: &str) -> bool {
    body.contains("wpTextbox1") || body.contains("Module:ChampionData")
}
