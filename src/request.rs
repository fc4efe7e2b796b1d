//! Per-request values every page handler needs: forwarded credentials,
//! locale and cookie preferences.

use crate::clients::{Auth, COLLECTION_ID_HEADER, FLORENCE_TOKEN_HEADER};
use crate::model::{CookiesPolicy, Page};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use cookie::Cookie;
use serde::Deserialize;
use std::convert::Infallible;

const ACCESS_TOKEN_COOKIE: &str = "access_token";
const COLLECTION_COOKIE: &str = "collection";
const LOCALE_HEADER: &str = "LocaleCode";
const LANG_COOKIE: &str = "lang";
const PREFERENCES_SET_COOKIE: &str = "cookies_preferences_set";
const POLICY_COOKIE: &str = "cookies_policy";

const DEFAULT_LANGUAGE: &str = "en";
const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "cy"];

/// Cookie consent as recorded by the site-wide cookie banner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookiePreferences {
    pub is_preference_set: bool,
    pub policy: CookiesPolicy,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub auth: Auth,
    pub language: String,
    pub cookies: CookiePreferences,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = parse_cookies(headers);
        let cookie = |name: &str| {
            cookies
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        let user_token = header_value(headers, FLORENCE_TOKEN_HEADER)
            .or_else(|| cookie(ACCESS_TOKEN_COOKIE))
            .unwrap_or_default();

        let service_token = header_value(headers, AUTHORIZATION.as_str())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(&v).to_string())
            .unwrap_or_default();

        let collection_id = header_value(headers, COLLECTION_ID_HEADER)
            .or_else(|| cookie(COLLECTION_COOKIE))
            .unwrap_or_default();

        let language = header_value(headers, LOCALE_HEADER)
            .or_else(|| cookie(LANG_COOKIE))
            .filter(|lang| SUPPORTED_LANGUAGES.contains(&lang.as_str()))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let preferences = CookiePreferences {
            is_preference_set: cookie(PREFERENCES_SET_COOKIE).as_deref() == Some("true"),
            policy: cookie(POLICY_COOKIE)
                .and_then(|raw| parse_policy(&raw))
                .unwrap_or_default(),
        };

        Self {
            auth: Auth {
                user_token,
                service_token,
                collection_id,
            },
            language,
            cookies: preferences,
        }
    }

    /// Copy language and cookie preferences onto a page model.
    pub fn apply_to(&self, page: &mut Page) {
        page.language = self.language.clone();
        page.cookies_preferences_set = self.cookies.is_preference_set;
        page.cookies_policy = self.cookies.policy.clone();
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext::from_headers(&parts.headers))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// All cookies across every `Cookie` header, in order, with values
/// percent-decoded. Pairs that do not parse are skipped.
fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse_encoded(v))
        .filter_map(|parsed| match parsed {
            Ok(cookie) => Some((cookie.name().to_string(), cookie.value_trimmed().to_string())),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed cookie");
                None
            }
        })
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

#[derive(Deserialize)]
struct PolicyCookie {
    essential: bool,
    usage: bool,
}

fn parse_policy(raw: &str) -> Option<CookiesPolicy> {
    match serde_json::from_str::<PolicyCookie>(raw) {
        Ok(policy) => Some(CookiesPolicy {
            essential: policy.essential,
            usage: policy.usage,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed cookies_policy cookie");
            None
        }
    }
}
