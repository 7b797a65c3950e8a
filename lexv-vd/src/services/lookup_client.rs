//! Dictionary lookup client
//!
//! One probe is one `GET {base_url}{word}` against the definition endpoint.
//! Every failure mode is folded into a [`ProbeResult`]; nothing a single
//! probe does can fail the pass.
//!
//! HTTP 429 is retried inside the probe with exponential backoff (or the
//! server's `Retry-After`), up to a configured number of attempts. An
//! optional global rate limiter paces all workers.

use crate::models::{ProbeResult, ProbeStatus};
use crate::services::tag_extractor::{DefinitionHeuristics, LexicalEntry, TagExtractor};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use lexv_common::config::ValidatorSection;
use lexv_common::terms::capitalize;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Lookup client errors
///
/// Internal to the client; each maps onto a `ProbeStatus`.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded after {0} attempts")]
    RateLimitExceeded(u32),

    #[error("API error {0}")]
    ApiError(u16),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<&LookupError> for ProbeStatus {
    fn from(err: &LookupError) -> Self {
        match err {
            LookupError::NetworkError(_) => ProbeStatus::TransportFailure,
            LookupError::NotFound(_) => ProbeStatus::NotFound,
            LookupError::RateLimitExceeded(_) => ProbeStatus::RateLimited,
            LookupError::ApiError(code) => ProbeStatus::from_http(*code),
            LookupError::UnexpectedResponse(_) => ProbeStatus::UnexpectedResponse,
        }
    }
}

/// Source of probe results for a word in a locale
#[async_trait]
pub trait LexicalLookup: Send + Sync {
    /// Query one literal word form
    async fn probe(&self, word: &str, locale: &str) -> ProbeResult;

    /// Probe the word, then in dual mode its capitalised variant
    ///
    /// Results are returned untouched, non-capitalised first. The variant is
    /// skipped when capitalisation does not change the word.
    async fn probe_task(&self, word: &str, locale: &str, dual_probe: bool) -> Vec<ProbeResult> {
        let mut probes = vec![self.probe(word, locale).await];
        if dual_probe {
            let capitalized = capitalize(word);
            if capitalized != word {
                probes.push(self.probe(&capitalized, locale).await);
            }
        }
        probes
    }
}

/// Connection and retry settings for [`DictionaryClient`]
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// 0 disables global pacing
    pub requests_per_second: u32,
    pub rate_limit_max_retries: u32,
    pub rate_limit_base_delay: Duration,
    pub rate_limit_max_delay: Duration,
}

impl From<&ValidatorSection> for LookupSettings {
    fn from(section: &ValidatorSection) -> Self {
        Self {
            base_url: section.base_url.clone(),
            user_agent: section.user_agent.clone(),
            connect_timeout: Duration::from_secs(section.connect_timeout_secs),
            request_timeout: Duration::from_secs(section.request_timeout_secs),
            requests_per_second: section.requests_per_second,
            rate_limit_max_retries: section.rate_limit_max_retries,
            rate_limit_base_delay: Duration::from_millis(section.rate_limit_base_delay_ms),
            rate_limit_max_delay: Duration::from_millis(section.rate_limit_max_delay_ms),
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self::from(&ValidatorSection::default())
    }
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client for the REST definition endpoint
pub struct DictionaryClient {
    http_client: reqwest::Client,
    rate_limiter: Option<Arc<DirectLimiter>>,
    extractor: Arc<dyn TagExtractor>,
    settings: LookupSettings,
}

impl DictionaryClient {
    pub fn new(settings: LookupSettings) -> Result<Self, LookupError> {
        Self::with_extractor(settings, Arc::new(DefinitionHeuristics::default()))
    }

    pub fn with_extractor(
        settings: LookupSettings,
        extractor: Arc<dyn TagExtractor>,
    ) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let rate_limiter = NonZeroU32::new(settings.requests_per_second)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self {
            http_client,
            rate_limiter,
            extractor,
            settings,
        })
    }

    fn url_for(&self, word: &str) -> String {
        format!("{}{}", self.settings.base_url, url_title(word))
    }

    /// Delay before re-attempting after a 429
    ///
    /// A server-supplied delay is honoured up to `rate_limit_max_delay`.
    fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(delay) = retry_after {
            return delay.min(self.settings.rate_limit_max_delay);
        }
        let base = self.settings.rate_limit_base_delay.as_secs_f64();
        let exp = base * 2f64.powi(attempt.min(30) as i32);
        let capped = exp.min(self.settings.rate_limit_max_delay.as_secs_f64());
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_secs_f64(capped * jitter)
    }

    /// Fetch and decode one page, retrying on 429
    async fn fetch(&self, word: &str) -> Result<serde_json::Value, LookupError> {
        let url = self.url_for(word);
        let mut attempt: u32 = 0;

        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }

            let response = self
                .http_client
                .get(&url)
                .send()
                .await
                .map_err(|e| LookupError::NetworkError(e.to_string()))?;

            let status = response.status().as_u16();
            debug!(word = %word, url = %url, status, attempt, "Dictionary response");

            match status {
                200 => {
                    let bytes = response
                        .bytes()
                        .await
                        .map_err(|e| LookupError::NetworkError(e.to_string()))?;
                    return serde_json::from_slice(&bytes)
                        .map_err(|e| LookupError::UnexpectedResponse(e.to_string()));
                }
                404 => return Err(LookupError::NotFound(word.to_string())),
                429 => {
                    if attempt >= self.settings.rate_limit_max_retries {
                        return Err(LookupError::RateLimitExceeded(attempt + 1));
                    }
                    let retry_after = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<f64>().ok())
                        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
                    let delay = self.backoff_delay(attempt, retry_after);
                    debug!(word = %word, ?delay, "Rate limited, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return Err(LookupError::ApiError(other)),
            }
        }
    }

    /// Interpret a decoded 200 body for `locale`
    fn interpret(&self, word: &str, locale: &str, body: serde_json::Value) -> ProbeResult {
        let serde_json::Value::Object(mut page) = body else {
            return ProbeResult::status_only(word, ProbeStatus::UnexpectedResponse);
        };

        debug!(
            word = %word,
            keys = ?page.keys().take(40).collect::<Vec<_>>(),
            "Definition page sections"
        );

        let section = match page.remove(locale) {
            Some(serde_json::Value::Array(entries)) if !entries.is_empty() => entries,
            _ => return ProbeResult::status_only(word, ProbeStatus::Ok),
        };

        // An entry that does not decode is skipped, the rest still count
        let entries: Vec<LexicalEntry> = section
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(word = %word, error = %e, "Skipping undecodable locale entry");
                    None
                }
            })
            .collect();

        let parts_of_speech = self.extractor.parts_of_speech(&entries);
        let tags = self.extractor.tags(&parts_of_speech, &entries);
        ProbeResult::found(word, parts_of_speech, tags)
    }
}

#[async_trait]
impl LexicalLookup for DictionaryClient {
    async fn probe(&self, word: &str, locale: &str) -> ProbeResult {
        match self.fetch(word).await {
            Ok(body) => self.interpret(word, locale, body),
            Err(e) => {
                debug!(word = %word, error = %e, "Probe did not validate");
                ProbeResult::status_only(word, ProbeStatus::from(&e))
            }
        }
    }
}

static PERCENT_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[0-9A-Fa-f]{2}").expect("static regex"));

/// Encode `word` as one URL path segment
///
/// A word in which every `%` already starts a valid `%HH` escape is taken as
/// encoded and returned unchanged.
pub fn url_title(word: &str) -> String {
    if word.contains('%') {
        let escaped_percents = PERCENT_ESCAPE.find_iter(word).count();
        let percents = word.matches('%').count();
        if escaped_percents > 0 && escaped_percents == percents {
            return word.to_string();
        }
    }
    urlencoding::encode(word).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_title_encodes_segment() {
        assert_eq!(url_title("run"), "run");
        assert_eq!(url_title("a/b c"), "a%2Fb%20c");
        assert_eq!(url_title("été"), "%C3%A9t%C3%A9");
    }

    #[test]
    fn test_url_title_no_double_encoding() {
        assert_eq!(url_title("%C3%A9t%C3%A9"), "%C3%A9t%C3%A9");
        assert_eq!(url_title("100%"), "100%25");
        assert_eq!(url_title("%41%"), "%2541%25");
    }

    #[test]
    fn test_lookup_error_to_status() {
        assert_eq!(
            ProbeStatus::from(&LookupError::NetworkError("timeout".into())),
            ProbeStatus::TransportFailure
        );
        assert_eq!(
            ProbeStatus::from(&LookupError::ApiError(502)),
            ProbeStatus::ServerError(502)
        );
        assert_eq!(
            ProbeStatus::from(&LookupError::RateLimitExceeded(7)),
            ProbeStatus::RateLimited
        );
    }

    #[test]
    fn test_backoff_prefers_retry_after() {
        let client = DictionaryClient::new(LookupSettings::default()).unwrap();
        assert_eq!(
            client.backoff_delay(3, Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_retry_after_capped_at_max_delay() {
        let client = DictionaryClient::new(LookupSettings::default()).unwrap();
        assert_eq!(
            client.backoff_delay(0, Some(Duration::from_secs(3600))),
            Duration::from_secs(20)
        );
    }

    #[test]
    fn test_backoff_is_capped_and_jittered() {
        let client = DictionaryClient::new(LookupSettings::default()).unwrap();
        let first = client.backoff_delay(0, None).as_secs_f64();
        assert!((0.6..0.9).contains(&first), "first delay {}", first);

        let late = client.backoff_delay(20, None).as_secs_f64();
        assert!(late <= 20.0 * 1.2 && late >= 20.0 * 0.8, "late delay {}", late);
    }

    #[test]
    fn test_interpret_wrong_locale_and_non_object() {
        let client = DictionaryClient::new(LookupSettings::default()).unwrap();

        let wrong = client.interpret("run", "fr", serde_json::json!({"en": [{"partOfSpeech": "Verb"}]}));
        assert!(wrong.is_wrong_locale());

        let empty = client.interpret("run", "en", serde_json::json!({"en": []}));
        assert!(empty.is_wrong_locale());

        let list = client.interpret("run", "en", serde_json::json!(["en"]));
        assert_eq!(list.status, ProbeStatus::UnexpectedResponse);
    }

    #[test]
    fn test_interpret_undecodable_section_still_validates() {
        let client = DictionaryClient::new(LookupSettings::default()).unwrap();
        let probe = client.interpret("run", "en", serde_json::json!({"en": [42, "x"]}));
        assert!(probe.is_validated());
        assert!(probe.parts_of_speech.is_empty());
        assert!(probe.extracted_tags.is_empty());
    }

    #[test]
    fn test_interpret_skips_only_bad_entries() {
        let client = DictionaryClient::new(LookupSettings::default()).unwrap();
        let probe = client.interpret(
            "run",
            "en",
            serde_json::json!({"en": [
                {"partOfSpeech": 7},
                {"partOfSpeech": "Noun", "definitions": [{"definition": "An act of running.", "examples": null}]},
                {"partOfSpeech": "Verb", "definitions": [{"definition": "To move swiftly."}]}
            ]}),
        );
        assert!(probe.is_validated());
        assert_eq!(probe.parts_of_speech, vec!["NOUN", "VERB"]);
        assert_eq!(probe.extracted_tags, vec!["SINGULAR"]);
    }
}
