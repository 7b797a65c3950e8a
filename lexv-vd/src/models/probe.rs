//! Outcome of one dictionary round-trip

/// Response class of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// HTTP 200 with a JSON object body
    Ok,
    /// HTTP 404
    NotFound,
    /// HTTP 429 after the client's own backoff was exhausted
    RateLimited,
    /// HTTP 5xx
    ServerError(u16),
    /// Any other non-success HTTP status
    OtherHttpError(u16),
    /// HTTP 200 whose body was not a decodable JSON object
    UnexpectedResponse,
    /// Connection failure, timeout or body read failure
    TransportFailure,
}

impl ProbeStatus {
    /// Classify an HTTP status code that was not handled as a body
    pub fn from_http(code: u16) -> Self {
        match code {
            200 => Self::Ok,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError(code),
            other => Self::OtherHttpError(other),
        }
    }
}

/// Raw result of probing one literal word form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Word form that was queried
    pub word: String,
    pub status: ProbeStatus,
    /// Response carried a non-empty section for the requested locale
    pub has_requested_locale: bool,
    /// Upper-cased, first-seen order
    pub parts_of_speech: Vec<String>,
    pub extracted_tags: Vec<String>,
}

impl ProbeResult {
    /// Probe that completed without a usable locale section
    pub fn status_only(word: impl Into<String>, status: ProbeStatus) -> Self {
        Self {
            word: word.into(),
            status,
            has_requested_locale: false,
            parts_of_speech: Vec::new(),
            extracted_tags: Vec::new(),
        }
    }

    /// Probe that failed below the HTTP layer
    pub fn exception(word: impl Into<String>) -> Self {
        Self::status_only(word, ProbeStatus::TransportFailure)
    }

    /// HTTP 200 with the locale section present
    pub fn found(
        word: impl Into<String>,
        parts_of_speech: Vec<String>,
        extracted_tags: Vec<String>,
    ) -> Self {
        Self {
            word: word.into(),
            status: ProbeStatus::Ok,
            has_requested_locale: true,
            parts_of_speech,
            extracted_tags,
        }
    }

    pub fn raised_exception(&self) -> bool {
        self.status == ProbeStatus::TransportFailure
    }

    /// HTTP 200 without the requested locale section
    pub fn is_wrong_locale(&self) -> bool {
        self.status == ProbeStatus::Ok && !self.has_requested_locale
    }

    pub fn is_validated(&self) -> bool {
        self.status == ProbeStatus::Ok && self.has_requested_locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http() {
        assert_eq!(ProbeStatus::from_http(200), ProbeStatus::Ok);
        assert_eq!(ProbeStatus::from_http(404), ProbeStatus::NotFound);
        assert_eq!(ProbeStatus::from_http(429), ProbeStatus::RateLimited);
        assert_eq!(ProbeStatus::from_http(503), ProbeStatus::ServerError(503));
        assert_eq!(ProbeStatus::from_http(403), ProbeStatus::OtherHttpError(403));
    }

    #[test]
    fn test_probe_predicates() {
        assert!(ProbeResult::exception("x").raised_exception());
        assert!(ProbeResult::status_only("x", ProbeStatus::Ok).is_wrong_locale());
        assert!(ProbeResult::found("x", vec![], vec![]).is_validated());
        assert!(!ProbeResult::status_only("x", ProbeStatus::NotFound).is_wrong_locale());
    }
}
