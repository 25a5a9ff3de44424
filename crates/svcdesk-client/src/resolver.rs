//! # Endpoint Resolver
//!
//! The same logical resource (current profile, current contract, a status
//! dictionary, "delete my account") lives at different paths on different
//! backend deployments. A resolution tries an ordered list of candidate
//! requests and accepts the first structurally valid success.
//!
//! ## Contract
//!
//! - Candidates are tried strictly in order, one at a time. The next
//!   candidate is only sent once the previous outcome is known, so a
//!   destructive resolution never has two requests in flight.
//! - A candidate succeeds on any 2xx status (204 with an empty body
//!   included). An empty or unparseable body reads as `{}`.
//! - The first success wins; later candidates are never contacted.
//! - A failed candidate is never retried within the same resolution, and
//!   nothing is remembered across resolutions.
//! - If every candidate fails, the error carries the diagnostic of the last
//!   one: its JSON `message`, or `HTTP <status> <url>`, or the transport error.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;

use crate::error::ServiceDeskError;
use crate::fields::Envelope;

/// HTTP method of a candidate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

/// One attempt at a logical resource.
#[derive(Debug, Clone)]
pub struct CandidateRequest {
    pub url: String,
    pub method: HttpMethod,
    /// Headers sent in addition to `Accept` and `Authorization`.
    pub headers: HeaderMap,
    /// JSON body, sent only with POST.
    pub body: Option<Value>,
}

impl CandidateRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add an extra header. Parse untrusted names with
    /// `HeaderName::from_bytes` first.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Result of probing one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Success { body: Value, status: u16 },
    Failure { reason: String, status: Option<u16> },
}

/// Diagnostic for one failed candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub url: String,
    pub status: Option<u16>,
    pub reason: String,
}

/// Every candidate of a resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeExhausted {
    pub attempts: usize,
    /// `None` only when the candidate list was empty.
    pub last: Option<CandidateFailure>,
}

impl ProbeExhausted {
    pub fn into_error(self, resource: &str) -> ServiceDeskError {
        let message = match self.last {
            Some(failure) => failure.reason,
            None => format!("no candidate endpoints for {resource}"),
        };
        ServiceDeskError::ResolutionExhausted {
            resource: resource.to_string(),
            attempts: self.attempts,
            message,
        }
    }
}

/// Evaluate `attempt` over `candidates` in order, stopping at the first
/// success.
///
/// This is the priority-ordered strategy list underneath every resolution;
/// it knows nothing about HTTP.
pub async fn probe_in_order<'a, D, T, F, Fut>(
    candidates: &'a [D],
    mut attempt: F,
) -> Result<T, ProbeExhausted>
where
    F: FnMut(&'a D) -> Fut,
    Fut: Future<Output = Result<T, CandidateFailure>>,
{
    let mut last = None;
    for (i, candidate) in candidates.iter().enumerate() {
        match attempt(candidate).await {
            Ok(value) => return Ok(value),
            Err(failure) => {
                tracing::debug!(
                    attempt = i + 1,
                    of = candidates.len(),
                    url = %failure.url,
                    status = ?failure.status,
                    "candidate failed: {}",
                    failure.reason
                );
                last = Some(failure);
            }
        }
    }
    Err(ProbeExhausted {
        attempts: candidates.len(),
        last,
    })
}

/// Sends candidate requests and resolves logical resources over them.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    http: reqwest::Client,
}

impl EndpointResolver {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Issue one candidate request and classify the response.
    pub async fn probe(&self, request: &CandidateRequest, token: Option<&str>) -> ResolutionOutcome {
        let mut builder = self
            .http
            .request(request.method.as_reqwest(), &request.url)
            .headers(request.headers.clone())
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let (HttpMethod::Post, Some(body)) = (request.method, &request.body) {
            builder = builder.json(body);
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                return ResolutionOutcome::Failure {
                    reason: e.to_string(),
                    status: None,
                }
            }
        };

        let status = resp.status();
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                return ResolutionOutcome::Failure {
                    reason: e.to_string(),
                    status: Some(status.as_u16()),
                }
            }
        };
        let body = parse_lenient(&text, &request.url, status.is_success());

        if status.is_success() {
            ResolutionOutcome::Success {
                body,
                status: status.as_u16(),
            }
        } else {
            let reason = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {} {}", status.as_u16(), request.url));
            ResolutionOutcome::Failure {
                reason,
                status: Some(status.as_u16()),
            }
        }
    }

    /// Resolve `resource` over `candidates`, returning the payload of the
    /// first success as located by `envelope`.
    pub async fn resolve(
        &self,
        resource: &str,
        candidates: &[CandidateRequest],
        token: Option<&str>,
        envelope: Envelope,
    ) -> Result<Value, ServiceDeskError> {
        self.resolve_with(resource, candidates, token, |body| Some(envelope.extract(body)))
            .await
    }

    /// Resolve `resource` over `candidates`. A 2xx response only counts as a
    /// success when `accept` recognises its body.
    pub async fn resolve_with<T, A>(
        &self,
        resource: &str,
        candidates: &[CandidateRequest],
        token: Option<&str>,
        accept: A,
    ) -> Result<T, ServiceDeskError>
    where
        A: Fn(&Value) -> Option<T>,
    {
        let accept = &accept;
        let result = probe_in_order(candidates, |candidate| async move {
            match self.probe(candidate, token).await {
                ResolutionOutcome::Success { body, status } => match accept(&body) {
                    Some(value) => {
                        tracing::debug!(%resource, url = %candidate.url, status, "resolved");
                        Ok(value)
                    }
                    None => Err(CandidateFailure {
                        url: candidate.url.clone(),
                        status: Some(status),
                        reason: format!("unrecognised payload from {}", candidate.url),
                    }),
                },
                ResolutionOutcome::Failure { reason, status } => Err(CandidateFailure {
                    url: candidate.url.clone(),
                    status,
                    reason,
                }),
            }
        })
        .await;

        result.map_err(|exhausted| {
            tracing::warn!(
                %resource,
                attempts = exhausted.attempts,
                "all candidate endpoints failed"
            );
            exhausted.into_error(resource)
        })
    }
}

/// Parse a body as JSON, reading empty or malformed text as `{}`.
fn parse_lenient(text: &str, url: &str, success: bool) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            if success {
                tracing::warn!(%url, "2xx response body is not JSON, treating as empty: {e}");
            }
            Value::Object(Default::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fail(url: &str, reason: &str) -> CandidateFailure {
        CandidateFailure {
            url: url.into(),
            status: Some(404),
            reason: reason.into(),
        }
    }

    #[tokio::test]
    async fn probe_in_order_stops_at_first_success() {
        let seen = parking_lot::Mutex::new(Vec::new());
        let candidates = ["a", "b", "c"];
        let result = probe_in_order(&candidates, |c| {
            seen.lock().push(*c);
            async move {
                if *c == "b" {
                    Ok(c.to_uppercase())
                } else {
                    Err(fail(c, "nope"))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "B");
        assert_eq!(*seen.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn probe_in_order_reports_last_failure() {
        let calls = AtomicUsize::new(0);
        let candidates = ["a", "b"];
        let result: Result<(), _> = probe_in_order(&candidates, |c| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(fail(c, &format!("failed {c}"))) }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(exhausted.attempts, 2);
        assert_eq!(exhausted.last.unwrap().reason, "failed b");
    }

    #[tokio::test]
    async fn empty_candidate_list_is_exhausted() {
        let candidates: [&str; 0] = [];
        let result: Result<(), _> =
            probe_in_order(&candidates, |c| async move { Err(fail(c, "")) }).await;
        let err = result.unwrap_err().into_error("profile");
        assert_eq!(err.to_string(), "no candidate endpoints for profile");
    }

    #[test]
    fn extra_headers_replace_same_name() {
        let name = HeaderName::from_static("x-client-platform");
        let request = CandidateRequest::get("http://x")
            .with_header(name.clone(), HeaderValue::from_static("cli"))
            .with_header(name.clone(), HeaderValue::from_static("web"));
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers[&name], "web");
        assert!(HeaderName::from_bytes(b"X Bad Name").is_err());
    }

    #[test]
    fn lenient_parse_reads_garbage_as_empty_object() {
        assert_eq!(parse_lenient("", "u", true), serde_json::json!({}));
        assert_eq!(parse_lenient("<html>", "u", true), serde_json::json!({}));
        assert_eq!(parse_lenient("[1]", "u", true), serde_json::json!([1]));
    }
}
