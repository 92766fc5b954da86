#![forbid(unsafe_code)]

//! Host service seams: clipboard, flash endpoint, health probe.
//!
//! These are the capability boundaries of §-boundary collaborators: the
//! browser clipboard and two small server endpoints. Each is a trait so
//! tests inject deterministic fakes; the fakes are exported alongside
//! the traits, the same way the in-memory storage backend is.

use std::collections::VecDeque;
use std::fmt;

use chatkit_dom::StreamMessage;

// ─────────────────────────────────────────────────────────────────────
// Clipboard
// ─────────────────────────────────────────────────────────────────────

/// Why a clipboard write failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The host denied the write (permissions, no user gesture).
    Denied(String),
    /// No clipboard available at all.
    Unavailable,
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied(reason) => write!(f, "clipboard write denied: {reason}"),
            Self::Unavailable => write!(f, "clipboard unavailable"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Write-only clipboard access.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Records writes; optionally fails every write with a fixed reason.
#[derive(Debug, Default)]
pub struct FakeClipboard {
    pub written: Vec<String>,
    pub deny_with: Option<String>,
}

impl FakeClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn denying(reason: &str) -> Self {
        Self {
            written: Vec::new(),
            deny_with: Some(reason.to_string()),
        }
    }
}

impl Clipboard for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if let Some(reason) = &self.deny_with {
            return Err(ClipboardError::Denied(reason.clone()));
        }
        self.written.push(text.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Flash endpoint
// ─────────────────────────────────────────────────────────────────────

/// Flash notification category, mirroring the server's flash keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Alert,
    Notice,
    Warning,
}

impl FlashKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Alert => "alert",
            Self::Notice => "notice",
            Self::Warning => "warning",
        }
    }
}

/// Body of a flash-relay POST: `{"flash":{"<kind>":"<message>"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashPayload {
    pub kind: FlashKind,
    pub message: String,
}

impl FlashPayload {
    #[must_use]
    pub fn new(kind: FlashKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    /// Wire encoding of the request body.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::json!({ "flash": { self.kind.as_str(): self.message } }).to_string()
    }
}

/// Why a flash-relay POST failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashError {
    /// Non-success HTTP status.
    Http(u16),
    /// The request never reached the server.
    Transport(String),
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(status) => write!(f, "HTTP error! Status: {status}"),
            Self::Transport(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for FlashError {}

/// The flash-relay POST endpoint.
///
/// A successful response is a fragment-replacement message for the
/// shared notification container.
pub trait FlashEndpoint {
    fn post(&mut self, token: &str, payload: &FlashPayload) -> Result<StreamMessage, FlashError>;
}

/// Records requests and replays queued responses.
///
/// With no queued response the fake answers with an empty stream
/// (a server that rendered nothing).
#[derive(Debug, Default)]
pub struct FakeFlashEndpoint {
    pub requests: Vec<(String, FlashPayload)>,
    responses: VecDeque<Result<StreamMessage, FlashError>>,
}

impl FakeFlashEndpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, response: Result<StreamMessage, FlashError>) {
        self.responses.push_back(response);
    }
}

impl FlashEndpoint for FakeFlashEndpoint {
    fn post(&mut self, token: &str, payload: &FlashPayload) -> Result<StreamMessage, FlashError> {
        self.requests.push((token.to_string(), payload.clone()));
        self.responses
            .pop_front()
            .unwrap_or_else(|| Ok(StreamMessage::new()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Health probe
// ─────────────────────────────────────────────────────────────────────

/// Why the host health check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthError {
    Http(u16),
    Transport(String),
}

impl fmt::Display for HealthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(status) => write!(f, "health check failed: {status}"),
            Self::Transport(reason) => write!(f, "health check request failed: {reason}"),
        }
    }
}

impl std::error::Error for HealthError {}

/// The `/up`-style liveness endpoint, polled when the page becomes
/// visible again.
pub trait HealthProbe {
    fn check(&mut self) -> Result<(), HealthError>;
}

/// Always answers with the configured result.
#[derive(Debug)]
pub struct FakeHealthProbe {
    pub result: Result<(), HealthError>,
    pub checks: usize,
}

impl Default for FakeHealthProbe {
    fn default() -> Self {
        Self {
            result: Ok(()),
            checks: 0,
        }
    }
}

impl FakeHealthProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(error: HealthError) -> Self {
        Self {
            result: Err(error),
            checks: 0,
        }
    }
}

impl HealthProbe for FakeHealthProbe {
    fn check(&mut self) -> Result<(), HealthError> {
        self.checks += 1;
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_wire_shape() {
        let payload = FlashPayload::new(FlashKind::Success, "report.txt - copied to the clipboard");
        assert_eq!(
            payload.to_json(),
            r#"{"flash":{"success":"report.txt - copied to the clipboard"}}"#
        );
    }

    #[test]
    fn fake_clipboard_records_and_denies() {
        let mut ok = FakeClipboard::new();
        ok.write_text("hello").unwrap();
        assert_eq!(ok.written, vec!["hello"]);

        let mut denied = FakeClipboard::denying("NotAllowedError");
        let err = denied.write_text("hello").unwrap_err();
        assert_eq!(err, ClipboardError::Denied("NotAllowedError".into()));
        assert!(denied.written.is_empty());
    }

    #[test]
    fn fake_endpoint_replays_responses() {
        let mut endpoint = FakeFlashEndpoint::new();
        endpoint.enqueue(Err(FlashError::Http(403)));

        let payload = FlashPayload::new(FlashKind::Alert, "boom");
        let err = endpoint.post("tok", &payload).unwrap_err();
        assert_eq!(err, FlashError::Http(403));

        // Queue exhausted: defaults to an empty stream.
        assert!(endpoint.post("tok", &payload).is_ok());
        assert_eq!(endpoint.requests.len(), 2);
        assert_eq!(endpoint.requests[0].0, "tok");
    }

    #[test]
    fn flash_error_messages_match_user_facing_text() {
        assert_eq!(FlashError::Http(500).to_string(), "HTTP error! Status: 500");
    }
}
