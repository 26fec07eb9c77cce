//! API error types and response classification for the Zarban REST APIs.
//!
//! Every HTTP response passes through [`classify_response`] exactly once:
//!
//! | Status      | Body                                         | Result                        |
//! |-------------|----------------------------------------------|-------------------------------|
//! | 2xx         | decodes as `T`                               | `Ok(T)`                       |
//! | 2xx         | does not decode                              | [`ApiError::MalformedSuccess`] |
//! | other       | `{"messages": {...}}` with ≥1 locale         | [`ErrorBody::User`]           |
//! | other       | `{"msg": "...", "reasons": [...]}`, msg ≠ "" | [`ErrorBody::Generic`]        |
//! | other       | anything else                                | [`ErrorBody::Unhandled`]      |

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::serde_util::null_as_default;

/// Header carrying the server-assigned request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// API-specific error type for the Zarban REST clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP/network error from reqwest (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, classified by body shape
    #[error("{0}")]
    Response(Box<ErrorResponse>),

    /// 2xx response whose body did not match the expected type
    #[error("Failed to parse success response (status {status}): {reason}")]
    MalformedSuccess {
        status: u16,
        request: RequestMeta,
        reason: String,
    },

    /// Invalid parameter provided by the caller
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Which of the three error shapes a non-2xx body matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserError,
    ApiError,
    Unhandled,
}

/// Request metadata attached to errors for diagnostics. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub request_id: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
}

impl RequestMeta {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: None,
            method: Some(method.into()),
            path: Some(path.into()),
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }
}

/// A single locale's message inside a [`UserError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub solutions: Vec<String>,
}

/// End-user actionable error, keyed by locale (e.g. `"en"`, `"fa"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: BTreeMap<String, LocalizedMessage>,
}

/// Operational error with a message and a list of reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub msg: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasons: Vec<String>,
}

/// Closed union over the error body shapes the APIs produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    User(UserError),
    Generic(GenericError),
    /// Raw body text, verbatim.
    Unhandled(String),
}

impl ErrorBody {
    /// Match a non-success body against the known shapes, in order.
    pub fn classify(body: &[u8]) -> Self {
        if let Ok(user) = serde_json::from_slice::<UserError>(body) {
            if !user.messages.is_empty() {
                return ErrorBody::User(user);
            }
        }

        if let Ok(generic) = serde_json::from_slice::<GenericError>(body) {
            if !generic.msg.is_empty() {
                return ErrorBody::Generic(generic);
            }
        }

        ErrorBody::Unhandled(String::from_utf8_lossy(body).into_owned())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorBody::User(_) => ErrorKind::UserError,
            ErrorBody::Generic(_) => ErrorKind::ApiError,
            ErrorBody::Unhandled(_) => ErrorKind::Unhandled,
        }
    }

    /// Short summary used as the report's `Message:` line.
    pub fn summary(&self) -> &str {
        match self {
            ErrorBody::User(_) => "User error",
            ErrorBody::Generic(generic) => &generic.msg,
            ErrorBody::Unhandled(_) => "Unhandled error",
        }
    }
}

/// A classified non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub request: RequestMeta,
    pub body: ErrorBody,
    /// Extra diagnostic key/value pairs added by callers.
    pub context: BTreeMap<String, String>,
}

impl ErrorResponse {
    pub fn new(status: u16, request: RequestMeta, body: ErrorBody) -> Self {
        Self {
            status,
            request,
            body,
            context: BTreeMap::new(),
        }
    }

    /// Render a multi-line report for console display.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        let dash = "-";

        out.push_str("API Error Report\n");
        out.push_str("---------------\n");
        let _ = writeln!(out, "Status:     {}", self.status);
        let _ = writeln!(
            out,
            "Request ID: {}",
            self.request.request_id.as_deref().unwrap_or(dash)
        );
        let _ = writeln!(
            out,
            "Path:       {} {}",
            self.request.method.as_deref().unwrap_or(dash),
            self.request.path.as_deref().unwrap_or(dash)
        );
        let _ = writeln!(out, "Message:    {}", self.body.summary());

        if !self.context.is_empty() {
            out.push_str("\nContext:\n");
            for (key, value) in &self.context {
                let _ = writeln!(out, "- {}: {}", key, value);
            }
        }

        match &self.body {
            ErrorBody::User(user) => {
                out.push_str("\nUser Error Details:\n");
                for (locale, detail) in &user.messages {
                    let _ = writeln!(out, "[{}]", locale);
                    let _ = writeln!(out, "Message:   {}", detail.user_message);
                    if !detail.solutions.is_empty() {
                        out.push_str("Solutions:\n");
                        for solution in &detail.solutions {
                            let _ = writeln!(out, "- {}", solution);
                        }
                    }
                }
            }
            ErrorBody::Generic(generic) => {
                out.push_str("\nError Details:\n");
                let _ = writeln!(out, "Message: {}", generic.msg);
                if !generic.reasons.is_empty() {
                    out.push_str("Reasons:\n");
                    for reason in &generic.reasons {
                        let _ = writeln!(out, "- {}", reason);
                    }
                }
            }
            ErrorBody::Unhandled(raw) => {
                out.push_str("\nRaw Details:\n");
                let _ = writeln!(out, "{}", raw);
            }
        }

        out
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API error [{}]: status {}, path: {} {}, message: {}",
            self.request.request_id.as_deref().unwrap_or("-"),
            self.status,
            self.request.method.as_deref().unwrap_or("-"),
            self.request.path.as_deref().unwrap_or("-"),
            self.body.summary()
        )
    }
}

impl ApiError {
    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response(response) => Some(response.status),
            ApiError::MalformedSuccess { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidParameter(_) => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Response(response) => Some(response.body.kind()),
            _ => None,
        }
    }

    pub fn request(&self) -> Option<&RequestMeta> {
        match self {
            ApiError::Response(response) => Some(&response.request),
            ApiError::MalformedSuccess { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn user_error(&self) -> Option<&UserError> {
        match self {
            ApiError::Response(response) => match &response.body {
                ErrorBody::User(user) => Some(user),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn generic_error(&self) -> Option<&GenericError> {
        match self {
            ApiError::Response(response) => match &response.body {
                ErrorBody::Generic(generic) => Some(generic),
                _ => None,
            },
            _ => None,
        }
    }

    /// Attach a diagnostic key/value pair. No-op for errors without a response.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        if let ApiError::Response(response) = &mut self {
            response.context.insert(key.into(), value.to_string());
        }
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Multi-line console report. Falls back to `Display` for transport errors.
    pub fn pretty(&self) -> String {
        match self {
            ApiError::Response(response) => response.pretty(),
            other => format!("{}\n", other),
        }
    }
}

/// Decode a success body as `T`, or classify the failure.
pub fn classify_response<T: DeserializeOwned>(
    status: u16,
    request: RequestMeta,
    body: &[u8],
) -> ApiResult<T> {
    if (200..300).contains(&status) {
        return serde_json::from_slice(body).map_err(|e| ApiError::MalformedSuccess {
            status,
            request,
            reason: e.to_string(),
        });
    }

    Err(ApiError::Response(Box::new(ErrorResponse::new(
        status,
        request,
        ErrorBody::classify(body),
    ))))
}
