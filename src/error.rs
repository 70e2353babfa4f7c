use crate::config::{API_KEY_VAR, MODELS_FILE_VAR};
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "TTS_API_KEY", "models[1].endpoint")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., response body excerpt)
    pub details: Option<String>,
    /// Source of the error (e.g., "config", "model_registry", "http_backend")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for text2vox.
///
/// Library callers see the full cause; the controller folds these into an
/// [`ErrorKind`] before anything reaches the user.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Remote error: HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model catalog error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// The user-facing category this error collapses into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } | Error::Yaml(_) => ErrorKind::Configuration,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Remote { .. } | Error::Transport(_) | Error::Io(_) => ErrorKind::Remote,
        }
    }

    /// The sentence shown to the user. Configuration errors name the
    /// setting to fix; everything else uses the fixed [`ErrorKind`] text.
    pub fn user_message(&self) -> String {
        match self {
            Error::Configuration { context, .. } => {
                let field = context.field_path.as_deref();
                if field == Some(API_KEY_VAR) {
                    ErrorKind::MISSING_CREDENTIAL_MESSAGE.to_string()
                } else if context.source.as_deref() == Some("model_registry") {
                    catalog_message(field)
                } else if let Some(field) = field {
                    format!("Invalid value for {}. Fix it and restart.", field)
                } else {
                    ErrorKind::CONFIGURATION_MESSAGE.to_string()
                }
            }
            Error::Yaml(_) => catalog_message(None),
            other => other.kind().user_message().to_string(),
        }
    }
}

fn catalog_message(field: Option<&str>) -> String {
    match field {
        Some(field) if field != MODELS_FILE_VAR => format!(
            "The voice model catalog is invalid at {}. Check {} and restart.",
            field, MODELS_FILE_VAR
        ),
        _ => format!(
            "The voice model catalog is invalid. Check {} and restart.",
            MODELS_FILE_VAR
        ),
    }
}

/// What the user is told. Each kind maps to exactly one fixed sentence so
/// transport diagnostics never reach the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Remote,
    Configuration,
}

impl ErrorKind {
    pub const VALIDATION_MESSAGE: &'static str = "Please enter text to convert.";
    pub const REMOTE_MESSAGE: &'static str =
        "An unexpected error occurred. Please try again later.";
    pub const CONFIGURATION_MESSAGE: &'static str =
        "The configuration is invalid. Check the TTS_* settings and restart.";
    pub const MISSING_CREDENTIAL_MESSAGE: &'static str =
        "Speech service credential is missing. Set TTS_API_KEY and restart.";

    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Validation => Self::VALIDATION_MESSAGE,
            ErrorKind::Remote => Self::REMOTE_MESSAGE,
            ErrorKind::Configuration => Self::CONFIGURATION_MESSAGE,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered_in_display() {
        let err = Error::configuration_with_context(
            "credential missing",
            ErrorContext::new()
                .with_field_path("TTS_API_KEY")
                .with_source("config"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: credential missing (field: TTS_API_KEY, source: config)"
        );
        assert_eq!(err.context().unwrap().source.as_deref(), Some("config"));
    }

    #[test]
    fn test_remote_and_transport_collapse_to_remote_kind() {
        let remote = Error::Remote {
            status: 503,
            message: "model loading".into(),
        };
        assert_eq!(remote.kind(), ErrorKind::Remote);

        let transport = Error::Transport(TransportError::Timeout);
        assert_eq!(transport.kind(), ErrorKind::Remote);
        assert!(transport.context().is_none());
    }

    #[test]
    fn test_user_messages_are_fixed() {
        assert_eq!(
            ErrorKind::Validation.to_string(),
            "Please enter text to convert."
        );
        assert_eq!(
            ErrorKind::Remote.user_message(),
            "An unexpected error occurred. Please try again later."
        );
        assert_ne!(
            ErrorKind::Configuration.user_message(),
            ErrorKind::Remote.user_message()
        );
    }

    #[test]
    fn test_configuration_messages_name_the_setting() {
        let missing = Error::configuration_with_context(
            "TTS_API_KEY is not set",
            ErrorContext::new().with_field_path(API_KEY_VAR),
        );
        assert_eq!(missing.user_message(), ErrorKind::MISSING_CREDENTIAL_MESSAGE);

        let proxy = Error::configuration_with_context(
            "invalid proxy",
            ErrorContext::new().with_field_path("TTS_PROXY_URL"),
        );
        assert_eq!(
            proxy.user_message(),
            "Invalid value for TTS_PROXY_URL. Fix it and restart."
        );

        let duplicate = Error::configuration_with_context(
            "duplicate endpoint",
            ErrorContext::new()
                .with_field_path("models[1].endpoint")
                .with_source("model_registry"),
        );
        assert_eq!(
            duplicate.user_message(),
            "The voice model catalog is invalid at models[1].endpoint. Check TTS_MODELS_FILE and restart."
        );

        let bare = Error::configuration_with_context("unknown", ErrorContext::new());
        assert_eq!(bare.user_message(), ErrorKind::CONFIGURATION_MESSAGE);
    }

    #[test]
    fn test_remote_user_message_hides_cause() {
        let err = Error::Remote {
            status: 500,
            message: "stack trace".into(),
        };
        assert_eq!(err.user_message(), ErrorKind::REMOTE_MESSAGE);
    }
}
