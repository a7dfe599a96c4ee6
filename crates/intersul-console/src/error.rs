//! Console error types.

use thiserror::Error;

use intersul_client::NETWORK_ERROR_MESSAGE;
use intersul_forms::FieldErrors;
use intersul_query::QueryError;

/// Message shown when the session is no longer valid.
pub const UNAUTHORIZED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Message shown when input was rejected.
pub const VALIDATION_MESSAGE: &str = "Please review the highlighted fields.";

/// Message shown for every other failure.
pub const SERVER_MESSAGE: &str = "Something went wrong. Please try again.";

/// How a failure should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received.
    Network,
    /// The credentials were rejected; the session has been cleared.
    Unauthorized,
    /// Input was rejected, locally or by the server (400/422).
    Validation,
    /// Anything else.
    Server,
}

impl ErrorKind {
    /// Fixed user-facing message for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::Network => NETWORK_ERROR_MESSAGE,
            ErrorKind::Unauthorized => UNAUTHORIZED_MESSAGE,
            ErrorKind::Validation => VALIDATION_MESSAGE,
            ErrorKind::Server => SERVER_MESSAGE,
        }
    }
}

/// Console-level errors.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Remote call failed.
    #[error(transparent)]
    Api(#[from] intersul_client::Error),

    /// Form input failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Persisting the session or theme failed.
    #[error("Session storage error: {0}")]
    Session(#[from] intersul_session::Error),

    /// A read was cancelled by a mutation on the same resource.
    #[error("Query cancelled")]
    Cancelled,

    /// A cached or speculative value could not be (de)serialized.
    #[error("Cache data error: {0}")]
    Cache(#[from] serde_json::Error),
}

impl From<QueryError<intersul_client::Error>> for ConsoleError {
    fn from(err: QueryError<intersul_client::Error>) -> Self {
        match err {
            QueryError::Cancelled => ConsoleError::Cancelled,
            QueryError::Fetch(e) => ConsoleError::Api(e),
            QueryError::Decode(e) => ConsoleError::Cache(e),
        }
    }
}

impl ConsoleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Api(e) if e.is_network() => ErrorKind::Network,
            ConsoleError::Api(e) if e.is_unauthorized() => ErrorKind::Unauthorized,
            ConsoleError::Api(e) if e.is_validation() => ErrorKind::Validation,
            ConsoleError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Server,
        }
    }

    /// The message to show the user.
    ///
    /// Server-side validation messages are passed through; everything else
    /// uses the fixed message of its [`ErrorKind`].
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Api(e) if e.is_validation() => e
                .server_message()
                .unwrap_or_else(|| VALIDATION_MESSAGE.to_string()),
            other => other.kind().message().to_string(),
        }
    }

    /// Field errors from local validation, if that is what failed.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ConsoleError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConsoleError::Cancelled)
    }
}

/// Result type for console operations.
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use intersul_client::ErrorBody;

    fn api(status: u16, body: serde_json::Value) -> ConsoleError {
        ConsoleError::Api(intersul_client::Error::Api {
            status,
            body: ErrorBody::from_value(body),
        })
    }

    #[test]
    fn test_kinds() {
        let network = ConsoleError::Api(intersul_client::Error::Network {
            detail: "connection refused".to_string(),
        });
        assert_eq!(network.kind(), ErrorKind::Network);
        assert_eq!(network.user_message(), NETWORK_ERROR_MESSAGE);

        let unauthorized = ConsoleError::Api(intersul_client::Error::Unauthorized {
            body: ErrorBody::default(),
        });
        assert_eq!(unauthorized.kind(), ErrorKind::Unauthorized);

        assert_eq!(api(500, serde_json::json!({})).kind(), ErrorKind::Server);
        assert_eq!(api(404, serde_json::json!({})).kind(), ErrorKind::Server);
        assert_eq!(ConsoleError::Cancelled.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_validation_passes_server_message_through() {
        let err = api(
            400,
            serde_json::json!({"message": ["email must be an email"], "statusCode": 400}),
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.user_message(), "email must be an email");

        let local = ConsoleError::from(FieldErrors::single("name", "Required"));
        assert_eq!(local.kind(), ErrorKind::Validation);
        assert_eq!(local.user_message(), VALIDATION_MESSAGE);
        assert_eq!(local.field_errors().and_then(|e| e.get("name")), Some("Required"));
    }

    #[test]
    fn test_query_error_conversion() {
        let cancelled: ConsoleError = QueryError::<intersul_client::Error>::Cancelled.into();
        assert!(cancelled.is_cancelled());
    }
}
