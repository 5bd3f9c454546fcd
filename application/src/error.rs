//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::rejection::QueryRejection,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            details: Vec::new(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// HTTP API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,

    /// Particular problems this [`Error`] consists of, if any.
    pub details: Vec<String>,
}

impl Error {
    /// Creates a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            details: Vec::new(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] representing malformed request arguments.
    #[must_use]
    pub fn invalid_argument(details: Vec<String>) -> Self {
        Self {
            code: "INVALID_ARGUMENT",
            status_code: http::StatusCode::BAD_REQUEST,
            message: "Invalid argument".to_owned(),
            details,
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
            details,
        } = self;

        write!(f, "[{code}]: {message}")?;
        if !details.is_empty() {
            write!(f, " ({})", details.iter().join("; "))?;
        }
        write!(
            f,
            "{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

/// Body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct Body<'a> {
    /// [`Error`] code.
    code: Code,

    /// [`Error`] message.
    error: &'a str,

    /// [`Error`] details.
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    errors: &'a [String],
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Internals are logged, but never exposed to clients.
        let message = if self.status_code.is_server_error() {
            log::error!("{self}");
            "Internal server error"
        } else {
            self.message.as_str()
        };
        let body = Body {
            code: self.code,
            error: message,
            errors: &self.details,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::invalid_argument(vec![self.body_text()]))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use axum::response::IntoResponse as _;
    use serde_json::json;

    use super::Error;

    async fn body(err: Error) -> (http::StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn responds_with_all_details() {
        let err = Error::invalid_argument(vec![
            "invalid parameter: sort".into(),
            "invalid parameter: limit".into(),
        ]);

        assert_eq!(
            body(err).await,
            (
                http::StatusCode::BAD_REQUEST,
                json!({
                    "code": "INVALID_ARGUMENT",
                    "error": "Invalid argument",
                    "errors": [
                        "invalid parameter: sort",
                        "invalid parameter: limit",
                    ],
                }),
            ),
        );
    }

    #[tokio::test]
    async fn hides_internal_message() {
        let err = Error::internal(&"connection refused to 10.0.0.1");

        assert_eq!(
            body(err).await,
            (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "code": "INTERNAL_SERVER_ERROR",
                    "error": "Internal server error",
                }),
            ),
        );
    }

    #[test]
    fn displays_details() {
        let err = Error::invalid_argument(vec!["a".into(), "b".into()]);

        assert_eq!(
            err.to_string(),
            "[INVALID_ARGUMENT]: Invalid argument (a; b)",
        );
    }
}
