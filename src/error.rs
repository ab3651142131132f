// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A composite error type for errors that can occur while interacting with Twitter.

use std::fmt;

use hyper::StatusCode;
use serde::Deserialize;

/// Convenient alias to a `Result` containing this crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A set of errors that can occur when constructing a [`Client`] or calling an API endpoint.
///
/// Failures reported by the remote service carry the raw response body, so that callers can
/// inspect whatever diagnostic payload Twitter attached to the response. No attempt is made to
/// model that payload beyond [`TwitterErrors`].
///
/// [`Client`]: crate::Client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote service returned HTTP 404. Contains the raw response body.
    #[error("resource not found")]
    NotFound(String),
    /// The remote service returned HTTP 401. Contains the raw response body.
    #[error("request not authorized")]
    Unauthorized(String),
    /// The remote service returned HTTP 403. Contains the raw response body.
    #[error("request forbidden")]
    Forbidden(String),
    /// The remote service returned HTTP 500. Contains the raw response body.
    #[error("remote server error")]
    ServerError(String),
    /// The remote service returned a status code outside the recognized set. Contains the status
    /// code and the raw response body.
    #[error("unexpected response status: {0}")]
    BadStatus(StatusCode, String),
    /// A request was assembled with an HTTP method the signer does not support.
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(hyper::Method),
    /// The call requires an authorized user, but the client holds no finalized access token.
    #[error("this call requires user authorization")]
    AuthRequired,
    /// The called operation is not implemented.
    #[error("not implemented")]
    NotImplemented,
    /// The out-of-band verifier was not a numeric PIN. Contains the rejected input.
    #[error("out-of-band verifier is not a numeric PIN: {0}")]
    MalformedPin(String),
    /// An expected value was missing from a token-exchange response.
    #[error("value missing from response: {0}")]
    MissingValue(&'static str),
    /// A required construction parameter was absent or empty.
    #[error("missing construction parameter: {0}")]
    MissingParameter(&'static str),
    /// The response from Twitter could not be interpreted.
    #[error("invalid response received")]
    InvalidResponse,
    /// The underlying network stack reported an error.
    #[error("network error: {0}")]
    NetError(#[from] hyper::Error),
    /// The request could not be assembled, e.g. because the configured API base does not form a
    /// valid URL.
    #[error("invalid request: {0}")]
    BadRequest(#[from] hyper::http::Error),
    /// A configured header value (such as the user agent) was not valid HTTP header text.
    #[error("invalid header value: {0}")]
    BadHeader(#[from] hyper::header::InvalidHeaderValue),
}

impl Error {
    /// Classifies an HTTP response into the fixed error taxonomy. Only called for non-200
    /// statuses.
    pub(crate) fn from_status(status: StatusCode, body: String) -> Error {
        match status {
            StatusCode::NOT_FOUND => Error::NotFound(body),
            StatusCode::UNAUTHORIZED => Error::Unauthorized(body),
            StatusCode::FORBIDDEN => Error::Forbidden(body),
            StatusCode::INTERNAL_SERVER_ERROR => Error::ServerError(body),
            status => Error::BadStatus(status, body),
        }
    }

    /// The numeric code this error is recorded under. See [`ErrorCode`].
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::Unauthorized(_) => ErrorCode::Unauthorized,
            Error::Forbidden(_) => ErrorCode::Forbidden,
            Error::ServerError(_) => ErrorCode::ServerError,
            Error::InvalidMethod(_) => ErrorCode::InvalidMethod,
            Error::AuthRequired => ErrorCode::AuthRequired,
            Error::NotImplemented => ErrorCode::NotImplemented,
            Error::MalformedPin(_) => ErrorCode::MalformedPin,
            _ => ErrorCode::UnknownHttp,
        }
    }

    /// The raw response body attached to this error, for errors that surfaced from an HTTP
    /// response.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Error::NotFound(body)
            | Error::Unauthorized(body)
            | Error::Forbidden(body)
            | Error::ServerError(body)
            | Error::BadStatus(_, body) => Some(body),
            _ => None,
        }
    }
}

/// The flat set of numeric error codes recorded in a client's last-error field.
///
/// The discriminants are bitmask-style and stable, so they can be stored or compared across
/// versions. [`ErrorCode::from_raw`] is the only way to build one from an integer, and it traps
/// values outside the enumeration, so an `ErrorCode` always holds a valid member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    /// HTTP 404 response.
    NotFound = 1,
    /// HTTP 500 response.
    ServerError = 2,
    /// HTTP 401 response.
    Unauthorized = 4,
    /// Some other, unexpected HTTP or transport failure.
    UnknownHttp = 8,
    /// A request was built with an unsupported HTTP method.
    InvalidMethod = 16,
    /// Internal contract violation: an integer outside this enumeration was recorded.
    ErroneousError = 32,
    /// The called endpoint requires user authorization.
    AuthRequired = 64,
    /// The called operation is not implemented.
    NotImplemented = 128,
    /// The out-of-band PIN was not numeric.
    MalformedPin = 256,
    /// HTTP 403 response.
    Forbidden = 512,
}

impl ErrorCode {
    /// The integer value of this code.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Converts a raw integer back into an `ErrorCode`.
    ///
    /// Values outside the enumeration are trapped and replaced with
    /// [`ErrorCode::ErroneousError`], so the result is always a valid member.
    pub fn from_raw(raw: u32) -> ErrorCode {
        match raw {
            1 => ErrorCode::NotFound,
            2 => ErrorCode::ServerError,
            4 => ErrorCode::Unauthorized,
            8 => ErrorCode::UnknownHttp,
            16 => ErrorCode::InvalidMethod,
            32 => ErrorCode::ErroneousError,
            64 => ErrorCode::AuthRequired,
            128 => ErrorCode::NotImplemented,
            256 => ErrorCode::MalformedPin,
            512 => ErrorCode::Forbidden,
            other => {
                tracing::warn!(code = other, "tried to restore an invalid error code");
                ErrorCode::ErroneousError
            }
        }
    }
}

/// The last error recorded by a [`Client`](crate::Client).
///
/// Overwritten by every failing call; no history is retained. Under concurrent calls on a shared
/// client this record is advisory only.
#[derive(Debug, Clone)]
pub struct LastError {
    /// The numeric code for the error.
    pub code: ErrorCode,
    /// A readable message, where one was available. For HTTP failures this is the error message
    /// Twitter attached to the response when it parses as [`TwitterErrors`], or the raw body
    /// otherwise.
    pub message: String,
}

/// Represents a collection of errors returned from a Twitter API call.
#[derive(Debug, Deserialize)]
pub struct TwitterErrors {
    /// A collection of errors returned by Twitter.
    pub errors: Vec<TwitterErrorCode>,
}

impl fmt::Display for TwitterErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for e in &self.errors {
            if first {
                first = false;
            } else {
                writeln!(f, ",")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

/// Represents a specific error returned from a Twitter API call.
#[derive(Debug, Deserialize)]
pub struct TwitterErrorCode {
    /// The error message returned by Twitter.
    pub message: String,
    /// The numeric error code returned by Twitter. A list of possible error codes can be found in
    /// the [API documentation][error-codes].
    ///
    /// [error-codes]: https://developer.twitter.com/en/docs/basics/response-codes
    pub code: i32,
}

impl fmt::Display for TwitterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}: {}", self.code, self.message)
    }
}

/// Extracts a readable message from a raw error body: the Twitter error payload when the body
/// parses as one, the raw body otherwise.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<TwitterErrors>(body) {
        Ok(errors) => errors.to_string(),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_the_fixed_taxonomy() {
        let cases = [
            (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
            (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::ServerError),
            (StatusCode::BAD_GATEWAY, ErrorCode::UnknownHttp),
            (StatusCode::TOO_MANY_REQUESTS, ErrorCode::UnknownHttp),
        ];
        for &(status, code) in &cases {
            let err = Error::from_status(status, String::new());
            assert_eq!(err.code(), code, "status {}", status);
        }
    }

    #[test]
    fn error_codes_round_trip() {
        let codes = [
            ErrorCode::NotFound,
            ErrorCode::ServerError,
            ErrorCode::Unauthorized,
            ErrorCode::UnknownHttp,
            ErrorCode::InvalidMethod,
            ErrorCode::ErroneousError,
            ErrorCode::AuthRequired,
            ErrorCode::NotImplemented,
            ErrorCode::MalformedPin,
            ErrorCode::Forbidden,
        ];
        for &code in &codes {
            assert_eq!(ErrorCode::from_raw(code.as_u32()), code);
        }
    }

    #[test]
    fn invalid_code_is_trapped() {
        assert_eq!(ErrorCode::from_raw(0), ErrorCode::ErroneousError);
        assert_eq!(ErrorCode::from_raw(3), ErrorCode::ErroneousError);
        assert_eq!(ErrorCode::from_raw(1024), ErrorCode::ErroneousError);
    }

    #[test]
    fn twitter_error_payload_is_preferred_for_messages() {
        let body = r#"{"errors":[{"message":"Sorry, that page does not exist","code":34}]}"#;
        assert_eq!(error_message(body), "#34: Sorry, that page does not exist");

        let plain = "<html>teapot</html>";
        assert_eq!(error_message(plain), plain);
    }

    #[test]
    fn status_errors_keep_the_raw_body() {
        let err = Error::from_status(StatusCode::FORBIDDEN, "nope".to_string());
        assert_eq!(err.response_body(), Some("nope"));
        assert!(Error::AuthRequired.response_body().is_none());
    }
}
