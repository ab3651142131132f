// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infrastructure types that package rate-limit telemetry alongside responses from Twitter.

use std::str::FromStr;

use super::Headers;

/// Rate-limit telemetry parsed opportunistically from a response's headers.
///
/// Twitter attaches `X-Ratelimit-*` headers to most responses, along with an `X-Runtime` header
/// reporting server-side processing time. Absence of any of these is not an error; the counters
/// default to `-1` and the runtime to `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    /// The rate limit ceiling for the given request, or `-1` if the header was absent.
    pub limit: i32,
    /// The number of requests left for the current window, or `-1` if the header was absent.
    pub remaining: i32,
    /// The UTC Unix timestamp at which the rate window resets, or `-1` if the header was absent.
    pub reset: i32,
    /// Server-side processing time for the request, in seconds, if reported.
    pub runtime: Option<f64>,
}

impl Default for RateLimit {
    fn default() -> RateLimit {
        RateLimit {
            limit: -1,
            remaining: -1,
            reset: -1,
            runtime: None,
        }
    }
}

/// A helper struct to wrap response data with accompanying rate limit information.
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The rate-limit telemetry attached to this response.
    pub rate_limit_status: RateLimit,
    /// The decoded response from the request.
    pub response: T,
}

impl<T> Response<T> {
    /// Converts a `Response<T>` to a `Response<U>` by running its contained response through the
    /// given function, preserving its rate-limit information.
    pub fn map<F, U>(self, fun: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            rate_limit_status: self.rate_limit_status,
            response: fun(self.response),
        }
    }
}

/// The raw output of an endpoint call: the response body, or `None` for a successful response
/// that carried no content.
pub type RawBody = Option<String>;

/// Convenient alias for the outcome of an endpoint call.
pub type WebResponse = crate::error::Result<Response<RawBody>>;

fn header_value<T: FromStr>(headers: &Headers, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Parses whatever rate-limit headers are present on the given header block. Unparseable or
/// missing headers fall back to the defaults.
pub(crate) fn rate_headers(headers: &Headers) -> RateLimit {
    RateLimit {
        limit: header_value(headers, "X-Ratelimit-Limit").unwrap_or(-1),
        remaining: header_value(headers, "X-Ratelimit-Remaining").unwrap_or(-1),
        reset: header_value(headers, "X-Ratelimit-Reset").unwrap_or(-1),
        runtime: header_value(headers, "X-Runtime"),
    }
}
