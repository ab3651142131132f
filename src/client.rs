// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The client context object: construction parameters, credentials, and the HTTP transport.

use std::borrow::Cow;
use std::sync::Mutex;

use hyper::header::{HeaderValue, USER_AGENT};
use hyper::{Body, Method, Request, StatusCode};
use lazy_static::lazy_static;

use crate::auth::{raw, KeyPair};
use crate::common::*;
use crate::error::{self, Error, LastError, Result};

#[cfg(feature = "native_tls")]
type HttpsConnector = hyper_tls::HttpsConnector<hyper::client::HttpConnector>;
#[cfg(all(
    any(feature = "rustls", feature = "rustls_webpki"),
    not(feature = "native_tls")
))]
type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;

#[cfg(feature = "native_tls")]
fn new_connector() -> HttpsConnector {
    hyper_tls::HttpsConnector::new()
}

#[cfg(all(feature = "rustls", not(feature = "native_tls")))]
fn new_connector() -> HttpsConnector {
    hyper_rustls::HttpsConnector::with_native_roots()
}

#[cfg(all(
    feature = "rustls_webpki",
    not(any(feature = "native_tls", feature = "rustls"))
))]
fn new_connector() -> HttpsConnector {
    hyper_rustls::HttpsConnector::with_webpki_roots()
}

/// The connection pool is shared between client instances; per-instance state lives on the
/// `Client` itself.
fn http_client() -> &'static hyper::Client<HttpsConnector> {
    lazy_static! {
        static ref CLIENT: hyper::Client<HttpsConnector> =
            hyper::Client::builder().build(new_connector());
    }
    &CLIENT
}

/// Construction options for a [`Client`].
///
/// The defaults talk to the real Twitter API over HTTPS using the out-of-band (PIN)
/// authorization flow:
///
/// ```
/// use tern::Config;
///
/// let config = Config {
///     api_base: "api.example.test".to_string(),
///     ..Config::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// URL in your application for Twitter to call back to after authorization, or `"oob"` for
    /// the out-of-band (PIN) flow. Defaults to `"oob"`.
    pub callback_url: String,
    /// The base host name for the Twitter API. Point this at a compatible clone to use the
    /// client against another service. Defaults to `"api.twitter.com"`.
    pub api_base: String,
    /// Communicate over HTTPS rather than HTTP. Defaults to `true`.
    pub use_ssl: bool,
    /// The HTTP user agent sent with every request. Defaults to `"tern/<version>"`.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            callback_url: "oob".to_string(),
            api_base: "api.twitter.com".to_string(),
            use_ssl: true,
            user_agent: concat!("tern/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A Twitter API client: consumer credentials, the (optional) user token, and per-instance
/// diagnostics.
///
/// All API calls go through a `Client`. Endpoint calls take `&self` and issue exactly one HTTP
/// request each; the authorization flow methods take `&mut self` because they replace the stored
/// token. Credentials are therefore only ever written between completed calls.
///
/// # Diagnostics
///
/// The client records the most recent failure ([`Client::last_error`]) and the most recent
/// rate-limit headers ([`Client::rate_limit_status`]). Both are overwritten by every completed
/// call, so when several calls on a shared client are in flight at once these accessors are
/// advisory: read them only right after the call whose outcome you care about.
///
/// # Cancellation
///
/// No timeout or cancellation primitive is provided. Every endpoint method returns a future;
/// dropping it before completion abandons the in-flight request. Callers that want a timeout can
/// race the future against a timer.
#[derive(Debug)]
pub struct Client {
    pub(crate) consumer: KeyPair,
    pub(crate) token: Option<KeyPair>,
    pub(crate) config: Config,
    /// Scheme + host, computed once at construction.
    base_url: String,
    user_agent: HeaderValue,
    last_error: Mutex<Option<LastError>>,
    rate_limit: Mutex<RateLimit>,
}

impl Client {
    /// Creates a client from the application's consumer credentials.
    ///
    /// Both the key and the secret must be non-empty; a client cannot sign requests without
    /// them, so a blank credential is a construction error rather than a deferred per-call
    /// failure. The configured user agent must also be valid HTTP header text.
    pub fn new(
        consumer_key: impl Into<Cow<'static, str>>,
        consumer_secret: impl Into<Cow<'static, str>>,
        config: Config,
    ) -> Result<Client> {
        let consumer_key = consumer_key.into();
        let consumer_secret = consumer_secret.into();
        if consumer_key.trim().is_empty() {
            return Err(Error::MissingParameter("consumer_key"));
        }
        if consumer_secret.trim().is_empty() {
            return Err(Error::MissingParameter("consumer_secret"));
        }

        let scheme = if config.use_ssl { "https" } else { "http" };
        let base_url = format!("{}://{}", scheme, config.api_base);
        let user_agent = HeaderValue::from_str(&config.user_agent)?;

        Ok(Client {
            consumer: KeyPair::new(consumer_key, consumer_secret),
            token: None,
            config,
            base_url,
            user_agent,
            last_error: Mutex::new(None),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// The full URL for the given endpoint path on the configured API host.
    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// The most recent error recorded by this client, if any failing call has completed.
    ///
    /// Overwritten on every failure; see the [type docs](Client#diagnostics) for how this
    /// behaves under concurrent calls.
    pub fn last_error(&self) -> Option<LastError> {
        self.last_error.lock().unwrap().clone()
    }

    /// The rate-limit telemetry from the most recent response that carried any.
    pub fn rate_limit_status(&self) -> RateLimit {
        *self.rate_limit.lock().unwrap()
    }

    /// Records the given error as this client's last error.
    pub(crate) fn register_error(&self, err: &Error) {
        let message = match err.response_body() {
            Some(body) => error::error_message(body),
            None => err.to_string(),
        };
        tracing::debug!(code = err.code().as_u32(), %message, "recording error");
        *self.last_error.lock().unwrap() = Some(LastError {
            code: err.code(),
            message,
        });
    }

    /// Assembles and dispatches a signed GET request for the given endpoint path.
    pub(crate) async fn raw_get(
        &self,
        url: String,
        params: Option<&ParamList>,
    ) -> Result<Response<RawBody>> {
        let req = raw::signed_request(Method::GET, url, &self.consumer, self.token.as_ref(), params)?;
        self.execute(req).await
    }

    /// Assembles and dispatches a signed POST request for the given endpoint path.
    pub(crate) async fn raw_post(
        &self,
        url: String,
        params: Option<&ParamList>,
    ) -> Result<Response<RawBody>> {
        let req =
            raw::signed_request(Method::POST, url, &self.consumer, self.token.as_ref(), params)?;
        self.execute(req).await
    }

    /// Issues a single HTTP request and maps its outcome through the fixed status taxonomy,
    /// recording rate-limit telemetry and any failure on this client. No retries are attempted
    /// and no timeout is imposed beyond what the underlying transport provides.
    pub(crate) async fn execute(&self, mut req: Request<Body>) -> Result<Response<RawBody>> {
        req.headers_mut().insert(USER_AGENT, self.user_agent.clone());
        tracing::debug!(method = %req.method(), uri = %req.uri(), "dispatching request");

        match self.dispatch(req).await {
            Ok((status, headers, text)) => self.settle(status, &headers, text),
            Err(err) => {
                self.register_error(&err);
                Err(err)
            }
        }
    }

    async fn dispatch(&self, req: Request<Body>) -> Result<(StatusCode, Headers, String)> {
        let resp = http_client().request(req).await?;
        let (parts, body) = resp.into_parts();

        let bytes = hyper::body::to_bytes(body).await?;
        tracing::debug!(status = %parts.status, bytes = bytes.len(), "response received");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok((parts.status, parts.headers, text))
    }

    /// Maps a fully read response through the fixed status taxonomy, storing the rate-limit
    /// telemetry it carried and recording any resulting error on this client.
    pub(crate) fn settle(
        &self,
        status: StatusCode,
        headers: &Headers,
        text: String,
    ) -> Result<Response<RawBody>> {
        let rate_limit_status = rate_headers(headers);
        *self.rate_limit.lock().unwrap() = rate_limit_status;

        if status == StatusCode::OK {
            // An empty 200 body means "succeeded, no content".
            let response = if text.is_empty() { None } else { Some(text) };
            Ok(Response {
                rate_limit_status,
                response,
            })
        } else {
            let err = Error::from_status(status, text);
            self.register_error(&err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn construction_requires_both_consumer_credentials() {
        let err = Client::new("key", "", Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("consumer_secret")));

        let err = Client::new("", "secret", Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("consumer_key")));

        assert!(Client::new("key", "secret", Config::default()).is_ok());
    }

    #[test]
    fn base_url_is_computed_once_from_the_config() {
        let client = Client::new("key", "secret", Config::default()).unwrap();
        assert_eq!(
            client.endpoint_url("oauth/request_token"),
            "https://api.twitter.com/oauth/request_token"
        );

        let config = Config {
            api_base: "api.example.test".to_string(),
            use_ssl: false,
            ..Config::default()
        };
        let client = Client::new("key", "secret", config).unwrap();
        assert_eq!(
            client.endpoint_url("1/statuses/update.json"),
            "http://api.example.test/1/statuses/update.json"
        );
    }

    #[test]
    fn last_error_is_overwritten_per_failure() {
        let client = Client::new("key", "secret", Config::default()).unwrap();
        assert!(client.last_error().is_none());

        client.register_error(&Error::AuthRequired);
        assert_eq!(
            client.last_error().map(|e| e.code),
            Some(ErrorCode::AuthRequired)
        );

        client.register_error(&Error::Forbidden("denied".to_string()));
        let last = client.last_error().unwrap();
        assert_eq!(last.code, ErrorCode::Forbidden);
        assert_eq!(last.message, "denied");
    }

    #[test]
    fn recorded_messages_prefer_the_twitter_error_payload() {
        let client = Client::new("key", "secret", Config::default()).unwrap();
        let body = r#"{"errors":[{"message":"Rate limit exceeded","code":88}]}"#.to_string();
        client.register_error(&Error::BadStatus(StatusCode::TOO_MANY_REQUESTS, body));

        let last = client.last_error().unwrap();
        assert_eq!(last.code, ErrorCode::UnknownHttp);
        assert_eq!(last.message, "#88: Rate limit exceeded");
    }

    #[test]
    fn default_config_matches_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.callback_url, "oob");
        assert_eq!(config.api_base, "api.twitter.com");
        assert!(config.use_ssl);
        assert_eq!(config.user_agent, concat!("tern/", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn fresh_clients_report_default_rate_limits() {
        let client = Client::new("key", "secret", Config::default()).unwrap();
        assert_eq!(client.rate_limit_status(), RateLimit::default());
    }

    #[test]
    fn settling_a_200_yields_the_body_and_stores_rate_limits() {
        let client = Client::new("key", "secret", Config::default()).unwrap();
        let mut headers = Headers::new();
        headers.insert("X-Ratelimit-Limit", HeaderValue::from_static("350"));
        headers.insert("X-Ratelimit-Remaining", HeaderValue::from_static("349"));

        let resp = client
            .settle(StatusCode::OK, &headers, "[]".to_string())
            .unwrap();
        assert_eq!(resp.response.as_deref(), Some("[]"));
        assert_eq!(resp.rate_limit_status.limit, 350);
        assert_eq!(client.rate_limit_status().remaining, 349);
        assert!(client.last_error().is_none());
    }

    #[test]
    fn settling_an_empty_200_yields_no_content() {
        let client = Client::new("key", "secret", Config::default()).unwrap();
        let resp = client
            .settle(StatusCode::OK, &Headers::new(), String::new())
            .unwrap();
        assert!(resp.response.is_none());
        assert!(client.last_error().is_none());
    }

    #[test]
    fn settling_a_failure_maps_the_status_and_records_it() {
        let client = Client::new("key", "secret", Config::default()).unwrap();
        let cases = [
            (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
            (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::ServerError),
            (StatusCode::BAD_GATEWAY, ErrorCode::UnknownHttp),
        ];
        for &(status, code) in &cases {
            let err = client
                .settle(status, &Headers::new(), format!("body for {}", status))
                .unwrap_err();
            assert_eq!(err.code(), code, "status {}", status);
            assert_eq!(err.response_body(), Some(&*format!("body for {}", status)));

            let last = client.last_error().unwrap();
            assert_eq!(last.code, code, "status {}", status);
            assert_eq!(last.message, format!("body for {}", status));
        }
    }
}
