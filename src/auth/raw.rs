// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Internal mechanisms for the `auth` module: OAuth 1.0a request signing and assembly.
//!
//! Everything that turns a `{method, url, parameter list, credentials}` tuple into a signed
//! `hyper::Request` lives here. The invariants maintained by this module:
//!
//! * OAuth parameters appear only in the `Authorization` header, never in the query string or
//!   the body.
//! * For GET requests, the caller's parameters are percent-encoded into the query string and the
//!   body is empty.
//! * For POST and DELETE requests, the caller's parameters are form-encoded into the body and
//!   the query string is empty.
//! * Any other HTTP method is rejected with [`Error::InvalidMethod`] before signing.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac, NewMac};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Method, Request};
use rand::Rng;
use sha1::Sha1;

use crate::common::*;
use crate::error::{Error, Result};

use super::KeyPair;

/// Assembles a signed request to the given URL with the given parameters, placing them in the
/// query string or the request body as the method dictates.
pub(crate) fn signed_request(
    method: Method,
    uri: String,
    consumer: &KeyPair,
    token: Option<&KeyPair>,
    params: Option<&ParamList>,
) -> Result<Request<Body>> {
    if method != Method::GET && method != Method::POST && method != Method::DELETE {
        return Err(Error::InvalidMethod(method));
    }

    let mut builder = RequestBuilder::new(method, uri);
    if let Some(params) = params {
        builder = if builder.method == Method::GET {
            builder.with_query_params(params)
        } else {
            builder.with_body_params(params)
        };
    }

    builder.request_keys(consumer, token)
}

/// Builder struct that assembles a signed request to a single endpoint.
pub(crate) struct RequestBuilder {
    base_uri: String,
    method: Method,
    params: Option<ParamList>,
    query: Option<String>,
    body: Option<(Body, &'static str)>,
    addon: OAuthAddOn,
}

impl RequestBuilder {
    pub(crate) fn new(method: Method, base_uri: String) -> Self {
        RequestBuilder {
            base_uri,
            method,
            params: None,
            query: None,
            body: None,
            addon: OAuthAddOn::None,
        }
    }

    /// Appends the given parameters to the request's query string, and includes them in the
    /// OAuth signature.
    pub(crate) fn with_query_params(self, params: &ParamList) -> Self {
        let total_params = match self.params {
            Some(mut my_params) => {
                my_params.combine(params.clone());
                my_params
            }
            None => params.clone(),
        };
        RequestBuilder {
            query: Some(params.to_urlencoded()),
            params: Some(total_params),
            ..self
        }
    }

    /// Form-encodes the given parameters into the request's body, and includes them in the OAuth
    /// signature.
    pub(crate) fn with_body_params(self, params: &ParamList) -> Self {
        let total_params = match self.params {
            Some(mut my_params) => {
                my_params.combine(params.clone());
                my_params
            }
            None => params.clone(),
        };
        RequestBuilder {
            body: Some((
                Body::from(params.to_urlencoded()),
                "application/x-www-form-urlencoded",
            )),
            params: Some(total_params),
            ..self
        }
    }

    /// Attaches an `oauth_callback` parameter, used when generating a request token.
    pub(crate) fn oauth_callback(self, callback: impl Into<String>) -> Self {
        RequestBuilder {
            addon: OAuthAddOn::Callback(callback.into()),
            ..self
        }
    }

    /// Attaches an `oauth_verifier` parameter, used when exchanging for an access token.
    pub(crate) fn oauth_verifier(self, verifier: impl Into<String>) -> Self {
        RequestBuilder {
            addon: OAuthAddOn::Verifier(verifier.into()),
            ..self
        }
    }

    /// Signs this request with the given keys and assembles the final `hyper::Request`.
    pub(crate) fn request_keys(self, consumer: &KeyPair, token: Option<&KeyPair>) -> Result<Request<Body>> {
        let oauth = OAuthParams::from_keys(consumer.clone(), token.cloned())
            .with_addon(self.addon.clone())
            .sign_request(self.method.clone(), &self.base_uri, self.params.as_ref());
        self.request_authorization(oauth.to_string())
    }

    fn request_authorization(self, authorization: String) -> Result<Request<Body>> {
        let full_url = match self.query {
            Some(query) => format!("{}?{}", self.base_uri, query),
            None => self.base_uri,
        };
        let request = Request::builder()
            .method(self.method)
            .uri(full_url)
            .header(AUTHORIZATION, authorization);

        let request = match self.body {
            Some((body, content)) => request.header(CONTENT_TYPE, content).body(body)?,
            None => request.body(Body::empty())?,
        };
        Ok(request)
    }
}

/// OAuth parameter set used to create an OAuth signature.
#[derive(Clone, Debug)]
struct OAuthParams {
    /// The consumer key pair that represents the app making the API request.
    consumer: KeyPair,
    /// The token that represents the user authorizing the request, or the request token being
    /// exchanged for an access token. Absent only when fetching a request token.
    token: Option<KeyPair>,
    /// A random token representing the request itself, used by Twitter to de-duplicate requests.
    nonce: String,
    /// A Unix timestamp for when the request was created.
    timestamp: u64,
    /// A callback or verifier parameter, if the request needs one.
    addon: OAuthAddOn,
}

impl OAuthParams {
    /// Creates an `OAuthParams` set with the given keys and a fresh `timestamp` and `nonce`.
    fn from_keys(consumer: KeyPair, token: Option<KeyPair>) -> OAuthParams {
        let timestamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(dur) => dur,
            Err(err) => err.duration(),
        }
        .as_secs();
        let nonce = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect::<String>();
        OAuthParams {
            consumer,
            token,
            nonce,
            timestamp,
            addon: OAuthAddOn::None,
        }
    }

    /// Adds the given callback or verifier to this parameter set.
    fn with_addon(self, addon: OAuthAddOn) -> OAuthParams {
        OAuthParams { addon, ..self }
    }

    /// Generates a signature for the given request and returns the complete header as a
    /// `SignedHeader`.
    fn sign_request(self, method: Method, uri: &str, params: Option<&ParamList>) -> SignedHeader {
        let query_string = {
            let sig_params = params
                .cloned()
                .unwrap_or_default()
                .add_param("oauth_consumer_key", self.consumer.key.clone())
                .add_param("oauth_nonce", self.nonce.clone())
                .add_param("oauth_signature_method", "HMAC-SHA1")
                .add_param("oauth_timestamp", self.timestamp.to_string())
                .add_param("oauth_version", "1.0")
                .add_opt_param("oauth_token", self.token.clone().map(|k| k.key))
                .add_opt_param("oauth_callback", self.addon.as_callback().map(|s| s.to_string()))
                .add_opt_param("oauth_verifier", self.addon.as_verifier().map(|s| s.to_string()));

            let mut query = sig_params
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>();
            query.sort();

            query.join("&")
        };

        let base_str = format!(
            "{}&{}&{}",
            percent_encode(method.as_str()),
            percent_encode(uri),
            percent_encode(&query_string)
        );
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer.secret),
            percent_encode(self.token.as_ref().map(|k| k.secret.as_ref()).unwrap_or(""))
        );

        // HMAC accepts keys of any length, so this cannot fail in practice.
        let mut digest =
            Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC rejected the signing key");
        digest.update(base_str.as_bytes());
        let signature = base64::encode(digest.finalize().into_bytes());

        let mut header: BTreeMap<&'static str, Cow<'static, str>> = BTreeMap::new();
        header.insert("oauth_signature_method", "HMAC-SHA1".into());
        header.insert("oauth_version", "1.0".into());
        header.insert("oauth_consumer_key", self.consumer.key);
        if let Some(token) = self.token {
            header.insert("oauth_token", token.key);
        }
        header.insert("oauth_nonce", self.nonce.into());
        header.insert("oauth_timestamp", self.timestamp.to_string().into());

        match self.addon {
            OAuthAddOn::Callback(c) => {
                header.insert("oauth_callback", c.into());
            }
            OAuthAddOn::Verifier(v) => {
                header.insert("oauth_verifier", v.into());
            }
            OAuthAddOn::None => (),
        }

        header.insert("oauth_signature", signature.into());

        SignedHeader { params: header }
    }
}

/// Represents an "addon" to an OAuth parameter set.
#[derive(Clone, Debug)]
enum OAuthAddOn {
    /// An `oauth_callback` parameter, used when generating a request token.
    Callback(String),
    /// An `oauth_verifier` parameter, used when generating an access token.
    Verifier(String),
    /// Neither parameter is present. This is the default for regular API requests.
    None,
}

impl OAuthAddOn {
    fn as_callback(&self) -> Option<&str> {
        match self {
            OAuthAddOn::Callback(c) => Some(c),
            _ => None,
        }
    }

    fn as_verifier(&self) -> Option<&str> {
        match self {
            OAuthAddOn::Verifier(v) => Some(v),
            _ => None,
        }
    }
}

/// A complete OAuth parameter set with its request signature, ready to be attached to a request.
struct SignedHeader {
    params: BTreeMap<&'static str, Cow<'static, str>>,
}

/// The `Display` impl for `SignedHeader` formats it as an `Authorization` header for an HTTP
/// request.
impl fmt::Display for SignedHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OAuth ")?;

        let mut first = true;
        for (k, v) in &self.params {
            if first {
                first = false;
            } else {
                write!(f, ", ")?;
            }
            write!(f, "{}=\"{}\"", k, percent_encode(v))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The worked example from Twitter's "Creating a signature" documentation.
    fn example_params() -> OAuthParams {
        OAuthParams {
            consumer: KeyPair::new(
                "xvz1evFS4wEEPTGEFPHBog",
                "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            ),
            token: Some(KeyPair::new(
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
                "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
            )),
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string(),
            timestamp: 1318622958,
            addon: OAuthAddOn::None,
        }
    }

    #[test]
    fn signature_matches_twitter_reference_vector() {
        let params = ParamList::new()
            .add_param("include_entities", "true")
            .add_param("status", "Hello Ladies + Gentlemen, a signed OAuth request!");

        let header = example_params().sign_request(
            Method::POST,
            "https://api.twitter.com/1/statuses/update.json",
            Some(&params),
        );

        assert_eq!(
            header.params.get("oauth_signature").map(|s| s.as_ref()),
            Some("tnnArxj06cWHq44gCs1OSKk/jLY=")
        );
    }

    #[test]
    fn header_is_rendered_as_an_oauth_scheme() {
        let header = example_params().sign_request(
            Method::POST,
            "https://api.twitter.com/1/statuses/update.json",
            None,
        );
        let rendered = header.to_string();
        assert!(rendered.starts_with("OAuth "));
        assert!(rendered.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(rendered.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(rendered.contains("oauth_signature=\""));
    }

    #[tokio::test]
    async fn get_requests_keep_params_in_the_query_string() {
        let consumer = KeyPair::new("key", "secret");
        let token = KeyPair::new("123456-token", "tokensecret");
        let params = ParamList::new().add_param("count", "50");

        let req = signed_request(
            Method::GET,
            "https://api.twitter.com/1/statuses/home_timeline.json".to_string(),
            &consumer,
            Some(&token),
            Some(&params),
        )
        .unwrap();

        let query = req.uri().query().unwrap();
        assert!(query.contains("count=50"));
        assert!(!query.contains("oauth_"), "OAuth params leaked into the query: {}", query);

        let auth = req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(auth.contains("oauth_signature="));

        let body = hyper::body::to_bytes(req.into_body()).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn post_requests_keep_params_in_the_body() {
        let consumer = KeyPair::new("key", "secret");
        let token = KeyPair::new("123456-token", "tokensecret");
        let params = ParamList::new().add_param("status", "hello world");

        let req = signed_request(
            Method::POST,
            "https://api.twitter.com/1/statuses/update.json".to_string(),
            &consumer,
            Some(&token),
            Some(&params),
        )
        .unwrap();

        assert!(req.uri().query().is_none());
        assert_eq!(
            req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/x-www-form-urlencoded")
        );

        let body = hyper::body::to_bytes(req.into_body()).await.unwrap();
        let body = std::str::from_utf8(&body).unwrap();
        assert_eq!(body, "status=hello%20world");
        assert!(!body.contains("oauth_"));
    }

    #[test]
    fn unsupported_methods_are_rejected_before_signing() {
        let consumer = KeyPair::new("key", "secret");
        let err = signed_request(
            Method::PUT,
            "https://api.twitter.com/1/statuses/update.json".to_string(),
            &consumer,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(m) if m == Method::PUT));
    }
}
