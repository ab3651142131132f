// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! OAuth 1.0a credentials and the user-authorization flow.
//!
//! Twitter's OAuth flow for these endpoints is a three-step exchange:
//!
//! 1. [`Client::authorization_url`] fetches a *request token* and returns the URL the user must
//!    visit to approve the application. The client's [`AuthState`] moves from `Unrequested` to
//!    `Pending`.
//! 2. The user approves the request and receives a verifier: either a PIN (for the out-of-band
//!    flow, the default) or an `oauth_verifier` parameter delivered to the configured callback
//!    URL.
//! 3. [`Client::access_token`] exchanges the request token plus the verifier for a finalized
//!    *access token*, moving the state to `Authorized`. The finalized token can be saved with
//!    [`Client::auth_tokens`] and restored later with [`Client::restore_tokens`] without
//!    repeating the exchange.
//!
//! The state is derived purely from the stored token: finalized access tokens issued by Twitter
//! carry a numeric user-id prefix (`{id}-{random}`), which is how a restored token is
//! distinguished from a still-pending request token.

pub(crate) mod raw;

use std::borrow::Cow;

use hyper::Method;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::{links, Client};

/// A key/secret pair representing OAuth credentials: either the application's consumer
/// credentials, or a request/access token obtained during authorization.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// The key portion of the credential, transmitted with requests.
    pub key: Cow<'static, str>,
    /// The secret portion, used only to derive request signatures.
    pub secret: Cow<'static, str>,
}

impl KeyPair {
    /// Creates a KeyPair with the given key and secret.
    ///
    /// This can be called with either `&'static str` (a string literal) or `String`. In the
    /// former case the resulting KeyPair has a `'static` lifetime without allocating.
    pub fn new(key: impl Into<Cow<'static, str>>, secret: impl Into<Cow<'static, str>>) -> KeyPair {
        KeyPair {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// Where a client stands in the user-authorization flow.
///
/// Derived from the token the client currently holds; see the [module docs](self) for how the
/// states connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token is present; authorization has not been requested.
    Unrequested,
    /// A request token is present but has not yet been exchanged for an access token.
    Pending,
    /// A finalized access token is present; calls on behalf of the user are possible.
    Authorized,
}

impl AuthState {
    /// Derives the authorization state from the token a client holds. Finalized access tokens
    /// are recognized by their numeric-id prefix.
    pub(crate) fn derive(token: Option<&KeyPair>) -> AuthState {
        lazy_static! {
            static ref ACCESS_TOKEN_SHAPE: Regex = Regex::new("^[0-9]+-").unwrap();
        }
        match token {
            None => AuthState::Unrequested,
            Some(token) if ACCESS_TOKEN_SHAPE.is_match(&token.key) => AuthState::Authorized,
            Some(_) => AuthState::Pending,
        }
    }
}

/// The identity Twitter reported for the user who completed an authorization exchange.
#[derive(Debug, Clone)]
pub struct Verified {
    /// The authorizing user's numeric ID.
    pub user_id: u64,
    /// The authorizing user's screen name.
    pub screen_name: String,
}

/// Picks a single parameter out of a form-encoded response body.
fn form_param<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    body.split('&').find_map(|elem| {
        let mut kv = elem.splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some(key), Some(value)) if key == name => Some(value),
            _ => None,
        }
    })
}

impl Client {
    /// Where this client stands in the authorization flow.
    pub fn auth_state(&self) -> AuthState {
        AuthState::derive(self.token.as_ref())
    }

    /// Whether this client holds a finalized access token and can act on the user's behalf.
    pub fn is_authorized(&self) -> bool {
        self.auth_state() == AuthState::Authorized
    }

    /// Short-circuits calls that require authorization. Records an auth-required error and bails
    /// before any request is assembled.
    pub(crate) fn assert_authorized(&self) -> Result<()> {
        if self.is_authorized() {
            Ok(())
        } else {
            let err = Error::AuthRequired;
            self.register_error(&err);
            Err(err)
        }
    }

    /// Begins the authorization flow: fetches a request token and returns the URL the user must
    /// visit to approve the application.
    ///
    /// On success the client holds the request token (state becomes [`AuthState::Pending`]) and
    /// the returned URL can be opened by or shown to the user. Once they approve the request,
    /// pass the verifier they receive to [`Client::access_token`].
    pub async fn authorization_url(&mut self) -> Result<String> {
        let req = raw::RequestBuilder::new(Method::POST, self.endpoint_url(links::auth::REQUEST_TOKEN))
            .oauth_callback(self.config.callback_url.clone())
            .request_keys(&self.consumer, None)?;
        let resp = self.execute(req).await?;
        let body = resp.response.ok_or(Error::InvalidResponse)?;

        let key = form_param(&body, "oauth_token").ok_or(Error::MissingValue("oauth_token"))?;
        let secret =
            form_param(&body, "oauth_token_secret").ok_or(Error::MissingValue("oauth_token_secret"))?;
        let token = KeyPair::new(key.to_string(), secret.to_string());

        tracing::debug!("request token stored; awaiting user approval");
        let url = format!(
            "{}?oauth_token={}",
            self.endpoint_url(links::auth::AUTHORIZE),
            token.key
        );
        self.token = Some(token);
        Ok(url)
    }

    /// "Sign in with Twitter" for web applications.
    ///
    /// The upstream service also offers an authentication variant of the authorization flow,
    /// available only to apps with a real callback URL. This crate does not implement it yet.
    pub fn authenticate_url(&self) -> Result<String> {
        let err = Error::NotImplemented;
        self.register_error(&err);
        Err(err)
    }

    /// Completes the authorization flow: exchanges the stored request token and the user's
    /// verifier for a finalized access token.
    ///
    /// For the out-of-band flow (the default `"oob"` callback), the verifier is the PIN shown to
    /// the user; a non-numeric PIN is rejected locally with [`Error::MalformedPin`] before any
    /// network call. On success the access token replaces the request token (state becomes
    /// [`AuthState::Authorized`]) and the authorizing user's identity is returned.
    pub async fn access_token(&mut self, verifier: impl Into<String>) -> Result<Verified> {
        let verifier = verifier.into();
        if self.config.callback_url == "oob"
            && (verifier.is_empty() || !verifier.bytes().all(|b| b.is_ascii_digit()))
        {
            let err = Error::MalformedPin(verifier);
            self.register_error(&err);
            return Err(err);
        }

        let req = raw::RequestBuilder::new(Method::POST, self.endpoint_url(links::auth::ACCESS_TOKEN))
            .oauth_verifier(verifier)
            .request_keys(&self.consumer, self.token.as_ref())?;
        let resp = self.execute(req).await?;
        let body = resp.response.ok_or(Error::InvalidResponse)?;

        let key = form_param(&body, "oauth_token").ok_or(Error::MissingValue("oauth_token"))?;
        let secret =
            form_param(&body, "oauth_token_secret").ok_or(Error::MissingValue("oauth_token_secret"))?;
        let user_id = form_param(&body, "user_id")
            .and_then(|s| s.parse().ok())
            .ok_or(Error::MissingValue("user_id"))?;
        let screen_name = form_param(&body, "screen_name")
            .ok_or(Error::MissingValue("screen_name"))?
            .to_string();

        self.token = Some(KeyPair::new(key.to_string(), secret.to_string()));
        tracing::debug!(user_id, %screen_name, "access token exchanged");
        Ok(Verified {
            user_id,
            screen_name,
        })
    }

    /// The authorized token pair, for applications that want to save it and restore the user
    /// later with [`Client::restore_tokens`].
    ///
    /// Returns [`Error::AuthRequired`] unless the client holds a finalized access token.
    pub fn auth_tokens(&self) -> Result<&KeyPair> {
        match &self.token {
            Some(token) if self.is_authorized() => Ok(token),
            _ => {
                let err = Error::AuthRequired;
                self.register_error(&err);
                Err(err)
            }
        }
    }

    /// Restores a previously authorized user from saved tokens.
    ///
    /// A token with the finalized access-token shape yields [`AuthState::Authorized`] directly;
    /// no verification call is made.
    pub fn restore_tokens(
        &mut self,
        key: impl Into<Cow<'static, str>>,
        secret: impl Into<Cow<'static, str>>,
    ) {
        self.token = Some(KeyPair::new(key, secret));
    }

    /// Discards any stored token, signing the user out of this client instance.
    pub fn clear_tokens(&mut self) {
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::Config;

    fn client() -> Client {
        Client::new("key", "secret", Config::default()).unwrap()
    }

    #[test]
    fn fresh_clients_are_unrequested() {
        let client = client();
        assert_eq!(client.auth_state(), AuthState::Unrequested);
        assert!(!client.is_authorized());
    }

    #[test]
    fn request_tokens_are_pending_and_access_tokens_are_authorized() {
        let mut client = client();

        client.restore_tokens("NPcudxy0yU5T3tBzho7iCotZ3cnetKwcTIRlX0iwRl0", "secret");
        assert_eq!(client.auth_state(), AuthState::Pending);

        client.restore_tokens("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb", "secret");
        assert_eq!(client.auth_state(), AuthState::Authorized);

        client.clear_tokens();
        assert_eq!(client.auth_state(), AuthState::Unrequested);
    }

    #[test]
    fn auth_tokens_require_a_finalized_token() {
        let mut client = client();
        assert!(matches!(client.auth_tokens(), Err(Error::AuthRequired)));
        assert_eq!(
            client.last_error().map(|e| e.code),
            Some(ErrorCode::AuthRequired)
        );

        client.restore_tokens("12345-finalized", "secret");
        let tokens = client.auth_tokens().unwrap();
        assert_eq!(tokens.key, "12345-finalized");
    }

    #[tokio::test]
    async fn out_of_band_pins_must_be_numeric() {
        let mut client = client();
        client.restore_tokens("request-token", "secret");

        let err = client.access_token("71O8").await.unwrap_err();
        assert!(matches!(err, Error::MalformedPin(_)));
        assert_eq!(
            client.last_error().map(|e| e.code),
            Some(ErrorCode::MalformedPin)
        );

        let err = client.access_token("").await.unwrap_err();
        assert!(matches!(err, Error::MalformedPin(_)));
    }

    #[test]
    fn authenticate_url_is_not_implemented() {
        let client = client();
        assert!(matches!(client.authenticate_url(), Err(Error::NotImplemented)));
        assert_eq!(
            client.last_error().map(|e| e.code),
            Some(ErrorCode::NotImplemented)
        );
    }

    #[test]
    fn form_bodies_are_split_on_demand() {
        let body = "oauth_token=abc&oauth_token_secret=def&user_id=42&screen_name=tern";
        assert_eq!(form_param(body, "oauth_token"), Some("abc"));
        assert_eq!(form_param(body, "oauth_token_secret"), Some("def"));
        assert_eq!(form_param(body, "user_id"), Some("42"));
        assert_eq!(form_param(body, "missing"), None);
    }
}
