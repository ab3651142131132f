// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A lightweight, needs-must wrapper for the Twitter v1 REST API.
//!
//! This crate handles the three chores every call to the API shares, and deliberately nothing
//! more: signing requests with OAuth 1.0a, dispatching them over HTTPS, and handing the raw
//! response body back to you. It does not model tweets or users as types; what Twitter returns
//! is what you get. The endpoints it wraps are the timeline reads, status operations, and
//! favorites in the [`tweet`] module, plus the authorization flow on [`Client`] itself.
//!
//! # Getting started
//!
//! Create a [`Client`] from your application's consumer credentials, then either walk the user
//! through the authorization flow or restore tokens you saved from a previous session:
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> tern::error::Result<()> {
//! use tern::{Client, Config, ParamList};
//!
//! let mut client = Client::new("consumer key", "consumer secret", Config::default())?;
//!
//! // First-time authorization over the out-of-band (PIN) flow.
//! let url = client.authorization_url().await?;
//! println!("visit {} and approve the request, then enter the PIN", url);
//! # let pin = "1234567";
//! let verified = client.access_token(pin).await?;
//! println!("signed in as @{}", verified.screen_name);
//!
//! // Save these to skip the flow next time; restore with `restore_tokens`.
//! let _tokens = client.auth_tokens()?.clone();
//!
//! let params = ParamList::new().add_param("count", "50");
//! let timeline = tern::tweet::home_timeline(&client, Some(params)).await?;
//! if let Some(body) = timeline.response {
//!     println!("{}", body);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors and diagnostics
//!
//! Every operation resolves to a [`error::Result`]. Failures map onto a small fixed taxonomy
//! ([`error::ErrorCode`]); the client additionally records its most recent failure
//! ([`Client::last_error`]) and the rate-limit headers from its most recent response
//! ([`Client::rate_limit_status`]). Internal logging goes through [`tracing`]; install a
//! subscriber to see it.
//!
//! # TLS
//!
//! The `native_tls` feature (default) uses the platform TLS stack via `hyper-tls`. Disable
//! default features and enable `rustls` or `rustls_webpki` to use rustls instead.

pub mod auth;
mod client;
mod common;
pub mod error;
mod links;
pub mod tweet;

pub use crate::auth::{AuthState, KeyPair, Verified};
pub use crate::client::{Client, Config};
pub use crate::common::{percent_encode, CowStr, Headers, ParamList, RateLimit, RawBody, Response, WebResponse};
