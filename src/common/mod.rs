// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Basic building blocks shared by the rest of the crate.
//!
//! The types in here are deliberately small: a parameter collection that the signer and the
//! endpoint functions pass around, the percent-encoding function that OAuth 1.0a requires, and
//! (in the `response` submodule) the wrapper that carries rate-limit telemetry alongside a
//! response payload.

use std::borrow::Cow;
use std::collections::HashMap;

use hyper::header::{HeaderMap, HeaderValue};
use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode};

mod response;

pub use self::response::*;

/// A set of headers returned with a response.
pub type Headers = HeaderMap<HeaderValue>;

/// Convenient alias for strings that are either borrowed literals or owned values.
pub type CowStr = Cow<'static, str>;

/// Represents a list of parameters to a Twitter API call.
///
/// This type is a wrapper around a `HashMap<Cow<'static, str>, Cow<'static, str>>` used to
/// collect the key/value pairs that make up a call's options bag. The `Cow` type is used to
/// avoid allocating a `String` when a string literal is used for a parameter; every function
/// that adds parameters accepts `impl Into<Cow<'static, str>>`, so both literals and owned
/// `String`s work.
///
/// The adding functions follow a builder pattern, so a `ParamList` can be assembled in a single
/// statement:
///
/// ```
/// use tern::ParamList;
///
/// let params = ParamList::new()
///     .add_param("count", "50")
///     .add_opt_param("since_id", Some("12345".to_string()));
/// ```
///
/// No client-side validation of parameter values is performed; invalid values are passed through
/// to the remote API, whose error response surfaces through the transport's status mapping.
#[derive(Debug, Clone, Default, derive_more::Deref, derive_more::DerefMut, derive_more::From)]
pub struct ParamList(HashMap<Cow<'static, str>, Cow<'static, str>>);

impl ParamList {
    /// Creates a new, empty `ParamList`.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Adds the given key/value parameter to this `ParamList`.
    pub fn add_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Adds the given key/value parameter to this `ParamList` only if the given value is `Some`.
    ///
    /// If the given value is `None`, the `ParamList` is returned unmodified.
    pub fn add_opt_param(
        self,
        key: impl Into<Cow<'static, str>>,
        value: Option<impl Into<Cow<'static, str>>>,
    ) -> Self {
        match value {
            Some(val) => self.add_param(key.into(), val.into()),
            None => self,
        }
    }

    /// Merge the parameters from the given `ParamList` into this one.
    pub(crate) fn combine(&mut self, other: ParamList) {
        self.0.extend(other.0);
    }

    /// Renders this `ParamList` as an `application/x-www-form-urlencoded` string.
    ///
    /// The key/value pairs are printed as `key1=value1&key2=value2`, with all keys and values
    /// being percent-encoded according to Twitter's requirements.
    pub fn to_urlencoded(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-encodes the given string based on the Twitter API specification.
///
/// Twitter bases its encoding scheme on RFC 3986, Section 2.1: every *byte* that is not an ASCII
/// number or letter, or one of the ASCII characters `-`, `.`, `_`, or `~`, must be replaced with
/// a percent sign (`%`) and the byte value in hexadecimal. Both the OAuth signature base string
/// and all transmitted parameters use this encoding.
pub fn percent_encode(src: &str) -> PercentEncode {
    lazy_static::lazy_static! {
        static ref ENCODER: AsciiSet = percent_encoding::NON_ALPHANUMERIC
            .remove(b'-')
            .remove(b'.')
            .remove(b'_')
            .remove(b'~');
    }
    utf8_percent_encode(src, &*ENCODER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_encoding_matches_twitter_rules() {
        assert_eq!(
            percent_encode("Ladies + Gentlemen").to_string(),
            "Ladies%20%2B%20Gentlemen"
        );
        assert_eq!(
            percent_encode("An encoded string!").to_string(),
            "An%20encoded%20string%21"
        );
        assert_eq!(
            percent_encode("Dogs, Cats & Mice").to_string(),
            "Dogs%2C%20Cats%20%26%20Mice"
        );
        assert_eq!(percent_encode("\u{2603}").to_string(), "%E2%98%83");
        assert_eq!(percent_encode("safe-._~chars").to_string(), "safe-._~chars");
    }

    #[test]
    fn urlencoding_percent_encodes_both_sides() {
        let params = ParamList::new().add_param("status", "hello world");
        assert_eq!(params.to_urlencoded(), "status=hello%20world");
    }

    #[test]
    fn opt_param_is_skipped_when_none() {
        let params = ParamList::new()
            .add_opt_param("count", None::<String>)
            .add_opt_param("page", Some("2"));
        assert!(params.get("count").is_none());
        assert_eq!(params.get("page").map(|v| v.as_ref()), Some("2"));
    }
}
