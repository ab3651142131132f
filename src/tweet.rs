// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The endpoint catalog: timeline reads, status CRUD, and favorites.
//!
//! Every function here follows the same contract:
//!
//! 1. The client must hold a finalized access token. If it doesn't, the call fails with
//!    [`Error::AuthRequired`](crate::error::Error::AuthRequired) before any request is
//!    assembled; no network traffic is generated.
//! 2. Caller-supplied options are merged with any path-derived identifiers and signed into the
//!    request. Option values are passed through as-is; the remote API is the authority on what
//!    is valid, and its verdict surfaces through the transport's status mapping.
//! 3. Exactly one HTTP request is issued, and the raw response body comes back in a
//!    [`Response`](crate::Response). A successful call with an empty body yields `None`.
//!
//! Options bags accept whatever parameters the corresponding API method documents (`count`,
//! `since_id`, `max_id`, `page`, `trim_user`, `include_rts`, `include_entities`, and for
//! [`user_timeline`] the `user_id`/`screen_name` selectors); this crate does not model them.

use crate::common::*;
use crate::links;
use crate::Client;

/// `statuses/home_timeline`: the authorized user's main timeline view.
pub async fn home_timeline(client: &Client, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    client
        .raw_get(client.endpoint_url(links::statuses::HOME_TIMELINE), params.as_ref())
        .await
}

/// `statuses/friends_timeline`: like [`home_timeline`], but only includes native retweets when
/// the `include_rts` option is set.
pub async fn friends_timeline(client: &Client, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    client
        .raw_get(client.endpoint_url(links::statuses::FRIENDS_TIMELINE), params.as_ref())
        .await
}

/// `statuses/user_timeline`: a single user's timeline view. Select the user with a `user_id` or
/// `screen_name` option; with neither, the API returns the authorized user's own timeline.
pub async fn user_timeline(client: &Client, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    client
        .raw_get(client.endpoint_url(links::statuses::USER_TIMELINE), params.as_ref())
        .await
}

/// `statuses/mentions`: tweets mentioning the authorized user.
pub async fn mentions(client: &Client, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    client
        .raw_get(client.endpoint_url(links::statuses::MENTIONS), params.as_ref())
        .await
}

/// `statuses/retweeted_by_me`: the authorized user's own retweets.
pub async fn retweeted_by_me(client: &Client, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    client
        .raw_get(client.endpoint_url(links::statuses::RETWEETED_BY_ME), params.as_ref())
        .await
}

/// `statuses/retweeted_to_me`: retweets by the users the authorized user follows.
pub async fn retweeted_to_me(client: &Client, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    client
        .raw_get(client.endpoint_url(links::statuses::RETWEETED_TO_ME), params.as_ref())
        .await
}

/// `statuses/retweets_of_me`: the authorized user's tweets that others have retweeted.
pub async fn retweets_of_me(client: &Client, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    client
        .raw_get(client.endpoint_url(links::statuses::RETWEETS_OF_ME), params.as_ref())
        .await
}

/// `statuses/update`: post a tweet as the authorized user.
///
/// The message lands in the `status` parameter; options such as `in_reply_to_status_id`, `lat`,
/// `long`, or `place_id` ride along in the options bag.
pub async fn update(
    client: &Client,
    message: impl Into<CowStr>,
    params: Option<ParamList>,
) -> WebResponse {
    client.assert_authorized()?;
    let params = params.unwrap_or_default().add_param("status", message.into());
    client
        .raw_post(client.endpoint_url(links::statuses::UPDATE), Some(&params))
        .await
}

/// `statuses/show`: look up a single tweet by numeric ID.
pub async fn show(client: &Client, id: u64, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    let params = params.unwrap_or_default().add_param("id", id.to_string());
    let url = client.endpoint_url(&format!("{}/{}.json", links::statuses::SHOW_STEM, id));
    client.raw_get(url, Some(&params)).await
}

/// `statuses/destroy`: delete a tweet. The authorized user must be its author.
pub async fn delete(client: &Client, id: u64, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    let params = params.unwrap_or_default().add_param("id", id.to_string());
    let url = client.endpoint_url(&format!("{}/{}.json", links::statuses::DESTROY_STEM, id));
    client.raw_post(url, Some(&params)).await
}

/// `statuses/retweet`: retweet a tweet as the authorized user.
pub async fn retweet(client: &Client, id: u64, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    let params = params.unwrap_or_default().add_param("id", id.to_string());
    let url = client.endpoint_url(&format!("{}/{}.json", links::statuses::RETWEET_STEM, id));
    client.raw_post(url, Some(&params)).await
}

/// `statuses/retweets`: the most recent retweets of the given tweet.
pub async fn retweets_of(client: &Client, id: u64, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    let params = params.unwrap_or_default().add_param("id", id.to_string());
    let url = client.endpoint_url(&format!("{}/{}.json", links::statuses::RETWEETS_STEM, id));
    client.raw_get(url, Some(&params)).await
}

/// `statuses/{id}/retweeted_by`: up to 100 users who retweeted the given tweet.
pub async fn retweeted_by(client: &Client, id: u64, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    let params = params.unwrap_or_default().add_param("id", id.to_string());
    let url = client.endpoint_url(&format!(
        "{}/{}/retweeted_by.json",
        links::statuses::STATUS_STEM,
        id
    ));
    client.raw_get(url, Some(&params)).await
}

/// `statuses/{id}/retweeted_by/ids`: up to 100 user IDs who retweeted the given tweet.
pub async fn retweeted_by_ids(client: &Client, id: u64, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    let params = params.unwrap_or_default().add_param("id", id.to_string());
    let url = client.endpoint_url(&format!(
        "{}/{}/retweeted_by/ids.json",
        links::statuses::STATUS_STEM,
        id
    ));
    client.raw_get(url, Some(&params)).await
}

/// `favorites/create`: favorite a tweet as the authorized user.
pub async fn favorite(client: &Client, id: u64, params: Option<ParamList>) -> WebResponse {
    client.assert_authorized()?;
    let params = params
        .unwrap_or_default()
        .add_param("status_id", id.to_string());
    let url = client.endpoint_url(&format!("{}/{}.json", links::favorites::CREATE_STEM, id));
    client.raw_post(url, Some(&params)).await
}
