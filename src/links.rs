// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Endpoint paths for the API methods this crate wraps.
//!
//! These are paths relative to the configured API base, since the host is a construction
//! parameter. Entries ending in `_STEM` are completed with a status ID by their endpoint
//! function.

pub mod auth {
    pub const REQUEST_TOKEN: &str = "oauth/request_token";
    pub const AUTHORIZE: &str = "oauth/authorize";
    pub const ACCESS_TOKEN: &str = "oauth/access_token";
}

pub mod statuses {
    pub const HOME_TIMELINE: &str = "1/statuses/home_timeline.json";
    pub const FRIENDS_TIMELINE: &str = "1/statuses/friends_timeline.json";
    pub const USER_TIMELINE: &str = "1/statuses/user_timeline.json";
    pub const MENTIONS: &str = "1/statuses/mentions.json";
    pub const RETWEETED_BY_ME: &str = "1/statuses/retweeted_by_me.json";
    pub const RETWEETED_TO_ME: &str = "1/statuses/retweeted_to_me.json";
    pub const RETWEETS_OF_ME: &str = "1/statuses/retweets_of_me.json";
    pub const UPDATE: &str = "1/statuses/update.json";
    pub const SHOW_STEM: &str = "1/statuses/show";
    pub const DESTROY_STEM: &str = "1/statuses/destroy";
    pub const RETWEET_STEM: &str = "1/statuses/retweet";
    pub const RETWEETS_STEM: &str = "1/statuses/retweets";
    /// Stem for the `statuses/{id}/retweeted_by` family, where the ID lands mid-path.
    pub const STATUS_STEM: &str = "1/statuses";
}

pub mod favorites {
    pub const CREATE_STEM: &str = "1/favorites/create";
}
