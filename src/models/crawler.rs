// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Crawler classification and canonical URL construction.
//!
//! Classification is a pure function of the request query string so the
//! "what counts as a crawler" policy can change without touching the
//! rendering path. No user-agent sniffing: the only signal is the reserved
//! escaped-fragment marker that AJAX-crawling user agents append.

use std::borrow::Cow;

/// Reserved query parameter a crawler appends to ask for pre-rendered
/// content. Its value carries the original `#!` fragment, if any.
pub const ESCAPED_FRAGMENT_PARAM: &str = "_escaped_fragment_";

/// Classification of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlerSignal {
    /// The request carries the escaped-fragment marker. `fragment` is the
    /// marker's (decoded) value, empty for a bare `?_escaped_fragment_=`.
    Crawler { fragment: String },
    /// A regular browser request; serve the application shell untouched.
    Browser,
}

impl CrawlerSignal {
    /// Classify a request from its raw query string.
    pub fn from_query(query: Option<&str>) -> Self {
        let Some(query) = query else {
            return CrawlerSignal::Browser;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == ESCAPED_FRAGMENT_PARAM {
                return CrawlerSignal::Crawler {
                    fragment: value.into_owned(),
                };
            }
        }
        CrawlerSignal::Browser
    }

    pub fn is_crawler(&self) -> bool {
        matches!(self, CrawlerSignal::Crawler { .. })
    }
}

/// Build the canonical path+query the renderer should load: the request
/// path with the marker stripped, every other query parameter preserved,
/// and the fragment restored in `#!` hashbang form when non-empty.
pub fn canonical_path_query(path: &str, query: Option<&str>) -> String {
    let mut fragment: Option<Cow<'_, str>> = None;
    let mut rest = url::form_urlencoded::Serializer::new(String::new());

    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == ESCAPED_FRAGMENT_PARAM {
                fragment = Some(value);
            } else {
                rest.append_pair(&key, &value);
            }
        }
    }

    let rest = rest.finish();
    let mut canonical = String::from(path);
    if !rest.is_empty() {
        canonical.push('?');
        canonical.push_str(&rest);
    }
    if let Some(fragment) = fragment {
        if !fragment.is_empty() {
            canonical.push_str("#!");
            canonical.push_str(&fragment);
        }
    }
    canonical
}
