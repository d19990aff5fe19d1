//! URL construction for both route styles.
//!
//! Literal URLs are assembled by plain concatenation and then passed through
//! the URL parser, which escapes only what a URI cannot carry (spaces,
//! quotes, angle brackets, non-ASCII) and leaves the assembled shape alone.

use url::Url;

use crate::config::{ClientConfig, RouteStyle};
use crate::error::ApiError;

type Pairs = [(&'static str, String)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Routes {
    base_url: String,
    style: RouteStyle,
}

impl Routes {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            style: config.route_style,
        }
    }

    /// `{base}/seg/seg/...`
    pub(crate) fn resource(&self, segments: &[&str]) -> Result<String, ApiError> {
        self.listing(segments, &[])
    }

    /// `{base}/seg/...?key=value&...`, omitting the `?` when there are no
    /// pairs.
    pub(crate) fn listing(&self, segments: &[&str], pairs: &Pairs) -> Result<String, ApiError> {
        match self.style {
            RouteStyle::Literal => {
                let mut url = self.literal_path(segments);
                if !pairs.is_empty() {
                    let query: Vec<String> =
                        pairs.iter().map(|(key, value)| format!("{key}={value}")).collect();
                    url.push('?');
                    url.push_str(&query.join("&"));
                }
                requote(&url)
            }
            RouteStyle::Encoded => self.encoded(segments, pairs),
        }
    }

    /// Things connected to a channel. The literal query glues each key to
    /// its value and terminates every pair with `&`.
    pub(crate) fn channel_things(&self, chan_id: &str, pairs: &Pairs) -> Result<String, ApiError> {
        let segments = ["channels", chan_id, "things"];
        match self.style {
            RouteStyle::Literal => {
                let mut url = self.literal_path(&segments);
                url.push('?');
                for (key, value) in pairs {
                    url.push_str(key);
                    url.push_str(value);
                    url.push('&');
                }
                requote(&url)
            }
            RouteStyle::Encoded => self.encoded(&segments, pairs),
        }
    }

    /// Connect endpoint. The literal form concatenates both ids into one
    /// segment.
    pub(crate) fn connect(&self, thing_id: &str, chan_id: &str) -> Result<String, ApiError> {
        match self.style {
            RouteStyle::Literal => {
                requote(&self.literal_path(&["connect", &format!("{thing_id}{chan_id}")]))
            }
            RouteStyle::Encoded => self.encoded(&["connect", thing_id, chan_id], &[]),
        }
    }

    fn literal_path(&self, segments: &[&str]) -> String {
        format!("{}/{}", self.base_url, segments.join("/"))
    }

    fn encoded(&self, segments: &[&str], pairs: &Pairs) -> Result<String, ApiError> {
        let mut url = parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url.into())
    }
}

fn parse(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

/// Escape the characters a URI cannot carry, keeping every delimiter.
fn requote(raw: &str) -> Result<String, ApiError> {
    parse(raw).map(String::from)
}
