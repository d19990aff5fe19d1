//! Client configuration.

use std::str::FromStr;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const ENV_BASE_URL: &str = "MF_SDK_URL";
pub const ENV_ROUTE_STYLE: &str = "MF_SDK_ROUTE_STYLE";

/// How request URLs are assembled.
///
/// `Literal` matches what deployed servers have always received: ids and
/// query values are concatenated without encoding, the channel-things query
/// is `?offset0&limit10&`, and connect ids are joined without a separator.
/// `Encoded` builds every URL with percent-encoded segments and `key=value`
/// query pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteStyle {
    #[default]
    Literal,
    Encoded,
}

impl FromStr for RouteStyle {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(RouteStyle::Literal),
            "encoded" => Ok(RouteStyle::Encoded),
            other => Err(ApiError::InvalidConfig(format!("unknown route style: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub route_style: RouteStyle,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            route_style: RouteStyle::default(),
        }
    }

    pub fn with_route_style(mut self, style: RouteStyle) -> Self {
        self.route_style = style;
        self
    }

    /// Read `MF_SDK_URL` and `MF_SDK_ROUTE_STYLE`, falling back to
    /// `http://localhost` and the literal style.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(ApiError::InvalidConfig(format!("{ENV_BASE_URL} is empty")));
        }
        let route_style = match lookup(ENV_ROUTE_STYLE) {
            Some(raw) => raw.parse()?,
            None => RouteStyle::default(),
        };
        Ok(Self::new(&base_url).with_route_style(route_style))
    }
}
