//! Executing requests over the network.
//!
//! # Design
//! Clients never touch sockets directly: they hand an `HttpRequest` to a
//! [`Transport`] and classify whatever `HttpResponse` comes back. The
//! default transport is a blocking ureq agent configured so that 4xx/5xx
//! responses are returned as data rather than as errors; only failures that
//! produce no response at all become [`ApiError::Transport`].

use std::fmt;

use tracing::{debug, warn};
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::status::Operation;

/// Executes one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(&url), &headers), body),
            HttpMethod::Put => send(with_headers(self.agent.put(&url), &headers), body),
        };
        let mut response = result.map_err(request_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Failures to form the request are the caller's URL, not the network.
fn request_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Http(_) | ureq::Error::BadUri(_) => ApiError::InvalidUrl(err.to_string()),
        other => ApiError::Transport(other.to_string()),
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Run `request` for `operation`, logging both ends of the exchange.
pub(crate) fn dispatch<T: Transport + ?Sized>(
    transport: &T,
    operation: Operation,
    request: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    debug!(%operation, method = request.method.as_str(), url = %request.url, "sending request");
    match transport.execute(request) {
        Ok(response) => {
            debug!(%operation, status = response.status, "received response");
            Ok(response)
        }
        Err(err) => {
            warn!(%operation, error = %err, "request failed");
            Err(err)
        }
    }
}
