use std::cell::RefCell;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Records every request and answers each with the same canned response
/// (500 when none was given).
#[derive(Debug, Default)]
pub(crate) struct Scripted {
    response: Option<HttpResponse>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl Scripted {
    pub(crate) fn replying(response: HttpResponse) -> Self {
        Self {
            response: Some(response),
            requests: RefCell::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for Scripted {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request);
        Ok(self.response.clone().unwrap_or_else(|| HttpResponse::new(500)))
    }
}
