//! Groups client.
//!
//! # Design
//! Same split as the things client: each operation has a `build_*` method
//! producing an `HttpRequest`, a `parse_*` method classifying the
//! `HttpResponse`, and a one-call method that runs both through the
//! client's transport.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::routes::Routes;
use crate::status::Operation;
use crate::transport::{dispatch, Transport, UreqTransport};
use crate::types::{Group, GroupQuery};

/// Stateless client for the `/groups` resource.
#[derive(Debug, Clone)]
pub struct GroupsClient<T = UreqTransport> {
    routes: Routes,
    transport: T,
}

impl GroupsClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T> GroupsClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            routes: Routes::new(config),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_create(&self, group: &Group, token: &str) -> Result<HttpRequest, ApiError> {
        HttpRequest::new(HttpMethod::Post, self.routes.resource(&["groups"])?)
            .authorized(token)
            .json(group)
    }

    pub fn build_get(&self, group_id: &str, token: &str) -> Result<HttpRequest, ApiError> {
        let url = self.routes.resource(&["groups", group_id])?;
        Ok(HttpRequest::new(HttpMethod::Get, url).authorized(token))
    }

    pub fn build_get_all(&self, query: &GroupQuery, token: &str) -> Result<HttpRequest, ApiError> {
        let url = self.routes.listing(&["groups"], &query.pairs())?;
        Ok(HttpRequest::new(HttpMethod::Get, url).authorized(token))
    }

    pub fn build_update(&self, group: &Group, token: &str) -> Result<HttpRequest, ApiError> {
        let id = group.id.as_deref().ok_or(ApiError::MissingId)?;
        HttpRequest::new(HttpMethod::Put, self.routes.resource(&["groups", id])?)
            .authorized(token)
            .json(group)
    }

    pub fn build_delete(&self, group_id: &str, token: &str) -> Result<HttpRequest, ApiError> {
        let url = self.routes.resource(&["groups", group_id])?;
        Ok(HttpRequest::new(HttpMethod::Delete, url).authorized(token))
    }

    /// Returns the new group's id, taken from the `Location` header.
    pub fn parse_create(&self, response: HttpResponse) -> Result<String, ApiError> {
        Operation::CreateGroup.check(response.status)?;
        response.location_id()
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Group, ApiError> {
        Operation::GetGroup.check(response.status)?;
        response.json()
    }

    /// The page body is returned as-is.
    pub fn parse_get_all(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Operation::ListGroups.check(response.status)?;
        response.json_payload()
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ApiError> {
        Operation::UpdateGroup.check(response.status)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        Operation::DeleteGroup.check(response.status)
    }
}

impl<T: Transport> GroupsClient<T> {
    pub fn create(&self, group: &Group, token: &str) -> Result<String, ApiError> {
        let request = self.build_create(group, token)?;
        self.parse_create(dispatch(&self.transport, Operation::CreateGroup, request)?)
    }

    pub fn get(&self, group_id: &str, token: &str) -> Result<Group, ApiError> {
        let request = self.build_get(group_id, token)?;
        self.parse_get(dispatch(&self.transport, Operation::GetGroup, request)?)
    }

    pub fn get_all(&self, query: &GroupQuery, token: &str) -> Result<Value, ApiError> {
        let request = self.build_get_all(query, token)?;
        self.parse_get_all(dispatch(&self.transport, Operation::ListGroups, request)?)
    }

    pub fn update(&self, group: &Group, token: &str) -> Result<(), ApiError> {
        let request = self.build_update(group, token)?;
        self.parse_update(dispatch(&self.transport, Operation::UpdateGroup, request)?)
    }

    pub fn delete(&self, group_id: &str, token: &str) -> Result<(), ApiError> {
        let request = self.build_delete(group_id, token)?;
        self.parse_delete(dispatch(&self.transport, Operation::DeleteGroup, request)?)
    }
}
