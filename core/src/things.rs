//! Things client, including the thing/channel relationship calls.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::routes::Routes;
use crate::status::Operation;
use crate::transport::{dispatch, Transport, UreqTransport};
use crate::types::{ChannelThingsQuery, ConnectRequest, Thing, ThingQuery};

/// Stateless client for `/things`, `/bulk`, `/connect` and
/// `/channels/{id}/things`.
#[derive(Debug, Clone)]
pub struct ThingsClient<T = UreqTransport> {
    routes: Routes,
    transport: T,
}

impl ThingsClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T> ThingsClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            routes: Routes::new(config),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_create(&self, thing: &Thing, token: &str) -> Result<HttpRequest, ApiError> {
        HttpRequest::new(HttpMethod::Post, self.routes.resource(&["things"])?)
            .authorized(token)
            .json(thing)
    }

    pub fn build_create_bulk(
        &self,
        things: &[Thing],
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        HttpRequest::new(HttpMethod::Post, self.routes.resource(&["bulk"])?)
            .authorized(token)
            .json(things)
    }

    pub fn build_get(&self, thing_id: &str, token: &str) -> Result<HttpRequest, ApiError> {
        let url = self.routes.resource(&["things", thing_id])?;
        Ok(HttpRequest::new(HttpMethod::Get, url).authorized(token))
    }

    pub fn build_get_all(&self, query: &ThingQuery, token: &str) -> Result<HttpRequest, ApiError> {
        let url = self.routes.listing(&["things"], &query.pairs())?;
        Ok(HttpRequest::new(HttpMethod::Get, url).authorized(token))
    }

    /// The remote API serves this listing on POST.
    pub fn build_get_by_channel(
        &self,
        chan_id: &str,
        query: &ChannelThingsQuery,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.routes.channel_things(chan_id, &query.pairs())?;
        Ok(HttpRequest::new(HttpMethod::Post, url).authorized(token))
    }

    pub fn build_update(&self, thing: &Thing, token: &str) -> Result<HttpRequest, ApiError> {
        let id = thing.id.as_deref().ok_or(ApiError::MissingId)?;
        HttpRequest::new(HttpMethod::Put, self.routes.resource(&["things", id])?)
            .authorized(token)
            .json(thing)
    }

    pub fn build_delete(&self, thing_id: &str, token: &str) -> Result<HttpRequest, ApiError> {
        let url = self.routes.resource(&["things", thing_id])?;
        Ok(HttpRequest::new(HttpMethod::Delete, url).authorized(token))
    }

    pub fn build_connect(
        &self,
        thing_id: &str,
        chan_id: &str,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = ConnectRequest {
            thing_id: thing_id.to_string(),
            chan_id: chan_id.to_string(),
        };
        HttpRequest::new(HttpMethod::Post, self.routes.connect(thing_id, chan_id)?)
            .authorized(token)
            .json(&body)
    }

    pub fn build_disconnect(
        &self,
        chan_id: &str,
        thing_id: &str,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.routes.resource(&["channels", chan_id, "things", thing_id])?;
        Ok(HttpRequest::new(HttpMethod::Delete, url).authorized(token))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<String, ApiError> {
        Operation::CreateThing.check(response.status)?;
        response.location_id()
    }

    pub fn parse_create_bulk(&self, response: HttpResponse) -> Result<String, ApiError> {
        Operation::CreateThings.check(response.status)?;
        response.location_id()
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Thing, ApiError> {
        Operation::GetThing.check(response.status)?;
        response.json()
    }

    pub fn parse_get_all(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Operation::ListThings.check(response.status)?;
        response.json_payload()
    }

    pub fn parse_get_by_channel(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Operation::ListChannelThings.check(response.status)?;
        response.json_payload()
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ApiError> {
        Operation::UpdateThing.check(response.status)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        Operation::DeleteThing.check(response.status)
    }

    pub fn parse_connect(&self, response: HttpResponse) -> Result<(), ApiError> {
        Operation::Connect.check(response.status)
    }

    pub fn parse_disconnect(&self, response: HttpResponse) -> Result<(), ApiError> {
        Operation::Disconnect.check(response.status)
    }
}

impl<T: Transport> ThingsClient<T> {
    pub fn create(&self, thing: &Thing, token: &str) -> Result<String, ApiError> {
        let request = self.build_create(thing, token)?;
        self.parse_create(dispatch(&self.transport, Operation::CreateThing, request)?)
    }

    /// Creates every thing in one request and returns the id carried by the
    /// `Location` header.
    pub fn create_bulk(&self, things: &[Thing], token: &str) -> Result<String, ApiError> {
        let request = self.build_create_bulk(things, token)?;
        self.parse_create_bulk(dispatch(&self.transport, Operation::CreateThings, request)?)
    }

    pub fn get(&self, thing_id: &str, token: &str) -> Result<Thing, ApiError> {
        let request = self.build_get(thing_id, token)?;
        self.parse_get(dispatch(&self.transport, Operation::GetThing, request)?)
    }

    pub fn get_all(&self, query: &ThingQuery, token: &str) -> Result<Value, ApiError> {
        let request = self.build_get_all(query, token)?;
        self.parse_get_all(dispatch(&self.transport, Operation::ListThings, request)?)
    }

    pub fn get_by_channel(
        &self,
        chan_id: &str,
        query: &ChannelThingsQuery,
        token: &str,
    ) -> Result<Value, ApiError> {
        let request = self.build_get_by_channel(chan_id, query, token)?;
        let response = dispatch(&self.transport, Operation::ListChannelThings, request)?;
        self.parse_get_by_channel(response)
    }

    pub fn update(&self, thing: &Thing, token: &str) -> Result<(), ApiError> {
        let request = self.build_update(thing, token)?;
        self.parse_update(dispatch(&self.transport, Operation::UpdateThing, request)?)
    }

    pub fn delete(&self, thing_id: &str, token: &str) -> Result<(), ApiError> {
        let request = self.build_delete(thing_id, token)?;
        self.parse_delete(dispatch(&self.transport, Operation::DeleteThing, request)?)
    }

    pub fn connect(&self, thing_id: &str, chan_id: &str, token: &str) -> Result<(), ApiError> {
        let request = self.build_connect(thing_id, chan_id, token)?;
        self.parse_connect(dispatch(&self.transport, Operation::Connect, request)?)
    }

    /// Note the argument order: channel first, then thing.
    pub fn disconnect(&self, chan_id: &str, thing_id: &str, token: &str) -> Result<(), ApiError> {
        let request = self.build_disconnect(chan_id, thing_id, token)?;
        self.parse_disconnect(dispatch(&self.transport, Operation::Disconnect, request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteStyle;
    use crate::error::ErrorKind;
    use crate::testing::Scripted;

    const BASE: &str = "http://localhost:9000";

    fn client() -> ThingsClient<Scripted> {
        ThingsClient::with_transport(&ClientConfig::new(BASE), Scripted::default())
    }

    fn encoded() -> ThingsClient<Scripted> {
        let config = ClientConfig::new(BASE).with_route_style(RouteStyle::Encoded);
        ThingsClient::with_transport(&config, Scripted::default())
    }

    fn with_response(response: HttpResponse) -> ThingsClient<Scripted> {
        ThingsClient::with_transport(&ClientConfig::new(BASE), Scripted::replying(response))
    }

    #[test]
    fn build_create_bulk_sends_array() {
        let things = vec![Thing::named("a"), Thing::named("b")];
        let req = client().build_create_bulk(&things, "t").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:9000/bulk");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!([{"name": "a"}, {"name": "b"}]));
    }

    #[test]
    fn build_get_all_filters() {
        let query = ThingQuery {
            offset: Some(0),
            limit: Some(10),
            name: Some("lamp".to_string()),
        };
        let req = client().build_get_all(&query, "t").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:9000/things?offset=0&limit=10&name=lamp");
    }

    #[test]
    fn build_get_by_channel_literal_query() {
        let query = ChannelThingsQuery {
            offset: Some(0),
            limit: Some(10),
            connected: None,
        };
        let req = client().build_get_by_channel("c1", &query, "t").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:9000/channels/c1/things?offset0&limit10&");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_by_channel_encoded_query() {
        let query = ChannelThingsQuery {
            offset: Some(0),
            limit: Some(10),
            connected: Some(false),
        };
        let req = encoded().build_get_by_channel("c1", &query, "t").unwrap();
        assert_eq!(
            req.url,
            "http://localhost:9000/channels/c1/things?offset=0&limit=10&connected=false"
        );
    }

    #[test]
    fn build_connect_literal_path_and_body() {
        let req = client().build_connect("t1", "c1", "tok").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:9000/connect/t1c1");
        assert_eq!(req.header("authorization"), Some("tok"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"thingID": "t1", "chanID": "c1"}));
    }

    #[test]
    fn build_connect_encoded_path() {
        let req = encoded().build_connect("t1", "c1", "tok").unwrap();
        assert_eq!(req.url, "http://localhost:9000/connect/t1/c1");
    }

    #[test]
    fn build_disconnect_path_order() {
        let req = client().build_disconnect("c1", "t1", "t").unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:9000/channels/c1/things/t1");
    }

    #[test]
    fn create_returns_location_id() {
        let c = with_response(HttpResponse::new(201).with_header("location", "/things/t-42"));
        assert_eq!(c.create(&Thing::named("lamp"), "t").unwrap(), "t-42");
    }

    #[test]
    fn create_without_location_fails() {
        let c = with_response(HttpResponse::new(201));
        let err = c.create(&Thing::named("lamp"), "t").unwrap_err();
        assert!(matches!(err, ApiError::MissingLocation));
    }

    #[test]
    fn create_bulk_unprocessable() {
        let c = with_response(HttpResponse::new(422));
        let err = c.create_bulk(&[Thing::named("a")], "t").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unprocessable));
    }

    #[test]
    fn get_not_found() {
        let err = with_response(HttpResponse::new(404)).get("t1", "t").unwrap_err();
        assert_eq!(err.message(), "Thing does not exist");
    }

    #[test]
    fn get_by_channel_expects_created() {
        let c = with_response(HttpResponse::new(201).with_body(r#"{"things":[]}"#));
        let page = c.get_by_channel("c1", &ChannelThingsQuery::default(), "t").unwrap();
        assert_eq!(page["things"], serde_json::json!([]));

        let c = with_response(HttpResponse::new(200).with_body("{}"));
        let err = c.get_by_channel("c1", &ChannelThingsQuery::default(), "t").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unknown));
    }

    #[test]
    fn listings_reject_null_body() {
        let c = with_response(HttpResponse::new(200).with_body("null"));
        let err = c.get_all(&ThingQuery::default(), "t").unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));

        let c = with_response(HttpResponse::new(201).with_body("null"));
        let err = c.get_by_channel("c1", &ChannelThingsQuery::default(), "t").unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn delete_bad_id() {
        let err = with_response(HttpResponse::new(400)).delete("??", "t").unwrap_err();
        assert_eq!(err.message(), "Failed due to malformed thing's ID");
    }

    #[test]
    fn connect_missing_entity() {
        let err = with_response(HttpResponse::new(404)).connect("t1", "c1", "t").unwrap_err();
        assert_eq!(err.message(), "A non-existent entity request");
    }

    #[test]
    fn disconnect_messages() {
        assert!(with_response(HttpResponse::new(204)).disconnect("c1", "t1", "t").is_ok());
        let err = with_response(HttpResponse::new(404)).disconnect("c1", "t1", "t").unwrap_err();
        assert_eq!(err.message(), "Channel or thing does not exist");
        let err = with_response(HttpResponse::new(400)).disconnect("c1", "t1", "t").unwrap_err();
        assert_eq!(err.message(), "Failed due to malformed query parameters");
    }

    #[test]
    fn each_call_issues_exactly_one_request() {
        let c = with_response(HttpResponse::new(500));
        let _ = c.delete("t1", "t");
        let _ = c.delete("t1", "t");
        let requests = c.transport().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.method == HttpMethod::Delete));
    }
}
