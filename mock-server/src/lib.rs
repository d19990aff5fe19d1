use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "token";
const DEFAULT_LIMIT: usize = 10;

pub type Entity = Map<String, Value>;

#[derive(Debug, Default)]
pub struct Store {
    pub groups: BTreeMap<String, Entity>,
    pub things: BTreeMap<String, Entity>,
    /// (channel id, thing id)
    pub connections: BTreeSet<(String, String)>,
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    store: Arc<RwLock<Store>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub name: Option<String>,
    pub connected: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectBody {
    #[serde(rename = "thingID")]
    pub thing_id: String,
    #[serde(rename = "chanID")]
    pub chan_id: String,
}

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", get(get_group).put(update_group).delete(delete_group))
        .route("/things", get(list_things).post(create_thing))
        .route("/things/{id}", get(get_thing).put(update_thing).delete(delete_thing))
        .route("/bulk", post(create_things))
        .route("/channels/{chan_id}/things", post(list_channel_things))
        .route("/channels/{chan_id}/things/{thing_id}", delete(disconnect))
        .route("/connect/{*rest}", post(connect))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

/// Every route demands the configured token verbatim in `Authorization`.
async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented != Some(&*state.token) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn insert_entity(
    entities: &mut BTreeMap<String, Entity>,
    mut fields: Entity,
) -> Result<String, StatusCode> {
    if let Some(name) = fields.get("name") {
        if entities.values().any(|e| e.get("name") == Some(name)) {
            return Err(StatusCode::CONFLICT);
        }
    }
    let id = Uuid::new_v4().to_string();
    fields.insert("id".to_string(), Value::String(id.clone()));
    entities.insert(id.clone(), fields);
    Ok(id)
}

fn replace_entity(
    entities: &mut BTreeMap<String, Entity>,
    id: &str,
    mut fields: Entity,
) -> Result<(), StatusCode> {
    let entity = entities.get_mut(id).ok_or(StatusCode::NOT_FOUND)?;
    fields.insert("id".to_string(), Value::String(id.to_string()));
    *entity = fields;
    Ok(())
}

fn page<'a>(entities: impl Iterator<Item = &'a Entity>, query: &PageQuery, key: &str) -> Value {
    let matching: Vec<&Entity> = entities
        .filter(|e| match &query.name {
            Some(name) => e.get("name").and_then(Value::as_str) == Some(name.as_str()),
            None => true,
        })
        .collect();
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let items: Vec<&Entity> = matching.iter().skip(offset).take(limit).copied().collect();
    let mut body = json!({
        "total": matching.len(),
        "offset": offset,
        "limit": limit,
    });
    body[key] = json!(items);
    body
}

fn created(kind: &str, id: &str) -> (StatusCode, [(HeaderName, String); 1]) {
    (StatusCode::CREATED, [(header::LOCATION, format!("/{kind}/{id}"))])
}

// --- groups ---

async fn create_group(
    State(state): State<AppState>,
    Json(fields): Json<Entity>,
) -> Result<impl IntoResponse, StatusCode> {
    let id = insert_entity(&mut state.store.write().await.groups, fields)?;
    Ok(created("groups", &id))
}

async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entity>, StatusCode> {
    let store = state.store.read().await;
    store.groups.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn list_groups(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Json<Value> {
    let store = state.store.read().await;
    Json(page(store.groups.values(), &query, "groups"))
}

async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Entity>,
) -> Result<StatusCode, StatusCode> {
    replace_entity(&mut state.store.write().await.groups, &id, fields)?;
    Ok(StatusCode::OK)
}

async fn delete_group(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.store.write().await.groups.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

// --- things ---

async fn create_thing(
    State(state): State<AppState>,
    Json(fields): Json<Entity>,
) -> Result<impl IntoResponse, StatusCode> {
    let id = insert_entity(&mut state.store.write().await.things, fields)?;
    Ok(created("things", &id))
}

/// Creates all things or none. `Location` points at the first one.
async fn create_things(
    State(state): State<AppState>,
    Json(batch): Json<Vec<Entity>>,
) -> Result<impl IntoResponse, StatusCode> {
    if batch.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = state.store.write().await;
    let mut staged = store.things.clone();
    let mut ids = Vec::with_capacity(batch.len());
    for fields in batch {
        ids.push(insert_entity(&mut staged, fields)?);
    }
    let things: Vec<Entity> = ids.iter().filter_map(|id| staged.get(id).cloned()).collect();
    store.things = staged;
    let (status, location) = created("things", &ids[0]);
    Ok((status, location, Json(json!({ "things": things }))))
}

async fn get_thing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entity>, StatusCode> {
    let store = state.store.read().await;
    store.things.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn list_things(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Json<Value> {
    let store = state.store.read().await;
    Json(page(store.things.values(), &query, "things"))
}

async fn update_thing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Entity>,
) -> Result<StatusCode, StatusCode> {
    replace_entity(&mut state.store.write().await.things, &id, fields)?;
    Ok(StatusCode::OK)
}

async fn delete_thing(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let mut store = state.store.write().await;
    if store.things.remove(&id).is_none() {
        return StatusCode::NOT_FOUND;
    }
    store.connections.retain(|(_, thing)| thing != &id);
    StatusCode::NO_CONTENT
}

// --- channel relationships ---

async fn list_channel_things(
    State(state): State<AppState>,
    Path(chan_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> (StatusCode, Json<Value>) {
    let store = state.store.read().await;
    let connected = store
        .connections
        .iter()
        .filter(|(chan, _)| chan == &chan_id)
        .filter_map(|(_, thing)| store.things.get(thing));
    (StatusCode::CREATED, Json(page(connected, &query, "things")))
}

/// The path suffix is ignored; the ids come from the body.
async fn connect(State(state): State<AppState>, Json(body): Json<ConnectBody>) -> StatusCode {
    let mut store = state.store.write().await;
    if !store.things.contains_key(&body.thing_id) {
        return StatusCode::NOT_FOUND;
    }
    if store.connections.insert((body.chan_id, body.thing_id)) {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

async fn disconnect(
    State(state): State<AppState>,
    Path((chan_id, thing_id)): Path<(String, String)>,
) -> StatusCode {
    let mut store = state.store.write().await;
    if store.connections.remove(&(chan_id, thing_id)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
