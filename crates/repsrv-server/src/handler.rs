use std::collections::BTreeSet;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;
use chrono::SecondsFormat;
use repsrv_store::AccessMode;
use repsrv_types::{CallerId, Iri, Resource};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::auth::{Credentials, ISSUED_CODE, ISSUED_TOKEN};
use crate::endpoint::{HealthResponse, TokenResponse, ACTIVITY_JSON};
use crate::error::{ServerError, ServerResult};
use crate::hooks::Direction;
use crate::state::AppState;

/// Addressing properties whose targets receive a copy of an activity.
const ADDRESSING: [&str; 5] = ["to", "cc", "bto", "bcc", "audience"];

const BLIND_ADDRESSING: [&str; 2] = ["bto", "bcc"];

const PUBLIC_COLLECTION: &str = "https://www.w3.org/ns/activitystreams#Public";

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "repsrv",
        "version": env!("CARGO_PKG_VERSION"),
        "actor": state.store.well_known().actor().as_str(),
        "objects": state.store.len(),
    }))
}

pub async fn get_object(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerId>,
    uri: Uri,
) -> ServerResult<Response> {
    let id = state.request_iri(uri.path());
    let resource = state.store.get(&id, AccessMode::Read, caller).await?;
    activity_json(StatusCode::OK, &resource)
}

/// Client-to-server submission: renamed to a fresh id, stored, listed, delivered.
pub async fn post_outbox(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerId>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let outbox = state.store.well_known().outbox().clone();
    let credentials = Credentials::from_headers(&headers);
    let actor = state.verifier.verify_for_outbox(&credentials, &outbox).await?;

    let mut activity = Resource::from_slice(&body)?;
    let id = state.store.next_id();
    activity.set_id(&id);
    if activity.property("actor").is_none() {
        activity.set_property("actor", Value::String(actor.to_string()));
    }
    let published = state.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true);
    activity.set_property("published", Value::String(published));

    state.callbacker.on_activity(Direction::Outbox, &activity).await?;
    state.store.set(&id, activity.clone(), caller).await?;
    prepend_to_collection(&state, &outbox, &id, caller).await?;
    info!(%id, kinds = ?activity.kinds(), "outbox activity accepted");

    deliver(&state, &activity).await?;
    Ok((StatusCode::CREATED, [(header::LOCATION, id.to_string())]).into_response())
}

/// Server-to-server delivery to the actor's inbox.
pub async fn post_inbox(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerId>,
    body: Bytes,
) -> ServerResult<Response> {
    let activity = Resource::from_slice(&body)?;
    let id = activity
        .id()
        .ok_or_else(|| ServerError::BadRequest("activity has no id".into()))?;
    if state.store.owns(&id) {
        return Err(ServerError::BadRequest(format!(
            "inbound activity claims local id {id}"
        )));
    }

    state.callbacker.on_activity(Direction::Inbox, &activity).await?;
    if !state.store.has(&id) {
        state.store.set(&id, activity, caller).await?;
    }
    let inbox = state.store.well_known().inbox().clone();
    prepend_to_collection(&state, &inbox, &id, caller).await?;
    info!(%id, "inbox activity accepted");
    Ok(StatusCode::OK.into_response())
}

/// Permissive OAuth authorization endpoint: immediately redirects back with
/// a fixed code, echoing every `state` parameter.
pub async fn authorize_handler(RawQuery(query): RawQuery) -> ServerResult<Response> {
    let query = query.unwrap_or_default();
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let redirect = pairs
        .iter()
        .find(|(key, _)| key == "redirect_uri")
        .map(|(_, value)| value)
        .ok_or_else(|| ServerError::BadRequest("missing redirect_uri".into()))?;
    let mut redirect = Url::parse(redirect)
        .map_err(|e| ServerError::BadRequest(format!("bad redirect_uri: {e}")))?;
    {
        let mut query = redirect.query_pairs_mut();
        for (_, state) in pairs.iter().filter(|(key, _)| key == "state") {
            query.append_pair("state", state);
        }
        query.append_pair("code", ISSUED_CODE);
    }
    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, redirect.to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::PRAGMA, "no-cache".to_string()),
        ],
    )
        .into_response())
}

/// Permissive OAuth token endpoint: grants the one token the verifier accepts.
pub async fn token_handler() -> Response {
    (
        [(header::CACHE_CONTROL, "no-store"), (header::PRAGMA, "no-cache")],
        Json(TokenResponse {
            access_token: ISSUED_TOKEN.into(),
            token_type: "Bearer".into(),
        }),
    )
        .into_response()
}

/// Read-modify-write of a collection within one request: take it with a
/// write lock, prepend `item`, and store it back (which releases the lock).
async fn prepend_to_collection(
    state: &AppState,
    collection: &Iri,
    item: &Iri,
    caller: CallerId,
) -> ServerResult<()> {
    let mut value = state.store.get(collection, AccessMode::Write, caller).await?;
    if !value.contains_ordered_item(item) {
        value.prepend_ordered_item(item);
    }
    state.store.set(collection, value, caller).await?;
    Ok(())
}

async fn deliver(state: &AppState, activity: &Resource) -> ServerResult<()> {
    let targets: Vec<Iri> = recipients(activity)
        .into_iter()
        .filter(|to| !state.store.owns(to))
        .collect();
    if targets.is_empty() {
        return Ok(());
    }

    let mut copy = activity.clone();
    for key in BLIND_ADDRESSING {
        copy.remove_property(key);
    }
    let payload = copy.to_vec()?;
    for to in &targets {
        state.deliverer.deliver(&payload, to).await;
    }
    debug!(count = targets.len(), "delivery handed off");
    Ok(())
}

/// Every addressed recipient except the public collection, deduplicated.
fn recipients(activity: &Resource) -> BTreeSet<Iri> {
    let mut out = BTreeSet::new();
    for key in ADDRESSING {
        let targets = match activity.property(key) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(item) => vec![item],
            None => Vec::new(),
        };
        for target in targets {
            let raw = match target {
                Value::String(s) => Some(s.as_str()),
                Value::Object(map) => map.get("id").and_then(Value::as_str),
                _ => None,
            };
            if let Some(iri) = raw
                .filter(|s| *s != PUBLIC_COLLECTION)
                .and_then(|s| Iri::parse(s).ok())
            {
                out.insert(iri);
            }
        }
    }
    out
}

fn activity_json(status: StatusCode, resource: &Resource) -> ServerResult<Response> {
    let body = resource.to_vec()?;
    Ok((status, [(header::CONTENT_TYPE, ACTIVITY_JSON)], body).into_response())
}
