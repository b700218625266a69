use axum::middleware;
use axum::routing::get;
use axum::Router;
use repsrv_store::WellKnown;
use tower_http::trace::TraceLayer;

use crate::endpoint::endpoints;
use crate::handler;
use crate::scope::request_scope;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::INFO, get(handler::info_handler))
        .route(endpoints::AUTH, get(handler::authorize_handler))
        .route(
            endpoints::TOKEN,
            get(handler::token_handler).post(handler::token_handler),
        )
        .route(
            WellKnown::Inbox.path(),
            get(handler::get_object).post(handler::post_inbox),
        )
        .route(
            WellKnown::Outbox.path(),
            get(handler::get_object).post(handler::post_outbox),
        )
        .route("/*path", get(handler::get_object))
        .layer(middleware::from_fn_with_state(state.clone(), request_scope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
