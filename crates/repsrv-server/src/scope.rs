use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::state::AppState;

/// Open a store request scope around every request.
///
/// The caller token is exposed to handlers as an
/// [`Extension<CallerId>`](axum::Extension). Write locks the handler left
/// held are released when the response is produced, or when the request
/// future is dropped because the client went away.
pub async fn request_scope(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let scope = state.store.begin_request();
    debug!(
        caller = %scope.caller(),
        method = %request.method(),
        uri = %request.uri(),
        "received request"
    );
    request.extensions_mut().insert(scope.caller());
    let response = next.run(request).await;
    scope.complete();
    response
}
