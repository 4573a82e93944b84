use crate::state::AppState;
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use dinner_control::{Intent, ViewModel};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173")
        .unwrap_or_else(|err| panic!("test origin is valid: {err}"))
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<axum::http::HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Ok(Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/view", get(view_handler))
        .route("/api/v1/intent", post(intent_handler))
        .route("/api/v1/stream", get(stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let controller = app_state.controller.lock();
    let constants = controller.constants();
    let state = controller.store().state();
    Json(serde_json::json!({
        "seed": app_state.seed,
        "today": controller.store().today().to_string(),
        "storage_key": constants.storage_key,
        "cooldown_days": constants.cooldown_days,
        "recipes": state.recipes.len(),
        "meals_recorded": state.meal_history.len(),
        "spinning": controller.is_spinning(),
        "vote_open": controller.is_vote_open(),
    }))
}

pub async fn view_handler(State(app_state): State<AppState>) -> Json<ViewModel> {
    Json(app_state.controller.lock().view())
}

#[derive(Serialize)]
pub struct IntentReply {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    view: ViewModel,
}

/// Applies one intent. Refusals answer 409 with the user-facing message;
/// the view in the reply is always the current one.
pub async fn intent_handler(
    State(app_state): State<AppState>,
    Json(intent): Json<Intent>,
) -> (StatusCode, Json<IntentReply>) {
    let mut controller = app_state.controller.lock();
    let result = controller.handle(intent);
    let view = controller.view();
    drop(controller);
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(IntentReply {
                ok: true,
                error: None,
                view,
            }),
        ),
        Err(refusal) => (
            StatusCode::CONFLICT,
            Json(IntentReply {
                ok: false,
                error: Some(refusal.to_string()),
                view,
            }),
        ),
    }
}

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let controller = app_state.controller.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(5));
        heartbeat.tick().await; // discard the immediate first tick
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(event) => match serde_json::to_string(&event) {
                            Ok(data) => {
                                yield Ok(Event::default().data(data));
                            }
                            Err(err) => {
                                tracing::error!("surface event serialization failed: {err}");
                            }
                        },
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "stream subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = heartbeat.tick() => {
                    let spinning = controller.lock().is_spinning();
                    let hb = serde_json::json!({"heartbeat": true, "spinning": spinning});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
