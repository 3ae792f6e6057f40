use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::bus::HubBus;
use crate::handles::*;

pub fn create_app(bus: Arc<HubBus>) -> Router {
    let devices = Router::new()
        .route("/", get(list_devices).post(add_device))
        .route("/:device_id", get(get_device))
        .route("/:device_id/set", post(set_device))
        .route("/:device_id/interview", post(interview_device));

    let v1 = Router::new()
        .route("/health", get(health))
        .nest("/devices", devices)
        .route("/scenes/:scene_id/trigger", post(trigger_scene))
        .route("/debug/seed", post(seed))
        .route("/events/ws", get(events_ws));

    Router::new()
        .route("/", get(index))
        .nest("/v1", v1)
        .with_state(HubState { bus })
        .layer(TraceLayer::new_for_http())
}
