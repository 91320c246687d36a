use crate::adapters::{TokioTimeProvider, WebPushSender};
use crate::config;
use crate::ports::{PushSender, TimeProvider};
use crate::state;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod notifications;
mod push;
mod subscriptions;

pub fn app(config: config::AppConfig) -> Result<Router, web_push::WebPushError> {
    let sender = WebPushSender::new(config.vapid.clone(), config.delivery_timeout)?;
    Ok(router(state::AppState::new(
        config,
        sender,
        TokioTimeProvider,
    )))
}

pub(crate) fn router<S: PushSender, T: TimeProvider>(state: state::AppState<S, T>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/push-public-key", get(push::push_public_key::<S, T>))
        .route(
            "/subscriptions",
            get(subscriptions::subscription_list::<S, T>)
                .post(subscriptions::subscribe::<S, T>)
                .delete(subscriptions::unsubscribe::<S, T>),
        )
        .route(
            "/notifications/broadcast",
            post(notifications::broadcast::<S, T>),
        )
        .route(
            "/api/debug/dispatch/schedule",
            get(push::dispatch_schedule_debug::<S, T>),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub(crate) async fn index() -> &'static str {
    "Push notification server is running"
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
