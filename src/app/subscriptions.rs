use crate::error::{ApiError, RegistryError};
use crate::ports::{PushSender, TimeProvider};
use crate::state;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscribeResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) already_existed: bool,
}

pub(crate) async fn subscribe<S: PushSender, T: TimeProvider>(
    State(state): State<state::AppState<S, T>>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubscribeResponse>), ApiError> {
    let candidate: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| RegistryError::InvalidSubscription("body must be a JSON object"))?;
    let registration = state.registry.register(candidate)?;

    if registration.already_existed {
        tracing::info!(
            endpoint = %registration.subscription.endpoint,
            "subscription already exists"
        );
    } else {
        tracing::info!(
            endpoint = %registration.subscription.endpoint,
            total = state.registry.count(),
            "new subscription added"
        );
    }
    state.scheduler.schedule(registration.subscription);

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            success: true,
            message: "Subscription saved".to_string(),
            already_existed: registration.already_existed,
        }),
    ))
}

#[derive(Deserialize)]
pub(crate) struct UnsubscribeRequest {
    pub(crate) endpoint: String,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct UnsubscribeResponse {
    pub(crate) success: bool,
    pub(crate) removed: bool,
}

pub(crate) async fn unsubscribe<S: PushSender, T: TimeProvider>(
    State(state): State<state::AppState<S, T>>,
    body: Bytes,
) -> Result<Json<UnsubscribeResponse>, ApiError> {
    let request: UnsubscribeRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("expected a JSON object with an endpoint"))?;
    let removed = state.registry.remove(&request.endpoint);
    if removed {
        tracing::info!(endpoint = %request.endpoint, "subscription removed on request");
    }

    Ok(Json(UnsubscribeResponse {
        success: true,
        removed,
    }))
}

#[derive(Serialize, Deserialize)]
pub(crate) struct SubscriptionListResponse {
    pub(crate) count: usize,
    pub(crate) subscriptions: Vec<SubscriptionEntry>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct SubscriptionEntry {
    pub(crate) endpoint: String,
}

pub(crate) async fn subscription_list<S: PushSender, T: TimeProvider>(
    State(state): State<state::AppState<S, T>>,
) -> Json<SubscriptionListResponse> {
    let mut subscriptions: Vec<SubscriptionEntry> = state
        .registry
        .list()
        .into_iter()
        .map(|subscription| SubscriptionEntry {
            endpoint: subscription.endpoint,
        })
        .collect();
    subscriptions.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));

    Json(SubscriptionListResponse {
        count: subscriptions.len(),
        subscriptions,
    })
}
