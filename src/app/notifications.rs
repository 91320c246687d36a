use crate::error::ApiError;
use crate::ports::{PushSender, TimeProvider};
use crate::state;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub(crate) struct BroadcastResponse {
    pub(crate) success: bool,
    pub(crate) sent: usize,
    pub(crate) failed: usize,
    pub(crate) pruned: usize,
    pub(crate) message: String,
}

/// Delivers to every subscriber and answers once all deliveries have settled.
pub(crate) async fn broadcast<S: PushSender, T: TimeProvider>(
    State(state): State<state::AppState<S, T>>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let tally = state.dispatcher.broadcast().await?;

    Ok(Json(BroadcastResponse {
        success: true,
        sent: tally.sent,
        failed: tally.failed,
        pruned: tally.pruned,
        message: format!(
            "Sent notifications to {} subscribers ({} failed)",
            tally.sent, tally.failed
        ),
    }))
}
