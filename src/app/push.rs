use crate::ports::{PushSender, TimeProvider};
use crate::state;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Serialize, Deserialize)]
pub(crate) struct PublicKeyResponse {
    #[serde(rename = "publicKey")]
    pub(crate) public_key: String,
}

pub(crate) async fn push_public_key<S: PushSender, T: TimeProvider>(
    State(state): State<state::AppState<S, T>>,
) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.config.vapid.public_key,
    })
}

#[derive(Serialize, Deserialize)]
pub(crate) struct DispatchScheduleDebugResponse {
    pub(crate) server_time: OffsetDateTime,
    pub(crate) scheduled: Vec<DispatchScheduleEntry>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct DispatchScheduleEntry {
    pub(crate) endpoint: String,
    pub(crate) scheduled_at: OffsetDateTime,
    pub(crate) due_at: OffsetDateTime,
    pub(crate) finished: bool,
}

pub(crate) async fn dispatch_schedule_debug<S: PushSender, T: TimeProvider>(
    State(state): State<state::AppState<S, T>>,
) -> Json<DispatchScheduleDebugResponse> {
    let server_time = state.scheduler.now();
    let scheduled: Vec<DispatchScheduleEntry> = state.scheduler.with_handles(|handles| {
        handles
            .iter()
            .map(|handle| DispatchScheduleEntry {
                endpoint: handle.endpoint.clone(),
                scheduled_at: handle.scheduled_at,
                due_at: handle.due_at,
                finished: handle.is_finished(),
            })
            .collect()
    });
    Json(DispatchScheduleDebugResponse {
        server_time,
        scheduled,
    })
}
