//! Request parsing and response shaping shared by article and comment
//! votes.

use axum::http::StatusCode;
use axum::Json;
use haven_core::voting::{VoteStatus, VoteTally, VoteTarget, VoteTransition};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Body of every vote response.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub message: String,
    pub upvotes: i64,
    pub downvotes: i64,
}

/// Read `status` from a vote body. Accepts `"true"`/`"false"` and JSON
/// booleans; anything else is a 400.
pub fn vote_status(body: &serde_json::Value) -> AppResult<bool> {
    body.get("status")
        .cloned()
        .and_then(|raw| serde_json::from_value::<VoteStatus>(raw).ok())
        .map(|VoteStatus(status)| status)
        .ok_or_else(|| AppError::BadRequest("Wrong status field provided".into()))
}

/// 201 when a vote row was created, 200 otherwise, with the counts after
/// the transition.
pub fn vote_response(
    transition: VoteTransition,
    tally: VoteTally,
    target: VoteTarget,
) -> (StatusCode, Json<VoteResponse>) {
    let status = if transition.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(VoteResponse {
            message: transition.message(target),
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
        }),
    )
}
