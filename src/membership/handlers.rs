use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::shared::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMembersResponse {
    pub channel_id: String,
    pub members: Vec<String>,
}

/// HTTP handler for a channel's current members
///
/// GET /channels/:channel_id/members
/// Unknown channels have no members.
#[instrument(name = "list_channel_members", skip(state))]
pub async fn list_channel_members(
    Path(channel_id): Path<String>,
    State(state): State<AppState>,
) -> Json<ChannelMembersResponse> {
    let members: Vec<String> = state.relay.members_of(&channel_id).await.into_iter().collect();

    info!(channel_id = %channel_id, member_count = members.len(), "Channel members listed");

    Json(ChannelMembersResponse {
        channel_id,
        members,
    })
}
