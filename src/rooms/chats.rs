use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, Json};
use serde_json::{json, Value};

use super::RoomRegistry;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_chats(
    Path(username): Path<String>,
    State(rooms): State<Arc<RoomRegistry>>,
) -> Json<Value> {
    let chats = rooms.rooms_for(&username).await;
    Json(json!({ "success": true, "chats": chats }))
}
