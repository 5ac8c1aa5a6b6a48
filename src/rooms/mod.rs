mod chats;
mod msg;
mod registry;
mod room;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub use msg::{Message, MessageTime};
pub use registry::{RoomHandle, RoomRegistry};
pub use room::{Room, RoomSummary};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my_chats/{username}", get(chats::my_chats))
        .route("/ws", get(ws::room_ws))
}
