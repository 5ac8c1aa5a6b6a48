use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{ws::{Message, WebSocket}, State, WebSocketUpgrade},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tower_sessions::Session;

use crate::{hub::ConnectionHub, session::USERNAME, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room_ws(
    State(hub): State<Arc<ConnectionHub>>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let username = session.get::<String>(USERNAME).await?;

    Ok(ws.on_upgrade(move |stream| serve(hub, username, stream)))
}

async fn serve(hub: Arc<ConnectionHub>, username: Option<String>, stream: WebSocket) {
    let (id, mut rx) = hub.on_connect(username).await;
    let (mut sender, mut receiver) = stream.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = ?e, "failed to serialize server event");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => hub.handle_text(id, text.as_str()).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %id, error = %e, "socket error");
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    hub.on_disconnect(id).await;
    send_task.abort();
}
