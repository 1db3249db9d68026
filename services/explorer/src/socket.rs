//! Push channel announcing plot images to the browser.
//!
//! On connect the client receives one `image available` message per plot
//! already on disk, followed by live announcements from the dispatcher.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::Response,
};
use explorer_common::ImageAvailable;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::state::AppState;

/// GET /socket - WebSocket upgrade for plot notifications
pub async fn socket_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!(clients = state.hub.client_count() + 1, "a user connected");

    // Subscribe before scanning so nothing finished in between is missed.
    let mut live = state.hub.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let existing = match catalog::plot_events(&state.config.plots_dir()).await {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "Could not scan plots directory");
            Vec::new()
        }
    };

    for event in &existing {
        if send_event(&mut sender, event).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            event = live.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Client fell behind on plot notifications");
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("a user disconnected");
}

async fn send_event<S>(sender: &mut S, event: &ImageAvailable) -> Result<(), axum::Error>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    sender
        .send(Message::Text(event.to_message().to_string()))
        .await
}
