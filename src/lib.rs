pub mod auth;
pub mod config;
pub mod hub;
pub mod logging;
pub mod rooms;
pub mod session;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRef},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use hub::ConnectionHub;
use rooms::RoomRegistry;
use users::{DirectoryError, UserDirectory};

/// Shared secret for the admin endpoints, compared as plain text.
#[derive(Clone)]
pub struct AdminKey(pub Arc<str>);

#[derive(Clone, FromRef)]
pub struct AppState {
    pub users: Arc<UserDirectory>,
    pub rooms: Arc<RoomRegistry>,
    pub hub: Arc<ConnectionHub>,
    pub admin_key: AdminKey,
}

impl AppState {
    pub fn new(users: UserDirectory, admin_key: &str) -> Self {
        let rooms = Arc::new(RoomRegistry::new());
        Self {
            users: Arc::new(users),
            hub: Arc::new(ConnectionHub::new(Arc::clone(&rooms))),
            rooms,
            admin_key: AdminKey(admin_key.into()),
        }
    }
}

pub fn router(state: AppState, session_expiry: time::Duration) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(session_expiry));

    Router::new()
        .merge(auth::router())
        .merge(rooms::router())
        .fallback(not_found)
        .with_state(state)
        .layer(session_layer)
        .layer(CorsLayer::permissive())
}

async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_owned())
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        use AppError::*;
        match self {
            InvalidInput(_) | AlreadyExists(_) => StatusCode::BAD_REQUEST,
            NotFound(_) => StatusCode::NOT_FOUND,
            Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Forbidden(_) => StatusCode::FORBIDDEN,
            Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (
            self.status(),
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidInput => Self::InvalidInput(err.to_string()),
            DirectoryError::AlreadyExists => Self::AlreadyExists(err.to_string()),
            // unknown user and bad password look the same from outside
            DirectoryError::NotFound | DirectoryError::WrongPassword => {
                Self::Unauthorized("invalid username or password".to_owned())
            }
            DirectoryError::Internal(e) => Self::Internal(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(anyhow::Error::from(err))
    }
}
