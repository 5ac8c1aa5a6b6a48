mod admin;
mod login;
mod logout;
mod register;

use axum::{routing::post, Router};
use serde::Deserialize;

use crate::{AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/admin/add_user", post(admin::add_user))
}

#[derive(Deserialize)]
pub(crate) struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl Credentials {
    /// Both fields, or `InvalidInput` if either is missing or empty.
    pub(crate) fn required(self) -> AppResult<(String, String)> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username, password))
            }
            _ => Err(AppError::InvalidInput(
                "username and password are required".to_owned(),
            )),
        }
    }
}
