use anyhow::Context;
use roomrelay::{config::Config, logging, users::UserDirectory, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log_level)?;

    let users = UserDirectory::open(&config.users_file)
        .await
        .with_context(|| format!("loading {}", config.users_file.display()))?;
    let app = roomrelay::router(AppState::new(users, &config.admin_key), config.session_expiry);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
