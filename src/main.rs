mod handlers;
mod models;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use axum::{Router, routing::get};
    use handlers::api::{data_handler, user_handler, videos_handler};
    use handlers::oauth::{callback_handler, login_handler};
    use models::{AppConfig, AppState};
    use tower_http::{cors::CorsLayer, services::ServeDir};

    let app_config = AppConfig::from_env()?;
    let app_state = AppState::new(app_config)?;

    let app = Router::new()
        .route("/login", get(login_handler))
        .route("/callback", get(callback_handler))
        .route("/api/data", get(data_handler))
        .route("/api/user", get(user_handler))
        .route("/api/videos", get(videos_handler))
        .fallback_service(ServeDir::new("."))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    eprintln!("listening on http://{}", "127.0.0.1:3000");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
