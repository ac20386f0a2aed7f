mod db;
mod events;
mod registry;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Media store is optional: image messages are rejected when unconfigured.
    let media = match services::media::HttpMediaStore::from_env() {
        Some(client) => {
            tracing::info!("media store configured");
            Some(Arc::new(client) as Arc<dyn services::media::MediaStore>)
        }
        None => {
            tracing::warn!("MEDIA_UPLOAD_URL not set — image messages disabled");
            None
        }
    };

    let state = state::AppState::new(pool, media);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "gigboard listening");
    axum::serve(listener, app).await.expect("server failed");
}
