mod config;
mod frame;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let addr = std::net::SocketAddr::new(config.bind_addr, config.port);
    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static client");
    }

    let state = state::AppState::new(config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "sketchsync listening");
    axum::serve(listener, app).await.expect("server failed");
}
