use std::sync::Arc;

use switchboard::providers::base::ModelClient;
use switchboard::providers::logging::LoggingClient;
use switchboard::providers::openai::OpenAiClient;
use switchboard_server::configuration::Settings;
use switchboard_server::routes;
use switchboard_server::state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    info!(
        upstream = %settings.upstream.host,
        model = %settings.upstream.model,
        delivery = ?settings.delivery,
        "loaded configuration"
    );

    let tools = settings.tools.endpoints(&settings.upstream.api_key)?;
    if !tools.is_empty() {
        info!(
            services = tools
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(","),
            "tool endpoints configured"
        );
    }

    let delivery = settings.delivery;
    let static_dir = settings.server.static_dir.clone();
    let addr = settings.server.socket_addr();

    let client = OpenAiClient::new(settings.upstream.into_config())?;
    let client: Arc<dyn ModelClient> = if settings.log_upstream {
        Arc::new(LoggingClient::new(Box::new(client)))
    } else {
        Arc::new(client)
    };

    let state = AppState::new(client, tools, delivery);

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
