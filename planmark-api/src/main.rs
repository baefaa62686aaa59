use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planmark_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = planmark_api::app();

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;

    info!("planmark API listening on http://0.0.0.0:3000");

    axum::serve(listener, app).await?;
    Ok(())
}
