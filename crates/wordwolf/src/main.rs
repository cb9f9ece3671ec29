use tracing_subscriber::EnvFilter;
use wordwolf::{WordwolfError, WordwolfServer};

#[tokio::main]
async fn main() -> Result<(), WordwolfError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // WORDWOLF_BIND wins; otherwise listen on all interfaces at $PORT.
    let addr = std::env::var("WORDWOLF_BIND").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        format!("0.0.0.0:{port}")
    });

    let server = WordwolfServer::builder().bind(&addr).build().await?;
    server.run().await
}
