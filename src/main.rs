mod analysis;
mod api;
mod crawler;
mod history;
mod keywords;
mod sentiment;

use std::env;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::history::PriceHistoryStore;
use crate::sentiment::VaderScorer;

#[derive(OpenApi)]
#[openapi(
    paths(api::analyze_url, api::get_price_history),
    components(
        schemas(
            api::AnalyzeRequest,
            api::AnalyzeResponse,
            api::PriceHistoryResponse,
            crate::analysis::Confidence,
            crate::analysis::Decision
        )
    ),
    tags(
        (name = "analysis", description = "Product Trust Analysis API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    // The lexicon is a startup dependency: a broken analyzer must abort here,
    // not score every review as neutral later
    let scorer = VaderScorer::try_new()?;

    let history_path =
        env::var("PRICE_HISTORY_FILE").unwrap_or_else(|_| "price_history.json".to_string());
    let state = Arc::new(api::AppState {
        scorer,
        history: Mutex::new(PriceHistoryStore::new(history_path)),
    });

    // The browser-extension client calls from arbitrary product pages
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(SwaggerUi::new("/lifelabel-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/analyze_url", post(api::analyze_url))
        .route("/price_history/:title", get(api::get_price_history))
        .layer(cors)
        .with_state(state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
