//src/main.rs

use anyhow::Context;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod engine;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;

fn pricing_routes() -> Router<AppState> {
    Router::new()
        .route("/settings"
               ,get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        )
        .route("/products/{id}/comparison"
               ,get(handlers::pricing::get_price_comparison)
        )
        .route("/products/{id}/smart-price"
               ,get(handlers::pricing::get_smart_price)
        )
        .route("/abc/recalculate"
               ,post(handlers::pricing::recalculate_abc)
        )
        .route("/elasticity/recalculate"
               ,post(handlers::pricing::recalculate_elasticity)
        )
        .route("/recommendations/recalculate"
               ,post(handlers::pricing::recalculate_recommendations)
        )
        .route("/recommendations"
               ,get(handlers::pricing::list_recommendations)
        )
        .route("/recommendations/{id}"
               ,patch(handlers::pricing::update_recommendation_status)
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Nível de log vem do RUST_LOG (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/pricing", pricing_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.server_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
