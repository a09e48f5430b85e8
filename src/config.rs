// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{PricingRepository, SettingsRepository},
    services::{PricingService, SettingsService},
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuração do processo, lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());
        let max_connections = parse_max_connections(env::var("DB_MAX_CONNECTIONS").ok().as_deref())?;

        Ok(Self { database_url, server_addr, max_connections })
    }
}

fn parse_max_connections(raw: Option<&str>) -> anyhow::Result<u32> {
    match raw {
        None => Ok(DEFAULT_MAX_CONNECTIONS),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", value)),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub pricing_service: PricingService,
    pub settings_service: SettingsService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let pricing_repo = PricingRepository::new();
        let settings_repo = SettingsRepository::new();

        let pricing_service = PricingService::new(pricing_repo, settings_repo.clone());
        let settings_service = SettingsService::new(settings_repo);

        Ok(Self {
            db_pool,
            pricing_service,
            settings_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_connections_defaults_to_five() {
        assert_eq!(parse_max_connections(None).unwrap(), 5);
        assert_eq!(parse_max_connections(Some(" 12 ")).unwrap(), 12);
    }

    #[test]
    fn invalid_max_connections_is_an_error() {
        assert!(parse_max_connections(Some("zero")).is_err());
        assert!(parse_max_connections(Some("0")).is_err());
    }
}
