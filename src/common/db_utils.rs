// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::tenancy::TenantContext;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define `app.tenant_id` para as políticas RLS.
///
/// A variável é de sessão (não local à transação) porque vários serviços
/// abrem a própria transação em cima desta conexão. Toda conexão que sai da
/// pool por aqui sobrescreve o valor anterior.
pub(crate) async fn get_tenant_connection(
    app_state: &AppState,
    tenant_ctx: &TenantContext,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut conn = app_state.db_pool.acquire().await?;

    sqlx::query("SELECT set_config('app.tenant_id', $1, false)")
        .bind(tenant_ctx.0.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
