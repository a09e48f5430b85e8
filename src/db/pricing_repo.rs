// src/db/pricing_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    engine::elasticity::ElasticityEstimate,
    models::pricing::{
        AbcCategory, CompetitorPriceObservation, NewPricingRecommendation, PriceElasticityRecord,
        PriceHistoryEntry, PricingRecommendation, Product, RecommendationStatus, SalesRecord,
    },
};

#[derive(Clone, Default)]
pub struct PricingRepository;

impl PricingRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Produtos
    // ---

    pub async fn get_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 AND id = $2",
        )
            .bind(tenant_id)
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn get_all_products<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 ORDER BY sku ASC",
        )
            .bind(tenant_id)
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn update_product_price<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        new_price: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET current_price = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(new_price)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))
    }

    /// Grava a categoria de todos os produtos numa única instrução.
    pub async fn update_abc_categories<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        categories: &[(Uuid, AbcCategory)],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = categories.iter().map(|(id, _)| *id).collect();
        let labels: Vec<&str> = categories.iter().map(|(_, c)| c.as_str()).collect();

        let result = sqlx::query(
            r#"
            UPDATE products p
            SET abc_category = c.category::abc_category, updated_at = NOW()
            FROM UNNEST($2::uuid[], $3::text[]) AS c(id, category)
            WHERE p.tenant_id = $1 AND p.id = c.id
            "#,
        )
            .bind(tenant_id)
            .bind(ids)
            .bind(labels)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // ---
    // Concorrentes, vendas e histórico de preço
    // ---

    /// Observações desde `since`. `product_id = None` traz o catálogo inteiro.
    pub async fn get_competitor_prices<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Option<Uuid>,
        since: NaiveDate,
    ) -> Result<Vec<CompetitorPriceObservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let observations = sqlx::query_as::<_, CompetitorPriceObservation>(
            r#"
            SELECT * FROM competitor_prices
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR product_id = $2)
              AND observed_on >= $3
            ORDER BY product_id, observed_on, id
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(since)
            .fetch_all(executor)
            .await?;
        Ok(observations)
    }

    pub async fn get_sales_since<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Option<Uuid>,
        since: NaiveDate,
    ) -> Result<Vec<SalesRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, SalesRecord>(
            r#"
            SELECT product_id, sale_date, units_sold, selling_price, purchase_price
            FROM sales
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR product_id = $2)
              AND sale_date >= $3
            ORDER BY product_id, sale_date
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(since)
            .fetch_all(executor)
            .await?;
        Ok(sales)
    }

    pub async fn get_price_history<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<Vec<PriceHistoryEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let history = sqlx::query_as::<_, PriceHistoryEntry>(
            r#"
            SELECT product_id, valid_from, regular_price
            FROM price_history
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR product_id = $2)
            ORDER BY product_id, valid_from
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .fetch_all(executor)
            .await?;
        Ok(history)
    }

    pub async fn insert_price_history<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        valid_from: NaiveDate,
        regular_price: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO price_history (tenant_id, product_id, valid_from, regular_price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tenant_id, product_id, valid_from)
            DO UPDATE SET regular_price = EXCLUDED.regular_price
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(valid_from)
            .bind(regular_price)
            .execute(executor)
            .await?;
        Ok(())
    }

    // ---
    // Elasticidade
    // ---

    pub async fn get_elasticity<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<PriceElasticityRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, PriceElasticityRecord>(
            "SELECT * FROM price_elasticity WHERE tenant_id = $1 AND product_id = $2",
        )
            .bind(tenant_id)
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(record)
    }

    pub async fn upsert_elasticity<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        estimate: &ElasticityEstimate,
    ) -> Result<PriceElasticityRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let data_points = i32::try_from(estimate.data_points).unwrap_or(i32::MAX);

        let record = sqlx::query_as::<_, PriceElasticityRecord>(
            r#"
            INSERT INTO price_elasticity
                (tenant_id, product_id, elasticity_coefficient, confidence, sensitivity_label, data_points)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id, product_id)
            DO UPDATE SET
                elasticity_coefficient = EXCLUDED.elasticity_coefficient,
                confidence = EXCLUDED.confidence,
                sensitivity_label = EXCLUDED.sensitivity_label,
                data_points = EXCLUDED.data_points,
                calculated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(estimate.coefficient)
            .bind(estimate.confidence)
            .bind(estimate.sensitivity)
            .bind(data_points)
            .fetch_one(executor)
            .await?;
        Ok(record)
    }

    // ---
    // Recomendações
    // ---

    pub async fn delete_new_recommendations<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM pricing_recommendations WHERE tenant_id = $1 AND status = 'new'",
        )
            .bind(tenant_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_recommendation<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        rec: &NewPricingRecommendation,
    ) -> Result<PricingRecommendation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, PricingRecommendation>(
            r#"
            INSERT INTO pricing_recommendations (
                tenant_id, product_id, current_price, competitor_avg_price,
                recommended_price, recommended_change_percent, reasoning,
                abc_class, action, confidence, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'new')
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(rec.product_id)
            .bind(rec.current_price)
            .bind(rec.competitor_avg_price)
            .bind(rec.recommended_price)
            .bind(rec.recommended_change_percent)
            .bind(&rec.reasoning)
            .bind(rec.abc_class)
            .bind(rec.action)
            .bind(rec.confidence)
            .fetch_one(executor)
            .await?;
        Ok(created)
    }

    pub async fn list_recommendations<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        status: Option<RecommendationStatus>,
    ) -> Result<Vec<PricingRecommendation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recommendations = sqlx::query_as::<_, PricingRecommendation>(
            r#"
            SELECT * FROM pricing_recommendations
            WHERE tenant_id = $1
              AND ($2::recommendation_status IS NULL OR status = $2)
            ORDER BY created_at DESC, abs(recommended_change_percent) DESC
            "#,
        )
            .bind(tenant_id)
            .bind(status)
            .fetch_all(executor)
            .await?;
        Ok(recommendations)
    }

    /// Trava a linha até o fim da transação.
    pub async fn get_recommendation_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        recommendation_id: Uuid,
    ) -> Result<Option<PricingRecommendation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rec = sqlx::query_as::<_, PricingRecommendation>(
            "SELECT * FROM pricing_recommendations WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
            .bind(tenant_id)
            .bind(recommendation_id)
            .fetch_optional(executor)
            .await?;
        Ok(rec)
    }

    pub async fn update_recommendation_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        recommendation_id: Uuid,
        status: RecommendationStatus,
    ) -> Result<PricingRecommendation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PricingRecommendation>(
            r#"
            UPDATE pricing_recommendations
            SET status = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(recommendation_id)
            .bind(status)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::RecommendationNotFound(recommendation_id))
    }
}
