// src/services/pricing_service.rs

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PricingRepository, SettingsRepository},
    engine::{
        abc, comparison,
        elasticity::{self, ElasticityOutcome},
        percent_difference,
        recommendation::{self, RuleContext},
        smart_price::{self, CompetitorPrices},
    },
    models::pricing::{
        AbcCategory, AbcRunSummary, CompetitorPriceObservation, ElasticityRunSummary,
        NewPricingRecommendation, PriceAction, PricingRecommendation, Product, ProductPriceInsight,
        RecommendationRunSummary, RecommendationStatus, SalesRecord, SmartPriceResult,
    },
};

/// Janela usada para estimar elasticidade: precisa de mudanças de preço suficientes.
const ELASTICITY_LOOKBACK_DAYS: i64 = 365;

fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days)
}

// Agrupa linhas por produto mantendo a ordem de chegada
fn group_by_product<T, F>(rows: Vec<T>, key: F) -> HashMap<Uuid, Vec<T>>
where
    F: Fn(&T) -> Uuid,
{
    rows.into_iter().fold(HashMap::new(), |mut acc, row| {
        acc.entry(key(&row)).or_insert_with(Vec::new).push(row);
        acc
    })
}

/// Monta a recomendação persistível; `maintain` e sugestões sem preço ficam de fora.
fn build_recommendation(
    product: &Product,
    competitor_observations: &[CompetitorPriceObservation],
    product_sales: &[SalesRecord],
    settings: &crate::models::settings::PricingSettings,
    period_start: NaiveDate,
) -> Option<NewPricingRecommendation> {
    let latest = comparison::latest_per_competitor(competitor_observations);
    let comparison = comparison::compare(product.current_price, &latest);

    let units_sold = product_sales
        .iter()
        .fold(Decimal::ZERO, |total, s| total + s.units_sold);

    let ctx = RuleContext {
        our_price: product.current_price,
        comparison: comparison.as_ref(),
        current_margin: product.margin_percent(),
        target_margin: settings.target_margin_percent,
        abc_class: product.abc_category,
        sales_trend: recommendation::sales_trend(
            product_sales,
            period_start,
            i64::from(settings.analysis_period_days),
        ),
        units_sold: Some(units_sold),
        is_private_label: product.is_private_label,
        private_label_min_margin: settings.private_label_min_margin_percent,
    };

    let rec = recommendation::recommend_for_catalog(&ctx);
    if rec.action == PriceAction::Maintain {
        return None;
    }
    let recommended_price = rec.suggested_price?;

    Some(NewPricingRecommendation {
        product_id: product.id,
        current_price: product.current_price,
        competitor_avg_price: comparison.as_ref().map(|c| c.competitor_avg_price),
        recommended_price,
        recommended_change_percent: percent_difference(recommended_price, product.current_price),
        reasoning: rec.reason,
        abc_class: product.abc_category,
        action: rec.action,
        confidence: rec.confidence,
    })
}

#[derive(Clone)]
pub struct PricingService {
    pricing_repo: PricingRepository,
    settings_repo: SettingsRepository,
}

impl PricingService {
    pub fn new(pricing_repo: PricingRepository, settings_repo: SettingsRepository) -> Self {
        Self { pricing_repo, settings_repo }
    }

    // --- COMPARAÇÃO + RECOMENDAÇÃO DE UM PRODUTO ---
    pub async fn get_price_insight<'e, A>(
        &self,
        executor: A,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<ProductPriceInsight, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self.pricing_repo
            .get_product(&mut *tx, tenant_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;
        let settings = self.settings_repo.get_settings(&mut *tx, tenant_id).await?;

        let period_start = window_start(Utc::now().date_naive(), i64::from(settings.analysis_period_days));
        let observations = self.pricing_repo
            .get_competitor_prices(&mut *tx, tenant_id, Some(product_id), period_start)
            .await?;
        let sales = self.pricing_repo
            .get_sales_since(&mut *tx, tenant_id, Some(product_id), period_start)
            .await?;

        tx.commit().await?;

        let latest = comparison::latest_per_competitor(&observations);
        let comparison = comparison::compare(product.current_price, &latest);

        let recommendation = comparison.as_ref().map(|cmp| {
            recommendation::recommend(
                cmp,
                product.margin_percent(),
                settings.target_margin_percent,
                product.abc_category,
                recommendation::sales_trend(&sales, period_start, i64::from(settings.analysis_period_days)),
            )
        });

        Ok(ProductPriceInsight { product_id, comparison, recommendation })
    }

    // --- PREÇO PROMOCIONAL INTELIGENTE ---
    pub async fn get_smart_price<'e, A>(
        &self,
        executor: A,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<SmartPriceResult, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self.pricing_repo
            .get_product(&mut *tx, tenant_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;
        let settings = self.settings_repo.get_settings(&mut *tx, tenant_id).await?;

        let period_start = window_start(Utc::now().date_naive(), i64::from(settings.analysis_period_days));
        let observations = self.pricing_repo
            .get_competitor_prices(&mut *tx, tenant_id, Some(product_id), period_start)
            .await?;
        let elasticity = self.pricing_repo
            .get_elasticity(&mut *tx, tenant_id, product_id)
            .await?;

        tx.commit().await?;

        let latest = comparison::latest_per_competitor(&observations);
        let competitors = comparison::compare(product.current_price, &latest)
            .map(|c| CompetitorPrices {
                min: Some(c.competitor_min_price),
                avg: Some(c.competitor_avg_price),
            })
            .unwrap_or_default();

        let result = smart_price::compute(
            &product,
            &settings,
            competitors,
            elasticity.map(|e| e.elasticity_coefficient),
        );

        tracing::debug!(
            %product_id,
            promo_price = %result.promo_price,
            "preço promocional calculado"
        );

        Ok(result)
    }

    // --- RECÁLCULO DA CURVA ABC ---
    pub async fn recalculate_abc<'e, A>(
        &self,
        executor: A,
        tenant_id: Uuid,
    ) -> Result<AbcRunSummary, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let settings = self.settings_repo.get_settings(&mut *tx, tenant_id).await?;
        let period_start = window_start(Utc::now().date_naive(), i64::from(settings.analysis_period_days));

        let products = self.pricing_repo.get_all_products(&mut *tx, tenant_id).await?;
        let sales = self.pricing_repo
            .get_sales_since(&mut *tx, tenant_id, None, period_start)
            .await?;

        let revenue = abc::aggregate_revenue(&sales);
        // Todo produto entra no ranking; quem não vendeu fica com receita zero (classe C)
        let revenue_by_product: HashMap<Uuid, Decimal> = products
            .iter()
            .map(|p| (p.id, revenue.get(&p.id).copied().unwrap_or(Decimal::ZERO)))
            .collect();

        let categories = abc::classify(&revenue_by_product, settings.abc_thresholds());
        let (category_a, category_b, category_c) = abc::category_counts(&categories);

        let mut assignments: Vec<(Uuid, AbcCategory)> = categories.into_iter().collect();
        assignments.sort_by_key(|(id, _)| *id);

        let updated = self.pricing_repo
            .update_abc_categories(&mut *tx, tenant_id, &assignments)
            .await?;

        tx.commit().await?;

        let total_revenue: Decimal = revenue_by_product.values().copied().sum();
        tracing::info!(
            "📊 Curva ABC recalculada: {} produtos ({} atualizados) | A={} B={} C={}",
            products.len(), updated, category_a, category_b, category_c
        );

        Ok(AbcRunSummary {
            total_products: products.len(),
            category_a,
            category_b,
            category_c,
            total_revenue,
            analysis_period_days: settings.analysis_period_days,
        })
    }

    // --- RECÁLCULO DAS RECOMENDAÇÕES ---
    pub async fn recalculate_recommendations<'e, A>(
        &self,
        executor: A,
        tenant_id: Uuid,
    ) -> Result<RecommendationRunSummary, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let settings = self.settings_repo.get_settings(&mut *tx, tenant_id).await?;
        let period_start = window_start(Utc::now().date_naive(), i64::from(settings.analysis_period_days));

        let products = self.pricing_repo.get_all_products(&mut *tx, tenant_id).await?;
        let observations = group_by_product(
            self.pricing_repo
                .get_competitor_prices(&mut *tx, tenant_id, None, period_start)
                .await?,
            |o| o.product_id,
        );
        let sales = group_by_product(
            self.pricing_repo
                .get_sales_since(&mut *tx, tenant_id, None, period_start)
                .await?,
            |s| s.product_id,
        );

        // Apaga e regrava na mesma transação: quem lê nunca vê a lista vazia
        let removed = self.pricing_repo.delete_new_recommendations(&mut *tx, tenant_id).await?;

        let mut summary = RecommendationRunSummary {
            products_analyzed: products.len(),
            ..Default::default()
        };

        for product in &products {
            let Some(new_rec) = build_recommendation(
                product,
                observations.get(&product.id).map(Vec::as_slice).unwrap_or_default(),
                sales.get(&product.id).map(Vec::as_slice).unwrap_or_default(),
                &settings,
                period_start,
            ) else {
                continue;
            };

            // Savepoint: uma falha não derruba o lote inteiro
            let mut savepoint = tx.begin().await?;
            match self.pricing_repo.insert_recommendation(&mut *savepoint, tenant_id, &new_rec).await {
                Ok(_) => {
                    savepoint.commit().await?;
                    summary.recommendations_created += 1;
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    summary.failed_inserts += 1;
                    tracing::warn!("⚠️ Falha ao gravar recomendação do produto {}: {}", product.id, e);
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            "💡 Recomendações recalculadas: {} produtos, {} removidas, {} criadas, {} falhas",
            summary.products_analyzed, removed, summary.recommendations_created, summary.failed_inserts
        );

        Ok(summary)
    }

    // --- RECÁLCULO DA ELASTICIDADE ---
    pub async fn recalculate_elasticity<'e, A>(
        &self,
        executor: A,
        tenant_id: Uuid,
        product_id: Option<Uuid>,
    ) -> Result<ElasticityRunSummary, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let products = match product_id {
            Some(id) => vec![
                self.pricing_repo
                    .get_product(&mut *tx, tenant_id, id)
                    .await?
                    .ok_or(AppError::ProductNotFound(id))?,
            ],
            None => self.pricing_repo.get_all_products(&mut *tx, tenant_id).await?,
        };

        let since = window_start(Utc::now().date_naive(), ELASTICITY_LOOKBACK_DAYS);
        let sales = group_by_product(
            self.pricing_repo.get_sales_since(&mut *tx, tenant_id, product_id, since).await?,
            |s| s.product_id,
        );
        let history = group_by_product(
            self.pricing_repo.get_price_history(&mut *tx, tenant_id, product_id).await?,
            |h| h.product_id,
        );

        let mut summary = ElasticityRunSummary {
            products_analyzed: products.len(),
            ..Default::default()
        };

        for product in &products {
            let outcome = elasticity::estimate(
                sales.get(&product.id).map(Vec::as_slice).unwrap_or_default(),
                history.get(&product.id).map(Vec::as_slice).unwrap_or_default(),
            );

            match outcome {
                ElasticityOutcome::Computed(estimate) => {
                    self.pricing_repo
                        .upsert_elasticity(&mut *tx, tenant_id, product.id, &estimate)
                        .await?;
                    summary.estimates_saved += 1;
                }
                ElasticityOutcome::Unavailable(reason) => {
                    tracing::debug!(product_id = %product.id, ?reason, "elasticidade sem dados suficientes");
                    summary.insufficient_data += 1;
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            "📈 Elasticidade recalculada: {} produtos, {} estimativas, {} sem dados",
            summary.products_analyzed, summary.estimates_saved, summary.insufficient_data
        );

        Ok(summary)
    }

    // --- LISTAGEM ---
    pub async fn list_recommendations<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        status: Option<RecommendationStatus>,
    ) -> Result<Vec<PricingRecommendation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.pricing_repo.list_recommendations(executor, tenant_id, status).await
    }

    // --- APLICAR / DESCARTAR ---
    pub async fn update_recommendation_status<'e, A>(
        &self,
        executor: A,
        tenant_id: Uuid,
        recommendation_id: Uuid,
        status: RecommendationStatus,
    ) -> Result<PricingRecommendation, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        if status == RecommendationStatus::New {
            return Err(AppError::InvalidRecommendationStatus);
        }

        let mut tx = executor.begin().await?;

        let rec = self.pricing_repo
            .get_recommendation_for_update(&mut *tx, tenant_id, recommendation_id)
            .await?
            .ok_or(AppError::RecommendationNotFound(recommendation_id))?;

        if rec.status != RecommendationStatus::New {
            return Err(AppError::RecommendationAlreadyProcessed(recommendation_id));
        }

        if status == RecommendationStatus::Applied {
            self.pricing_repo
                .update_product_price(&mut *tx, tenant_id, rec.product_id, rec.recommended_price)
                .await?;
            self.pricing_repo
                .insert_price_history(
                    &mut *tx,
                    tenant_id,
                    rec.product_id,
                    Utc::now().date_naive(),
                    rec.recommended_price,
                )
                .await?;
        }

        let updated = self.pricing_repo
            .update_recommendation_status(&mut *tx, tenant_id, recommendation_id, status)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "✅ Recomendação {} marcada como {:?} (produto {})",
            recommendation_id, status, rec.product_id
        );

        Ok(updated)
    }
}
