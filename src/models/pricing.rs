// src/models/pricing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

/// Curva ABC: A = maiores contribuidores de receita, C = cauda longa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "abc_category")]
pub enum AbcCategory {
    A,
    B,
    C,
}

impl AbcCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbcCategory::A => "A",
            AbcCategory::B => "B",
            AbcCategory::C => "C",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recommendation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    New,
    Applied,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "price_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceAction {
    Increase,
    Decrease,
    Maintain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recommendation_confidence", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "price_sensitivity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLabel {
    Inelastic,
    Normal,
    HighlyElastic,
}

/// Posição do nosso preço em relação aos concorrentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PricePosition {
    CheaperThanAll,
    CheaperThanAvg,
    AroundAvg,
    MoreExpensiveThanAvg,
    MoreExpensiveThanAll,
    NoCompetitorData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SalesTrend {
    Growing,
    Stable,
    Declining,
}

// --- Structs (tabelas) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "CAF-500G")]
    pub sku: String,
    #[schema(example = "Café Torrado 500g")]
    pub name: String,
    #[schema(example = "12.40")]
    pub cost_price: Decimal,
    #[schema(example = "18.90")]
    pub current_price: Decimal,
    pub abc_category: Option<AbcCategory>,
    pub is_private_label: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Margem atual em % sobre o preço de venda: (preço - custo) / preço * 100.
    pub fn margin_percent(&self) -> Decimal {
        crate::engine::margin_percent(self.current_price, self.cost_price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorPriceObservation {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = "Mercado Concorrente")]
    pub competitor_name: String,
    /// Preço regular (de prateleira)
    pub price: Decimal,
    pub promo_price: Option<Decimal>,
    pub is_on_promo: bool,
    pub observed_on: NaiveDate,
}

// Uma linha de venda. Receita do período = (venda - compra) * unidades.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub product_id: Uuid,
    pub sale_date: NaiveDate,
    pub units_sold: Decimal,
    pub selling_price: Decimal,
    pub purchase_price: Decimal,
}

impl SalesRecord {
    pub fn revenue(&self) -> Decimal {
        (self.selling_price - self.purchase_price) * self.units_sold
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub product_id: Uuid,
    pub valid_from: NaiveDate,
    pub regular_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceElasticityRecord {
    pub product_id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub elasticity_coefficient: f64,
    #[schema(example = 0.6)]
    pub confidence: f64,
    pub sensitivity_label: SensitivityLabel,
    pub data_points: i32,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRecommendation {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub current_price: Decimal,
    pub competitor_avg_price: Option<Decimal>,
    pub recommended_price: Decimal,
    #[schema(example = "3.00")]
    pub recommended_change_percent: Decimal,
    #[schema(example = "Produto A com vendas em queda e mais caro que todos os concorrentes.")]
    pub reasoning: String,
    pub abc_class: Option<AbcCategory>,
    pub action: PriceAction,
    pub confidence: Confidence,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha ainda não persistida (gerada pelo recálculo em lote)
#[derive(Debug, Clone)]
pub struct NewPricingRecommendation {
    pub product_id: Uuid,
    pub current_price: Decimal,
    pub competitor_avg_price: Option<Decimal>,
    pub recommended_price: Decimal,
    pub recommended_change_percent: Decimal,
    pub reasoning: String,
    pub abc_class: Option<AbcCategory>,
    pub action: PriceAction,
    pub confidence: Confidence,
}

// --- Resultados calculados (não são tabelas) ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub our_price: Decimal,
    pub competitor_min_price: Decimal,
    pub competitor_avg_price: Decimal,
    pub competitor_max_price: Decimal,
    /// Menor preço promocional ativo entre os concorrentes
    pub competitor_discount_price: Option<Decimal>,
    pub price_position: PricePosition,
    #[schema(example = "-9.52")]
    pub price_difference_vs_avg: Decimal,
    pub price_difference_vs_min: Decimal,
    pub total_competitors: usize,
    pub competitors_with_promo: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: PriceAction,
    pub suggested_price: Option<Decimal>,
    pub reason: String,
    pub confidence: Confidence,
}

/// Resposta da análise de um produto. Sem observações de concorrentes, os dois campos vêm nulos.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPriceInsight {
    pub product_id: Uuid,
    pub comparison: Option<PriceComparison>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmartPriceConstraints {
    pub min_margin: bool,
    pub max_discount: bool,
    pub above_competitor_min: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmartPriceResult {
    pub current_price: Decimal,
    pub promo_price: Decimal,
    pub promo_margin: Decimal,
    pub discount_percent: Decimal,
    pub expected_uplift_percent: Decimal,
    pub constraints_met: SmartPriceConstraints,
}

// --- Resumos dos jobs em lote ---

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbcRunSummary {
    pub total_products: usize,
    pub category_a: usize,
    pub category_b: usize,
    pub category_c: usize,
    pub total_revenue: Decimal,
    pub analysis_period_days: i32,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRunSummary {
    pub products_analyzed: usize,
    pub recommendations_created: usize,
    pub failed_inserts: usize,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElasticityRunSummary {
    pub products_analyzed: usize,
    pub estimates_saved: usize,
    pub insufficient_data: usize,
}
