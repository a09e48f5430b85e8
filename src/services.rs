pub mod pricing_service;
pub use pricing_service::PricingService;
pub mod settings_service;
pub use settings_service::SettingsService;
