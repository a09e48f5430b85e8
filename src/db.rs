pub mod pricing_repo;
pub use pricing_repo::PricingRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
