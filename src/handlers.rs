pub mod pricing;
pub mod settings;
