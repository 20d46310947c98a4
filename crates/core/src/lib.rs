pub mod config;
pub mod controller;
pub mod food;
pub mod metrics;
pub mod providers;
pub mod ranking;
pub mod search;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ProviderKind,
    SanitizedConfig,
};
pub use controller::{SearchController, SearchPhase, SearchSnapshot};
pub use food::{normalize_barcode, FoodItem, FoodSource, NutriScore};
pub use providers::{
    FoodProvider, OpenFoodFactsClient, OpenFoodFactsConfig, ProviderError, UsdaClient, UsdaConfig,
};
pub use ranking::{rank, RESULT_CAP};
pub use search::{BarcodeOutcome, FallbackSearcher, FoodSearch, SearchOutcome};
