//! Configuration, filter parameters, and the parameter store shared by the
//! socialdash client, dashboard, and CLI crates.

pub mod app_config;
pub mod config;
pub mod filters;
pub mod pagination;
pub mod products;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::{DateRange, FilterParameters, SearchScope, TimeSeriesMetric};
pub use pagination::{total_pages, PageRequest, Pagination};
pub use products::{load_products, load_products_or_default, Product, ProductsFile};
pub use store::{FilterPatch, ParamSnapshot, ParameterStore, StoreChange};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read products file {path}: {source}")]
    ProductsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse products file: {0}")]
    ProductsFileParse(#[from] serde_yaml::Error),

    #[error("products validation failed: {0}")]
    Validation(String),
}
