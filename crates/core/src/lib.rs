pub mod config;
pub mod domain;
pub mod draft;
pub mod errors;
pub mod rating;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat, LoggingConfig};
pub use domain::breakdown::{round_money, CostSplit, LineItem, LineKind, PriceBreakdown};
pub use domain::request::{
    ContractVariant, PackageVariant, RawServiceRequest, ServiceRequest, ServiceType,
    ValidationMode,
};
pub use domain::tariff::PricingTable;
pub use draft::QuoteDraft;
pub use errors::{RatingError, VariantKind};
pub use rating::{QuoteEngine, RatingEngine, RatingOptions, TariffHandle};
