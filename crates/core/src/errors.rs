use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the rating entrypoints.
///
/// Out-of-range durations and headcounts never show up here; the formulas
/// clamp them. Only structurally invalid input and a missing tariff do.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    #[error("unknown service type `{0}`")]
    InvalidServiceType(String),
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("invalid {kind} variant: {detail}")]
    InvalidVariant { kind: VariantKind, detail: String },
    #[error("pricing configuration unavailable: {0}")]
    ConfigurationMissing(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantKind {
    Contract,
    Package,
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contract => f.write_str("contract"),
            Self::Package => f.write_str("package"),
        }
    }
}

impl RatingError {
    pub fn missing_variant(kind: VariantKind) -> Self {
        Self::InvalidVariant { kind, detail: "a variant is required for this service type".into() }
    }

    pub fn unknown_variant(kind: VariantKind, value: &str) -> Self {
        Self::InvalidVariant { kind, detail: format!("`{}` is not a known variant", value.trim()) }
    }

    /// Stable machine-readable code for logs and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidServiceType(_) => "invalid_service_type",
            Self::InvalidDuration(_) => "invalid_duration",
            Self::InvalidVariant { .. } => "invalid_variant",
            Self::ConfigurationMissing(_) => "configuration_missing",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidServiceType(_) => {
                "The requested service type is not offered. Choose a listed service and try again."
            }
            Self::InvalidDuration(_) => "The service duration must be a positive number of hours.",
            Self::InvalidVariant { kind: VariantKind::Contract, .. } => {
                "Choose a weekly, monthly or annual contract."
            }
            Self::InvalidVariant { kind: VariantKind::Package, .. } => {
                "Choose the Essential, Comfort or Premium package."
            }
            Self::ConfigurationMissing(_) => {
                "Pricing is temporarily unavailable. Please retry shortly."
            }
        }
    }
}

impl From<ConfigError> for RatingError {
    fn from(value: ConfigError) -> Self {
        Self::ConfigurationMissing(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::errors::{RatingError, VariantKind};

    #[test]
    fn variant_errors_name_the_kind() {
        let error = RatingError::unknown_variant(VariantKind::Package, " Gold ");

        assert_eq!(error.to_string(), "invalid package variant: `Gold` is not a known variant");
        assert_eq!(error.code(), "invalid_variant");
        assert_eq!(error.user_message(), "Choose the Essential, Comfort or Premium package.");
    }

    #[test]
    fn config_failure_maps_to_configuration_missing() {
        let error = RatingError::from(ConfigError::Validation("taxes.first.rate".to_owned()));

        assert!(matches!(
            error,
            RatingError::ConfigurationMissing(ref message) if message.contains("taxes.first.rate")
        ));
        assert_eq!(error.user_message(), "Pricing is temporarily unavailable. Please retry shortly.");
    }

    #[test]
    fn structural_errors_have_distinct_codes() {
        let codes = [
            RatingError::InvalidServiceType("spa".to_owned()).code(),
            RatingError::InvalidDuration("-1".to_owned()).code(),
            RatingError::missing_variant(VariantKind::Contract).code(),
            RatingError::ConfigurationMissing("empty".to_owned()).code(),
        ];

        for (index, code) in codes.iter().enumerate() {
            assert!(!codes[index + 1..].contains(code), "duplicate code {code}");
        }
    }
}
