use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::request::ValidationMode;
use crate::domain::tariff::PricingTable;
use crate::rating::RatingOptions;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub tariff: PricingTable,
    pub rating: RatingOptions,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub validation_mode: Option<ValidationMode>,
    pub contract_duration_override: Option<bool>,
    pub first_tax_rate: Option<Decimal>,
    pub second_tax_rate: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tariff: PricingTable::default(),
            rating: RatingOptions::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file, then `CAREQUOTE_*` environment
    /// variables, then programmatic overrides. Validated last.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("carequote.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        tracing::info!(
            event_name = "system.config.loaded",
            currency = %config.tariff.currency.0,
            validation_mode = ?config.rating.mode,
            "tariff configuration loaded"
        );

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(tariff) = patch.tariff {
            self.tariff = tariff;
        }

        if let Some(rating) = patch.rating {
            if let Some(mode) = rating.mode {
                self.rating.mode = mode;
            }
            if let Some(contract_duration_override) = rating.contract_duration_override {
                self.rating.contract_duration_override = contract_duration_override;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let taxes = &mut self.tariff.taxes;
        if let Some(rate) = env_override::<Decimal>("CAREQUOTE_TAX_FIRST_RATE")? {
            taxes.first.rate = rate;
        }
        if let Some(rate) = env_override::<Decimal>("CAREQUOTE_TAX_SECOND_RATE")? {
            taxes.second.rate = rate;
        }

        if let Some(mode) = env_override::<ValidationMode>("CAREQUOTE_RATING_MODE")? {
            self.rating.mode = mode;
        }
        if let Some(enabled) = env_override::<bool>("CAREQUOTE_CONTRACT_DURATION_OVERRIDE")? {
            self.rating.contract_duration_override = enabled;
        }

        if let Some(level) = env_text(&["CAREQUOTE_LOGGING_LEVEL", "CAREQUOTE_LOG_LEVEL"]) {
            self.logging.level = level;
        }
        if let Some(format) = env_text(&["CAREQUOTE_LOGGING_FORMAT", "CAREQUOTE_LOG_FORMAT"]) {
            self.logging.format = format.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(mode) = overrides.validation_mode {
            self.rating.mode = mode;
        }
        if let Some(contract_duration_override) = overrides.contract_duration_override {
            self.rating.contract_duration_override = contract_duration_override;
        }
        if let Some(rate) = overrides.first_tax_rate {
            self.tariff.taxes.first.rate = rate;
        }
        if let Some(rate) = overrides.second_tax_rate {
            self.tariff.taxes.second.rate = rate;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tariff(&self.tariff)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("carequote.toml"), PathBuf::from("config/carequote.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces `${VAR}` with the variable's value; a missing variable is an error.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let key = &after[..end];
        let value = env::var(key)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.to_string() })?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);

    Ok(output)
}

/// Checks the structural soundness of a tariff: the formulas rely on
/// these to stay total (no zero divisors, ordered ranges).
pub fn validate_tariff(tariff: &PricingTable) -> Result<(), ConfigError> {
    check(!tariff.currency.0.trim().is_empty(), "currency must not be empty")?;

    check(
        tariff.max_duration_hours > Decimal::ZERO,
        "max_duration_hours must be greater than zero",
    )?;

    let regular = &tariff.regular;
    check(!regular.tiers.is_empty(), "regular.tiers must contain at least one tier")?;
    check(regular.minimum_hours > Decimal::ZERO, "regular.minimum_hours must be greater than zero")?;
    check(!regular.overage_rate.is_sign_negative(), "regular.overage_rate must be >= 0")?;
    for tier in &regular.tiers {
        check(tier.hours > Decimal::ZERO, "regular.tiers hours must be greater than zero")?;
        check(!tier.price.is_sign_negative(), "regular.tiers price must be >= 0")?;
    }
    check(
        regular.tiers.windows(2).all(|pair| pair[0].hours < pair[1].hours),
        "regular.tiers must be strictly ascending by hours",
    )?;

    let a_la_carte = &tariff.a_la_carte;
    check(
        a_la_carte.minimum_hours > Decimal::ZERO,
        "a_la_carte.minimum_hours must be greater than zero",
    )?;
    check(!a_la_carte.hourly_rate.is_sign_negative(), "a_la_carte.hourly_rate must be >= 0")?;
    check(!a_la_carte.minimum_price.is_sign_negative(), "a_la_carte.minimum_price must be >= 0")?;
    check(
        a_la_carte.activities.iter().all(|activity| activity.minimum_hours > Decimal::ZERO),
        "a_la_carte.activities minimum_hours must be greater than zero",
    )?;
    check(
        unique(a_la_carte.activities.iter().map(|activity| activity.code.to_ascii_lowercase())),
        "a_la_carte.activities codes must be unique",
    )?;

    let group = &tariff.group;
    check(group.min_people > 0, "group.min_people must be greater than zero")?;
    check(group.min_people <= group.max_people, "group.min_people must be <= group.max_people")?;
    check(group.base_hours > Decimal::ZERO, "group.base_hours must be greater than zero")?;
    check(group.hour_increment > Decimal::ZERO, "group.hour_increment must be greater than zero")?;
    check(!group.hourly_rate.is_sign_negative(), "group.hourly_rate must be >= 0")?;
    check(!group.hours_per_person.is_sign_negative(), "group.hours_per_person must be >= 0")?;

    let shared = &tariff.shared;
    check(shared.min_neighbors > 0, "shared.min_neighbors must be greater than zero")?;
    check(
        shared.min_neighbors <= shared.max_neighbors,
        "shared.min_neighbors must be <= shared.max_neighbors",
    )?;
    check(shared.block_hours > Decimal::ZERO, "shared.block_hours must be greater than zero")?;
    check(!shared.block_price.is_sign_negative(), "shared.block_price must be >= 0")?;

    for (variant, entry) in tariff.contracts.entries() {
        if entry.rate.is_sign_negative() || entry.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "contracts.{} rate and price must be >= 0",
                variant.label().to_ascii_lowercase()
            )));
        }
    }

    for (variant, entry) in tariff.packages.entries() {
        if entry.monthly_price.is_sign_negative() || entry.hourly_rate.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "packages.{variant:?} monthly_price and hourly_rate must be >= 0"
            )));
        }
    }

    check(
        tariff.addons.iter().all(|addon| !addon.code.trim().is_empty()),
        "addons codes must not be empty",
    )?;
    check(
        tariff.addons.iter().all(|addon| !addon.amount.is_sign_negative()),
        "addons amounts must be >= 0",
    )?;
    check(unique(tariff.addons.iter().map(|addon| addon.code.clone())), "addons codes must be unique")?;

    for (name, tax) in [("taxes.first", &tariff.taxes.first), ("taxes.second", &tariff.taxes.second)]
    {
        if tax.rate.is_sign_negative() || tax.rate >= Decimal::ONE {
            return Err(ConfigError::Validation(format!("{name}.rate must be in range 0..1")));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn check(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.to_string()))
    }
}

fn unique(values: impl Iterator<Item = String>) -> bool {
    let mut seen = HashSet::new();
    values.into_iter().all(|value| seen.insert(value))
}

/// First non-blank value among `keys`, in order.
fn env_text(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Typed environment override. Unset or blank variables leave the layer below untouched.
fn env_override<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    let Some(value) = env_text(&[key]) else {
        return Ok(None);
    };

    match value.parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    tariff: Option<PricingTable>,
    rating: Option<RatingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RatingPatch {
    mode: Option<ValidationMode>,
    contract_duration_override: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
