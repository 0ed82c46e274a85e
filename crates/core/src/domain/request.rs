use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{RatingError, VariantKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Regular,
    ALaCarte,
    GroupCare,
    GroupAnimation,
    SharedNeighbors,
    CorporateContract,
    RecurringPackage,
}

impl ServiceType {
    pub const ALL: [ServiceType; 7] = [
        Self::Regular,
        Self::ALaCarte,
        Self::GroupCare,
        Self::GroupAnimation,
        Self::SharedNeighbors,
        Self::CorporateContract,
        Self::RecurringPackage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::ALaCarte => "ALaCarte",
            Self::GroupCare => "GroupCare",
            Self::GroupAnimation => "GroupAnimation",
            Self::SharedNeighbors => "SharedNeighbors",
            Self::CorporateContract => "CorporateContract",
            Self::RecurringPackage => "RecurringPackage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Regular => "Regular service (no contract)",
            Self::ALaCarte => "A la carte (companionship)",
            Self::GroupCare => "Group care (RPA)",
            Self::GroupAnimation => "Group animation (RPA)",
            Self::SharedNeighbors => "Shared among RPA neighbors",
            Self::CorporateContract => "Corporate contract",
            Self::RecurringPackage => "Recurring package",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts canonical names in any case or separator style, plus the labels
/// and short keys used by the legacy quoting front-ends.
impl FromStr for ServiceType {
    type Err = RatingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_key(value).as_str() {
            "regular" | "regulier" | "régulier" | "régulier(sanscontrat)" => Ok(Self::Regular),
            "alacarte" | "àlacarte" | "àlacarte(animation)" => Ok(Self::ALaCarte),
            "groupcare" | "rpa" | "groupesoinsrpa" => Ok(Self::GroupCare),
            "groupanimation" | "groupeanimationrpa" => Ok(Self::GroupAnimation),
            "sharedneighbors" | "shared" | "partagévoisinsrpa" => Ok(Self::SharedNeighbors),
            "corporatecontract" | "contract" | "contratcorporatif" => Ok(Self::CorporateContract),
            "recurringpackage" | "package" | "forfaitrécurrent" => Ok(Self::RecurringPackage),
            _ => Err(RatingError::InvalidServiceType(value.trim().to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractVariant {
    Weekly,
    Monthly,
    Annual,
}

impl ContractVariant {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Annual => "Annual",
        }
    }
}

impl FromStr for ContractVariant {
    type Err = RatingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_key(value).as_str() {
            "weekly" | "hebdomadaire" => Ok(Self::Weekly),
            "monthly" | "mensuel" => Ok(Self::Monthly),
            "annual" | "yearly" | "annuel" => Ok(Self::Annual),
            _ => Err(RatingError::unknown_variant(VariantKind::Contract, value)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PackageVariant {
    Essential,
    Comfort,
    Premium,
}

impl FromStr for PackageVariant {
    type Err = RatingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_key(value).as_str() {
            "essential" | "essentiel" => Ok(Self::Essential),
            "comfort" | "confort" => Ok(Self::Comfort),
            "premium" => Ok(Self::Premium),
            _ => Err(RatingError::unknown_variant(VariantKind::Package, value)),
        }
    }
}

/// How input problems are handled before rating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Unknown types, unusable durations and missing variants are errors.
    #[default]
    Strict,
    /// Legacy behaviour: fall back to `Regular`, drop unusable durations,
    /// default the contract to weekly and the package to Essential.
    Lenient,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unsupported validation mode `{other}` (expected strict|lenient)")),
        }
    }
}

/// A normalized quote request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub service_type: ServiceType,
    #[serde(default)]
    pub duration_hours: Option<Decimal>,
    #[serde(default)]
    pub num_people: Option<u32>,
    #[serde(default)]
    pub contract_variant: Option<ContractVariant>,
    #[serde(default)]
    pub package_variant: Option<PackageVariant>,
    /// A la carte activity code; its minimum duration may exceed the default.
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub addons: BTreeSet<String>,
}

impl ServiceRequest {
    pub fn new(service_type: ServiceType) -> Self {
        Self {
            service_type,
            duration_hours: None,
            num_people: None,
            contract_variant: None,
            package_variant: None,
            activity: None,
            addons: BTreeSet::new(),
        }
    }

    pub fn with_duration(mut self, hours: Decimal) -> Self {
        self.duration_hours = Some(hours);
        self
    }

    pub fn with_people(mut self, people: u32) -> Self {
        self.num_people = Some(people);
        self
    }

    pub fn with_contract(mut self, variant: ContractVariant) -> Self {
        self.contract_variant = Some(variant);
        self
    }

    pub fn with_package(mut self, variant: PackageVariant) -> Self {
        self.package_variant = Some(variant);
        self
    }

    pub fn with_activity(mut self, code: impl Into<String>) -> Self {
        self.activity = Some(code.into());
        self
    }

    pub fn with_addon(mut self, code: impl Into<String>) -> Self {
        self.addons.insert(code.into());
        self
    }

    /// The duration a formula may bill, bounded by `max_hours`.
    ///
    /// Strict mode rejects a duration above the bound; lenient mode bills the bound.
    pub fn bounded_duration(
        &self,
        max_hours: Decimal,
        mode: ValidationMode,
    ) -> Result<Option<Decimal>, RatingError> {
        match (self.duration_hours, mode) {
            (Some(hours), ValidationMode::Strict) if hours > max_hours => {
                Err(RatingError::InvalidDuration(format!(
                    "{hours} hours exceeds the {}h maximum",
                    max_hours.normalize()
                )))
            }
            (Some(hours), _) => Ok(Some(hours.min(max_hours))),
            (None, _) => Ok(None),
        }
    }

    /// Structural checks only. Range problems are left to the formulas.
    pub fn validate(&self, mode: ValidationMode) -> Result<(), RatingError> {
        if mode == ValidationMode::Lenient {
            return Ok(());
        }

        if let Some(hours) = self.duration_hours {
            if hours.is_sign_negative() && !hours.is_zero() {
                return Err(RatingError::InvalidDuration(format!(
                    "{hours} hours is negative"
                )));
            }
        }

        match self.service_type {
            ServiceType::CorporateContract if self.contract_variant.is_none() => {
                Err(RatingError::missing_variant(VariantKind::Contract))
            }
            ServiceType::RecurringPackage if self.package_variant.is_none() => {
                Err(RatingError::missing_variant(VariantKind::Package))
            }
            _ => Ok(()),
        }
    }
}

/// The loosely typed record handed over by the extraction collaborator.
///
/// Numbers may arrive as JSON numbers or strings (`"2,5"` included), and
/// every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawServiceRequest {
    pub service_type: Option<String>,
    pub duration_hours: Option<Value>,
    pub num_people: Option<Value>,
    pub contract_variant: Option<String>,
    pub package_variant: Option<String>,
    pub activity: Option<String>,
    pub addons: Vec<String>,
}

impl RawServiceRequest {
    pub fn parse(&self, mode: ValidationMode) -> Result<ServiceRequest, RatingError> {
        let strict = mode == ValidationMode::Strict;

        let service_type = match self.service_type.as_deref().map(str::parse::<ServiceType>) {
            Some(Ok(service_type)) => service_type,
            Some(Err(error)) if strict => return Err(error),
            None if strict => {
                return Err(RatingError::InvalidServiceType("<missing>".to_string()));
            }
            _ => ServiceType::Regular,
        };

        let duration_hours = match self.duration_hours.as_ref().map(parse_hours).transpose() {
            Ok(hours) => hours.flatten(),
            Err(detail) if strict => return Err(RatingError::InvalidDuration(detail)),
            Err(_) => None,
        };

        let num_people = self.num_people.as_ref().and_then(parse_count);

        let contract_variant = match service_type {
            ServiceType::CorporateContract => Some(resolve_variant(
                self.contract_variant.as_deref(),
                VariantKind::Contract,
                mode,
                ContractVariant::Weekly,
            )?),
            _ => self.contract_variant.as_deref().and_then(|value| value.parse().ok()),
        };

        let package_variant = match service_type {
            ServiceType::RecurringPackage => Some(resolve_variant(
                self.package_variant.as_deref(),
                VariantKind::Package,
                mode,
                PackageVariant::Essential,
            )?),
            _ => self.package_variant.as_deref().and_then(|value| value.parse().ok()),
        };

        let request = ServiceRequest {
            service_type,
            duration_hours,
            num_people,
            contract_variant,
            package_variant,
            activity: self
                .activity
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            addons: self
                .addons
                .iter()
                .map(|code| code.trim())
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect(),
        };
        request.validate(mode)?;

        Ok(request)
    }
}

fn resolve_variant<T>(
    value: Option<&str>,
    kind: VariantKind,
    mode: ValidationMode,
    fallback: T,
) -> Result<T, RatingError>
where
    T: FromStr<Err = RatingError>,
{
    let value = value.map(str::trim).filter(|value| !value.is_empty());
    match (value.map(str::parse::<T>), mode) {
        (Some(Ok(variant)), _) => Ok(variant),
        (Some(Err(error)), ValidationMode::Strict) => Err(error),
        (None, ValidationMode::Strict) => Err(RatingError::missing_variant(kind)),
        (_, ValidationMode::Lenient) => Ok(fallback),
    }
}

/// `Ok(None)` means "not supplied"; `Err` carries a reason for strict mode.
fn parse_hours(value: &Value) -> Result<Option<Decimal>, String> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) if text.trim().is_empty() => return Ok(None),
        Value::String(text) => parse_decimal(&text.trim().replace(',', ".")),
        other => return Err(format!("expected a number of hours, got `{other}`")),
    };

    match parsed {
        Some(hours) if hours.is_sign_negative() && !hours.is_zero() => {
            Err(format!("{hours} hours is negative"))
        }
        Some(hours) => Ok(Some(hours)),
        None => Err(format!("`{value}` is not a number of hours")),
    }
}

fn parse_count(value: &Value) -> Option<u32> {
    let count = match value {
        Value::Number(number) => parse_decimal(&number.to_string())?,
        Value::String(text) => parse_decimal(text.trim())?,
        _ => return None,
    };

    if count.is_sign_negative() {
        return Some(0);
    }
    // Saturate so an oversized headcount still reaches the range clamp.
    Some(count.trunc().to_u32().unwrap_or(u32::MAX))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)).ok()
}

fn normalize_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
