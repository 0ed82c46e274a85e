use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::request::{
    ContractVariant, PackageVariant, ServiceRequest, ServiceType, ValidationMode,
};
use crate::domain::tariff::PricingTable;
use crate::errors::{RatingError, VariantKind};
use crate::rating::RatingOptions;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    Care,
    Animation,
}

impl GroupKind {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Self::Care => ServiceType::GroupCare,
            Self::Animation => ServiceType::GroupAnimation,
        }
    }
}

/// The formula chosen for a request, with the inputs it needs.
///
/// Group services resolve to one of two strategies up front: headcount-driven
/// when a usable headcount is present, flat hourly otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingStrategy {
    Regular { hours: Option<Decimal> },
    ALaCarte { hours: Option<Decimal>, activity: Option<String> },
    GroupHeadcount { kind: GroupKind, people: u32 },
    GroupHourly { kind: GroupKind, hours: Option<Decimal> },
    SharedBlock { neighbors: Option<u32> },
    Contract { variant: ContractVariant, hours_override: Option<Decimal> },
    Package { variant: PackageVariant },
}

impl RatingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Regular { .. } => "regular",
            Self::ALaCarte { .. } => "a_la_carte",
            Self::GroupHeadcount { .. } => "group_headcount",
            Self::GroupHourly { .. } => "group_hourly",
            Self::SharedBlock { .. } => "shared_block",
            Self::Contract { .. } => "contract",
            Self::Package { .. } => "package",
        }
    }
}

pub fn select_strategy(
    request: &ServiceRequest,
    table: &PricingTable,
    options: &RatingOptions,
) -> Result<RatingStrategy, RatingError> {
    let hours = request.bounded_duration(table.max_duration_hours, options.mode)?;

    let strategy = match request.service_type {
        ServiceType::Regular => RatingStrategy::Regular { hours },
        ServiceType::ALaCarte => {
            RatingStrategy::ALaCarte { hours, activity: request.activity.clone() }
        }
        ServiceType::GroupCare => group_strategy(GroupKind::Care, request.num_people, hours, table),
        ServiceType::GroupAnimation => {
            group_strategy(GroupKind::Animation, request.num_people, hours, table)
        }
        ServiceType::SharedNeighbors => {
            RatingStrategy::SharedBlock { neighbors: request.num_people.filter(|count| *count > 0) }
        }
        ServiceType::CorporateContract => {
            let variant = match (request.contract_variant, options.mode) {
                (Some(variant), _) => variant,
                (None, ValidationMode::Strict) => {
                    return Err(RatingError::missing_variant(VariantKind::Contract));
                }
                (None, ValidationMode::Lenient) => ContractVariant::Weekly,
            };
            let hours_override = if options.contract_duration_override {
                hours.filter(|hours| *hours > Decimal::ZERO)
            } else {
                None
            };
            RatingStrategy::Contract { variant, hours_override }
        }
        ServiceType::RecurringPackage => {
            let variant = match (request.package_variant, options.mode) {
                (Some(variant), _) => variant,
                (None, ValidationMode::Strict) => {
                    return Err(RatingError::missing_variant(VariantKind::Package));
                }
                (None, ValidationMode::Lenient) => PackageVariant::Essential,
            };
            RatingStrategy::Package { variant }
        }
    };

    Ok(strategy)
}

fn group_strategy(
    kind: GroupKind,
    people: Option<u32>,
    hours: Option<Decimal>,
    table: &PricingTable,
) -> RatingStrategy {
    match people {
        Some(people) if people >= table.group.min_people => {
            RatingStrategy::GroupHeadcount { kind, people }
        }
        _ => RatingStrategy::GroupHourly { kind, hours },
    }
}
