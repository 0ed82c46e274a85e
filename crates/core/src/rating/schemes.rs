//! One pure function per billing scheme.
//!
//! Each formula is total over its domain: durations and headcounts outside
//! the scheme's range are clamped, never rejected. Amounts keep full decimal
//! precision; rounding happens at the presentation boundary.

use rust_decimal::Decimal;

use crate::domain::breakdown::{round_money, CostSplit, LineItem};
use crate::domain::request::{ContractVariant, PackageVariant};
use crate::domain::tariff::{
    ALaCarteTariff, ContractTable, GroupTariff, PackageTable, PricingTable, RegularTariff,
    SharedTariff,
};
use crate::rating::dispatch::{GroupKind, RatingStrategy};

/// Base charge for one request, before add-ons and taxes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemeRating {
    pub base_amount: Decimal,
    pub description: String,
    /// The base line first, then any informational lines that belong to it.
    pub lines: Vec<LineItem>,
    pub billed_hours: Option<Decimal>,
    pub effective_rate: Decimal,
    pub split: Option<CostSplit>,
}

impl SchemeRating {
    fn new(description: String, base_amount: Decimal, effective_rate: Decimal) -> Self {
        Self {
            lines: vec![LineItem::base(description.clone(), base_amount)],
            base_amount,
            description,
            billed_hours: None,
            effective_rate,
            split: None,
        }
    }

    fn hours(mut self, hours: Decimal) -> Self {
        self.billed_hours = Some(hours);
        self
    }

    fn split(mut self, split: CostSplit, info_label: String) -> Self {
        self.lines.push(LineItem::info(info_label));
        self.split = Some(split);
        self
    }
}

pub fn rate_strategy(strategy: &RatingStrategy, table: &PricingTable) -> SchemeRating {
    match strategy {
        RatingStrategy::Regular { hours } => rate_regular(*hours, &table.regular),
        RatingStrategy::ALaCarte { hours, activity } => {
            rate_a_la_carte(*hours, activity.as_deref(), &table.a_la_carte)
        }
        RatingStrategy::GroupHeadcount { kind, people } => {
            rate_group_headcount(*kind, *people, &table.group)
        }
        RatingStrategy::GroupHourly { kind, hours } => {
            rate_group_hourly(*kind, *hours, &table.group)
        }
        RatingStrategy::SharedBlock { neighbors } => rate_shared(*neighbors, &table.shared),
        RatingStrategy::Contract { variant, hours_override } => {
            rate_contract(*variant, *hours_override, &table.contracts)
        }
        RatingStrategy::Package { variant } => rate_package(*variant, &table.packages),
    }
}

/// Tier price for `hours`: the first tier whose hour count covers it, then
/// the last tier plus overage.
pub fn regular_price(hours: Decimal, tariff: &RegularTariff) -> Decimal {
    if let Some(tier) = tariff.tiers.iter().find(|tier| hours <= tier.hours) {
        return tier.price;
    }

    match tariff.tiers.last() {
        Some(last) => last.price + (hours - last.hours) * tariff.overage_rate,
        None => hours * tariff.overage_rate,
    }
}

pub fn rate_regular(hours: Option<Decimal>, tariff: &RegularTariff) -> SchemeRating {
    let hours = clamp_hours(hours, tariff.minimum_hours);
    let base = regular_price(hours, tariff);

    let description = match tariff.tiers.last() {
        Some(last) if hours > last.hours => format!(
            "Regular service - {}h ({} base + {}h x {}/h)",
            fmt_hours(hours),
            fmt_money(last.price),
            fmt_hours(hours - last.hours),
            fmt_money(tariff.overage_rate)
        ),
        _ => format!("Regular service - {}h", fmt_hours(hours)),
    };

    SchemeRating::new(description, base, safe_div(base, hours)).hours(hours)
}

pub fn rate_a_la_carte(
    hours: Option<Decimal>,
    activity: Option<&str>,
    tariff: &ALaCarteTariff,
) -> SchemeRating {
    let activity = activity.and_then(|code| tariff.activity(code));
    let minimum = activity
        .map(|activity| activity.minimum_hours.max(tariff.minimum_hours))
        .unwrap_or(tariff.minimum_hours);
    let hours = clamp_hours(hours, minimum);
    let base = (hours * tariff.hourly_rate).max(tariff.minimum_price);

    let name = activity.map(|activity| activity.name.as_str()).unwrap_or("Companionship");
    let description = format!(
        "{name} - {}h x {}/h (min {}h)",
        fmt_hours(hours),
        fmt_money(tariff.hourly_rate),
        fmt_hours(minimum)
    );

    SchemeRating::new(description, base, safe_div(base, hours)).hours(hours)
}

/// Hours a group visit needs for `people` residents, before the base-hours floor.
pub fn group_required_hours(people: u32, tariff: &GroupTariff) -> Decimal {
    let raw = tariff.hours_per_person * Decimal::from(people) + tariff.setup_hours;
    ceil_to_increment(raw, tariff.hour_increment)
}

pub fn rate_group_headcount(kind: GroupKind, people: u32, tariff: &GroupTariff) -> SchemeRating {
    let people = people.clamp(tariff.min_people, tariff.max_people.max(tariff.min_people));
    let hours = group_required_hours(people, tariff).max(tariff.base_hours);
    let base = hours * tariff.hourly_rate;
    let participants = Decimal::from(people);
    let per_person = safe_div(base, participants);

    let description = format!(
        "{} - {people} people x {}h",
        kind.service_type().label(),
        fmt_hours(hours)
    );
    let split = CostSplit {
        participants: people,
        cost_per_participant: per_person,
        hours_per_participant: safe_div(hours, participants),
    };

    SchemeRating::new(description, base, tariff.hourly_rate)
        .hours(hours)
        .split(split, format!("({} per person)", fmt_money(per_person)))
}

pub fn rate_group_hourly(kind: GroupKind, hours: Option<Decimal>, tariff: &GroupTariff) -> SchemeRating {
    let hours = clamp_hours(hours, tariff.base_hours);
    let base = hours * tariff.hourly_rate;

    let description = format!(
        "{} - {}h x {}/h",
        kind.service_type().label(),
        fmt_hours(hours),
        fmt_money(tariff.hourly_rate)
    );

    SchemeRating::new(description, base, tariff.hourly_rate).hours(hours)
}

/// The full block is always billed; the split is for display.
pub fn rate_shared(neighbors: Option<u32>, tariff: &SharedTariff) -> SchemeRating {
    let max = tariff.max_neighbors.max(tariff.min_neighbors);
    let neighbors = neighbors.unwrap_or(max).clamp(tariff.min_neighbors, max);
    let count = Decimal::from(neighbors);
    let per_neighbor = safe_div(tariff.block_price, count);

    let description = format!(
        "Shared block, {neighbors} neighbors - {}h",
        fmt_hours(tariff.block_hours)
    );
    let split = CostSplit {
        participants: neighbors,
        cost_per_participant: per_neighbor,
        hours_per_participant: safe_div(tariff.block_hours, count),
    };

    SchemeRating::new(
        description,
        tariff.block_price,
        safe_div(tariff.block_price, tariff.block_hours),
    )
    .hours(tariff.block_hours)
    .split(split, format!("({} per neighbor)", fmt_money(per_neighbor)))
}

pub fn rate_contract(
    variant: ContractVariant,
    hours_override: Option<Decimal>,
    table: &ContractTable,
) -> SchemeRating {
    let entry = table.get(variant);

    match hours_override.filter(|hours| *hours > Decimal::ZERO) {
        Some(hours) => {
            let description = format!(
                "{} contract - {}h x {}/h",
                variant.label(),
                fmt_hours(hours),
                fmt_money(entry.rate)
            );
            SchemeRating::new(description, hours * entry.rate, entry.rate).hours(hours)
        }
        None => {
            let description = format!(
                "{} contract - {} x {}/h",
                variant.label(),
                entry.commitment,
                fmt_money(entry.rate)
            );
            SchemeRating::new(description, entry.price, entry.rate).hours(entry.committed_hours)
        }
    }
}

pub fn rate_package(variant: PackageVariant, table: &PackageTable) -> SchemeRating {
    let entry = table.get(variant);
    let description = format!(
        "{} package - {}h/month ({})",
        entry.name,
        fmt_hours(entry.monthly_hours),
        entry.frequency
    );

    SchemeRating::new(description, entry.monthly_price, entry.hourly_rate)
        .hours(entry.monthly_hours)
}

fn clamp_hours(hours: Option<Decimal>, floor: Decimal) -> Decimal {
    hours.unwrap_or(Decimal::ZERO).max(floor)
}

fn ceil_to_increment(value: Decimal, increment: Decimal) -> Decimal {
    match value.checked_div(increment) {
        Some(steps) if increment > Decimal::ZERO => steps.ceil() * increment,
        _ => value,
    }
}

fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

fn fmt_hours(hours: Decimal) -> String {
    hours.normalize().to_string()
}

fn fmt_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}
