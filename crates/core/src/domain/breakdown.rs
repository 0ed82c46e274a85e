use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::request::ServiceType;

/// Two decimal places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Base,
    /// Zero-amount display line, e.g. the per-person share under a group charge.
    Info,
    Addon,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
    pub kind: LineKind,
}

impl LineItem {
    pub fn base(label: impl Into<String>, amount: Decimal) -> Self {
        Self { label: label.into(), amount, kind: LineKind::Base }
    }

    pub fn info(label: impl Into<String>) -> Self {
        Self { label: label.into(), amount: Decimal::ZERO, kind: LineKind::Info }
    }

    pub fn addon(label: impl Into<String>, amount: Decimal) -> Self {
        Self { label: label.into(), amount, kind: LineKind::Addon }
    }
}

/// How a fixed charge divides among participants. Display only; the full
/// base amount is always what gets billed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSplit {
    pub participants: u32,
    pub cost_per_participant: Decimal,
    pub hours_per_participant: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub service_type: ServiceType,
    pub description: String,
    pub currency: String,
    pub base_amount: Decimal,
    pub billed_hours: Option<Decimal>,
    pub line_items: Vec<LineItem>,
    pub addon_total: Decimal,
    pub subtotal: Decimal,
    pub tax1: Decimal,
    pub tax2: Decimal,
    pub total: Decimal,
    pub effective_rate: Decimal,
    pub split: Option<CostSplit>,
}

impl PriceBreakdown {
    /// Sum of the lines that carry monetary weight.
    pub fn charged_lines_total(&self) -> Decimal {
        self.line_items
            .iter()
            .filter(|line| line.kind != LineKind::Info)
            .map(|line| line.amount)
            .sum()
    }

    /// Presentation view: every monetary field at two decimals.
    ///
    /// `tax1`, `tax2` and `total` are already rounded by the tax step and
    /// pass through unchanged.
    pub fn rounded(&self) -> Self {
        Self {
            service_type: self.service_type,
            description: self.description.clone(),
            currency: self.currency.clone(),
            base_amount: round_money(self.base_amount),
            billed_hours: self.billed_hours,
            line_items: self
                .line_items
                .iter()
                .map(|line| LineItem { amount: round_money(line.amount), ..line.clone() })
                .collect(),
            addon_total: round_money(self.addon_total),
            subtotal: round_money(self.subtotal),
            tax1: self.tax1,
            tax2: self.tax2,
            total: self.total,
            effective_rate: round_money(self.effective_rate),
            split: self.split.as_ref().map(|split| CostSplit {
                participants: split.participants,
                cost_per_participant: round_money(split.cost_per_participant),
                hours_per_participant: split.hours_per_participant.round_dp(2),
            }),
        }
    }
}
