use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::breakdown::LineItem;
use crate::domain::tariff::AddonEntry;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddonSummary {
    pub total: Decimal,
    /// One line per applied add-on, in catalog order.
    pub lines: Vec<LineItem>,
}

/// Sums the catalog surcharges the request selected. Codes missing from the
/// catalog are skipped.
pub fn apply_addons(catalog: &[AddonEntry], selected: &BTreeSet<String>) -> AddonSummary {
    let mut summary = AddonSummary::default();

    for addon in catalog.iter().filter(|addon| selected.contains(&addon.code)) {
        summary.total += addon.amount;
        summary.lines.push(LineItem::addon(format!("+ {}", addon.name), addon.amount));
    }

    for code in selected.iter().filter(|code| !catalog.iter().any(|addon| &addon.code == *code)) {
        debug!(event_name = "rating.addon.ignored", addon_code = %code, "unknown add-on code ignored");
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::apply_addons;
    use crate::domain::breakdown::LineKind;
    use crate::domain::tariff::default_addons;

    fn selected(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|code| code.to_string()).collect()
    }

    #[test]
    fn lines_follow_catalog_order_not_input_order() {
        let summary = apply_addons(
            &default_addons(),
            &selected(&["specialSupplies", "urgency", "weekendOrHoliday"]),
        );

        let labels: Vec<_> = summary.lines.iter().map(|line| line.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "+ Same-day urgency",
                "+ Weekend or statutory holiday",
                "+ Special equipment or supplies"
            ]
        );
        assert!(summary.lines.iter().all(|line| line.kind == LineKind::Addon));
        assert_eq!(summary.total, dec!(35));
    }

    #[test]
    fn unknown_codes_are_ignored() {
        let summary = apply_addons(&default_addons(), &selected(&["teleport", "offHours"]));

        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.total, dec!(10));
    }

    #[test]
    fn no_selection_means_no_surcharge() {
        let summary = apply_addons(&default_addons(), &BTreeSet::new());

        assert_eq!(summary.total, Decimal::ZERO);
        assert!(summary.lines.is_empty());
    }

    #[test]
    fn full_catalog_totals_sixty() {
        let catalog = default_addons();
        let all: BTreeSet<String> = catalog.iter().map(|addon| addon.code.clone()).collect();

        assert_eq!(apply_addons(&catalog, &all).total, dec!(60));
    }
}
