use crate::domain::breakdown::PriceBreakdown;
use crate::domain::request::ServiceType;
use crate::rating::addons::AddonSummary;
use crate::rating::schemes::SchemeRating;
use crate::rating::tax::TaxComputation;

/// Base line(s) first, add-on lines after. Subtotal, taxes and total stay
/// named fields rather than lines.
pub fn assemble(
    service_type: ServiceType,
    currency: &str,
    scheme: SchemeRating,
    addons: AddonSummary,
    taxes: TaxComputation,
) -> PriceBreakdown {
    let mut line_items = scheme.lines;
    line_items.extend(addons.lines);

    PriceBreakdown {
        service_type,
        description: scheme.description,
        currency: currency.to_string(),
        base_amount: scheme.base_amount,
        billed_hours: scheme.billed_hours,
        line_items,
        addon_total: addons.total,
        subtotal: taxes.subtotal,
        tax1: taxes.tax1,
        tax2: taxes.tax2,
        total: taxes.total,
        effective_rate: scheme.effective_rate,
        split: scheme.split,
    }
}
