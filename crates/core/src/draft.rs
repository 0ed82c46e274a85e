//! A quote request being edited over several steps.
//!
//! The draft belongs to the caller (a UI session, a chat thread); the engine
//! never stores it. Every call to [`QuoteDraft::quote`] rates the current
//! state from scratch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::breakdown::PriceBreakdown;
use crate::domain::request::{RawServiceRequest, ValidationMode};
use crate::errors::RatingError;
use crate::rating::RatingEngine;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    request: RawServiceRequest,
}

impl QuoteDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(request: RawServiceRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &RawServiceRequest {
        &self.request
    }

    pub fn set_service_type(&mut self, service_type: impl Into<String>) -> &mut Self {
        self.request.service_type = Some(service_type.into());
        self
    }

    pub fn set_duration_hours(&mut self, hours: Decimal) -> &mut Self {
        self.request.duration_hours = Some(Value::String(hours.to_string()));
        self
    }

    pub fn clear_duration_hours(&mut self) -> &mut Self {
        self.request.duration_hours = None;
        self
    }

    pub fn set_num_people(&mut self, people: u32) -> &mut Self {
        self.request.num_people = Some(Value::from(people));
        self
    }

    pub fn set_contract_variant(&mut self, variant: impl Into<String>) -> &mut Self {
        self.request.contract_variant = Some(variant.into());
        self
    }

    pub fn set_package_variant(&mut self, variant: impl Into<String>) -> &mut Self {
        self.request.package_variant = Some(variant.into());
        self
    }

    pub fn set_activity(&mut self, code: impl Into<String>) -> &mut Self {
        self.request.activity = Some(code.into());
        self
    }

    /// Codes are compared trimmed, the way parsing sees them.
    pub fn toggle_addon(&mut self, code: &str, enabled: bool) -> &mut Self {
        let code = code.trim();
        self.request.addons.retain(|existing| existing.trim() != code);
        if enabled && !code.is_empty() {
            self.request.addons.push(code.to_string());
        }
        self
    }

    /// Applies a partial update, e.g. fields extracted from a follow-up
    /// message. Present fields win; add-ons in the patch are added.
    pub fn merge(&mut self, patch: RawServiceRequest) -> &mut Self {
        let RawServiceRequest {
            service_type,
            duration_hours,
            num_people,
            contract_variant,
            package_variant,
            activity,
            addons,
        } = patch;

        if service_type.is_some() {
            self.request.service_type = service_type;
        }
        if duration_hours.is_some() {
            self.request.duration_hours = duration_hours;
        }
        if num_people.is_some() {
            self.request.num_people = num_people;
        }
        if contract_variant.is_some() {
            self.request.contract_variant = contract_variant;
        }
        if package_variant.is_some() {
            self.request.package_variant = package_variant;
        }
        if activity.is_some() {
            self.request.activity = activity;
        }
        for code in addons {
            let code = code.trim();
            if !code.is_empty() && !self.request.addons.iter().any(|existing| existing.trim() == code) {
                self.request.addons.push(code.to_string());
            }
        }
        self
    }

    pub fn quote<E>(&self, engine: &E, mode: ValidationMode) -> Result<PriceBreakdown, RatingError>
    where
        E: RatingEngine + ?Sized,
    {
        let request = self.request.parse(mode)?;
        engine.rate(&request)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::QuoteDraft;
    use crate::domain::request::{RawServiceRequest, ServiceType, ValidationMode};
    use crate::domain::tariff::PricingTable;
    use crate::errors::RatingError;
    use crate::rating::QuoteEngine;

    fn engine() -> QuoteEngine {
        QuoteEngine::new(PricingTable::default()).expect("reference tariff is valid")
    }

    #[test]
    fn each_quote_reflects_the_current_draft() {
        let engine = engine();
        let mut draft = QuoteDraft::new();
        draft.set_service_type("Regular").set_duration_hours(dec!(2));

        let first = draft.quote(&engine, ValidationMode::Strict).expect("first quote");
        draft.set_duration_hours(dec!(3)).toggle_addon("urgency", true);
        let second = draft.quote(&engine, ValidationMode::Strict).expect("second quote");

        assert_eq!(first.subtotal, dec!(120));
        assert_eq!(second.subtotal, dec!(165));
    }

    #[test]
    fn toggling_an_addon_off_removes_it() {
        let engine = engine();
        let mut draft = QuoteDraft::new();
        draft.set_service_type("ALaCarte").toggle_addon("offHours", true).toggle_addon("offHours", true);
        assert_eq!(draft.request().addons, vec!["offHours".to_string()]);

        draft.toggle_addon("offHours", false);
        let breakdown = draft.quote(&engine, ValidationMode::Strict).expect("quote");

        assert_eq!(breakdown.addon_total, dec!(0));
    }

    #[test]
    fn addon_codes_are_matched_trimmed() {
        let mut draft = QuoteDraft::new();
        draft.set_service_type("Regular").toggle_addon("urgency", true);

        draft.toggle_addon(" urgency ", false);
        assert!(draft.request().addons.is_empty());

        draft.toggle_addon(" offHours ", true);
        let patch: RawServiceRequest =
            serde_json::from_value(json!({ "addons": ["offHours  ", "urgency"] })).expect("patch");
        draft.merge(patch);

        assert_eq!(draft.request().addons, vec!["offHours".to_string(), "urgency".to_string()]);
    }

    #[test]
    fn merge_keeps_fields_the_patch_does_not_mention() {
        let mut draft = QuoteDraft::new();
        draft.set_service_type("GroupCare").set_num_people(8).toggle_addon("urgency", true);

        let patch: RawServiceRequest =
            serde_json::from_value(json!({ "numPeople": 12, "addons": ["urgency", "offHours"] }))
                .expect("patch");
        draft.merge(patch);

        let request = draft.request().parse(ValidationMode::Strict).expect("parse");
        assert_eq!(request.service_type, ServiceType::GroupCare);
        assert_eq!(request.num_people, Some(12));
        assert_eq!(draft.request().addons, vec!["urgency".to_string(), "offHours".to_string()]);
    }

    #[test]
    fn incomplete_draft_surfaces_validation_errors() {
        let engine = engine();
        let mut draft = QuoteDraft::new();
        draft.set_service_type("Forfait récurrent");

        assert!(matches!(
            draft.quote(&engine, ValidationMode::Strict),
            Err(RatingError::InvalidVariant { .. })
        ));

        draft.set_package_variant("Premium");
        let breakdown = draft.quote(&engine, ValidationMode::Strict).expect("complete draft");
        assert_eq!(breakdown.base_amount, dec!(960));
    }
}
