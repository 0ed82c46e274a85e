use carequote_core::{
    ContractVariant, LineKind, PricingTable, QuoteEngine, RawServiceRequest, ServiceRequest,
    ServiceType, ValidationMode,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn engine() -> QuoteEngine {
    QuoteEngine::new(PricingTable::default()).expect("reference tariff is valid")
}

#[test]
fn regular_two_hours_end_to_end() {
    let breakdown = engine()
        .quote(&ServiceRequest::new(ServiceType::Regular).with_duration(dec!(2)))
        .expect("quote");

    assert_eq!(breakdown.base_amount, dec!(120));
    assert_eq!(breakdown.subtotal, dec!(120));
    assert_eq!(breakdown.tax1, dec!(6.00));
    assert_eq!(breakdown.tax2, dec!(11.97));
    assert_eq!(breakdown.total, dec!(137.97));
    assert_eq!(breakdown.effective_rate, dec!(60));
    assert_eq!(breakdown.description, "Regular service - 2h");
    assert_eq!(breakdown.currency, "CAD");
}

#[test]
fn group_care_ten_people_end_to_end() {
    let breakdown = engine()
        .quote(&ServiceRequest::new(ServiceType::GroupCare).with_people(10))
        .expect("quote");
    let split = breakdown.split.as_ref().expect("per-person split");

    assert_eq!(breakdown.billed_hours, Some(dec!(6.0)));
    assert_eq!(breakdown.base_amount, dec!(300));
    assert_eq!(split.cost_per_participant, dec!(30.00));
    assert_eq!(breakdown.line_items[0].kind, LineKind::Base);
    assert_eq!(breakdown.line_items[1].label, "(30.00 per person)");
    assert_eq!(breakdown.subtotal, dec!(300));
}

#[test]
fn shared_neighbors_four_end_to_end() {
    let breakdown = engine()
        .quote(&ServiceRequest::new(ServiceType::SharedNeighbors).with_people(4))
        .expect("quote");
    let split = breakdown.split.as_ref().expect("per-neighbor split");

    assert_eq!(breakdown.base_amount, dec!(200));
    assert_eq!(split.cost_per_participant, dec!(50.00));
    assert_eq!(split.hours_per_participant, dec!(1.0));
    assert_eq!(breakdown.subtotal, dec!(200));
}

#[test]
fn a_la_carte_below_minimum_with_urgency_end_to_end() {
    let breakdown = engine()
        .quote(
            &ServiceRequest::new(ServiceType::ALaCarte)
                .with_duration(dec!(1))
                .with_addon("urgency"),
        )
        .expect("quote");

    assert_eq!(breakdown.base_amount, dec!(100));
    assert_eq!(breakdown.addon_total, dec!(15));
    assert_eq!(breakdown.subtotal, dec!(115));
    assert_eq!(breakdown.tax1, dec!(5.75));
    assert_eq!(breakdown.tax2, dec!(11.47));
    assert_eq!(breakdown.total, dec!(132.22));
    assert_eq!(breakdown.line_items.last().map(|line| line.kind), Some(LineKind::Addon));
}

#[test]
fn annual_contract_ignores_zero_duration_end_to_end() {
    let breakdown = engine()
        .quote(
            &ServiceRequest::new(ServiceType::CorporateContract)
                .with_contract(ContractVariant::Annual)
                .with_duration(Decimal::ZERO),
        )
        .expect("quote");

    assert_eq!(breakdown.base_amount, dec!(7680));
    assert_eq!(breakdown.effective_rate, dec!(40));
}

#[test]
fn extraction_record_with_legacy_labels_is_quoted() {
    let raw: RawServiceRequest = serde_json::from_value(json!({
        "serviceType": "Contrat corporatif",
        "contractVariant": "mensuel",
        "durationHours": "0",
        "addons": ["weekendOrHoliday", "notACode"]
    }))
    .expect("raw request");

    let breakdown = engine().quote_raw(&raw).expect("quote");

    assert_eq!(breakdown.service_type, ServiceType::CorporateContract);
    assert_eq!(breakdown.base_amount, dec!(688));
    assert_eq!(breakdown.addon_total, dec!(10));
    assert_eq!(breakdown.subtotal, dec!(698));
}

#[test]
fn identical_requests_produce_identical_output() {
    let engine = engine();
    let request = ServiceRequest::new(ServiceType::GroupAnimation)
        .with_people(13)
        .with_addon("specialSupplies")
        .with_addon("offHours");

    let first = serde_json::to_string(&engine.quote(&request).expect("first")).expect("json");
    let second = serde_json::to_string(&engine.quote(&request).expect("second")).expect("json");

    assert_eq!(first, second);
}

#[test]
fn lenient_mode_reproduces_legacy_defaults() {
    let raw: RawServiceRequest = serde_json::from_value(json!({
        "serviceType": "Soins à domicile",
        "durationHours": "trois"
    }))
    .expect("raw request");
    let engine = engine();

    let strict = engine.quote_raw_with_mode(&raw, ValidationMode::Strict);
    let lenient = engine.quote_raw_with_mode(&raw, ValidationMode::Lenient).expect("lenient");

    assert!(strict.is_err());
    assert_eq!(lenient.service_type, ServiceType::Regular);
    assert_eq!(lenient.base_amount, dec!(65));
}
