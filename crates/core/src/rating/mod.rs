pub mod addons;
pub mod assemble;
pub mod dispatch;
pub mod schemes;
pub mod tax;

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{validate_tariff, AppConfig};
use crate::domain::breakdown::PriceBreakdown;
use crate::domain::request::{RawServiceRequest, ServiceRequest, ValidationMode};
use crate::domain::tariff::PricingTable;
use crate::errors::RatingError;

use self::{
    addons::apply_addons, assemble::assemble, dispatch::select_strategy, schemes::rate_strategy,
    tax::compute_taxes,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingOptions {
    pub mode: ValidationMode,
    /// Bill corporate contracts as `duration x rate` when a duration is given.
    pub contract_duration_override: bool,
}

pub trait RatingEngine: Send + Sync {
    fn rate(&self, request: &ServiceRequest) -> Result<PriceBreakdown, RatingError>;
}

/// Shared read-only tariff. Updates replace the whole table so a rating in
/// flight never sees a mix of old and new rates.
#[derive(Debug)]
pub struct TariffHandle {
    current: RwLock<Arc<PricingTable>>,
}

impl TariffHandle {
    pub fn new(table: PricingTable) -> Self {
        Self { current: RwLock::new(Arc::new(table)) }
    }

    pub fn current(&self) -> Arc<PricingTable> {
        // The guarded value is a single Arc, so a poisoned lock still holds a whole table.
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn replace(&self, table: PricingTable) -> Arc<PricingTable> {
        let next = Arc::new(table);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

#[derive(Debug)]
pub struct QuoteEngine {
    tariff: TariffHandle,
    options: RatingOptions,
}

impl QuoteEngine {
    pub fn new(table: PricingTable) -> Result<Self, RatingError> {
        Self::with_options(table, RatingOptions::default())
    }

    pub fn with_options(table: PricingTable, options: RatingOptions) -> Result<Self, RatingError> {
        validate_tariff(&table)?;
        info!(
            event_name = "rating.engine.initialized",
            currency = %table.currency.0,
            validation_mode = ?options.mode,
            "quote engine initialized"
        );
        Ok(Self { tariff: TariffHandle::new(table), options })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RatingError> {
        Self::with_options(config.tariff.clone(), config.rating)
    }

    pub fn options(&self) -> RatingOptions {
        self.options
    }

    /// The tariff currently used for rating.
    pub fn tariff(&self) -> Arc<PricingTable> {
        self.tariff.current()
    }

    /// Validates `table` and swaps it in whole. The previous table is kept
    /// when validation fails.
    pub fn replace_tariff(&self, table: PricingTable) -> Result<(), RatingError> {
        validate_tariff(&table)?;
        let previous = self.tariff.replace(table);
        info!(
            event_name = "rating.tariff.replaced",
            previous_currency = %previous.currency.0,
            "tariff replaced"
        );
        Ok(())
    }

    pub fn quote(&self, request: &ServiceRequest) -> Result<PriceBreakdown, RatingError> {
        rate_request(&self.tariff.current(), &self.options, request)
    }

    /// Parses an extraction record with the engine's validation mode, then rates it.
    pub fn quote_raw(&self, request: &RawServiceRequest) -> Result<PriceBreakdown, RatingError> {
        self.quote_raw_with_mode(request, self.options.mode)
    }

    pub fn quote_raw_with_mode(
        &self,
        request: &RawServiceRequest,
        mode: ValidationMode,
    ) -> Result<PriceBreakdown, RatingError> {
        let parsed = request.parse(mode).map_err(|error| {
            debug!(
                event_name = "rating.request.rejected",
                error_code = error.code(),
                error = %error,
                "request rejected"
            );
            error
        })?;

        let options = RatingOptions { mode, ..self.options };
        rate_request(&self.tariff.current(), &options, &parsed)
    }
}

impl RatingEngine for QuoteEngine {
    fn rate(&self, request: &ServiceRequest) -> Result<PriceBreakdown, RatingError> {
        self.quote(request)
    }
}

/// The full pipeline against one tariff snapshot: dispatch, scheme formula,
/// add-ons, taxes, assembly.
pub fn rate_request(
    table: &PricingTable,
    options: &RatingOptions,
    request: &ServiceRequest,
) -> Result<PriceBreakdown, RatingError> {
    request.validate(options.mode)?;

    let strategy = select_strategy(request, table, options)?;
    let scheme = rate_strategy(&strategy, table);
    let addons = apply_addons(&table.addons, &request.addons);
    let taxes = compute_taxes(scheme.base_amount + addons.total, &table.taxes);
    let breakdown = assemble(request.service_type, &table.currency.0, scheme, addons, taxes);

    debug!(
        event_name = "rating.quote.computed",
        service_type = %breakdown.service_type,
        scheme = strategy.name(),
        base_amount = %breakdown.base_amount,
        addon_total = %breakdown.addon_total,
        total = %breakdown.total,
        "quote computed"
    );

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::{QuoteEngine, RatingEngine, RatingOptions};
    use crate::domain::breakdown::PriceBreakdown;
    use crate::domain::request::{
        RawServiceRequest, ServiceRequest, ServiceType, ValidationMode,
    };
    use crate::domain::tariff::PricingTable;
    use crate::errors::RatingError;

    fn engine() -> QuoteEngine {
        QuoteEngine::new(PricingTable::default()).expect("reference tariff is valid")
    }

    #[test]
    fn invalid_tariff_is_a_configuration_error() {
        let mut table = PricingTable::default();
        table.regular.tiers.clear();

        assert!(matches!(
            QuoteEngine::new(table),
            Err(RatingError::ConfigurationMissing(ref message)) if message.contains("regular.tiers")
        ));
    }

    #[test]
    fn tariff_query_returns_the_table_in_use() {
        let engine = engine();

        assert_eq!(*engine.tariff(), PricingTable::default());
        assert_eq!(engine.options(), RatingOptions::default());
    }

    #[test]
    fn replace_tariff_swaps_the_whole_table() {
        let engine = engine();
        let request = ServiceRequest::new(ServiceType::Regular).with_duration(dec!(2));
        let before = engine.quote(&request).expect("before");

        let mut table = PricingTable::default();
        table.regular.tiers[1].price = dec!(130);
        table.taxes.first.rate = Decimal::ZERO;
        engine.replace_tariff(table).expect("valid replacement");
        let after = engine.quote(&request).expect("after");

        assert_eq!(before.base_amount, dec!(120));
        assert_eq!(after.base_amount, dec!(130));
        assert_eq!(after.tax1, Decimal::ZERO);
    }

    #[test]
    fn rejected_replacement_keeps_previous_tariff() {
        let engine = engine();
        let mut table = PricingTable::default();
        table.shared.min_neighbors = 5;

        assert!(engine.replace_tariff(table).is_err());
        assert_eq!(*engine.tariff(), PricingTable::default());
    }

    #[test]
    fn concurrent_quotes_see_one_table_or_the_other() {
        let engine = Arc::new(engine());
        let request = ServiceRequest::new(ServiceType::SharedNeighbors).with_people(2);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let request = request.clone();
                thread::spawn(move || {
                    (0..200)
                        .map(|_| engine.quote(&request).expect("quote"))
                        .collect::<Vec<PriceBreakdown>>()
                })
            })
            .collect();

        let mut doubled = PricingTable::default();
        doubled.shared.block_price = dec!(400);
        doubled.taxes.first.rate = dec!(0.10);
        engine.replace_tariff(doubled).expect("swap");

        for worker in workers {
            for breakdown in worker.join().expect("worker") {
                let consistent = (breakdown.base_amount == dec!(200) && breakdown.tax1 == dec!(10))
                    || (breakdown.base_amount == dec!(400) && breakdown.tax1 == dec!(40));
                assert!(consistent, "mixed tariff: {breakdown:?}");
            }
        }
    }

    #[test]
    fn raw_quotes_honour_the_requested_mode() {
        let engine = engine();
        let raw: RawServiceRequest =
            serde_json::from_value(json!({ "serviceType": "Jardinage", "durationHours": 3 }))
                .expect("raw");

        assert!(matches!(engine.quote_raw(&raw), Err(RatingError::InvalidServiceType(_))));

        let lenient = engine.quote_raw_with_mode(&raw, ValidationMode::Lenient).expect("lenient");
        assert_eq!(lenient.service_type, ServiceType::Regular);
        assert_eq!(lenient.base_amount, dec!(150));
    }

    #[test]
    fn engine_is_usable_through_the_trait() {
        struct FlatEngine;

        impl RatingEngine for FlatEngine {
            fn rate(&self, request: &ServiceRequest) -> Result<PriceBreakdown, RatingError> {
                let engine = QuoteEngine::new(PricingTable::default())?;
                let mut breakdown = engine.quote(request)?;
                breakdown.description = "flat".to_string();
                Ok(breakdown)
            }
        }

        let engines: Vec<Box<dyn RatingEngine>> = vec![Box::new(engine()), Box::new(FlatEngine)];
        let request = ServiceRequest::new(ServiceType::ALaCarte);

        for engine in engines {
            assert_eq!(engine.rate(&request).expect("rate").base_amount, dec!(100));
        }
    }
}
