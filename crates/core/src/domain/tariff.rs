//! Static pricing configuration.
//!
//! Every section implements [`Default`] with the reference (Québec) tariff and
//! is `#[serde(default)]`, so a TOML file only has to name the values it
//! changes. A table is read-only once handed to the engine; live updates swap
//! the whole table (see [`crate::rating::TariffHandle`]).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::request::{ContractVariant, PackageVariant};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTable {
    pub currency: Currency,
    /// Longest billable duration for one request; 744h is a 31-day month.
    pub max_duration_hours: Decimal,
    pub regular: RegularTariff,
    pub a_la_carte: ALaCarteTariff,
    pub group: GroupTariff,
    pub shared: SharedTariff,
    pub contracts: ContractTable,
    pub packages: PackageTable,
    pub addons: Vec<AddonEntry>,
    pub taxes: TaxRates,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(pub String);

impl Default for Currency {
    fn default() -> Self {
        Self("CAD".to_string())
    }
}

/// One row of the regular (no contract) price grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularTier {
    pub hours: Decimal,
    pub price: Decimal,
    pub effective_rate: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegularTariff {
    /// Ascending by `hours`; a duration is billed at the first tier it fits.
    pub tiers: Vec<RegularTier>,
    /// Charged per hour beyond the last tier, on top of the last tier price.
    pub overage_rate: Decimal,
    pub minimum_hours: Decimal,
    /// Advertised market rate, informational only.
    pub posted_rate: Decimal,
}

impl Default for RegularTariff {
    fn default() -> Self {
        Self {
            tiers: vec![
                RegularTier { hours: dec!(1), price: dec!(65), effective_rate: dec!(65) },
                RegularTier { hours: dec!(2), price: dec!(120), effective_rate: dec!(60) },
                RegularTier { hours: dec!(3), price: dec!(150), effective_rate: dec!(50) },
                RegularTier { hours: dec!(4), price: dec!(180), effective_rate: dec!(45) },
            ],
            overage_rate: dec!(45),
            minimum_hours: dec!(1),
            posted_rate: dec!(50),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub code: String,
    pub name: String,
    pub minimum_hours: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ALaCarteTariff {
    pub hourly_rate: Decimal,
    pub minimum_hours: Decimal,
    pub minimum_price: Decimal,
    pub activities: Vec<ActivityEntry>,
}

impl ALaCarteTariff {
    pub fn activity(&self, code: &str) -> Option<&ActivityEntry> {
        self.activities.iter().find(|activity| activity.code.eq_ignore_ascii_case(code.trim()))
    }
}

impl Default for ALaCarteTariff {
    fn default() -> Self {
        let activity = |code: &str, name: &str, minimum_hours: Decimal| ActivityEntry {
            code: code.to_string(),
            name: name.to_string(),
            minimum_hours,
        };

        Self {
            hourly_rate: dec!(50),
            minimum_hours: dec!(2),
            minimum_price: dec!(100),
            activities: vec![
                activity("companionship", "Companionship visit", dec!(2)),
                activity("games", "Bingo, board games and cognitive activities", dec!(2)),
                activity("outing", "Walk or leisure outing", dec!(2)),
                activity("themed", "Themed activity", dec!(2)),
                activity("event", "Event or special outing accompaniment", dec!(3)),
            ],
        }
    }
}

/// Group care and group animation in seniors' residences (RPA).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupTariff {
    pub hourly_rate: Decimal,
    pub base_hours: Decimal,
    pub base_price: Decimal,
    pub min_people: u32,
    pub max_people: u32,
    /// Required hours = `hours_per_person * people + setup_hours`,
    /// rounded up to `hour_increment`.
    pub hours_per_person: Decimal,
    pub setup_hours: Decimal,
    pub hour_increment: Decimal,
}

impl Default for GroupTariff {
    fn default() -> Self {
        Self {
            hourly_rate: dec!(50),
            base_hours: dec!(4),
            base_price: dec!(200),
            min_people: 5,
            max_people: 20,
            hours_per_person: dec!(0.4),
            setup_hours: dec!(2),
            hour_increment: dec!(0.5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedTariff {
    pub block_hours: Decimal,
    pub block_price: Decimal,
    pub min_neighbors: u32,
    pub max_neighbors: u32,
}

impl Default for SharedTariff {
    fn default() -> Self {
        Self { block_hours: dec!(4), block_price: dec!(200), min_neighbors: 2, max_neighbors: 4 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEntry {
    pub rate: Decimal,
    pub price: Decimal,
    pub committed_hours: Decimal,
    pub commitment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractTable {
    pub weekly: ContractEntry,
    pub monthly: ContractEntry,
    pub annual: ContractEntry,
}

impl ContractTable {
    pub fn get(&self, variant: ContractVariant) -> &ContractEntry {
        match variant {
            ContractVariant::Weekly => &self.weekly,
            ContractVariant::Monthly => &self.monthly,
            ContractVariant::Annual => &self.annual,
        }
    }

    pub fn entries(&self) -> [(ContractVariant, &ContractEntry); 3] {
        [
            (ContractVariant::Weekly, &self.weekly),
            (ContractVariant::Monthly, &self.monthly),
            (ContractVariant::Annual, &self.annual),
        ]
    }
}

impl Default for ContractTable {
    fn default() -> Self {
        Self {
            weekly: ContractEntry {
                rate: dec!(45),
                price: dec!(180),
                committed_hours: dec!(4),
                commitment: "4h/week".to_string(),
            },
            monthly: ContractEntry {
                rate: dec!(43),
                price: dec!(688),
                committed_hours: dec!(16),
                commitment: "16h/month".to_string(),
            },
            annual: ContractEntry {
                rate: dec!(40),
                price: dec!(7680),
                committed_hours: dec!(192),
                commitment: "16h/month x 12".to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,
    pub frequency: String,
    pub monthly_price: Decimal,
    pub hourly_rate: Decimal,
    pub monthly_hours: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageTable {
    pub essential: PackageEntry,
    pub comfort: PackageEntry,
    pub premium: PackageEntry,
}

impl PackageTable {
    pub fn get(&self, variant: PackageVariant) -> &PackageEntry {
        match variant {
            PackageVariant::Essential => &self.essential,
            PackageVariant::Comfort => &self.comfort,
            PackageVariant::Premium => &self.premium,
        }
    }

    pub fn entries(&self) -> [(PackageVariant, &PackageEntry); 3] {
        [
            (PackageVariant::Essential, &self.essential),
            (PackageVariant::Comfort, &self.comfort),
            (PackageVariant::Premium, &self.premium),
        ]
    }
}

impl Default for PackageTable {
    fn default() -> Self {
        let package = |name: &str, frequency: &str, price: Decimal, rate: Decimal, hours: Decimal| {
            PackageEntry {
                name: name.to_string(),
                frequency: frequency.to_string(),
                monthly_price: price,
                hourly_rate: rate,
                monthly_hours: hours,
            }
        };

        Self {
            essential: package("Essential", "1x/week", dec!(360), dec!(45), dec!(8)),
            comfort: package("Comfort", "2x/week", dec!(680), dec!(42.50), dec!(16)),
            premium: package("Premium", "3x/week", dec!(960), dec!(40), dec!(24)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonEntry {
    pub code: String,
    pub name: String,
    pub amount: Decimal,
}

/// The add-on catalog in display order.
pub fn default_addons() -> Vec<AddonEntry> {
    [
        ("urgency", "Same-day urgency", dec!(15)),
        ("offHours", "Off hours (before 7am / after 8pm)", dec!(10)),
        ("weekendOrHoliday", "Weekend or statutory holiday", dec!(10)),
        ("outOfZoneTravel", "Out-of-zone travel", dec!(15)),
        ("specialSupplies", "Special equipment or supplies", dec!(10)),
    ]
    .into_iter()
    .map(|(code, name, amount)| AddonEntry {
        code: code.to_string(),
        name: name.to_string(),
        amount,
    })
    .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub label: String,
    pub rate: Decimal,
}

/// Two rates applied independently to the same subtotal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRates {
    pub first: TaxRate,
    pub second: TaxRate,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            first: TaxRate { label: "GST (5%)".to_string(), rate: dec!(0.05) },
            second: TaxRate { label: "QST (9.975%)".to_string(), rate: dec!(0.09975) },
        }
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            max_duration_hours: dec!(744),
            regular: RegularTariff::default(),
            a_la_carte: ALaCarteTariff::default(),
            group: GroupTariff::default(),
            shared: SharedTariff::default(),
            contracts: ContractTable::default(),
            packages: PackageTable::default(),
            addons: default_addons(),
            taxes: TaxRates::default(),
        }
    }
}

impl PricingTable {
    pub fn addon(&self, code: &str) -> Option<&AddonEntry> {
        self.addons.iter().find(|addon| addon.code == code)
    }
}
