pub mod breakdown;
pub mod request;
pub mod tariff;
