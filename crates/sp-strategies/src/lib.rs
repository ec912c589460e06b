//! # sp-strategies
//!
//! Products built as ordered lists of option legs with signed quantities.
//! A [`Strategy`] prices as the quantity-weighted sum of its legs, each
//! leg dispatched through [`sp_pricingengines::price`].
//!
//! - [`options`]: spreads, straddles, digital replication, portfolios
//! - [`certificates`]: zero-strike-call based certificates
//! - [`structured`]: reverse convertibles and the autocall

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod certificates;
pub mod options;
pub mod strategy;
pub mod structured;

pub use structured::{Autocall, AutocallValuation};
pub use strategy::{Leg, Strategy};
