//! The option engine interface.

use sp_core::errors::Result;
use sp_instruments::{OptionContract, PricingResults};
use sp_market::Market;

/// An engine pricing single option contracts.
///
/// Engines hold their pricing date and settings; the market is passed per
/// call so shocked copies can be priced by the same engine.
pub trait OptionEngine: Send + Sync {
    /// Price `option` on `market`.
    fn calculate(&self, market: &Market, option: &OptionContract) -> Result<PricingResults>;
}
