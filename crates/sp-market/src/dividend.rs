//! Dividend descriptions.

use serde::{Deserialize, Serialize};
use sp_core::{Rate, Real};
use sp_time::Date;

/// How the underlying pays dividends.
///
/// A continuous yield and a discrete cash dividend are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Dividend {
    /// No dividends.
    #[default]
    None,
    /// Continuous dividend yield `q`.
    Continuous {
        /// Annual yield, continuously compounded.
        yield_rate: Rate,
    },
    /// A single cash dividend paid on `date`.
    Discrete {
        /// Cash amount.
        amount: Real,
        /// Ex-dividend date.
        date: Date,
    },
}

impl Dividend {
    /// The continuous yield (zero unless [`Dividend::Continuous`]).
    pub fn yield_rate(&self) -> Rate {
        match self {
            Dividend::Continuous { yield_rate } => *yield_rate,
            _ => 0.0,
        }
    }

    /// The discrete cash dividend as `(amount, date)`, if any.
    pub fn discrete(&self) -> Option<(Real, Date)> {
        match self {
            Dividend::Discrete { amount, date } if *amount > 0.0 => Some((*amount, *date)),
            _ => None,
        }
    }
}
