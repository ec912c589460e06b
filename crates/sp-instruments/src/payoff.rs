//! Payoff descriptions.
//!
//! [`PayoffKind`] is a closed set of variants; engines match on it instead of
//! going through a payoff trait object, so an unsupported combination is a
//! visible `match` arm.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sp_core::{Error, Real};
use sp_math::RegressionModel;
use sp_time::Frequency;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// `max(φ(S − K), 0)`.
    pub fn intrinsic(self, spot: Real, strike: Real) -> Real {
        (self.sign() * (spot - strike)).max(0.0)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(Error::InvalidArgument(format!("unknown option type '{other}'"))),
        }
    }
}

// ── Barriers ──────────────────────────────────────────────────────────────────

/// Side from which the barrier is approached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierDirection {
    /// Breached when the underlying is above the level.
    Up,
    /// Breached when the underlying is below the level.
    Down,
}

/// Whether a breach switches the option on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierKind {
    /// Knock-in: pays only if breached.
    In,
    /// Knock-out: pays only if never breached.
    Out,
}

/// When the barrier is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierMonitoring {
    /// Only at maturity.
    European,
    /// Along the whole path.
    American,
}

/// A barrier condition. Rebates are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    /// Up or down.
    pub direction: BarrierDirection,
    /// In or out.
    pub kind: BarrierKind,
    /// Trigger level.
    pub level: Real,
    /// European or American observation.
    pub monitoring: BarrierMonitoring,
}

impl Barrier {
    /// Whether `spot` is on the breached side of the level (strictly).
    pub fn is_breached(&self, spot: Real) -> bool {
        match self.direction {
            BarrierDirection::Up => spot > self.level,
            BarrierDirection::Down => spot < self.level,
        }
    }

    /// Whether the option is alive given the breach status.
    pub fn is_active(&self, breached: bool) -> bool {
        match self.kind {
            BarrierKind::In => breached,
            BarrierKind::Out => !breached,
        }
    }

    /// The same barrier with the opposite in/out kind.
    pub fn opposite(&self) -> Self {
        let kind = match self.kind {
            BarrierKind::In => BarrierKind::Out,
            BarrierKind::Out => BarrierKind::In,
        };
        Self { kind, ..*self }
    }
}

// ── Payoff variants ───────────────────────────────────────────────────────────

/// The payoff family of an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PayoffKind {
    /// `max(φ(S_T − K), 0)`.
    European,
    /// Cash-or-nothing paying 1: `S_T > K` for calls, `S_T < K` for puts.
    Digital,
    /// Vanilla payoff switched by a barrier.
    Barrier(Barrier),
    /// Vanilla payoff on the arithmetic mean of the path.
    Asian {
        /// Averaging frequency; every simulated point when absent.
        averaging: Option<Frequency>,
    },
    /// Vanilla payoff with early exercise.
    American {
        /// Continuation-value regression used by Longstaff–Schwartz.
        regression: RegressionModel,
    },
}

impl PayoffKind {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            PayoffKind::European => "european",
            PayoffKind::Digital => "digital",
            PayoffKind::Barrier(_) => "barrier",
            PayoffKind::Asian { .. } => "asian",
            PayoffKind::American { .. } => "american",
        }
    }

    /// Whether the payoff needs the whole path rather than `S_T`.
    pub fn is_path_dependent(&self) -> bool {
        match self {
            PayoffKind::European | PayoffKind::Digital => false,
            PayoffKind::Barrier(b) => b.monitoring == BarrierMonitoring::American,
            PayoffKind::Asian { .. } | PayoffKind::American { .. } => true,
        }
    }
}
