//! Option contracts.

use serde::{Deserialize, Serialize};
use sp_core::errors::{Error, Result};
use sp_core::{ensure, Real};
use sp_math::RegressionModel;
use sp_time::{Date, Frequency};

use crate::payoff::{Barrier, BarrierDirection, BarrierKind, BarrierMonitoring, OptionType, PayoffKind};

/// A single-underlying option: type, strike, maturity and payoff family.
///
/// Contracts carry no market-derived state. Times to maturity are computed
/// by the pricing context from the pricing date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    option_type: OptionType,
    strike: Real,
    maturity: Date,
    payoff: PayoffKind,
}

impl OptionContract {
    /// Build and validate a contract.
    pub fn new(option_type: OptionType, strike: Real, maturity: Date, payoff: PayoffKind) -> Result<Self> {
        ensure!(strike >= 0.0 && strike.is_finite(), "strike must be non-negative, got {strike}");
        match payoff {
            PayoffKind::Barrier(b) => {
                ensure!(b.level > 0.0 && b.level.is_finite(), "barrier level must be positive, got {}", b.level);
            }
            PayoffKind::American { regression } => {
                // deserialised models bypass RegressionModel::new
                RegressionModel::new(regression.family(), regression.degree())?;
            }
            _ => {}
        }
        Ok(Self {
            option_type,
            strike,
            maturity,
            payoff,
        })
    }

    /// European vanilla.
    pub fn european(option_type: OptionType, strike: Real, maturity: Date) -> Result<Self> {
        Self::new(option_type, strike, maturity, PayoffKind::European)
    }

    /// Cash-or-nothing digital paying 1.
    pub fn digital(option_type: OptionType, strike: Real, maturity: Date) -> Result<Self> {
        Self::new(option_type, strike, maturity, PayoffKind::Digital)
    }

    /// Barrier option.
    pub fn barrier(
        option_type: OptionType,
        strike: Real,
        maturity: Date,
        direction: BarrierDirection,
        kind: BarrierKind,
        level: Real,
        monitoring: BarrierMonitoring,
    ) -> Result<Self> {
        let barrier = Barrier {
            direction,
            kind,
            level,
            monitoring,
        };
        Self::new(option_type, strike, maturity, PayoffKind::Barrier(barrier))
    }

    /// Arithmetic-average Asian option.
    pub fn asian(option_type: OptionType, strike: Real, maturity: Date, averaging: Option<Frequency>) -> Result<Self> {
        Self::new(option_type, strike, maturity, PayoffKind::Asian { averaging })
    }

    /// American option.
    pub fn american(option_type: OptionType, strike: Real, maturity: Date, regression: RegressionModel) -> Result<Self> {
        Self::new(option_type, strike, maturity, PayoffKind::American { regression })
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Strike.
    pub fn strike(&self) -> Real {
        self.strike
    }

    /// Maturity date.
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Payoff family.
    pub fn payoff(&self) -> &PayoffKind {
        &self.payoff
    }

    /// The barrier, if this is a barrier option.
    pub fn barrier_spec(&self) -> Option<&Barrier> {
        match &self.payoff {
            PayoffKind::Barrier(b) => Some(b),
            _ => None,
        }
    }

    /// The same contract with a vanilla European payoff.
    pub fn to_european(&self) -> Self {
        Self {
            payoff: PayoffKind::European,
            ..*self
        }
    }

    /// The same contract with another payoff family.
    pub fn with_payoff(&self, payoff: PayoffKind) -> Result<Self> {
        Self::new(self.option_type, self.strike, self.maturity, payoff)
    }

    /// Payoff of immediate exercise at `spot`, ignoring any barrier.
    ///
    /// Digital for [`PayoffKind::Digital`], vanilla otherwise.
    pub fn intrinsic(&self, spot: Real) -> Real {
        match self.payoff {
            PayoffKind::Digital => {
                let in_the_money = match self.option_type {
                    OptionType::Call => spot > self.strike,
                    OptionType::Put => spot < self.strike,
                };
                if in_the_money {
                    1.0
                } else {
                    0.0
                }
            }
            _ => self.option_type.intrinsic(spot, self.strike),
        }
    }

    /// Payoff from the terminal price alone.
    ///
    /// European-monitored barriers observe the terminal price. Fails for
    /// payoffs that need the path.
    pub fn terminal_payoff(&self, spot: Real) -> Result<Real> {
        match &self.payoff {
            PayoffKind::European | PayoffKind::Digital | PayoffKind::American { .. } => Ok(self.intrinsic(spot)),
            PayoffKind::Barrier(b) if b.monitoring == BarrierMonitoring::European => {
                Ok(if b.is_active(b.is_breached(spot)) {
                    self.intrinsic(spot)
                } else {
                    0.0
                })
            }
            other => Err(Error::InvalidArgument(format!(
                "{} payoff needs the full path",
                other.name()
            ))),
        }
    }

    /// Payoff of a whole path `path[0] = S_0, …, path[n] = S_T`.
    ///
    /// `averaging` selects the path indices averaged by Asian options; every
    /// point is averaged when it is `None`.
    pub fn path_payoff(&self, path: &[Real], averaging: Option<&[usize]>) -> Result<Real> {
        let Some(&terminal) = path.last() else {
            return Err(Error::InvalidArgument("empty price path".into()));
        };
        match &self.payoff {
            PayoffKind::Asian { .. } => {
                let mean = match averaging {
                    Some(steps) if !steps.is_empty() => {
                        let mut sum = 0.0;
                        for &i in steps {
                            sum += *path.get(i).ok_or(Error::IndexOutOfRange {
                                index: i,
                                size: path.len(),
                            })?;
                        }
                        sum / steps.len() as Real
                    }
                    _ => path.iter().sum::<Real>() / path.len() as Real,
                };
                Ok(self.option_type.intrinsic(mean, self.strike))
            }
            PayoffKind::Barrier(b) if b.monitoring == BarrierMonitoring::American => {
                let breached = path.iter().any(|&s| b.is_breached(s));
                Ok(if b.is_active(breached) {
                    self.intrinsic(terminal)
                } else {
                    0.0
                })
            }
            _ => self.terminal_payoff(terminal),
        }
    }
}
