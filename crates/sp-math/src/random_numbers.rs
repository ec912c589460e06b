//! Random number generators.
//!
//! Two standard-normal generators are offered: a Mersenne Twister
//! (MT19937-64, via `rand_mt`) pushed through the inverse normal CDF, and
//! `rand`'s `StdRng` sampled with the Ziggurat method of `rand_distr`.
//!
//! Nothing here keeps global state: every consumer owns its generator, and
//! parallel consumers obtain independent, reproducible streams from
//! [`RngStreams`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_mt::Mt19937GenRand64;
use serde::{Deserialize, Serialize};
use sp_core::Real;

use crate::distributions::normal_cdf_inverse;

/// Source of standard-normal deviates.
pub trait NormalGenerator {
    /// Next standard-normal deviate.
    fn next_normal(&mut self) -> Real;

    /// Fill `out` with standard-normal deviates.
    fn fill_normal(&mut self, out: &mut [Real]) {
        for x in out.iter_mut() {
            *x = self.next_normal();
        }
    }
}

// ── Mersenne Twister ─────────────────────────────────────────────────────────

/// A uniform pseudo-random number generator based on the Mersenne Twister
/// MT19937-64 algorithm.
pub struct MersenneTwisterUniformRng {
    rng: Mt19937GenRand64,
}

impl MersenneTwisterUniformRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Next uniform deviate in the open interval `(0, 1)`.
    pub fn next_real(&mut self) -> Real {
        // 53 random bits, offset by half a step so that 0 is never produced
        let bits = self.rng.next_u64() >> 11;
        (bits as Real + 0.5) / (1u64 << 53) as Real
    }
}

/// Mersenne Twister uniforms mapped through the inverse normal CDF.
pub struct InverseCumulativeNormalRng {
    inner: MersenneTwisterUniformRng,
}

impl InverseCumulativeNormalRng {
    /// Create a new generator backed by a Mersenne Twister with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: MersenneTwisterUniformRng::new(seed),
        }
    }
}

impl NormalGenerator for InverseCumulativeNormalRng {
    fn next_normal(&mut self) -> Real {
        normal_cdf_inverse(self.inner.next_real())
    }
}

// ── Ziggurat ─────────────────────────────────────────────────────────────────

/// `StdRng` sampled through `rand_distr`'s Ziggurat standard normal.
pub struct ZigguratNormalRng {
    rng: StdRng,
}

impl ZigguratNormalRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NormalGenerator for ZigguratNormalRng {
    fn next_normal(&mut self) -> Real {
        self.rng.sample(StandardNormal)
    }
}

// ── Generator selection ──────────────────────────────────────────────────────

/// Which normal generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngKind {
    /// Mersenne Twister + inverse normal CDF.
    #[default]
    MersenneTwister,
    /// `StdRng` + Ziggurat.
    Ziggurat,
}

/// A normal generator of either kind.
pub enum NormalRng {
    /// See [`InverseCumulativeNormalRng`].
    MersenneTwister(InverseCumulativeNormalRng),
    /// See [`ZigguratNormalRng`].
    Ziggurat(ZigguratNormalRng),
}

impl NormalRng {
    /// Create a generator of `kind` seeded with `seed`.
    pub fn new(kind: RngKind, seed: u64) -> Self {
        match kind {
            RngKind::MersenneTwister => Self::MersenneTwister(InverseCumulativeNormalRng::new(seed)),
            RngKind::Ziggurat => Self::Ziggurat(ZigguratNormalRng::new(seed)),
        }
    }
}

impl NormalGenerator for NormalRng {
    fn next_normal(&mut self) -> Real {
        match self {
            Self::MersenneTwister(g) => g.next_normal(),
            Self::Ziggurat(g) => g.next_normal(),
        }
    }
}

/// A family of independent generators derived from one master seed.
///
/// Stream `i` is seeded from `(seed, i)` alone, so work split into fixed
/// batches gives the same numbers whatever the number of worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngStreams {
    kind: RngKind,
    seed: u64,
}

impl RngStreams {
    /// Streams of `kind` derived from `seed`.
    pub fn new(kind: RngKind, seed: u64) -> Self {
        Self { kind, seed }
    }

    /// Streams seeded from operating-system entropy.
    pub fn from_entropy(kind: RngKind) -> Self {
        Self::new(kind, StdRng::from_entropy().gen())
    }

    /// Master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generator kind.
    pub fn kind(&self) -> RngKind {
        self.kind
    }

    /// The generator for stream `index`.
    pub fn stream(&self, index: u64) -> NormalRng {
        let mixed = splitmix64(self.seed ^ splitmix64(index.wrapping_add(1)));
        NormalRng::new(self.kind, mixed)
    }
}

/// SplitMix64 finaliser, used to decorrelate stream seeds.
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
