//! Lattice nodes.

use serde::Serialize;
use sp_core::{Probability, Real};

/// Index of a node in the tree's arena.
pub type NodeId = usize;

/// A lattice node.
///
/// Nodes of the same layer form a column linked through `up` / `down`; the
/// column's central node is its trunk. Links to the next layer are
/// `next_mid`, `next_up` and `next_down`; only trunk nodes know the trunk
/// of the previous column (`behind`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Underlying level.
    pub underlying: Real,
    /// Time index.
    pub layer: usize,
    /// Rung relative to the trunk at creation.
    pub level: i64,
    /// Neighbour above in the same column.
    pub up: Option<NodeId>,
    /// Neighbour below in the same column.
    pub down: Option<NodeId>,
    /// Central successor.
    pub next_mid: Option<NodeId>,
    /// Upper successor; `None` when pruned.
    pub next_up: Option<NodeId>,
    /// Lower successor; `None` when pruned.
    pub next_down: Option<NodeId>,
    /// Previous trunk (trunk nodes only).
    pub behind: Option<NodeId>,
    /// Trunk of this node's column.
    pub trunk: NodeId,
    /// Up probability.
    pub p_up: Probability,
    /// Mid probability.
    pub p_mid: Probability,
    /// Down probability.
    pub p_down: Probability,
    /// Probability of reaching this node from the root.
    pub p_cum: Probability,
    /// Set on trunks whose step straddles the dividend date.
    pub is_div_next_period: bool,
    /// Immediate exercise value, after valuation of an early-exercise payoff.
    pub intrinsic: Option<Real>,
    /// Value after the backward pass.
    pub price: Option<Real>,
    /// Early exercise is optimal here.
    pub is_exercised: bool,
}

impl Node {
    pub(crate) fn new(underlying: Real, layer: usize, level: i64, trunk: NodeId) -> Self {
        Self {
            underlying,
            layer,
            level,
            up: None,
            down: None,
            next_mid: None,
            next_up: None,
            next_down: None,
            behind: None,
            trunk,
            p_up: 0.0,
            p_mid: 0.0,
            p_down: 0.0,
            p_cum: 0.0,
            is_div_next_period: false,
            intrinsic: None,
            price: None,
            is_exercised: false,
        }
    }

    /// Whether the node has successors.
    pub fn has_successors(&self) -> bool {
        self.next_mid.is_some()
    }

    /// `p_up + p_mid + p_down`.
    pub fn probability_sum(&self) -> Probability {
        self.p_up + self.p_mid + self.p_down
    }
}
