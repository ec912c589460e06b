//! Trinomial tree with discrete-dividend reconnection and pruning.
//!
//! The lattice approximates geometric Brownian motion with the jump factor
//! `α = exp(σ √(3 Δt))`. Each column is built from its trunk, whose central
//! successor sits at the trunk's forward value; every other node branches
//! to the successor built by its neighbour, so the lattice recombines.
//!
//! On the step straddling a cash dividend, forwards drop by the dividend
//! and every node searches the next column for the successor `m` with
//! `m(1+α)/(2α) < forward ≤ m(1+α)/2`, creating nodes as needed.
//!
//! Branch probabilities match the first two moments of the forward:
//!
//! ```text
//! p_down = (m⁻²(V + E²) − 1 − (α+1)(m⁻¹E − 1)) / ((1−α)(α⁻² − 1))
//! p_up   = (m⁻¹E − 1 − (α⁻¹ − 1) p_down) / (α − 1)
//! p_mid  = 1 − p_up − p_down
//! ```
//!
//! Edge nodes whose outer branch would be reached with cumulative
//! probability below the pruning limit collapse to `p_mid = 1`, which stops
//! the column from growing on that side.

use std::time::Instant;

use sp_core::errors::{Error, Result};
use sp_core::{DiscountFactor, Probability, Real, Time};
use tracing::{debug, warn};

use super::{LatticePayoff, NegativeProbabilityPolicy, Node, NodeId, TreeParameters};

/// A trinomial lattice stored as a node arena.
#[derive(Debug, Clone)]
pub struct TrinomialTree {
    params: TreeParameters,
    alpha: Real,
    dt: Time,
    nodes: Vec<Node>,
    root: NodeId,
    last_trunk: NodeId,
    negative_probabilities: usize,
}

impl TrinomialTree {
    /// Build the lattice.
    ///
    /// Fails on invalid parameters, on zero volatility (`α = 1`), when a
    /// trunk forward turns non-positive after the dividend, under
    /// [`NegativeProbabilityPolicy::Reject`] and when the deadline passes.
    pub fn build(params: TreeParameters) -> Result<Self> {
        params.validate()?;
        let dt = params.dt();
        let alpha = (params.volatility * (3.0 * dt).sqrt()).exp();
        if alpha - 1.0 <= Real::EPSILON {
            return Err(Error::NumericalInstability(format!(
                "degenerate lattice: alpha = {alpha} (volatility {})",
                params.volatility
            )));
        }

        let mut tree = Self {
            params,
            alpha,
            dt,
            nodes: Vec::new(),
            root: 0,
            last_trunk: 0,
            negative_probabilities: 0,
        };
        tree.create()?;
        debug!(
            steps = tree.steps(),
            nodes = tree.nodes.len(),
            alpha,
            negative = tree.negative_probabilities,
            "trinomial tree built"
        );
        Ok(tree)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Every node of the lattice.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// A node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Trunk of the terminal column.
    pub fn last_trunk(&self) -> NodeId {
        self.last_trunk
    }

    /// Jump factor `α`.
    pub fn alpha(&self) -> Real {
        self.alpha
    }

    /// Step length.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Number of steps.
    pub fn steps(&self) -> usize {
        self.params.steps()
    }

    /// Nodes whose moment matching produced a negative probability.
    pub fn negative_probability_count(&self) -> usize {
        self.negative_probabilities
    }

    /// All nodes of the column whose trunk is `trunk`: the trunk, the nodes
    /// above it upwards, then the nodes below it downwards.
    pub fn column(&self, trunk: NodeId) -> Vec<NodeId> {
        let mut ids = vec![trunk];
        let mut cursor = trunk;
        while let Some(up) = self.nodes[cursor].up {
            ids.push(up);
            cursor = up;
        }
        cursor = trunk;
        while let Some(down) = self.nodes[cursor].down {
            ids.push(down);
            cursor = down;
        }
        ids
    }

    /// Every branch as `(from, to, probability)`.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, Probability)> {
        let mut edges = Vec::with_capacity(3 * self.nodes.len());
        for (id, node) in self.nodes.iter().enumerate() {
            if let Some(mid) = node.next_mid {
                edges.push((id, mid, node.p_mid));
            }
            if let Some(up) = node.next_up {
                edges.push((id, up, node.p_up));
            }
            if let Some(down) = node.next_down {
                edges.push((id, down, node.p_down));
            }
        }
        edges
    }

    // ── Construction ─────────────────────────────────────────────────────────

    fn create(&mut self) -> Result<()> {
        let root = self.push(self.params.spot, 0, 0, None);
        self.nodes[root].p_cum = 1.0;
        self.root = root;

        let mut trunk = self.build_trunk_triplet(root)?;
        for _ in 1..self.steps() {
            self.check_deadline()?;
            trunk = self.build_column(trunk)?;
        }
        self.last_trunk = trunk;
        Ok(())
    }

    fn check_deadline(&self) -> Result<()> {
        match self.params.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    fn push(&mut self, underlying: Real, layer: usize, level: i64, trunk: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(underlying, layer, level, trunk.unwrap_or(id)));
        id
    }

    fn up_or_create(&mut self, id: NodeId) -> NodeId {
        if let Some(up) = self.nodes[id].up {
            return up;
        }
        let (s, layer, level, trunk) = {
            let n = &self.nodes[id];
            (n.underlying * self.alpha, n.layer, n.level + 1, n.trunk)
        };
        let up = self.push(s, layer, level, Some(trunk));
        self.nodes[up].down = Some(id);
        self.nodes[id].up = Some(up);
        up
    }

    fn down_or_create(&mut self, id: NodeId) -> NodeId {
        if let Some(down) = self.nodes[id].down {
            return down;
        }
        let (s, layer, level, trunk) = {
            let n = &self.nodes[id];
            (n.underlying / self.alpha, n.layer, n.level - 1, n.trunk)
        };
        let down = self.push(s, layer, level, Some(trunk));
        self.nodes[down].up = Some(id);
        self.nodes[id].down = Some(down);
        down
    }

    fn straddles_dividend(&self, layer: usize) -> bool {
        let Some(dividend) = self.params.dividend.filter(|d| d.amount > 0.0) else {
            return false;
        };
        let tolerance = (1.0 / 365.0) / self.steps() as Real / 10.0;
        let same = |a: Time, b: Time| (a - b).abs() < tolerance;
        let start = layer as Real * self.dt;
        let end = (layer + 1) as Real * self.dt;
        !same(start, dividend.time) && start < dividend.time && (end > dividend.time || same(end, dividend.time))
    }

    fn forward(&self, id: NodeId) -> Real {
        let node = &self.nodes[id];
        let drift = self.params.rates[node.layer] - self.params.dividend_yield;
        let forward = node.underlying * (drift * self.dt).exp();
        match self.params.dividend {
            Some(d) if self.nodes[node.trunk].is_div_next_period => forward - d.amount,
            _ => forward,
        }
    }

    fn variance(&self, id: NodeId) -> Real {
        let node = &self.nodes[id];
        let drift = self.params.rates[node.layer] - self.params.dividend_yield;
        let vol = self.params.volatility;
        node.underlying.powi(2) * (2.0 * drift * self.dt).exp() * ((vol * vol * self.dt).exp() - 1.0)
    }

    fn build_column(&mut self, trunk: NodeId) -> Result<NodeId> {
        let next_trunk = self.build_trunk_triplet(trunk)?;
        if let Some(below) = self.nodes[trunk].down {
            let candidate = self.down_or_create(next_trunk);
            self.build_lower_column(below, candidate)?;
        }
        if let Some(above) = self.nodes[trunk].up {
            let candidate = self.up_or_create(next_trunk);
            self.build_upper_column(above, candidate)?;
        }
        Ok(next_trunk)
    }

    fn build_trunk_triplet(&mut self, trunk: NodeId) -> Result<NodeId> {
        let layer = self.nodes[trunk].layer;
        self.nodes[trunk].is_div_next_period = self.straddles_dividend(layer);

        let forward = self.forward(trunk);
        if forward <= 0.0 {
            return Err(Error::NumericalInstability(format!(
                "trunk forward {forward} is not positive at layer {layer}"
            )));
        }
        let level = self.nodes[trunk].level;
        let next = self.push(forward, layer + 1, level, None);
        self.nodes[next].behind = Some(trunk);
        self.link_triplet(trunk, next)?;
        Ok(next)
    }

    fn build_lower_column(&mut self, mut prev: NodeId, mut candidate: NodeId) -> Result<()> {
        loop {
            if self.nodes[self.nodes[prev].trunk].is_div_next_period {
                if self.forward(prev) <= 0.0 {
                    debug!(layer = self.nodes[prev].layer, "lower column stops: forward after dividend <= 0");
                    return Ok(());
                }
                candidate = self.reconnect(prev, candidate);
            }
            self.link_triplet(prev, candidate)?;
            match self.nodes[prev].down {
                Some(next) => {
                    prev = next;
                    candidate = self.down_or_create(candidate);
                }
                None => return Ok(()),
            }
        }
    }

    fn build_upper_column(&mut self, mut prev: NodeId, mut candidate: NodeId) -> Result<()> {
        loop {
            if self.nodes[self.nodes[prev].trunk].is_div_next_period {
                candidate = self.reconnect(prev, candidate);
            }
            self.link_triplet(prev, candidate)?;
            match self.nodes[prev].up {
                Some(next) => {
                    prev = next;
                    candidate = self.up_or_create(candidate);
                }
                None => return Ok(()),
            }
        }
    }

    /// Walk `candidate` until its interval brackets the forward of `prev`.
    fn reconnect(&mut self, prev: NodeId, mut candidate: NodeId) -> NodeId {
        let forward = self.forward(prev);
        let a = self.alpha;
        loop {
            let m = self.nodes[candidate].underlying;
            if forward > m * (1.0 + a) / 2.0 {
                candidate = self.up_or_create(candidate);
            } else if forward <= m * (1.0 + a) / (2.0 * a) {
                candidate = self.down_or_create(candidate);
            } else {
                return candidate;
            }
        }
    }

    fn link_triplet(&mut self, prev: NodeId, candidate: NodeId) -> Result<()> {
        self.nodes[prev].next_mid = Some(candidate);
        let (p_up, p_mid, p_down) = self.probabilities(prev, candidate)?;

        let limit = self.params.pruning_limit;
        let (has_up, has_down, p_cum) = {
            let n = &self.nodes[prev];
            (n.up.is_some(), n.down.is_some(), n.p_cum)
        };
        let prune = (!has_up && p_cum * p_up < limit) || (!has_down && p_cum * p_down < limit);

        let (next_up, next_down) = if prune {
            (None, None)
        } else {
            (Some(self.up_or_create(candidate)), Some(self.down_or_create(candidate)))
        };

        let node = &mut self.nodes[prev];
        if prune {
            node.p_up = 0.0;
            node.p_mid = 1.0;
            node.p_down = 0.0;
        } else {
            node.p_up = p_up;
            node.p_mid = p_mid;
            node.p_down = p_down;
        }
        node.next_up = next_up;
        node.next_down = next_down;
        let (p_up, p_mid, p_down) = (node.p_up, node.p_mid, node.p_down);

        self.nodes[candidate].p_cum += p_cum * p_mid;
        if let Some(up) = next_up {
            self.nodes[up].p_cum += p_cum * p_up;
        }
        if let Some(down) = next_down {
            self.nodes[down].p_cum += p_cum * p_down;
        }
        Ok(())
    }

    fn probabilities(&mut self, prev: NodeId, candidate: NodeId) -> Result<(Probability, Probability, Probability)> {
        let expected = self.forward(prev);
        let variance = self.variance(prev);
        let m = self.nodes[candidate].underlying;
        let (p_up, p_mid, p_down) = moment_matched_probabilities(expected, variance, m, self.alpha);

        if p_up >= 0.0 && p_mid >= 0.0 && p_down >= 0.0 {
            return Ok((p_up, p_mid, p_down));
        }

        self.negative_probabilities += 1;
        let (layer, level) = (self.nodes[prev].layer, self.nodes[prev].level);
        match self.params.policy {
            NegativeProbabilityPolicy::Warn => {
                warn!(layer, level, p_up, p_mid, p_down, "negative tree probability");
                Ok((p_up, p_mid, p_down))
            }
            NegativeProbabilityPolicy::Clamp => {
                warn!(layer, level, p_up, p_mid, p_down, "negative tree probability clamped");
                Ok(clamp_probabilities(p_up, p_mid, p_down))
            }
            NegativeProbabilityPolicy::Reject => Err(Error::NumericalInstability(format!(
                "negative probability at layer {layer}, level {level}: \
                 up {p_up}, mid {p_mid}, down {p_down}"
            ))),
        }
    }

    // ── Valuation ────────────────────────────────────────────────────────────

    /// Discount factor from each layer to maturity.
    fn discount_to_maturity(&self) -> Vec<DiscountFactor> {
        let n = self.steps();
        let mut factors = vec![1.0; n + 1];
        for layer in (0..n).rev() {
            factors[layer] = factors[layer + 1] * (-self.params.rates[layer] * self.dt).exp();
        }
        factors
    }

    fn priced(&self, id: NodeId) -> Result<Real> {
        self.nodes[id]
            .price
            .ok_or_else(|| Error::Runtime(format!("lattice node {id} valued before its successors")))
    }

    /// Backward pass, column by column from maturity to the root.
    ///
    /// Stores each node's value (and, for early exercise, its intrinsic
    /// value and exercise flag) and returns the root value. Nodes cut off
    /// by a dividend larger than their forward continue as a worthless
    /// underlying held to maturity.
    pub fn price(&mut self, payoff: &dyn LatticePayoff) -> Result<Real> {
        let to_maturity = self.discount_to_maturity();
        let floor = payoff.terminal(0.0);

        for id in self.column(self.last_trunk) {
            let node = &mut self.nodes[id];
            let s = node.underlying;
            node.price = Some(if payoff.is_knocked_out(s) { 0.0 } else { payoff.terminal(s) });
            node.intrinsic = None;
            node.is_exercised = false;
        }

        let mut trunk = self.nodes[self.last_trunk].behind;
        while let Some(t) = trunk {
            for id in self.column(t) {
                self.value_node(id, payoff, &to_maturity, floor)?;
            }
            trunk = self.nodes[t].behind;
        }

        let value = self.priced(self.root)?;
        if !value.is_finite() {
            return Err(Error::NumericalInstability(format!("lattice value is {value}")));
        }
        Ok(value)
    }

    fn value_node(
        &mut self,
        id: NodeId,
        payoff: &dyn LatticePayoff,
        to_maturity: &[DiscountFactor],
        floor: Real,
    ) -> Result<()> {
        let node = &self.nodes[id];
        let s = node.underlying;
        let continuation = match node.next_mid {
            None => floor * to_maturity[node.layer],
            Some(mid) => {
                let mut value = node.p_mid * self.priced(mid)?;
                if let Some(up) = node.next_up {
                    value += node.p_up * self.priced(up)?;
                }
                if let Some(down) = node.next_down {
                    value += node.p_down * self.priced(down)?;
                }
                value * (-self.params.rates[node.layer] * self.dt).exp()
            }
        };

        let (price, intrinsic, exercised) = if payoff.is_knocked_out(s) {
            (0.0, None, false)
        } else {
            match payoff.exercise(s) {
                Some(ex) => (continuation.max(ex), Some(ex), ex > continuation),
                None => (continuation, None, false),
            }
        };

        let node = &mut self.nodes[id];
        node.price = Some(price);
        node.intrinsic = intrinsic;
        node.is_exercised = exercised;
        Ok(())
    }

    /// Memoised recursive valuation from the root.
    ///
    /// Equivalent to [`price`](Self::price) but leaves the nodes untouched;
    /// recursion depth grows with the number of steps.
    pub fn price_recursive(&self, payoff: &dyn LatticePayoff) -> Real {
        let to_maturity = self.discount_to_maturity();
        let floor = payoff.terminal(0.0);
        let mut memo = vec![None; self.nodes.len()];
        self.recurse(self.root, payoff, &to_maturity, floor, &mut memo)
    }

    fn recurse(
        &self,
        id: NodeId,
        payoff: &dyn LatticePayoff,
        to_maturity: &[DiscountFactor],
        floor: Real,
        memo: &mut [Option<Real>],
    ) -> Real {
        if let Some(value) = memo[id] {
            return value;
        }
        let node = &self.nodes[id];
        let s = node.underlying;
        let value = if payoff.is_knocked_out(s) {
            0.0
        } else if node.layer == self.steps() {
            payoff.terminal(s)
        } else {
            let continuation = match node.next_mid {
                None => floor * to_maturity[node.layer],
                Some(mid) => {
                    let mut v = node.p_mid * self.recurse(mid, payoff, to_maturity, floor, memo);
                    if let Some(up) = node.next_up {
                        v += node.p_up * self.recurse(up, payoff, to_maturity, floor, memo);
                    }
                    if let Some(down) = node.next_down {
                        v += node.p_down * self.recurse(down, payoff, to_maturity, floor, memo);
                    }
                    v * (-self.params.rates[node.layer] * self.dt).exp()
                }
            };
            match payoff.exercise(s) {
                Some(ex) => continuation.max(ex),
                None => continuation,
            }
        };
        memo[id] = Some(value);
        value
    }
}

/// Moment-matched `(p_up, p_mid, p_down)` for a node with forward
/// `expected` and variance `variance` branching around `mid`.
pub fn moment_matched_probabilities(
    expected: Real,
    variance: Real,
    mid: Real,
    alpha: Real,
) -> (Probability, Probability, Probability) {
    let ratio = expected / mid;
    let p_down = ((variance + expected * expected) / (mid * mid) - 1.0 - (alpha + 1.0) * (ratio - 1.0))
        / ((1.0 - alpha) * (1.0 / (alpha * alpha) - 1.0));
    let p_up = (ratio - 1.0 - (1.0 / alpha - 1.0) * p_down) / (alpha - 1.0);
    let p_mid = 1.0 - p_up - p_down;
    (p_up, p_mid, p_down)
}

fn clamp_probabilities(p_up: Probability, p_mid: Probability, p_down: Probability) -> (Probability, Probability, Probability) {
    let (u, m, d) = (p_up.max(0.0), p_mid.max(0.0), p_down.max(0.0));
    let total = u + m + d;
    if total <= 0.0 {
        return (0.0, 1.0, 0.0);
    }
    (u / total, m / total, d / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CashDividend;
    use approx::assert_abs_diff_eq;

    struct Vanilla {
        strike: Real,
        call: bool,
        american: bool,
    }

    impl LatticePayoff for Vanilla {
        fn terminal(&self, spot: Real) -> Real {
            if self.call {
                (spot - self.strike).max(0.0)
            } else {
                (self.strike - spot).max(0.0)
            }
        }

        fn exercise(&self, spot: Real) -> Option<Real> {
            self.american.then(|| self.terminal(spot))
        }
    }

    const CALL: Vanilla = Vanilla {
        strike: 100.0,
        call: true,
        american: false,
    };

    #[test]
    fn european_call_converges_to_black_scholes() {
        // BS ≈ 10.4506
        let mut tree = TrinomialTree::build(TreeParameters::flat(100.0, 0.2, 0.05, 1.0, 200)).unwrap();
        let price = tree.price(&CALL).unwrap();
        assert!((price - 10.4506).abs() < 0.02, "tree call = {price:.4}");
        // a full lattice has 2n+1 nodes per column
        assert_eq!(tree.nodes().len(), 201 * 201);
    }

    #[test]
    fn recursive_oracle_matches_backward_pass() {
        let mut params = TreeParameters::flat(100.0, 0.25, 0.03, 1.0, 60);
        params.dividend = Some(CashDividend { amount: 3.0, time: 0.4 });
        let mut tree = TrinomialTree::build(params).unwrap();
        let put = Vanilla {
            strike: 105.0,
            call: false,
            american: true,
        };
        let iterative = tree.price(&put).unwrap();
        let recursive = tree.price_recursive(&put);
        assert_abs_diff_eq!(iterative, recursive, epsilon = 1e-10);
    }

    #[test]
    fn american_put_flags_early_exercise() {
        let mut tree = TrinomialTree::build(TreeParameters::flat(100.0, 0.2, 0.05, 1.0, 100)).unwrap();
        let put = Vanilla {
            strike: 100.0,
            call: false,
            american: true,
        };
        let american = tree.price(&put).unwrap();
        assert!(tree.nodes().iter().any(|n| n.is_exercised));
        let european = tree.price(&Vanilla { american: false, ..put }).unwrap();
        assert!(american > european + 0.3, "american {american:.4} vs european {european:.4}");
    }

    #[test]
    fn zero_volatility_is_rejected() {
        let err = TrinomialTree::build(TreeParameters::flat(100.0, 0.0, 0.05, 1.0, 10)).unwrap_err();
        assert!(matches!(err, Error::NumericalInstability(_)));
    }

    #[test]
    fn negative_probability_policies() {
        // σ = 2 over a single one-year step: p_mid < 0 at the root
        let mut params = TreeParameters::flat(100.0, 2.0, 0.0, 1.0, 1);
        let warned = TrinomialTree::build(params.clone()).unwrap();
        assert_eq!(warned.negative_probability_count(), 1);
        assert!(warned.nodes()[warned.root()].p_mid < 0.0);

        params.policy = NegativeProbabilityPolicy::Clamp;
        let clamped = TrinomialTree::build(params.clone()).unwrap();
        let root = &clamped.nodes()[clamped.root()];
        assert_eq!(root.p_mid, 0.0);
        assert_abs_diff_eq!(root.probability_sum(), 1.0, epsilon = 1e-12);

        params.policy = NegativeProbabilityPolicy::Reject;
        assert!(matches!(
            TrinomialTree::build(params),
            Err(Error::NumericalInstability(_))
        ));
    }

    #[test]
    fn expired_deadline_aborts_the_build() {
        let mut params = TreeParameters::flat(100.0, 0.2, 0.05, 1.0, 50);
        params.deadline = Some(Instant::now());
        assert_eq!(TrinomialTree::build(params).unwrap_err(), Error::DeadlineExceeded);
    }

    #[test]
    fn dividend_step_marks_one_trunk() {
        let mut params = TreeParameters::flat(100.0, 0.2, 0.05, 1.0, 10);
        params.dividend = Some(CashDividend { amount: 2.0, time: 0.45 });
        let tree = TrinomialTree::build(params).unwrap();
        let flagged: Vec<usize> = tree
            .nodes()
            .iter()
            .filter(|n| n.is_div_next_period)
            .map(|n| n.layer)
            .collect();
        assert_eq!(flagged, vec![4]);
    }

    #[test]
    fn edges_cover_every_branch() {
        let tree = TrinomialTree::build(TreeParameters::flat(100.0, 0.2, 0.05, 1.0, 3)).unwrap();
        // columns of 1, 3, 5 nodes each branching three ways
        assert_eq!(tree.edges().len(), 3 * (1 + 3 + 5));
        assert!(tree.edges().iter().all(|&(from, to, _)| tree.nodes()[to].layer == tree.nodes()[from].layer + 1));
    }
}
