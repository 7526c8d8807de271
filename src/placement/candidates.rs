//! Candidate scoring primitives shared by the greedy strategies.
//!
//! Every candidate is a fixed struct of named numeric fields; min-max
//! normalization is a generic function over a named-field set so strategies
//! can combine heterogeneous costs on a common scale.

use crate::domain::ids::ServerId;
use std::collections::HashMap;

/// Geometric mean of a cpu/memory pair, used to collapse two-dimensional
/// demand or capacity into a single comparable magnitude.
pub fn normalize_cpu_and_memory(cpu: i64, memory: i64) -> f64 {
    ((cpu * memory) as f64).sqrt()
}

/// Min-max normalization of `x` into `[0, 1]`. Degenerate ranges map to 1 so
/// a constant field neither favors nor penalizes any candidate.
pub fn min_max_norm(x: f64, min: f64, max: f64) -> f64 {
    if max > min { (x - min) / (max - min) } else { 1.0 }
}

/// A candidate type exposing a fixed set of named numeric fields.
pub trait ScoredFields {
    const FIELDS: &'static [&'static str];

    fn field(&self, name: &str) -> f64;
}

/// Per-field minima and maxima over a candidate set, for normalization.
#[derive(Debug, Clone)]
pub struct FieldBounds {
    min: HashMap<&'static str, f64>,
    max: HashMap<&'static str, f64>,
}

impl FieldBounds {
    pub fn of<T: ScoredFields>(candidates: &[T]) -> Self {
        let mut min = HashMap::new();
        let mut max = HashMap::new();

        for candidate in candidates {
            for name in T::FIELDS {
                let value = candidate.field(name);
                min.entry(*name).and_modify(|m: &mut f64| *m = m.min(value)).or_insert(value);
                max.entry(*name).and_modify(|m: &mut f64| *m = m.max(value)).or_insert(value);
            }
        }

        Self { min, max }
    }

    /// Normalized value of one field of a candidate.
    pub fn normalized<T: ScoredFields>(&self, candidate: &T, name: &'static str) -> f64 {
        match (self.min.get(name), self.max.get(name)) {
            (Some(min), Some(max)) => min_max_norm(candidate.field(name), *min, *max),
            _ => 0.0,
        }
    }

    /// Sum of the normalized values of every field in the set.
    pub fn normalized_sum<T: ScoredFields>(&self, candidate: &T) -> f64 {
        T::FIELDS.iter().map(|name| self.normalized(candidate, name)).sum()
    }
}

/// Candidate host ranked by provider trust and user-to-server delay.
#[derive(Debug, Clone)]
pub struct TrustDelayCandidate {
    pub server: ServerId,
    pub trust_degree: u8,
    pub delay: f64,
}

/// Candidate host scored by the composite-score strategy.
///
/// `sla_violations` is a hard sort key; the three cost fields are min-max
/// normalized across the candidate set and summed as the soft key.
#[derive(Debug, Clone)]
pub struct CompositeCandidate {
    pub server: ServerId,

    /// How many SLAs (delay, privacy) hosting here would violate: 0, 1 or 2.
    pub sla_violations: u32,

    /// Cost of taking this server away from pending services that could
    /// legally use it. Charged only to the last service of a chain.
    pub affected_services_cost: f64,

    /// Power cost of one core plus the static share when the server is idle.
    pub power_consumption: f64,

    /// Additional end-to-end delay this hop would add. Charged only to the
    /// last service of a chain.
    pub delay_cost: f64,
}

impl ScoredFields for CompositeCandidate {
    const FIELDS: &'static [&'static str] = &["affected_services_cost", "power_consumption", "delay_cost"];

    fn field(&self, name: &str) -> f64 {
        match name {
            "affected_services_cost" => self.affected_services_cost,
            "power_consumption" => self.power_consumption,
            "delay_cost" => self.delay_cost,
            _ => panic!("unknown candidate field: {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(affected: f64, power: f64, delay: f64) -> CompositeCandidate {
        CompositeCandidate { server: ServerId::new(0), sla_violations: 0, affected_services_cost: affected, power_consumption: power, delay_cost: delay }
    }

    #[test]
    fn min_max_norm_spans_unit_interval() {
        assert_eq!(min_max_norm(5.0, 5.0, 15.0), 0.0);
        assert_eq!(min_max_norm(15.0, 5.0, 15.0), 1.0);
        assert_eq!(min_max_norm(10.0, 5.0, 15.0), 0.5);
    }

    #[test]
    fn degenerate_range_normalizes_to_one() {
        assert_eq!(min_max_norm(7.0, 7.0, 7.0), 1.0);
    }

    #[test]
    fn normalize_cpu_and_memory_is_geometric_mean() {
        assert_eq!(normalize_cpu_and_memory(4, 16), 8.0);
    }

    #[test]
    fn bounds_cover_all_named_fields() {
        let candidates = vec![candidate(0.0, 10.0, 2.0), candidate(4.0, 30.0, 2.0)];
        let bounds = FieldBounds::of(&candidates);

        assert_eq!(bounds.normalized(&candidates[0], "affected_services_cost"), 0.0);
        assert_eq!(bounds.normalized(&candidates[1], "affected_services_cost"), 1.0);
        assert_eq!(bounds.normalized(&candidates[1], "power_consumption"), 1.0);
        // Constant delay_cost contributes 1 for both candidates.
        assert_eq!(bounds.normalized_sum(&candidates[0]), 1.0);
        assert_eq!(bounds.normalized_sum(&candidates[1]), 3.0);
    }
}
