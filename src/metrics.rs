//! Metrics collected from a committed placement.

use crate::domain::ids::ProviderId;
use crate::domain::routing::PathComputer;
use crate::domain::scenario::Scenario;
use crate::error::Result;
use crate::placement::candidates::normalize_cpu_and_memory;
use crate::placement::evaluator::evaluate_placement;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Occupation summary of one infrastructure provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderOccupation {
    pub provider: ProviderId,

    /// Mean occupation percentage across the provider's servers.
    pub occupation: f64,

    /// Servers of this provider with nonzero demand.
    pub active_servers: usize,
}

/// The metrics record reported to callers after a placement is committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    pub delay_sla_violations: u32,
    pub privacy_sla_violations: u32,
    pub overall_power_consumption: f64,
    pub overloaded_edge_servers: u32,

    /// Mean occupation percentage across all servers.
    pub overall_occupation: f64,

    pub per_provider: Vec<ProviderOccupation>,
}

/// Collects the metrics record from the current (committed) placement state.
/// Communication paths are refreshed as part of the measurement.
pub fn collect(scenario: &mut Scenario, paths: &dyn PathComputer) -> MetricsRecord {
    let evaluation = evaluate_placement(scenario, paths);

    let mut per_provider: BTreeMap<ProviderId, Vec<f64>> = BTreeMap::new();
    let mut overall_occupation = 0.0;

    for host in &scenario.servers {
        let capacity = normalize_cpu_and_memory(host.cpu, host.memory);
        let demand = normalize_cpu_and_memory(host.cpu_demand, host.memory_demand);
        let occupation = if capacity > 0.0 { demand / capacity * 100.0 } else { 0.0 };

        overall_occupation += occupation;
        per_provider.entry(host.provider).or_default().push(occupation);
    }

    if !scenario.servers.is_empty() {
        overall_occupation /= scenario.servers.len() as f64;
    }

    let per_provider = per_provider
        .into_iter()
        .map(|(provider, occupations)| ProviderOccupation {
            provider,
            occupation: occupations.iter().sum::<f64>() / occupations.len() as f64,
            active_servers: occupations.iter().filter(|occupation| **occupation > 0.0).count(),
        })
        .collect();

    MetricsRecord {
        delay_sla_violations: evaluation.delay_sla_violations,
        privacy_sla_violations: evaluation.privacy_sla_violations,
        overall_power_consumption: evaluation.power_consumption,
        overloaded_edge_servers: evaluation.overloaded_servers,
        overall_occupation,
        per_provider,
    }
}

impl MetricsRecord {
    /// Writes the record as a single CSV row (with header), suitable for
    /// appending across experiment runs.
    pub fn write_summary_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

        csv_writer.write_record([
            "delay_sla_violations",
            "privacy_sla_violations",
            "overall_power_consumption",
            "overloaded_edge_servers",
            "overall_occupation",
        ])?;
        csv_writer.write_record([
            self.delay_sla_violations.to_string(),
            self.privacy_sla_violations.to_string(),
            self.overall_power_consumption.to_string(),
            self.overloaded_edge_servers.to_string(),
            self.overall_occupation.to_string(),
        ])?;

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes one CSV row per infrastructure provider.
    pub fn write_provider_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

        csv_writer.write_record(["provider", "occupation", "active_servers"])?;
        for entry in &self.per_provider {
            csv_writer.write_record([entry.provider.to_string(), entry.occupation.to_string(), entry.active_servers.to_string()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MetricsRecord {
        MetricsRecord {
            delay_sla_violations: 1,
            privacy_sla_violations: 0,
            overall_power_consumption: 250.0,
            overloaded_edge_servers: 0,
            overall_occupation: 42.5,
            per_provider: vec![
                ProviderOccupation { provider: ProviderId::new(1), occupation: 85.0, active_servers: 2 },
                ProviderOccupation { provider: ProviderId::new(2), occupation: 0.0, active_servers: 0 },
            ],
        }
    }

    #[test]
    fn summary_csv_has_header_and_one_row() {
        let mut buffer = Vec::new();
        record().write_summary_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.trim_end().lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("delay_sla_violations;"));
        assert!(lines[1].starts_with("1;0;250;"));
    }

    #[test]
    fn provider_csv_has_one_row_per_provider() {
        let mut buffer = Vec::new();
        record().write_provider_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1;85;2");
    }
}
