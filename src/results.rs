//! Meter results reported by the simulation engine.
//!
//! A meter can be reported at several frequencies in the same run. Interval values
//! add up to the total, but a run-period value already is the total: it is reduced
//! with the maximum of its observations and never summed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Joules per kilowatt-hour.
pub const J_PER_KWH: f64 = 3.6e6;

pub const ELECTRICITY_FACILITY: &str = "Electricity:Facility";
pub const HEATING_TRANSFER: &str = "Heating:EnergyTransfer";
pub const COOLING_TRANSFER: &str = "Cooling:EnergyTransfer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportingFrequency {
    Timestep,
    Hourly,
    Daily,
    Monthly,
    RunPeriod,
}

impl ReportingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestep => "Timestep",
            Self::Hourly => "Hourly",
            Self::Daily => "Daily",
            Self::Monthly => "Monthly",
            Self::RunPeriod => "RunPeriod",
        }
    }
}

impl fmt::Display for ReportingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a reported value covers one interval or everything up to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeterKind {
    Interval,
    Cumulative,
}

/// One reported value of a meter, in joules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterObservation {
    pub meter: String,
    pub frequency: ReportingFrequency,
    pub kind: MeterKind,
    pub value_j: f64,
}

impl MeterObservation {
    pub fn interval(meter: &str, frequency: ReportingFrequency, value_j: f64) -> Self {
        let kind = if frequency == ReportingFrequency::RunPeriod {
            MeterKind::Cumulative
        } else {
            MeterKind::Interval
        };
        Self {
            meter: meter.to_string(),
            frequency,
            kind,
            value_j,
        }
    }

    pub fn cumulative(meter: &str, frequency: ReportingFrequency, value_j: f64) -> Self {
        Self {
            meter: meter.to_string(),
            frequency,
            kind: MeterKind::Cumulative,
            value_j,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Latest,
    Max,
    Sum,
}

impl Reducer {
    pub fn for_kind(kind: MeterKind) -> Self {
        match kind {
            MeterKind::Cumulative => Self::Max,
            MeterKind::Interval => Self::Sum,
        }
    }

    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        match self {
            Self::Latest => finite.last(),
            Self::Max => finite.reduce(f64::max),
            Self::Sum => {
                let mut finite = finite.peekable();
                finite.peek()?;
                Some(finite.sum())
            }
        }
    }
}

/// Total of one meter over the run.
///
/// Only the coarsest frequency reported for the meter is used, so that monthly and
/// hourly values of the same meter are not added together. Returns `None` when the
/// meter was not reported.
pub fn aggregate_meter(observations: &[MeterObservation], meter: &str) -> Option<f64> {
    let frequency = observations
        .iter()
        .filter(|o| o.meter == meter)
        .map(|o| o.frequency)
        .max()?;
    let selected: Vec<&MeterObservation> = observations
        .iter()
        .filter(|o| o.meter == meter && o.frequency == frequency)
        .collect();
    let cumulative = selected.iter().any(|o| o.kind == MeterKind::Cumulative);
    let reducer = Reducer::for_kind(if cumulative {
        MeterKind::Cumulative
    } else {
        MeterKind::Interval
    });
    let values: Vec<f64> = selected.iter().map(|o| o.value_j).collect();
    reducer.apply(&values)
}

/// Meter values of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub meters: Vec<MeterObservation>,
}

impl SimulationOutput {
    pub fn meter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.meters.iter().map(|o| o.meter.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Annual site energy by end use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndUseSummary {
    pub electricity_kwh: f64,
    /// Keyed by fuel name, e.g. "NaturalGas".
    pub fuels_kwh: BTreeMap<String, f64>,
    pub heating_delivered_kwh: f64,
    pub cooling_delivered_kwh: f64,
    pub total_site_kwh: f64,
    /// kWh per m^2 of conditioned floor area.
    pub eui_kwh_per_m2: f64,
}

pub fn summarize(output: &SimulationOutput, floor_area_m2: f64) -> EndUseSummary {
    let kwh = |meter: &str| aggregate_meter(&output.meters, meter).unwrap_or(0.) / J_PER_KWH;
    let fuels_kwh: BTreeMap<String, f64> = output
        .meter_names()
        .into_iter()
        .filter_map(|m| m.strip_suffix(":Facility").map(|fuel| (fuel, m)))
        .filter(|(fuel, _)| *fuel != "Electricity")
        .map(|(fuel, m)| (fuel.to_string(), kwh(m)))
        .collect();
    let electricity_kwh = kwh(ELECTRICITY_FACILITY);
    let total_site_kwh = electricity_kwh + fuels_kwh.values().sum::<f64>();
    let eui_kwh_per_m2 = if floor_area_m2 > 0. {
        total_site_kwh / floor_area_m2
    } else {
        0.
    };
    EndUseSummary {
        electricity_kwh,
        fuels_kwh,
        heating_delivered_kwh: kwh(HEATING_TRANSFER),
        cooling_delivered_kwh: kwh(COOLING_TRANSFER),
        total_site_kwh,
        eui_kwh_per_m2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_run_period_total_is_not_summed() {
        // The same cumulative total read from ten tables
        let obs: Vec<MeterObservation> = (0..10)
            .map(|_| MeterObservation::interval(ELECTRICITY_FACILITY, ReportingFrequency::RunPeriod, 5.0e11))
            .collect();
        assert_eq!(aggregate_meter(&obs, ELECTRICITY_FACILITY), Some(5.0e11));
    }

    #[test]
    fn test_monthly_values_are_summed() {
        let obs: Vec<MeterObservation> = (1..=12)
            .map(|m| MeterObservation::interval("NaturalGas:Facility", ReportingFrequency::Monthly, m as f64))
            .collect();
        assert_eq!(aggregate_meter(&obs, "NaturalGas:Facility"), Some(78.));
    }

    #[test]
    fn test_coarsest_frequency_wins() {
        let mut obs = vec![MeterObservation::interval(ELECTRICITY_FACILITY, ReportingFrequency::RunPeriod, 100.)];
        obs.extend((0..4).map(|_| MeterObservation::interval(ELECTRICITY_FACILITY, ReportingFrequency::Monthly, 25.)));
        assert_eq!(aggregate_meter(&obs, ELECTRICITY_FACILITY), Some(100.));
        assert_eq!(aggregate_meter(&obs, "Missing"), None);
    }

    #[test]
    fn test_cumulative_monthly_running_total() {
        let obs: Vec<MeterObservation> = [10., 25., 40.]
            .iter()
            .map(|&v| MeterObservation::cumulative(HEATING_TRANSFER, ReportingFrequency::Monthly, v))
            .collect();
        assert_eq!(aggregate_meter(&obs, HEATING_TRANSFER), Some(40.));
        assert_eq!(Reducer::Latest.apply(&[1., f64::NAN, 3.]), Some(3.));
        assert_eq!(Reducer::Sum.apply(&[]), None);
    }

    #[test]
    fn test_summary_eui() {
        let output = SimulationOutput {
            meters: vec![
                MeterObservation::interval(ELECTRICITY_FACILITY, ReportingFrequency::RunPeriod, 100. * J_PER_KWH),
                MeterObservation::interval("NaturalGas:Facility", ReportingFrequency::RunPeriod, 50. * J_PER_KWH),
                MeterObservation::interval(COOLING_TRANSFER, ReportingFrequency::RunPeriod, 70. * J_PER_KWH),
            ],
        };
        let s = summarize(&output, 10.);
        assert!((s.total_site_kwh - 150.).abs() < 1e-9);
        assert!((s.eui_kwh_per_m2 - 15.).abs() < 1e-9);
        assert_eq!(s.fuels_kwh.len(), 1);
        assert!((s.cooling_delivered_kwh - 70.).abs() < 1e-9);
        assert_eq!(s.heating_delivered_kwh, 0.);
    }
}
