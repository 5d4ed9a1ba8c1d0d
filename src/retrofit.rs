//! Retrofit scenario evaluation.
//!
//! Every scenario is an independent generate-and-simulate cycle on its own copy of
//! the request and settings. Scenarios run on a dedicated rayon pool whose size is
//! `concurrency.max_concurrent_simulations`, so at most that many simulations are in
//! flight at once.

use crate::collab::SimulationRunner;
use crate::config::GeneratorSettings;
use crate::generate::{GenerationRequest, generate};
use crate::hvac::SystemFamily;
use crate::results::{EndUseSummary, summarize};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Name of the unmodified building in a [`RetrofitReport`].
pub const BASELINE: &str = "baseline";

/// One change applied on top of the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RetrofitMeasure {
    /// Envelope upgraded to the constructions of the given year.
    Envelope { year: i32 },
    Hvac { family: SystemFamily },
    /// Thermostat setpoints widened by this many kelvin on each side.
    SetpointWidening { kelvin: f64 },
    Feature { name: String },
}

impl RetrofitMeasure {
    fn apply(&self, req: &mut GenerationRequest, settings: &mut GeneratorSettings) {
        match self {
            Self::Envelope { year } => req.params.construction_era = Some(*year),
            Self::Hvac { family } => req.params.hvac_family = Some(*family),
            Self::SetpointWidening { kelvin } => {
                settings.setpoints.heating_c -= kelvin;
                settings.setpoints.cooling_c += kelvin;
            }
            Self::Feature { name } => {
                req.params.special_features.insert(name.clone());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrofitScenario {
    pub name: String,
    pub measures: Vec<RetrofitMeasure>,
}

impl RetrofitScenario {
    pub fn new(name: &str, measures: Vec<RetrofitMeasure>) -> Self {
        Self {
            name: name.to_string(),
            measures,
        }
    }

    /// Request and settings of this scenario. The inputs are not modified.
    pub fn apply(&self, base: &GenerationRequest, settings: &GeneratorSettings) -> (GenerationRequest, GeneratorSettings) {
        let mut req = base.clone();
        req.name = format!("{}_{}", base.name, self.name);
        let mut settings = settings.clone();
        for m in &self.measures {
            m.apply(&mut req, &mut settings);
        }
        (req, settings)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Summary of the simulation, or the error that stopped generation or simulation.
    pub result: std::result::Result<EndUseSummary, String>,
}

impl ScenarioOutcome {
    pub fn summary(&self) -> Option<&EndUseSummary> {
        self.result.as_ref().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrofitReport {
    pub baseline: ScenarioOutcome,
    pub scenarios: Vec<ScenarioOutcome>,
}

impl RetrofitReport {
    /// Site energy saved by a scenario relative to the baseline, in kWh.
    pub fn savings_kwh(&self, scenario: &str) -> Option<f64> {
        let base = self.baseline.summary()?;
        let s = self.scenarios.iter().find(|s| s.name == scenario)?.summary()?;
        Some(base.total_site_kwh - s.total_site_kwh)
    }

    /// Successful scenario with the lowest site energy.
    pub fn best(&self) -> Option<&ScenarioOutcome> {
        self.scenarios
            .iter()
            .filter_map(|s| s.summary().map(|sum| (s, sum.total_site_kwh)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s)
    }
}

/// Runs the baseline and every scenario with bounded concurrency.
///
/// A failing scenario is recorded in its outcome; only a failure to set up the
/// worker pool is returned as an error.
pub fn evaluate_scenarios(
    base: &GenerationRequest,
    scenarios: &[RetrofitScenario],
    runner: &dyn SimulationRunner,
    settings: &GeneratorSettings,
) -> Result<RetrofitReport> {
    let workers = settings.concurrency.max_concurrent_simulations.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("retrofit-{i}"))
        .build()
        .with_context(|| format!("Failed to start a pool of {workers} simulation workers"))?;

    let baseline = RetrofitScenario::new(BASELINE, Vec::new());
    let mut outcomes: Vec<ScenarioOutcome> = pool.install(|| {
        std::iter::once(&baseline)
            .chain(scenarios)
            .collect::<Vec<_>>()
            .par_iter()
            .map(|s| run_scenario(s, base, runner, settings))
            .collect()
    });
    let baseline = outcomes.remove(0);
    info!(scenarios = outcomes.len(), workers, "evaluated retrofit scenarios");
    Ok(RetrofitReport {
        baseline,
        scenarios: outcomes,
    })
}

fn run_scenario(
    scenario: &RetrofitScenario,
    base: &GenerationRequest,
    runner: &dyn SimulationRunner,
    settings: &GeneratorSettings,
) -> ScenarioOutcome {
    let (req, settings) = scenario.apply(base, settings);
    let result = generate(&req, &settings)
        .map_err(anyhow::Error::from)
        .and_then(|out| {
            let sim = runner
                .simulate(&out.idf)
                .with_context(|| format!("Simulation of scenario '{}' failed", scenario.name))?;
            Ok(summarize(&sim, out.model.building.total_area()))
        })
        .map_err(|e| {
            warn!(scenario = %scenario.name, error = %e, "scenario failed");
            format!("{e:#}")
        });
    ScenarioOutcome {
        name: scenario.name.clone(),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::ParameterRecord;
    use crate::generate::testing::chicago;
    use crate::idf::split_objects;
    use crate::results::{ELECTRICITY_FACILITY, J_PER_KWH, MeterObservation, ReportingFrequency, SimulationOutput};
    use crate::zoning::BuildingType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Reports electricity proportional to the number of objects in the file and
    /// tracks how many simulations overlap.
    #[derive(Default)]
    struct CountingRunner {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SimulationRunner for CountingRunner {
        fn simulate(&self, idf: &str) -> anyhow::Result<SimulationOutput> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.running.fetch_sub(1, Ordering::SeqCst);
            if idf.contains("PTAC") {
                anyhow::bail!("engine crashed");
            }
            let objects = split_objects(idf).len() as f64;
            Ok(SimulationOutput {
                meters: vec![MeterObservation::interval(
                    ELECTRICITY_FACILITY,
                    ReportingFrequency::RunPeriod,
                    objects * J_PER_KWH,
                )],
            })
        }
    }

    fn base() -> GenerationRequest {
        let params = ParameterRecord {
            building_type: Some(BuildingType::Office),
            stories: Some(1),
            floor_area_per_story_m2: Some(500.),
            hvac_family: Some(SystemFamily::Vav),
            ..Default::default()
        };
        GenerationRequest::new("Office", params, chicago())
    }

    #[test]
    fn test_apply_does_not_touch_inputs() {
        let settings = GeneratorSettings::default();
        let scenario = RetrofitScenario::new(
            "wide",
            vec![
                RetrofitMeasure::SetpointWidening { kelvin: 1. },
                RetrofitMeasure::Envelope { year: 2020 },
            ],
        );
        let (req, tweaked) = scenario.apply(&base(), &settings);
        assert_eq!(req.name, "Office_wide");
        assert_eq!(req.params.construction_era, Some(2020));
        assert_eq!(tweaked.setpoints.cooling_c, settings.setpoints.cooling_c + 1.);
        assert_eq!(base().params.construction_era, None);
    }

    #[test]
    fn test_concurrency_is_bounded() -> Result<()> {
        let mut settings = GeneratorSettings::default();
        settings.concurrency.max_concurrent_simulations = 2;
        let scenarios: Vec<RetrofitScenario> = (0..6)
            .map(|i| RetrofitScenario::new(&format!("s{i}"), vec![RetrofitMeasure::Envelope { year: 1970 + i * 10 }]))
            .collect();
        let runner = CountingRunner::default();
        let report = evaluate_scenarios(&base(), &scenarios, &runner, &settings)?;
        assert_eq!(report.scenarios.len(), 6);
        assert!(runner.peak.load(Ordering::SeqCst) <= 2);
        assert!(report.baseline.summary().is_some());
        Ok(())
    }

    #[test]
    fn test_failed_scenario_is_recorded() -> Result<()> {
        let scenarios = vec![
            RetrofitScenario::new("ptac", vec![RetrofitMeasure::Hvac { family: SystemFamily::Ptac }]),
            RetrofitScenario::new("ideal", vec![RetrofitMeasure::Hvac { family: SystemFamily::IdealLoads }]),
        ];
        let report = evaluate_scenarios(&base(), &scenarios, &CountingRunner::default(), &GeneratorSettings::default())?;
        let ptac = &report.scenarios[0];
        assert!(ptac.result.as_ref().is_err_and(|e| e.contains("engine crashed")));
        assert!(report.savings_kwh("ptac").is_none());
        assert!(report.savings_kwh("ideal").is_some());
        assert_eq!(report.best().map(|s| s.name.as_str()), Some("ideal"));
        Ok(())
    }
}
