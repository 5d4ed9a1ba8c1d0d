//! Schedules for internal gains, setpoints and equipment availability.
//!
//! A schedule is either constant or a weekly profile given as 24 hourly values for
//! weekdays and 24 for weekends. Weekly profiles are emitted compacted: adjacent
//! hours with equal values merge into one "Until" period.

use crate::HasName;
use crate::config::SetpointSettings;
use crate::geom::zone::UsageType;
use serde::{Deserialize, Serialize};

pub const ALWAYS_ON: &str = "AlwaysOn";
pub const ACTIVITY_LEVEL: &str = "ActivityLevel";
pub const THERMOSTAT_CONTROL_TYPE: &str = "DualSetpointControlType";
pub const HEATING_SETPOINT: &str = "HeatingSetpoint";
pub const COOLING_SETPOINT: &str = "CoolingSetpoint";
pub const HEATING_SETBACK: &str = "HeatingSetback";
pub const COOLING_SETBACK: &str = "CoolingSetback";

pub const FRACTION: &str = "Fraction";
pub const TEMPERATURE: &str = "Temperature";
pub const ACTIVITY: &str = "ActivityLevel";
pub const CONTROL_TYPE: &str = "ControlType";
pub const ON_OFF: &str = "OnOff";

/// Numeric type literals of `ScheduleTypeLimits`.
pub const NUMERIC_TYPES: &[&str] = &["Continuous", "Discrete"];
/// Unit type literals of `ScheduleTypeLimits` used by this crate.
pub const UNIT_TYPES: &[&str] = &[
    "Dimensionless",
    "Temperature",
    "ActivityLevel",
    "Control",
    "Availability",
];

/// Dual setpoint control type value of `ZoneControl:Thermostat`.
pub const DUAL_SETPOINT_CONTROL: f64 = 4.;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTypeLimits {
    pub name: String,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub numeric_type: String,
    pub unit_type: String,
}

impl ScheduleTypeLimits {
    fn new(name: &str, lower: Option<f64>, upper: Option<f64>, numeric_type: &str, unit_type: &str) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
            numeric_type: numeric_type.to_string(),
            unit_type: unit_type.to_string(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.is_none_or(|l| value >= l) && self.upper.is_none_or(|u| value <= u)
    }
}

impl HasName for ScheduleTypeLimits {
    fn get_name(&self) -> &str {
        &self.name
    }
}

/// Type limits referenced by the schedules of this crate.
pub fn standard_type_limits() -> Vec<ScheduleTypeLimits> {
    vec![
        ScheduleTypeLimits::new(FRACTION, Some(0.), Some(1.), "Continuous", "Dimensionless"),
        ScheduleTypeLimits::new(TEMPERATURE, Some(-60.), Some(200.), "Continuous", "Temperature"),
        ScheduleTypeLimits::new(ACTIVITY, Some(0.), None, "Continuous", "ActivityLevel"),
        ScheduleTypeLimits::new(CONTROL_TYPE, Some(0.), Some(4.), "Discrete", "Control"),
        ScheduleTypeLimits::new(ON_OFF, Some(0.), Some(1.), "Discrete", "Availability"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleProfile {
    Constant(f64),
    Weekly {
        weekdays: [f64; 24],
        weekends: [f64; 24],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    pub type_limits: String,
    pub profile: ScheduleProfile,
}

impl HasName for Schedule {
    fn get_name(&self) -> &str {
        &self.name
    }
}

impl Schedule {
    pub fn constant(name: &str, type_limits: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            type_limits: type_limits.to_string(),
            profile: ScheduleProfile::Constant(value),
        }
    }

    pub fn weekly(name: &str, type_limits: &str, weekdays: [f64; 24], weekends: [f64; 24]) -> Self {
        Self {
            name: name.to_string(),
            type_limits: type_limits.to_string(),
            profile: ScheduleProfile::Weekly { weekdays, weekends },
        }
    }

    /// Value at an hour of a week starting on Monday 00:00 (0..168).
    pub fn value_at(&self, hour_of_week: usize) -> f64 {
        match &self.profile {
            ScheduleProfile::Constant(v) => *v,
            ScheduleProfile::Weekly { weekdays, weekends } => {
                let h = hour_of_week % 168;
                if h / 24 < 5 {
                    weekdays[h % 24]
                } else {
                    weekends[h % 24]
                }
            }
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match &self.profile {
            ScheduleProfile::Constant(v) => vec![*v],
            ScheduleProfile::Weekly { weekdays, weekends } => {
                weekdays.iter().chain(weekends.iter()).copied().collect()
            }
        }
    }
}

/// Merges equal adjacent hours into `(until_hour, value)` periods.
///
/// `until_hour` runs from 1 to 24 and the last period always ends at 24.
pub fn compact_day(hours: &[f64; 24]) -> Vec<(u8, f64)> {
    let mut periods: Vec<(u8, f64)> = Vec::new();
    for (h, &v) in hours.iter().enumerate() {
        let until = (h + 1) as u8;
        match periods.last_mut() {
            Some((end, last)) if *last == v => *end = until,
            _ => periods.push((until, v)),
        }
    }
    periods
}

fn day(pattern: &[(std::ops::Range<usize>, f64)], default: f64) -> [f64; 24] {
    let mut values = [default; 24];
    for (range, v) in pattern {
        for h in range.clone() {
            values[h] = *v;
        }
    }
    values
}

/// Occupancy fraction profile per usage.
pub fn occupancy_profile(usage: UsageType) -> ([f64; 24], [f64; 24]) {
    match usage {
        UsageType::Residential | UsageType::Corridor => {
            let d = day(&[(7..9, 0.5), (9..17, 0.2), (17..22, 0.8)], 1.0);
            (d, d)
        }
        UsageType::Retail => (
            day(&[(9..21, 0.8), (8..9, 0.2)], 0.0),
            day(&[(10..19, 0.9)], 0.0),
        ),
        UsageType::Storage | UsageType::Mechanical | UsageType::Warehouse => (
            day(&[(7..17, 0.3)], 0.0),
            [0.0; 24],
        ),
        UsageType::Office | UsageType::Lobby => (
            day(&[(7..8, 0.1), (8..12, 0.95), (12..13, 0.5), (13..17, 0.95), (17..18, 0.3), (18..22, 0.1)], 0.0),
            day(&[(8..14, 0.1)], 0.0),
        ),
    }
}

/// Lighting and equipment follow occupancy with a base load.
fn base_loaded(profile: &[f64; 24], base: f64) -> [f64; 24] {
    profile.map(|v| base + (1. - base) * v)
}

pub fn occupancy_schedule_name(usage: UsageType) -> String {
    format!("Occupancy_{}", usage.label())
}

pub fn lighting_schedule_name(usage: UsageType) -> String {
    format!("Lighting_{}", usage.label())
}

pub fn equipment_schedule_name(usage: UsageType) -> String {
    format!("Equipment_{}", usage.label())
}

/// Schedules needed by the given usages, with thermostat schedules for the setpoints.
///
/// The result is sorted by usage order of first appearance, then by kind, so the same
/// input always yields the same list.
pub fn build_schedules(usages: &[UsageType], setpoints: &SetpointSettings) -> Vec<Schedule> {
    let mut schedules = vec![
        Schedule::constant(ALWAYS_ON, ON_OFF, 1.),
        Schedule::constant(ACTIVITY_LEVEL, ACTIVITY, 120.),
        Schedule::constant(THERMOSTAT_CONTROL_TYPE, CONTROL_TYPE, DUAL_SETPOINT_CONTROL),
        Schedule::constant(HEATING_SETPOINT, TEMPERATURE, setpoints.heating_c),
        Schedule::constant(COOLING_SETPOINT, TEMPERATURE, setpoints.cooling_c),
        Schedule::weekly(
            HEATING_SETBACK,
            TEMPERATURE,
            day(&[(6..22, setpoints.heating_c)], setpoints.heating_setback_c),
            day(&[(8..14, setpoints.heating_c)], setpoints.heating_setback_c),
        ),
        Schedule::weekly(
            COOLING_SETBACK,
            TEMPERATURE,
            day(&[(6..22, setpoints.cooling_c)], setpoints.cooling_setback_c),
            day(&[(8..14, setpoints.cooling_c)], setpoints.cooling_setback_c),
        ),
    ];

    let mut seen: Vec<UsageType> = Vec::new();
    for &usage in usages {
        if seen.contains(&usage) {
            continue;
        }
        seen.push(usage);
        let (weekdays, weekends) = occupancy_profile(usage);
        schedules.push(Schedule::weekly(&occupancy_schedule_name(usage), FRACTION, weekdays, weekends));
        schedules.push(Schedule::weekly(
            &lighting_schedule_name(usage),
            FRACTION,
            base_loaded(&weekdays, 0.05),
            base_loaded(&weekends, 0.05),
        ));
        schedules.push(Schedule::weekly(
            &equipment_schedule_name(usage),
            FRACTION,
            base_loaded(&weekdays, 0.2),
            base_loaded(&weekends, 0.2),
        ));
    }
    schedules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_schedule() {
        let s = Schedule::constant("test", FRACTION, 0.5);
        assert_eq!(s.value_at(0), 0.5);
        assert_eq!(s.value_at(5000), 0.5);
    }

    #[test]
    fn test_office_occupancy() {
        let (wd, we) = occupancy_profile(UsageType::Office);
        let s = Schedule::weekly("occ", FRACTION, wd, we);
        // Monday 10am
        assert!((s.value_at(10) - 0.95).abs() < 1e-12);
        // Monday 2am
        assert_eq!(s.value_at(2), 0.0);
        // Saturday 10am
        assert!((s.value_at(5 * 24 + 10) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_compact_day_merges_equal_hours() {
        let d = day(&[(8..18, 1.0)], 0.0);
        assert_eq!(compact_day(&d), vec![(8, 0.0), (18, 1.0), (24, 0.0)]);
        assert_eq!(compact_day(&[0.3; 24]), vec![(24, 0.3)]);
    }

    #[test]
    fn test_schedules_within_type_limits() {
        let limits = standard_type_limits();
        let usages = [UsageType::Office, UsageType::Residential, UsageType::Office];
        let schedules = build_schedules(&usages, &SetpointSettings::default());
        // 7 common + 3 per distinct usage
        assert_eq!(schedules.len(), 13);
        for s in &schedules {
            let l = limits.iter().find(|l| l.name == s.type_limits).unwrap();
            assert!(s.values().iter().all(|v| l.contains(*v)), "{} out of range", s.name);
        }
    }
}
