//! Sizing hints for coils, fans and terminals.
//!
//! The values are estimates handed to the engine instead of autosize directives. They
//! are clamped so the rated flow per rated capacity stays inside the range the engine
//! accepts for DX coils; the clamps are tuning values from [`SizingSettings`].

use crate::config::{GeneratorSettings, SizingSettings};
use crate::geom::zone::Zone;
use tracing::debug;

/// Density of air at sea level (kg/m^3).
pub const AIR_DENSITY: f64 = 1.2;
/// Specific heat of air (J/(kg*K)).
pub const AIR_SPECIFIC_HEAT: f64 = 1006.;

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSizing {
    pub zone: String,
    /// W
    pub cooling_capacity: f64,
    /// W
    pub heating_capacity: f64,
    /// m^3/s
    pub supply_flow: f64,
    pub min_flow_fraction: f64,
    /// m^3/s
    pub outdoor_air: f64,
}

/// Totals of the zones served by one air loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopSizing {
    pub cooling_capacity: f64,
    pub heating_capacity: f64,
    pub supply_flow: f64,
    pub outdoor_air: f64,
}

/// Design cooling capacity with the area-scaled and absolute floors applied.
pub fn design_capacity(zone: &Zone, cooling_load_w: f64, settings: &SizingSettings) -> f64 {
    cooling_load_w
        .max(settings.min_capacity_w_per_m2 * zone.area())
        .max(settings.min_capacity_w)
}

/// Supply air flow for a zone with the given design cooling load (m^3/s).
///
/// The flow follows the load and the supply temperature difference, while the rated
/// capacity carries the floors of [`design_capacity`]. Flow per capacity is then
/// clamped to `[min_flow_per_watt, max_flow_per_watt]`, which raises the flow of zones
/// whose capacity was floored and caps it for fully loaded ones.
pub fn compute_airflow_sizing(zone: &Zone, cooling_load_w: f64, settings: &SizingSettings) -> f64 {
    let capacity = design_capacity(zone, cooling_load_w, settings);
    let flow = cooling_load_w.max(0.) / (AIR_DENSITY * AIR_SPECIFIC_HEAT * settings.supply_delta_t_k);
    let ratio = flow / capacity;
    let clamped = ratio.clamp(settings.min_flow_per_watt, settings.max_flow_per_watt);
    if clamped != ratio {
        debug!(
            zone = %zone.name,
            ratio,
            clamped,
            "clamped flow per capacity"
        );
    }
    clamped * capacity
}

/// Minimum flow fraction of a VAV terminal.
pub fn min_flow_fraction(settings: &SizingSettings) -> f64 {
    settings
        .vav_min_flow_fraction
        .min(settings.max_vav_min_flow_fraction)
        .max(0.)
}

pub fn size_zone(zone: &Zone, settings: &GeneratorSettings) -> ZoneSizing {
    let sizing = &settings.sizing;
    let load = zone.area() * sizing.cooling_load_density(zone.usage);
    let supply_flow = compute_airflow_sizing(zone, load, sizing);
    ZoneSizing {
        zone: zone.name.clone(),
        cooling_capacity: design_capacity(zone, load, sizing),
        heating_capacity: (zone.area() * sizing.heating_load_w_per_m2).max(sizing.min_capacity_w),
        supply_flow,
        min_flow_fraction: min_flow_fraction(sizing),
        outdoor_air: (zone.area() * settings.hvac.outdoor_air_per_area_m3s_m2).min(supply_flow),
    }
}

pub fn size_loop(zones: &[ZoneSizing]) -> LoopSizing {
    zones.iter().fold(LoopSizing::default(), |acc, z| LoopSizing {
        cooling_capacity: acc.cooling_capacity + z.cooling_capacity,
        heating_capacity: acc.heating_capacity + z.heating_capacity,
        supply_flow: acc.supply_flow + z.supply_flow,
        outdoor_air: acc.outdoor_air + z.outdoor_air,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Polygon;
    use crate::geom::zone::UsageType;

    fn zone(area: f64, usage: UsageType) -> Zone {
        let side = area.sqrt();
        let fp = Polygon::from_xy(&[(0., 0.), (side, 0.), (side, side), (0., side)], 0.);
        Zone::new("Z", 0, usage, fp, 3., area)
    }

    #[test]
    fn test_flow_per_capacity_within_bounds() {
        let settings = SizingSettings::default();
        for area in [1., 10., 100., 1000.] {
            for usage in [UsageType::Office, UsageType::Storage, UsageType::Retail] {
                let z = zone(area, usage);
                let load = area * settings.cooling_load_density(usage);
                let flow = compute_airflow_sizing(&z, load, &settings);
                let ratio = flow / design_capacity(&z, load, &settings);
                assert!(ratio >= settings.min_flow_per_watt - 1e-15);
                assert!(ratio <= settings.max_flow_per_watt + 1e-15);
            }
        }
    }

    #[test]
    fn test_flow_follows_load_between_bounds() {
        let settings = SizingSettings::default();
        let per_watt = |area: f64, load: f64| {
            let z = zone(area, UsageType::Office);
            compute_airflow_sizing(&z, load, &settings) / design_capacity(&z, load, &settings)
        };
        // Capacity floored far above the load
        assert!((per_watt(2., 10.) - settings.min_flow_per_watt).abs() < 1e-15);
        // Fully loaded zone at the default temperature difference
        assert!((per_watt(100., 8000.) - settings.max_flow_per_watt).abs() < 1e-15);
        // Load at 60% of the area floor stays unclamped
        let expected = 0.6 / (AIR_DENSITY * AIR_SPECIFIC_HEAT * settings.supply_delta_t_k);
        assert!((per_watt(100., 1500.) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_capacity_floors() {
        let settings = SizingSettings::default();
        // Tiny zone: absolute floor
        assert_eq!(design_capacity(&zone(2., UsageType::Storage), 10., &settings), 1000.);
        // Large lightly loaded zone: area-scaled floor
        let z = zone(1000., UsageType::Warehouse);
        assert_eq!(design_capacity(&z, 100., &settings), 25_000.);
    }

    #[test]
    fn test_min_flow_fraction_ceiling() {
        let mut settings = SizingSettings::default();
        settings.vav_min_flow_fraction = 0.8;
        assert_eq!(min_flow_fraction(&settings), settings.max_vav_min_flow_fraction);
    }

    #[test]
    fn test_loop_totals() {
        let settings = GeneratorSettings::default();
        let a = size_zone(&zone(100., UsageType::Office), &settings);
        let b = size_zone(&zone(50., UsageType::Corridor), &settings);
        let total = size_loop(&[a.clone(), b.clone()]);
        assert!((total.supply_flow - a.supply_flow - b.supply_flow).abs() < 1e-12);
        assert!(total.outdoor_air <= total.supply_flow);
        assert!((a.outdoor_air - 0.03).abs() < 1e-12);
    }
}
