//! Opaque materials and layered constructions per construction era.

use crate::HasName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Surface roughness literals accepted by `Material`.
pub const ROUGHNESS: &[&str] = &[
    "VeryRough",
    "Rough",
    "MediumRough",
    "MediumSmooth",
    "Smooth",
    "VerySmooth",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionEra {
    Pre1980,
    From1980To2004,
    #[default]
    Post2004,
}

impl ConstructionEra {
    pub fn from_year(year: i32) -> Self {
        match year {
            ..=1979 => Self::Pre1980,
            1980..=2004 => Self::From1980To2004,
            _ => Self::Post2004,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre1980 => "pre_1980",
            Self::From1980To2004 => "1980_2004",
            Self::Post2004 => "post_2004",
        }
    }

    /// Insulation thickness of (walls, roof) in m.
    fn insulation(&self) -> (f64, f64) {
        match self {
            Self::Pre1980 => (0.025, 0.05),
            Self::From1980To2004 => (0.05, 0.10),
            Self::Post2004 => (0.09, 0.17),
        }
    }
}

impl fmt::Display for ConstructionEra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstructionEra {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(Self::from_year)
            .map_err(|_| format!("expected a construction year, got '{s}'"))
    }
}

/// Homogeneous opaque layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub roughness: String,
    /// m
    pub thickness: f64,
    /// W/(m*K)
    pub conductivity: f64,
    /// kg/m^3
    pub density: f64,
    /// J/(kg*K)
    pub specific_heat: f64,
    pub thermal_absorptance: f64,
    pub solar_absorptance: f64,
    pub visible_absorptance: f64,
}

impl Material {
    pub fn new(
        name: &str,
        roughness: &str,
        thickness: f64,
        conductivity: f64,
        density: f64,
        specific_heat: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            roughness: roughness.to_string(),
            thickness,
            conductivity,
            density,
            specific_heat,
            thermal_absorptance: 0.9,
            solar_absorptance: 0.7,
            visible_absorptance: 0.7,
        }
    }

    /// Thermal resistance in m^2*K/W.
    pub fn resistance(&self) -> f64 {
        if self.conductivity > 0.0 {
            self.thickness / self.conductivity
        } else {
            0.0
        }
    }
}

impl HasName for Material {
    fn get_name(&self) -> &str {
        &self.name
    }
}

/// Construction defined by material layers (outside to inside).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    pub name: String,
    pub layers: Vec<String>,
    /// External surface resistance in m^2*K/W.
    pub r_se: f64,
    /// Internal surface resistance in m^2*K/W.
    pub r_si: f64,
}

impl HasName for Construction {
    fn get_name(&self) -> &str {
        &self.name
    }
}

impl Construction {
    pub fn wall(name: &str, layers: &[&str]) -> Self {
        Self::with_resistances(name, layers, 0.04, 0.13)
    }

    /// Downward heat flow on the inside.
    pub fn floor(name: &str, layers: &[&str]) -> Self {
        Self::with_resistances(name, layers, 0.04, 0.17)
    }

    /// Upward heat flow on the inside.
    pub fn roof(name: &str, layers: &[&str]) -> Self {
        Self::with_resistances(name, layers, 0.04, 0.10)
    }

    fn with_resistances(name: &str, layers: &[&str], r_se: f64, r_si: f64) -> Self {
        Self {
            name: name.to_string(),
            layers: layers.iter().map(|l| l.to_string()).collect(),
            r_se,
            r_si,
        }
    }

    /// The same layers seen from the other side.
    pub fn mirrored(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            layers: self.layers.iter().rev().cloned().collect(),
            r_se: self.r_si,
            r_si: self.r_se,
        }
    }

    /// Total thermal resistance including surface resistances, or None if a layer
    /// is not in `materials`.
    pub fn total_resistance(&self, materials: &[Material]) -> Option<f64> {
        let mut r = self.r_se + self.r_si;
        for layer in &self.layers {
            r += materials.iter().find(|m| &m.name == layer)?.resistance();
        }
        Some(r)
    }

    /// U-value in W/(m^2*K).
    pub fn u_value(&self, materials: &[Material]) -> Option<f64> {
        let r = self.total_resistance(materials)?;
        Some(if r > 0.0 { 1.0 / r } else { 0.0 })
    }
}

/// Materials, constructions and the construction name used for each kind of surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionSet {
    pub era: ConstructionEra,
    pub materials: Vec<Material>,
    pub constructions: Vec<Construction>,
    pub exterior_wall: String,
    pub roof: String,
    pub ground_floor: String,
    pub interior_wall: String,
    pub interior_floor: String,
    pub interior_ceiling: String,
}

impl ConstructionSet {
    pub fn for_era(era: ConstructionEra) -> Self {
        let (wall_ins, roof_ins) = era.insulation();
        let materials = vec![
            Material::new("Brick", "MediumRough", 0.1, 0.89, 1920., 790.),
            Material::new("Concrete200", "MediumRough", 0.2, 1.31, 2240., 836.),
            Material::new("Concrete100", "MediumRough", 0.1, 1.31, 2240., 836.),
            Material::new("WallInsulation", "MediumRough", wall_ins, 0.043, 91., 837.),
            Material::new("RoofInsulation", "MediumRough", roof_ins, 0.049, 265., 836.),
            Material::new("RoofMembrane", "VeryRough", 0.0095, 0.16, 1121., 1460.),
            Material::new("Gypsum", "Smooth", 0.0127, 0.16, 784., 830.),
            Material::new("Carpet", "Smooth", 0.0127, 0.06, 288., 1380.),
        ];
        let floor = Construction::floor("InteriorFloor", &["Carpet", "Concrete100"]);
        let ceiling = floor.mirrored("InteriorCeiling");
        let constructions = vec![
            Construction::wall("ExteriorWall", &["Brick", "WallInsulation", "Concrete200", "Gypsum"]),
            Construction::roof("Roof", &["RoofMembrane", "RoofInsulation", "Concrete100"]),
            Construction::floor("GroundFloor", &["Concrete200", "Carpet"]),
            Construction::wall("InteriorWall", &["Gypsum", "Gypsum"]),
            floor,
            ceiling,
        ];
        Self {
            era,
            materials,
            constructions,
            exterior_wall: "ExteriorWall".to_string(),
            roof: "Roof".to_string(),
            ground_floor: "GroundFloor".to_string(),
            interior_wall: "InteriorWall".to_string(),
            interior_floor: "InteriorFloor".to_string(),
            interior_ceiling: "InteriorCeiling".to_string(),
        }
    }

    pub fn construction(&self, name: &str) -> Option<&Construction> {
        self.constructions.iter().find(|c| c.name == name)
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn u_value(&self, construction: &str) -> Option<f64> {
        self.construction(construction)?.u_value(&self.materials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era_from_year() {
        assert_eq!(ConstructionEra::from_year(1965), ConstructionEra::Pre1980);
        assert_eq!(ConstructionEra::from_year(1980), ConstructionEra::From1980To2004);
        assert_eq!(ConstructionEra::from_year(2004), ConstructionEra::From1980To2004);
        assert_eq!(ConstructionEra::from_year(2005), ConstructionEra::Post2004);
        assert_eq!("1995".parse::<ConstructionEra>(), Ok(ConstructionEra::From1980To2004));
    }

    #[test]
    fn test_material_resistance() {
        let m = Material::new("Concrete", "Rough", 0.2, 1.4, 2300., 880.);
        assert!((m.resistance() - 0.142857).abs() < 1e-6);
    }

    #[test]
    fn test_newer_eras_insulate_better() {
        let old = ConstructionSet::for_era(ConstructionEra::Pre1980);
        let new = ConstructionSet::for_era(ConstructionEra::Post2004);
        let u_old = old.u_value("ExteriorWall").unwrap();
        let u_new = new.u_value("ExteriorWall").unwrap();
        assert!(u_new < u_old, "{u_new} should be below {u_old}");
        assert!(u_new > 0.1 && u_old < 2.0);
        assert!(new.u_value("Roof").unwrap() < old.u_value("Roof").unwrap());
    }

    #[test]
    fn test_all_layers_exist() {
        let set = ConstructionSet::for_era(ConstructionEra::default());
        for c in &set.constructions {
            assert!(c.u_value(&set.materials).is_some(), "{} has unknown layers", c.name);
        }
        for m in &set.materials {
            assert!(ROUGHNESS.contains(&m.roughness.as_str()));
        }
    }

    #[test]
    fn test_mirrored_interior_ceiling() {
        let set = ConstructionSet::for_era(ConstructionEra::default());
        let floor = set.construction("InteriorFloor").unwrap();
        let ceiling = set.construction("InteriorCeiling").unwrap();
        assert_eq!(floor.layers.first(), ceiling.layers.last());
        let (uf, uc) = (set.u_value("InteriorFloor").unwrap(), set.u_value("InteriorCeiling").unwrap());
        assert!((uf - uc).abs() < 1e-12);
    }
}
