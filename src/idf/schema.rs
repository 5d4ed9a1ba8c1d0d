//! Target engine schema: pinned versions, field counts per object class and the
//! accepted literals of closed enumerations.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUPPORTED_VERSIONS: &[&str] = &["23.1", "23.2"];

/// Field count of an extensible object with no practical upper bound.
const EXTENSIBLE: usize = usize::MAX;

/// Maximum number of vertices of a detailed surface.
pub const MAX_SURFACE_VERTICES: usize = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "23.1")]
    V23_1,
    #[default]
    #[serde(rename = "23.2")]
    V23_2,
}

impl SchemaVersion {
    /// Parses an exact `major.minor` version. Patch suffixes are not accepted: the
    /// declared version must match the engine build exactly.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "23.1" => Ok(Self::V23_1),
            "23.2" => Ok(Self::V23_2),
            _ => Err(ValidationError::UnsupportedSchemaVersion {
                version: s.to_string(),
                supported: SUPPORTED_VERSIONS,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V23_1 => "23.1",
            Self::V23_2 => "23.2",
        }
    }

    /// Accepted (min, max) field count of an object class.
    pub fn field_limits(&self, class: &str) -> Option<(usize, usize)> {
        let table = match self {
            Self::V23_1 | Self::V23_2 => FIELD_LIMITS_23,
        };
        table
            .iter()
            .find(|(c, _, _)| *c == class)
            .map(|&(_, min, max)| (min, max))
    }

    pub fn check_field_count(&self, class: &str, count: usize) -> Result<(), ValidationError> {
        let (min, max) = self.field_limits(class).ok_or_else(|| ValidationError::InvalidFieldValue {
            object: class.to_string(),
            field: "class".to_string(),
            value: class.to_string(),
            reason: format!("object class is not part of schema {}", self.as_str()),
        })?;
        if count < min || count > max {
            return Err(ValidationError::FieldCount {
                class: class.to_string(),
                version: self.as_str().to_string(),
                count,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Accepted literals of a closed enumeration.
    pub fn literals(&self, set: LiteralSet) -> &'static [&'static str] {
        match self {
            Self::V23_1 | Self::V23_2 => set.literals_23(),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralSet {
    EconomizerControlType,
    EconomizerControlAction,
    LockoutType,
    MinimumLimitType,
    FuelType,
    MinimumFlowInputMethod,
    DamperHeatingAction,
    FanPlacement,
    IdealLoadsLimit,
    Dehumidification,
    Humidification,
    SetpointControlVariable,
    Roughness,
    NumericType,
    UnitType,
    SurfaceType,
    OutsideBoundaryCondition,
}

impl LiteralSet {
    fn literals_23(&self) -> &'static [&'static str] {
        match self {
            Self::EconomizerControlType => &[
                "NoEconomizer",
                "FixedDryBulb",
                "FixedEnthalpy",
                "DifferentialDryBulb",
                "DifferentialEnthalpy",
                "FixedDewPointAndDryBulb",
                "ElectronicEnthalpy",
                "DifferentialDryBulbAndEnthalpy",
            ],
            Self::EconomizerControlAction => &["ModulateFlow", "MinimumFlowWithBypass"],
            Self::LockoutType => &["NoLockout", "LockoutWithHeating", "LockoutWithCompressor"],
            Self::MinimumLimitType => &["FixedMinimum", "ProportionalMinimum"],
            Self::FuelType => &[
                "NaturalGas",
                "Propane",
                "FuelOilNo1",
                "FuelOilNo2",
                "Diesel",
                "Gasoline",
                "Coal",
                "OtherFuel1",
                "OtherFuel2",
            ],
            Self::MinimumFlowInputMethod => &["Constant", "FixedFlowRate", "Scheduled"],
            Self::DamperHeatingAction => &["Normal", "Reverse", "ReverseWithLimits"],
            Self::FanPlacement => &["BlowThrough", "DrawThrough"],
            Self::IdealLoadsLimit => &["NoLimit", "LimitFlowRate", "LimitCapacity", "LimitFlowRateAndCapacity"],
            Self::Dehumidification => &["ConstantSensibleHeatRatio", "Humidistat", "None", "ConstantSupplyHumidityRatio"],
            Self::Humidification => &["None", "Humidistat", "ConstantSupplyHumidityRatio"],
            Self::SetpointControlVariable => &["Temperature", "MinimumTemperature", "MaximumTemperature"],
            Self::Roughness => crate::envelope::ROUGHNESS,
            Self::NumericType => &["Continuous", "Discrete"],
            Self::UnitType => &[
                "Dimensionless",
                "Temperature",
                "DeltaTemperature",
                "PrecipitationRate",
                "Angle",
                "ConvectionCoefficient",
                "ActivityLevel",
                "Velocity",
                "Capacity",
                "Power",
                "Availability",
                "Percent",
                "Control",
                "Mode",
            ],
            Self::SurfaceType => &["Floor", "Wall", "Ceiling", "Roof"],
            Self::OutsideBoundaryCondition => &[
                "Adiabatic",
                "Surface",
                "Zone",
                "Outdoors",
                "Foundation",
                "Ground",
                "OtherSideCoefficients",
                "OtherSideConditionsModel",
            ],
        }
    }
}

const FIELD_LIMITS_23: &[(&str, usize, usize)] = &[
    ("Version", 1, 1),
    ("SimulationControl", 7, 7),
    ("Building", 8, 8),
    ("GlobalGeometryRules", 3, 5),
    ("Timestep", 1, 1),
    ("Site:Location", 5, 5),
    ("RunPeriod", 7, 15),
    ("Material", 6, 9),
    ("Construction", 2, 11),
    ("Zone", 1, 13),
    ("BuildingSurface:Detailed", 11 + 3 * 3, 11 + 3 * MAX_SURFACE_VERTICES),
    ("ScheduleTypeLimits", 1, 5),
    ("Schedule:Constant", 3, 3),
    ("Schedule:Compact", 5, EXTENSIBLE),
    ("People", 10, 25),
    ("Lights", 11, 13),
    ("ElectricEquipment", 10, 11),
    ("ZoneInfiltration:DesignFlowRate", 12, 13),
    ("ZoneControl:Thermostat", 5, 13),
    ("ThermostatSetpoint:DualSetpoint", 3, 3),
    ("ZoneHVAC:EquipmentConnections", 6, 6),
    ("ZoneHVAC:EquipmentList", 8, EXTENSIBLE),
    ("ZoneHVAC:AirDistributionUnit", 4, 7),
    ("AirTerminal:SingleDuct:VAV:Reheat", 16, 19),
    ("AirTerminal:SingleDuct:ConstantVolume:NoReheat", 5, 7),
    ("Coil:Heating:Electric", 6, 7),
    ("Coil:Heating:Fuel", 7, 11),
    ("Coil:Cooling:DX:SingleSpeed", 15, 37),
    ("CoilSystem:Cooling:DX", 7, 13),
    ("Fan:ConstantVolume", 9, 10),
    ("Fan:VariableVolume", 17, 18),
    ("Controller:OutdoorAir", 16, 27),
    ("AirLoopHVAC:ControllerList", 3, 17),
    ("AirLoopHVAC:OutdoorAirSystem:EquipmentList", 3, 17),
    ("AirLoopHVAC:OutdoorAirSystem", 3, 4),
    ("OutdoorAir:Mixer", 5, 5),
    ("OutdoorAir:NodeList", 1, EXTENSIBLE),
    ("Branch", 6, EXTENSIBLE),
    ("BranchList", 2, EXTENSIBLE),
    ("AirLoopHVAC", 10, 11),
    ("AirLoopHVAC:SupplyPath", 4, EXTENSIBLE),
    ("AirLoopHVAC:ReturnPath", 4, EXTENSIBLE),
    ("AirLoopHVAC:ZoneSplitter", 3, EXTENSIBLE),
    ("AirLoopHVAC:ZoneMixer", 3, EXTENSIBLE),
    ("SetpointManager:OutdoorAirReset", 7, 12),
    ("SetpointManager:MixedAir", 6, 9),
    ("SetpointManager:Scheduled", 4, 4),
    ("ZoneHVAC:PackagedTerminalAirConditioner", 20, 27),
    ("ZoneHVAC:IdealLoadsAirSystem", 27, 28),
    ("Curve:Biquadratic", 11, 15),
    ("Curve:Quadratic", 6, 9),
    ("Output:Meter", 2, 2),
];
