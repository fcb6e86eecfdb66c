//! Project-level configuration the core depends on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Plane the 2D sketch lives in. The remaining axis is the layer depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SketchPlane {
    #[default]
    XY,
    YZ,
    ZX,
}

impl SketchPlane {
    /// Index (0 = x, 1 = y, 2 = z) of the depth coordinate.
    pub fn depth_axis(self) -> usize {
        match self {
            SketchPlane::XY => 2,
            SketchPlane::YZ => 0,
            SketchPlane::ZX => 1,
        }
    }
}

impl fmt::Display for SketchPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SketchPlane::XY => "XY",
            SketchPlane::YZ => "YZ",
            SketchPlane::ZX => "ZX",
        };
        f.write_str(s)
    }
}

/// Length unit of the sketch coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitSystem {
    Meters,
    Centimeters,
    Millimeters,
    /// `10^exponent` metres.
    Scientific(f64),
}

impl UnitSystem {
    /// Parse the persisted unit strings. Unknown units and unparseable
    /// exponents resolve to metres.
    pub fn parse(unit: &str, exponent: &str) -> Self {
        match unit.trim() {
            "m" => UnitSystem::Meters,
            "cm" => UnitSystem::Centimeters,
            "mm" => UnitSystem::Millimeters,
            "scientific" => match exponent.trim().parse::<f64>() {
                Ok(e) if e.is_finite() => UnitSystem::Scientific(e),
                _ => {
                    tracing::debug!(exponent, "unparseable unit exponent, using scale 1.0");
                    UnitSystem::Meters
                }
            },
            other => {
                tracing::debug!(unit = other, "unknown unit system, using scale 1.0");
                UnitSystem::Meters
            }
        }
    }

    /// Multiplier written to the `scale` entry.
    pub fn scale(self) -> f64 {
        match self {
            UnitSystem::Meters => 1.0,
            UnitSystem::Centimeters => 0.01,
            UnitSystem::Millimeters => 0.001,
            UnitSystem::Scientific(e) => {
                let s = if e.fract() == 0.0 && e.abs() <= f64::from(i32::MAX) {
                    10f64.powi(e as i32)
                } else {
                    10f64.powf(e)
                };
                if s.is_finite() && s > 0.0 { s } else { 1.0 }
            }
        }
    }
}

/// Persisted project settings. Unit fields stay as strings so that
/// whatever the user typed survives a save/load cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSpecs {
    pub sketch_plane: SketchPlane,
    pub unit_system: String,
    pub unit_sci_exponent: String,
}

impl ProjectSpecs {
    pub fn units(&self) -> UnitSystem {
        UnitSystem::parse(&self.unit_system, &self.unit_sci_exponent)
    }

    pub fn scale_value(&self) -> f64 {
        self.units().scale()
    }

    pub fn with_units(mut self, unit: impl Into<String>, exponent: impl Into<String>) -> Self {
        self.unit_system = unit.into();
        self.unit_sci_exponent = exponent.into();
        self
    }

    pub fn with_sketch_plane(mut self, plane: SketchPlane) -> Self {
        self.sketch_plane = plane;
        self
    }
}

impl Default for ProjectSpecs {
    fn default() -> Self {
        Self {
            sketch_plane: SketchPlane::XY,
            unit_system: "m".to_string(),
            unit_sci_exponent: "0".to_string(),
        }
    }
}
