//! Test definitions: reporting units, conversion factors, and biological limits.
//!
//! A `TestDefinition` is the contract supplied by the test definition
//! registry. Values convert between units by pivoting through the primary
//! unit, so converting A -> B -> A round-trips within floating-point
//! tolerance for any pair of listed units.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An alternative reporting unit for a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeUnit {
    /// Unit symbol (e.g., "mg/dL").
    pub unit: String,
    /// Multiplier converting a value in this unit to the primary unit.
    pub factor: f64,
    /// Decimal places used when reporting values in this unit.
    pub precision: u8,
}

/// Per-unit limit bands, from widest to narrowest concern:
/// absolute (compatible with life), physiological (plausible for a living
/// patient), critical and panic (laboratory alarm thresholds).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitLimits {
    pub absolute_min: Option<f64>,
    pub absolute_max: Option<f64>,
    pub physiological_min: Option<f64>,
    pub physiological_max: Option<f64>,
    pub critical_low: Option<f64>,
    pub critical_high: Option<f64>,
    pub panic_low: Option<f64>,
    pub panic_high: Option<f64>,
}

/// Outcome of checking a value against the biological limits for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCheck {
    /// Inside the physiological band.
    Physiological,
    /// Outside the physiological band but inside the absolute band.
    Absolute,
    /// Outside every defined band.
    Outside,
    /// The definition carries no limits at all.
    NoLimits,
    /// No limits are defined for the requested unit.
    NoUnitLimits,
}

impl RangeCheck {
    /// A value is plausible when it lands in the physiological or absolute band.
    pub fn is_in_range(self) -> bool {
        matches!(self, RangeCheck::Physiological | RangeCheck::Absolute)
    }
}

/// Definition of a single laboratory test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDefinition {
    pub test_id: String,
    pub name: String,
    /// Canonical unit; limits and correlation formulas assume this unit.
    pub primary_unit: String,
    pub primary_precision: u8,
    #[serde(default)]
    pub alternative_units: Vec<AlternativeUnit>,
    /// Limit bands keyed by unit symbol.
    #[serde(default)]
    pub limits: BTreeMap<String, UnitLimits>,
}

impl TestDefinition {
    /// Multiplier converting a value in `unit` to the primary unit.
    /// Returns `None` when the unit is not listed for this test.
    pub fn factor_to_primary(&self, unit: &str) -> Option<f64> {
        if unit == self.primary_unit {
            return Some(1.0);
        }
        self.alternative_units
            .iter()
            .find(|alt| alt.unit == unit)
            .map(|alt| alt.factor)
    }

    /// Convert `value` from one listed unit to another, pivoting through the
    /// primary unit. Returns `None` when either unit is unknown; a missing
    /// conversion path is "no suggestion", not an error.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Option<f64> {
        let from_factor = self.factor_to_primary(from)?;
        let to_factor = self.factor_to_primary(to)?;
        Some(value * from_factor / to_factor)
    }

    /// Ratio of unit scales between `from` and `to` (how much a raw number
    /// grows or shrinks under the conversion). Used to flag implausibly
    /// large conversions.
    pub fn conversion_ratio(&self, from: &str, to: &str) -> Option<f64> {
        let from_factor = self.factor_to_primary(from)?;
        let to_factor = self.factor_to_primary(to)?;
        Some(from_factor / to_factor)
    }

    /// Every unit this definition can report in, primary first.
    pub fn units(&self) -> Vec<&str> {
        let mut units = vec![self.primary_unit.as_str()];
        units.extend(self.alternative_units.iter().map(|alt| alt.unit.as_str()));
        units
    }

    /// Reporting precision for a unit, falling back to the primary precision.
    pub fn precision_for(&self, unit: &str) -> u8 {
        if unit == self.primary_unit {
            return self.primary_precision;
        }
        self.alternative_units
            .iter()
            .find(|alt| alt.unit == unit)
            .map(|alt| alt.precision)
            .unwrap_or(self.primary_precision)
    }

    /// Round a value to the reporting precision of the given unit.
    pub fn round_for(&self, value: f64, unit: &str) -> f64 {
        let scale = 10f64.powi(i32::from(self.precision_for(unit)));
        (value * scale).round() / scale
    }

    pub fn unit_limits(&self, unit: &str) -> Option<&UnitLimits> {
        self.limits.get(unit)
    }

    /// Check a value against the biological limits for `unit`, trying the
    /// physiological band before the absolute band.
    pub fn range_check(&self, value: f64, unit: &str) -> RangeCheck {
        if self.limits.is_empty() {
            return RangeCheck::NoLimits;
        }
        let Some(limits) = self.limits.get(unit) else {
            return RangeCheck::NoUnitLimits;
        };
        if within(value, limits.physiological_min, limits.physiological_max) {
            return RangeCheck::Physiological;
        }
        if within(value, limits.absolute_min, limits.absolute_max) {
            return RangeCheck::Absolute;
        }
        RangeCheck::Outside
    }

    /// True when the value sits at or beyond the critical thresholds.
    pub fn beyond_critical(&self, value: f64, unit: &str) -> bool {
        let Some(limits) = self.limits.get(unit) else {
            return false;
        };
        beyond(value, limits.critical_low, limits.critical_high)
    }

    /// True when the value sits at or beyond the panic thresholds.
    pub fn beyond_panic(&self, value: f64, unit: &str) -> bool {
        let Some(limits) = self.limits.get(unit) else {
            return false;
        };
        beyond(value, limits.panic_low, limits.panic_high)
    }
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    // A band with neither bound defined is treated as absent.
    if min.is_none() && max.is_none() {
        return false;
    }
    if let Some(min) = min
        && value < min
    {
        return false;
    }
    if let Some(max) = max
        && value > max
    {
        return false;
    }
    true
}

fn beyond(value: f64, low: Option<f64>, high: Option<f64>) -> bool {
    if let Some(low) = low
        && value <= low
    {
        return true;
    }
    if let Some(high) = high
        && value >= high
    {
        return true;
    }
    false
}
