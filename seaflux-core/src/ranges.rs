//! Allowable input ranges and the policy for values outside them
//!
//! The bulk formula is defined for any finite input, but the solubility
//! parameterisation is only calibrated over a limited range of conditions.
//! [`RangePolicy`] decides what happens to inputs outside those ranges:
//! nothing, a logged warning (the default), or an error.
//!
//! NaN values are never treated as out of range. They mark land or otherwise
//! masked cells and propagate through the calculation instead.

use crate::errors::{SeafluxError, SeafluxResult};
use crate::field::{FloatValue, PhysicalField};
use log::warn;
use serde::{Deserialize, Serialize};

/// Closed interval of physically meaningful input values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: FloatValue,
    pub max: FloatValue,
}

impl ValueRange {
    pub const fn new(min: FloatValue, max: FloatValue) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: FloatValue) -> bool {
        value >= self.min && value <= self.max
    }

    /// Summary of the non-NaN values of `field` outside this range
    pub fn violations(&self, name: &str, field: &PhysicalField) -> Option<RangeViolation> {
        let mut outside = field
            .values()
            .iter()
            .copied()
            .filter(|v| !v.is_nan() && !self.contains(*v));
        let first = outside.next()?;

        Some(RangeViolation {
            name: name.to_string(),
            count: 1 + outside.count(),
            first,
            range: *self,
        })
    }
}

/// Out-of-range values found in a single input
#[derive(Debug, Clone, PartialEq)]
pub struct RangeViolation {
    pub name: String,
    /// Number of offending elements
    pub count: usize,
    /// First offending value in iteration order
    pub first: FloatValue,
    pub range: ValueRange,
}

/// Sea surface temperature (degC)
pub const TEMPERATURE_RANGE: ValueRange = ValueRange::new(-2.0, 45.0);
/// Salinity (PSU)
pub const SALINITY_RANGE: ValueRange = ValueRange::new(5.0, 50.0);
/// Sea and air pCO2 (uatm)
pub const PCO2_RANGE: ValueRange = ValueRange::new(50.0, 1000.0);
/// Atmospheric pressure (hPa)
pub const PRESSURE_RANGE: ValueRange = ValueRange::new(500.0, 1500.0);

/// What to do with finite inputs outside their allowable range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Accept every value without checking
    Ignore,
    /// Log a warning per offending input and continue
    #[default]
    Warn,
    /// Fail with [`SeafluxError::ValueRange`]
    Strict,
}

impl RangePolicy {
    /// Check a named input against its range
    ///
    /// Under [`RangePolicy::Warn`] the violation is logged once and returned.
    pub fn check(
        &self,
        name: &str,
        field: &PhysicalField,
        range: ValueRange,
    ) -> SeafluxResult<Option<RangeViolation>> {
        if *self == RangePolicy::Ignore {
            return Ok(None);
        }
        let Some(violation) = range.violations(name, field) else {
            return Ok(None);
        };

        match self {
            RangePolicy::Strict => Err(SeafluxError::ValueRange {
                name: violation.name,
                value: violation.first,
                min: range.min,
                max: range.max,
            }),
            _ => {
                warn!(
                    "{} value(s) of `{}` outside the allowable range [{}, {}] (first: {})",
                    violation.count, name, range.min, range.max, violation.first
                );
                Ok(Some(violation))
            }
        }
    }
}
