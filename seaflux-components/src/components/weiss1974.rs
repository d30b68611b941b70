//! CO2 solubility after Weiss (1974)
//!
//! Computes the solubility coefficient K0 (mol/L/atm) of CO2 in seawater:
//!
//! $$ \ln K_0 = A_1 + A_2 \frac{100}{T} + A_3 \ln\frac{T}{100} + S \left(B_1 + B_2 \frac{T}{100} + B_3 \left(\frac{T}{100}\right)^2\right) $$
//!
//! Where $T$ is temperature (K) and $S$ is salinity (PSU).
//!
//! An optional total-pressure correction scales K0 by
//! $\exp((1 - P) \bar{v} / (R T))$ with $P$ in atm.
//!
//! Weiss, R. F. (1974). Carbon dioxide in water and seawater: the solubility
//! of a non-ideal gas. Marine Chemistry, 2(3), 203-215.

use ndarray::{ArrayD, ArrayViewD, Zip};
use seaflux_core::errors::SeafluxResult;
use seaflux_core::field::FloatValue;
use seaflux_core::solubility::Solubility;
use serde::{Deserialize, Serialize};

/// Partial molar volume of CO2 in seawater (cm^3/mol)
pub const PARTIAL_MOLAR_VOLUME_CO2: FloatValue = 32.3;

/// Gas constant (cm^3 atm / (mol K))
pub const GAS_CONSTANT: FloatValue = 82.05736;

/// Coefficients of the Weiss (1974) solubility fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weiss1974Parameters {
    /// default: -58.0931
    pub a1: FloatValue,
    /// default: 90.5069
    pub a2: FloatValue,
    /// default: 22.2940
    pub a3: FloatValue,
    /// default: 0.027766
    pub b1: FloatValue,
    /// default: -0.025888
    pub b2: FloatValue,
    /// default: 0.0050578
    pub b3: FloatValue,
    /// Apply the total-pressure correction
    /// default: false
    pub pressure_correction: bool,
}

impl Default for Weiss1974Parameters {
    /// Coefficients for K0 in mol/L/atm (Weiss 1974, Table I)
    fn default() -> Self {
        Self {
            a1: -58.0931,
            a2: 90.5069,
            a3: 22.2940,
            b1: 0.027766,
            b2: -0.025888,
            b3: 0.0050578,
            pressure_correction: false,
        }
    }
}

/// Weiss (1974) CO2 solubility
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weiss1974 {
    #[serde(default)]
    parameters: Weiss1974Parameters,
}

impl Weiss1974 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(parameters: Weiss1974Parameters) -> Self {
        Self { parameters }
    }

    /// Same coefficients with the total-pressure correction applied
    pub fn with_pressure_correction() -> Self {
        Self::from_parameters(Weiss1974Parameters {
            pressure_correction: true,
            ..Weiss1974Parameters::default()
        })
    }

    pub fn parameters(&self) -> &Weiss1974Parameters {
        &self.parameters
    }

    /// K0 (mol/L/atm) for a single element
    ///
    /// * `salinity` - PSU
    /// * `temperature_k` - K
    /// * `pressure_atm` - atm, only used with the pressure correction
    pub fn calculate_k0(
        &self,
        salinity: FloatValue,
        temperature_k: FloatValue,
        pressure_atm: FloatValue,
    ) -> FloatValue {
        let p = &self.parameters;
        let t100 = temperature_k / 100.0;
        let ln_k0 = p.a1
            + p.a2 * (100.0 / temperature_k)
            + p.a3 * t100.ln()
            + salinity * (p.b1 + p.b2 * t100 + p.b3 * t100 * t100);

        if p.pressure_correction {
            (ln_k0
                + (1.0 - pressure_atm) * PARTIAL_MOLAR_VOLUME_CO2 / (GAS_CONSTANT * temperature_k))
                .exp()
        } else {
            ln_k0.exp()
        }
    }
}

#[typetag::serde(name = "Weiss1974")]
impl Solubility for Weiss1974 {
    fn name(&self) -> &str {
        "Weiss1974"
    }

    fn k0(
        &self,
        salinity: ArrayViewD<'_, FloatValue>,
        temperature_k: ArrayViewD<'_, FloatValue>,
        pressure_atm: ArrayViewD<'_, FloatValue>,
    ) -> SeafluxResult<ArrayD<FloatValue>> {
        Ok(Zip::from(salinity)
            .and(temperature_k)
            .and(pressure_atm)
            .map_collect(|&s, &t, &p| self.calculate_k0(s, t, p)))
    }
}
