//! Bulk air-sea CO2 flux
//!
//! Evaluates the bulk formulation element-wise:
//!
//! $$ F_{CO_2} = k_w \cdot K_0 \cdot (pCO_2^{sea} - pCO_2^{air}) \cdot M_C $$
//!
//! Where:
//! - $k_w$ is the gas transfer velocity (m/day)
//! - $K_0$ is the CO2 solubility coefficient from the injected [`Solubility`] model
//! - $pCO_2$ are partial pressures (atm)
//! - $M_C$ is the molar mass of carbon on a millimole basis (g/mmol)
//!
//! The result is in gC m^-2 day^-1. Positive values are outgassing (ocean to
//! atmosphere), negative values are uptake by the ocean.
//!
//! Each output element only depends on the matching input elements. NaN and
//! infinite inputs propagate to the affected elements without failing the
//! whole calculation.

use crate::errors::{SeafluxError, SeafluxResult};
use crate::field::{CommonGrid, FloatValue, PhysicalField};
use crate::ranges::{
    RangePolicy, RangeViolation, PCO2_RANGE, PRESSURE_RANGE, SALINITY_RANGE, TEMPERATURE_RANGE,
};
use crate::solubility::Solubility;
use crate::units::UnitConverter;
use log::debug;
use ndarray::Zip;

/// Unit of the computed flux
pub const FLUX_UNIT: &str = "gC/m2/day";

/// Observed inputs to the bulk flux, in their reporting units
#[derive(Debug, Clone, PartialEq)]
pub struct FluxInputs {
    /// Sea surface temperature (degC)
    pub temp_c: PhysicalField,
    /// Sea surface salinity (PSU)
    pub salt: PhysicalField,
    /// Partial pressure of CO2 in the surface ocean (uatm)
    pub pco2_sea_uatm: PhysicalField,
    /// Partial pressure of CO2 in the overlying air (uatm)
    pub pco2_air_uatm: PhysicalField,
    /// Atmospheric pressure at sea level (hPa)
    pub pres_hpa: PhysicalField,
    /// Gas transfer velocity (cm/hr)
    pub kw_cmhr: PhysicalField,
}

impl FluxInputs {
    pub fn new(
        temp_c: PhysicalField,
        salt: PhysicalField,
        pco2_sea_uatm: PhysicalField,
        pco2_air_uatm: PhysicalField,
        pres_hpa: PhysicalField,
        kw_cmhr: PhysicalField,
    ) -> Self {
        Self {
            temp_c,
            salt,
            pco2_sea_uatm,
            pco2_air_uatm,
            pres_hpa,
            kw_cmhr,
        }
    }

    /// Inputs paired with the names used in error messages
    pub fn named(&self) -> [(&'static str, &PhysicalField); 6] {
        [
            ("temp_C", &self.temp_c),
            ("salt", &self.salt),
            ("pCO2_sea_uatm", &self.pco2_sea_uatm),
            ("pCO2_air_uatm", &self.pco2_air_uatm),
            ("pres_hPa", &self.pres_hpa),
            ("kw_cmhr", &self.kw_cmhr),
        ]
    }

    /// Check the inputs with a documented range against `policy`
    ///
    /// Returns one entry per input with values outside its range. Only
    /// [`RangePolicy::Warn`] reports entries; `Strict` fails on the first.
    pub fn check_ranges(&self, policy: RangePolicy) -> SeafluxResult<Vec<RangeViolation>> {
        let checks = [
            ("temp_C", &self.temp_c, TEMPERATURE_RANGE),
            ("salt", &self.salt, SALINITY_RANGE),
            ("pCO2_sea_uatm", &self.pco2_sea_uatm, PCO2_RANGE),
            ("pCO2_air_uatm", &self.pco2_air_uatm, PCO2_RANGE),
            ("pres_hPa", &self.pres_hpa, PRESSURE_RANGE),
        ];

        let mut violations = Vec::new();
        for (name, field, range) in checks {
            if let Some(violation) = policy.check(name, field, range)? {
                violations.push(violation);
            }
        }
        Ok(violations)
    }
}

/// Bulk flux for a single element, with inputs already in formula units
///
/// * `kw` - gas transfer velocity (m/day)
/// * `k0` - solubility (mol/L/atm)
/// * `delta_pco2` - sea minus air partial pressure (atm)
/// * `molar_mass` - molar mass of carbon (g/mmol)
pub fn bulk_flux(
    kw: FloatValue,
    k0: FloatValue,
    delta_pco2: FloatValue,
    molar_mass: FloatValue,
) -> FloatValue {
    kw * k0 * delta_pco2 * molar_mass
}

/// Evaluates the bulk flux over broadcast-compatible fields
#[derive(Debug)]
pub struct FluxCalculator {
    solubility: Box<dyn Solubility>,
    converter: UnitConverter,
}

impl FluxCalculator {
    pub fn new(solubility: Box<dyn Solubility>) -> Self {
        Self {
            solubility,
            converter: UnitConverter,
        }
    }

    pub fn solubility(&self) -> &dyn Solubility {
        self.solubility.as_ref()
    }

    /// Flux in gC m^-2 day^-1 with the broadcast shape of the inputs
    ///
    /// The result carries the grid labels of the labelled inputs, if any.
    pub fn calculate(&self, inputs: &FluxInputs) -> SeafluxResult<PhysicalField> {
        let grid = CommonGrid::resolve(&inputs.named())?;
        let shape = grid.shape.as_slice();

        let pres_atm = self.converter.hpa_to_atm(&inputs.pres_hpa);
        let temp_k = self.converter.celsius_to_kelvin(&inputs.temp_c);
        let pco2_sea = self.converter.uatm_to_atm(&inputs.pco2_sea_uatm);
        let pco2_air = self.converter.uatm_to_atm(&inputs.pco2_air_uatm);
        let kw = self.converter.cmhr_to_mday(&inputs.kw_cmhr);
        let molar_mass = self.converter.molar_mass_carbon();

        let k0 = self.solubility.k0(
            inputs.salt.broadcast_to("salt", shape)?,
            temp_k.broadcast_to("temp_C", shape)?,
            pres_atm.broadcast_to("pres_hPa", shape)?,
        )?;
        if k0.shape() != shape {
            return Err(SeafluxError::ShapeMismatch {
                name: format!("K0 ({})", self.solubility.name()),
                expected: shape.to_vec(),
                found: k0.shape().to_vec(),
            });
        }

        let flux = Zip::from(kw.broadcast_to("kw_cmhr", shape)?)
            .and(&k0)
            .and(pco2_sea.broadcast_to("pCO2_sea_uatm", shape)?)
            .and(pco2_air.broadcast_to("pCO2_air_uatm", shape)?)
            .map_collect(|&kw, &k0, &sea, &air| bulk_flux(kw, k0, sea - air, molar_mass));

        debug!(
            "Computed bulk flux over shape {:?} using {} solubility",
            shape,
            self.solubility.name()
        );

        Ok(PhysicalField::from_parts(flux, FLUX_UNIT, grid.labels))
    }
}
