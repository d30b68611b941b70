//! Unit normalisation for the bulk flux formula
//!
//! Observational inputs arrive in the units they are usually reported in
//! (degC, hPa, µatm, cm/hr). The flux formula works in K, atm and m/day.
//! [`UnitConverter`] performs those conversions element-wise, preserving the
//! shape and grid labels of each field.
//!
//! | Quantity | From | To | Operation |
//! |----------|------|----|-----------|
//! | Pressure | hPa | atm | `/ 1013.25` |
//! | Temperature | degC | K | `+ 273.15` |
//! | pCO2 | uatm | atm | `* 1e-6` |
//! | Transfer velocity | cm/hr | m/day | `* 24 / 100` |

use crate::field::{FloatValue, PhysicalField};

/// Standard atmosphere (hPa)
pub const HPA_PER_ATM: FloatValue = 1013.25;

/// Offset between Celsius and Kelvin
pub const KELVIN_OFFSET: FloatValue = 273.15;

pub const ATM_PER_UATM: FloatValue = 1e-6;

/// cm/hr to m/day: 24 hr/day and 1/100 m/cm
pub const CMHR_TO_MDAY: FloatValue = 24.0 / 100.0;

/// Molar mass of carbon (g/mol)
pub const MOLAR_MASS_CARBON: FloatValue = 12.0108;

/// Molar mass of carbon on a millimole basis.
///
/// Paired with a solubility in mol/L/atm this yields grams of carbon directly:
/// $$ (m\,day^{-1}) (mmol\,m^{-3}\,atm^{-1}) (atm) (gC\,mmol^{-1}) = gC\,m^{-2}\,day^{-1} $$
pub const MOLAR_MASS_CARBON_MMOL: FloatValue = MOLAR_MASS_CARBON * 1000.0;

/// Element-wise unit conversions used by the flux calculation
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitConverter;

impl UnitConverter {
    pub fn hpa_to_atm(&self, pres_hpa: &PhysicalField) -> PhysicalField {
        pres_hpa.map("atm", |p| p / HPA_PER_ATM)
    }

    pub fn celsius_to_kelvin(&self, temp_c: &PhysicalField) -> PhysicalField {
        temp_c.map("K", |t| t + KELVIN_OFFSET)
    }

    pub fn uatm_to_atm(&self, pco2_uatm: &PhysicalField) -> PhysicalField {
        pco2_uatm.map("atm", |p| p * ATM_PER_UATM)
    }

    pub fn cmhr_to_mday(&self, kw_cmhr: &PhysicalField) -> PhysicalField {
        kw_cmhr.map("m/day", |k| k * CMHR_TO_MDAY)
    }

    pub fn molar_mass_carbon(&self) -> FloatValue {
        MOLAR_MASS_CARBON_MMOL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GridLabels;
    use is_close::is_close;
    use ndarray::array;

    #[test]
    fn test_standard_pressure_is_one_atm() {
        let atm = UnitConverter.hpa_to_atm(&PhysicalField::scalar(1013.25, "hPa"));
        assert_eq!(atm.scalar_value(), Some(1.0));
        assert_eq!(atm.unit(), "atm");
    }

    #[test]
    fn test_celsius_to_kelvin() {
        let temp_c = PhysicalField::from_vec(vec![-2.0, 0.0, 15.0], "degC");
        let kelvin = UnitConverter.celsius_to_kelvin(&temp_c);
        let expected = [271.15, 273.15, 288.15];
        assert!(kelvin
            .values()
            .iter()
            .zip(expected)
            .all(|(v, e)| is_close!(*v, e)));
    }

    #[test]
    fn test_uatm_to_atm() {
        let atm = UnitConverter.uatm_to_atm(&PhysicalField::scalar(400.0, "uatm"));
        assert!(is_close!(atm.scalar_value().unwrap(), 4.0e-4));
    }

    #[test]
    fn test_cmhr_to_mday() {
        let kw = UnitConverter.cmhr_to_mday(&PhysicalField::scalar(10.0, "cm/hr"));
        assert!(is_close!(kw.scalar_value().unwrap(), 2.4));
        assert_eq!(kw.unit(), "m/day");
    }

    #[test]
    fn test_conversions_preserve_shape_and_labels() {
        let labels = GridLabels::new(["lat", "lon"]);
        let pres = array![[1000.0, 1013.25], [990.0, f64::NAN]].into_dyn();
        let field = PhysicalField::labelled(pres, "hPa", labels).unwrap();
        let atm = UnitConverter.hpa_to_atm(&field);

        assert_eq!(atm.shape(), field.shape());
        assert_eq!(atm.labels(), field.labels());
        assert!(atm.values()[[1, 1]].is_nan());
    }

    #[test]
    fn test_molar_mass_is_mmol_based() {
        assert!(is_close!(UnitConverter.molar_mass_carbon(), 12010.8));
    }
}
