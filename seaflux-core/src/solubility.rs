//! Solubility collaborator interface
//!
//! The flux calculation needs the CO2 solubility coefficient K0 for every
//! element of its inputs. Concrete parameterisations live outside the core
//! and are injected as trait objects.

use crate::errors::SeafluxResult;
use crate::field::FloatValue;
use ndarray::{ArrayD, ArrayViewD};
use std::fmt::Debug;

/// A CO2 solubility parameterisation
///
/// Implementations receive salinity (PSU), temperature (K) and pressure (atm)
/// already broadcast to a common shape and must return K0 with that shape,
/// in mol/L/atm. The flux formula pairs this with the millimole-based molar
/// mass of carbon.
///
/// Implementations are serialisable so that the solubility model can be
/// chosen from configuration.
#[typetag::serde(tag = "model")]
pub trait Solubility: Debug + Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// K0 for each element of the inputs
    fn k0(
        &self,
        salinity: ArrayViewD<'_, FloatValue>,
        temperature_k: ArrayViewD<'_, FloatValue>,
        pressure_atm: ArrayViewD<'_, FloatValue>,
    ) -> SeafluxResult<ArrayD<FloatValue>>;
}
