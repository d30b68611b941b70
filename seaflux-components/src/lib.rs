//! Collaborators for the bulk flux core
//!
//! - [`Weiss1974`]: CO2 solubility after Weiss (1974)
//! - [`EllipsoidGridArea`]: grid cell areas on the WGS84 ellipsoid
//!
//! [`flux_bulk`] wires both into a [`BulkFlux`] model with default settings.
//!
//! ```rust
//! use seaflux_components::flux_bulk;
//! use seaflux_core::PhysicalField;
//!
//! let result = flux_bulk(
//!     &PhysicalField::scalar(15.0, "degC"),
//!     &PhysicalField::scalar(35.0, "PSU"),
//!     &PhysicalField::scalar(400.0, "uatm"),
//!     &PhysicalField::scalar(380.0, "uatm"),
//!     &PhysicalField::scalar(1013.25, "hPa"),
//!     &PhysicalField::scalar(10.0, "cm/hr"),
//! )
//! .unwrap();
//!
//! // Sea pCO2 above air pCO2: the ocean outgasses
//! assert!(result.flux().scalar_value().unwrap() > 0.0);
//! ```

pub mod components;
pub mod settings;

pub use components::{EllipsoidGridArea, Weiss1974, Weiss1974Parameters};
pub use settings::BulkFluxSettings;

use seaflux_core::errors::SeafluxResult;
use seaflux_core::{BulkFlux, FluxResult, PhysicalField};

/// Model using the Weiss (1974) solubility and WGS84 cell areas
pub fn default_model() -> BulkFlux {
    BulkFluxSettings::default().build()
}

/// Bulk air-sea CO2 flux with the default collaborators
///
/// See [`BulkFlux::flux_bulk`] for the inputs and result.
pub fn flux_bulk(
    temp_c: &PhysicalField,
    salt: &PhysicalField,
    pco2_sea_uatm: &PhysicalField,
    pco2_air_uatm: &PhysicalField,
    pres_hpa: &PhysicalField,
    kw_cmhr: &PhysicalField,
) -> SeafluxResult<FluxResult> {
    default_model().flux_bulk(temp_c, salt, pco2_sea_uatm, pco2_air_uatm, pres_hpa, kw_cmhr)
}
