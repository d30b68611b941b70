//! Bulk air-sea CO2 flux
//!
//! Re-exports the calculation core and its default collaborators. With the
//! `python` feature enabled the crate also builds the `seaflux._lib` Python
//! extension module.

pub use seaflux_components::{
    default_model, flux_bulk, BulkFluxSettings, EllipsoidGridArea, Weiss1974,
};
pub use seaflux_core::errors::{SeafluxError, SeafluxResult};
pub use seaflux_core::{BulkFlux, FloatValue, FluxDataset, FluxResult, GridLabels, PhysicalField};

#[cfg(feature = "python")]
pub mod python;
