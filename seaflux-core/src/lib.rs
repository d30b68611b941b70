//! Bulk air-sea CO2 flux calculations
//!
//! Computes $F_{CO_2} = k_w \cdot K_0 \cdot \Delta pCO_2$ over point data,
//! plain arrays or labelled latitude/longitude grids. Solubility and grid
//! area are supplied by collaborators implementing [`solubility::Solubility`]
//! and [`area::AreaProvider`].

pub mod area;
pub mod config;
pub mod field;
pub mod flux;
pub mod model;
pub mod ranges;
pub mod result;
pub mod solubility;
pub mod units;

pub mod errors;

pub use field::{FloatValue, GridLabels, PhysicalField};
pub use model::BulkFlux;
pub use result::{FluxDataset, FluxResult};
