//! Grid-area collaborator interface

use crate::errors::SeafluxResult;
use crate::field::PhysicalField;
use std::fmt::Debug;

/// Provides the surface area of each cell of a labelled field
///
/// The returned field must be labelled with (a subset of) the reference
/// field's dimension names so that it can be aligned with it. Units are
/// expected to be m^2.
#[typetag::serde(tag = "provider")]
pub trait AreaProvider: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Cell areas for the grid that `reference` is defined on
    fn cell_area(&self, reference: &PhysicalField) -> SeafluxResult<PhysicalField>;
}
