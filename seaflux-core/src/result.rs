//! Shaping of the flux into the value returned to callers
//!
//! A flux computed from point data or plain arrays is returned as-is. A flux
//! defined on a latitude/longitude grid is bundled with the cell areas and
//! the area-integrated annual flux:
//!
//! | Field | Content | Units |
//! |-------|---------|-------|
//! | `fgco2` | flux per unit area | gC/m2/day |
//! | `area` | cell area from the [`AreaProvider`] | m^2 |
//! | `fgco2_global` | $\sum_{lat,lon} fgco2 \cdot area \cdot 365$ | gC/Yr |
//!
//! The annual total assumes each cell's daily rate holds for the whole year.

use crate::area::AreaProvider;
use crate::errors::{SeafluxError, SeafluxResult};
use crate::field::{FloatValue, PhysicalField, ATTR_DESCRIPTION, ATTR_UNITS};
use crate::flux::FLUX_UNIT;
use log::debug;
use serde::{Deserialize, Serialize};

pub const FGCO2: &str = "fgco2";
pub const AREA: &str = "area";
pub const FGCO2_GLOBAL: &str = "fgco2_global";

/// Unit of the area-integrated annual flux
pub const GLOBAL_FLUX_UNIT: &str = "gC/Yr";

/// Days used to scale a daily flux to an annual total
pub const DAYS_PER_YEAR: FloatValue = 365.0;

const FGCO2_DESCRIPTION: &str = "Air sea CO2 fluxes calculated using the bulk formulation.";
const FGCO2_GLOBAL_DESCRIPTION: &str = "integrated fluxes fgco2 * area";

/// Flux bundled with cell areas and the integrated annual flux
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxDataset {
    pub fgco2: PhysicalField,
    pub area: PhysicalField,
    pub fgco2_global: PhysicalField,
}

impl FluxDataset {
    pub fn get(&self, name: &str) -> Option<&PhysicalField> {
        match name {
            FGCO2 => Some(&self.fgco2),
            AREA => Some(&self.area),
            FGCO2_GLOBAL => Some(&self.fgco2_global),
            _ => None,
        }
    }

    /// All fields with their names
    pub fn fields(&self) -> [(&'static str, &PhysicalField); 3] {
        [
            (FGCO2, &self.fgco2),
            (AREA, &self.area),
            (FGCO2_GLOBAL, &self.fgco2_global),
        ]
    }
}

/// Result of a flux calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FluxResult {
    /// Flux without spatial context
    Plain(PhysicalField),
    /// Flux on a latitude/longitude grid with areas and the integrated flux
    Composite(FluxDataset),
}

impl FluxResult {
    /// The flux field, regardless of variant
    pub fn flux(&self) -> &PhysicalField {
        match self {
            FluxResult::Plain(flux) => flux,
            FluxResult::Composite(dataset) => &dataset.fgco2,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, FluxResult::Composite(_))
    }

    pub fn as_composite(&self) -> Option<&FluxDataset> {
        match self {
            FluxResult::Composite(dataset) => Some(dataset),
            FluxResult::Plain(_) => None,
        }
    }

    pub fn into_plain(self) -> Option<PhysicalField> {
        match self {
            FluxResult::Plain(flux) => Some(flux),
            FluxResult::Composite(_) => None,
        }
    }
}

/// Chooses the result variant and builds the composite result
///
/// The area provider is optional: it is only needed for fluxes on a
/// latitude/longitude grid.
#[derive(Debug)]
pub struct ResultAssembler {
    area_provider: Option<Box<dyn AreaProvider>>,
    days_per_year: FloatValue,
}

impl Default for ResultAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAssembler {
    /// An assembler that can only return plain results
    pub fn new() -> Self {
        Self {
            area_provider: None,
            days_per_year: DAYS_PER_YEAR,
        }
    }

    pub fn with_area_provider(provider: Box<dyn AreaProvider>) -> Self {
        Self {
            area_provider: Some(provider),
            ..Self::new()
        }
    }

    pub fn days_per_year(mut self, days: FloatValue) -> Self {
        self.days_per_year = days;
        self
    }

    /// Set the area provider, keeping the other settings
    pub fn replace_area_provider(&mut self, provider: Box<dyn AreaProvider>) {
        self.area_provider = Some(provider);
    }

    pub fn area_provider(&self) -> Option<&dyn AreaProvider> {
        self.area_provider.as_deref()
    }

    pub fn assemble(&self, flux: PhysicalField) -> SeafluxResult<FluxResult> {
        let labels = match flux.labels() {
            Some(labels) if labels.is_spatial() => labels.clone(),
            _ => {
                debug!("Flux has no spatial labels, returning plain result");
                return Ok(FluxResult::Plain(flux));
            }
        };
        let provider = self
            .area_provider
            .as_ref()
            .ok_or(SeafluxError::MissingAreaProvider)?;

        let area = provider.cell_area(&flux)?;
        let area_values = area.align_to(AREA, &labels, flux.shape())?;

        let annual = (flux.values() * &area_values) * self.days_per_year;
        let fgco2_global = PhysicalField::labelled(annual, GLOBAL_FLUX_UNIT, labels)?
            .sum_spatial(GLOBAL_FLUX_UNIT)?
            .with_attribute(ATTR_UNITS, GLOBAL_FLUX_UNIT)
            .with_attribute(ATTR_DESCRIPTION, FGCO2_GLOBAL_DESCRIPTION);

        debug!(
            "Assembled composite flux result using {} areas, global flux shape {:?}",
            provider.name(),
            fgco2_global.shape()
        );

        Ok(FluxResult::Composite(FluxDataset {
            fgco2: flux
                .with_attribute(ATTR_UNITS, FLUX_UNIT)
                .with_attribute(ATTR_DESCRIPTION, FGCO2_DESCRIPTION),
            area,
            fgco2_global,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GridLabels;
    use is_close::is_close;
    use ndarray::{array, Array3};

    /// Every cell has the same area
    #[derive(Debug, Serialize, Deserialize)]
    struct UniformArea(FloatValue);

    #[typetag::serde]
    impl AreaProvider for UniformArea {
        fn name(&self) -> &str {
            "uniform"
        }

        fn cell_area(&self, reference: &PhysicalField) -> SeafluxResult<PhysicalField> {
            let labels = reference
                .labels()
                .cloned()
                .unwrap_or_else(|| GridLabels::new(["lat", "lon"]));
            PhysicalField::labelled(reference.values().mapv(|_| self.0), "m^2", labels)
        }
    }

    /// Areas laid out as (lon, lat) with distinct values per cell
    #[derive(Debug, Serialize, Deserialize)]
    struct TransposedArea;

    #[typetag::serde]
    impl AreaProvider for TransposedArea {
        fn name(&self) -> &str {
            "transposed"
        }

        fn cell_area(&self, _reference: &PhysicalField) -> SeafluxResult<PhysicalField> {
            PhysicalField::labelled(
                array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]].into_dyn(),
                "m^2",
                GridLabels::new(["lon", "lat"]),
            )
        }
    }

    fn gridded_flux() -> PhysicalField {
        // (time, lat, lon) = (2, 2, 3)
        let values = Array3::from_shape_fn((2, 2, 3), |(t, i, j)| {
            (t + 1) as FloatValue * (i * 3 + j) as FloatValue
        });
        let labels = GridLabels::new(["time", "lat", "lon"])
            .with_coord("time", vec![0.0, 31.0])
            .with_coord("lat", vec![-0.5, 0.5])
            .with_coord("lon", vec![0.5, 1.5, 2.5]);
        PhysicalField::labelled(values.into_dyn(), FLUX_UNIT, labels).unwrap()
    }

    #[test]
    fn test_plain_flux_is_returned_unchanged() {
        let flux = PhysicalField::from_vec(vec![0.1, -0.2], FLUX_UNIT);
        let result = ResultAssembler::new().assemble(flux.clone()).unwrap();

        assert!(!result.is_composite());
        assert_eq!(result.into_plain(), Some(flux));
    }

    #[test]
    fn test_non_spatial_labels_give_plain_result() {
        let labels = GridLabels::new(["time"]);
        let flux = PhysicalField::labelled(array![0.1, 0.2].into_dyn(), FLUX_UNIT, labels).unwrap();
        let result = ResultAssembler::new().assemble(flux).unwrap();
        assert!(matches!(result, FluxResult::Plain(_)));
    }

    #[test]
    fn test_spatial_flux_without_provider_fails() {
        let result = ResultAssembler::new().assemble(gridded_flux());
        assert!(matches!(result, Err(SeafluxError::MissingAreaProvider)));
    }

    #[test]
    fn test_composite_fields_and_attributes() {
        let assembler = ResultAssembler::with_area_provider(Box::new(UniformArea(2.0)));
        let result = assembler.assemble(gridded_flux()).unwrap();
        let dataset = result.as_composite().unwrap();

        assert_eq!(dataset.fgco2.attribute(ATTR_UNITS), Some("gC/m2/day"));
        assert_eq!(dataset.fgco2.attribute(ATTR_DESCRIPTION), Some(FGCO2_DESCRIPTION));
        assert_eq!(dataset.fgco2_global.attribute(ATTR_UNITS), Some("gC/Yr"));
        assert_eq!(dataset.area.unit(), "m^2");
        assert_eq!(result.flux().values(), gridded_flux().values());
        assert_eq!(
            dataset.fields().map(|(name, _)| name),
            [FGCO2, AREA, FGCO2_GLOBAL]
        );
    }

    #[test]
    fn test_global_flux_sums_over_space_per_time() {
        let assembler = ResultAssembler::with_area_provider(Box::new(UniformArea(2.0)));
        let result = assembler.assemble(gridded_flux()).unwrap();
        let global = &result.as_composite().unwrap().fgco2_global;

        // Cell values 0..=5 sum to 15, doubled for the second time step
        assert_eq!(global.shape(), &[2]);
        assert!(is_close!(global.values()[[0]], 15.0 * 2.0 * 365.0));
        assert!(is_close!(global.values()[[1]], 30.0 * 2.0 * 365.0));
        assert_eq!(global.labels().unwrap().coord("time"), Some(&[0.0, 31.0][..]));
    }

    #[test]
    fn test_global_flux_aligns_area_by_name() {
        let assembler = ResultAssembler::with_area_provider(Box::new(TransposedArea));
        let result = assembler.assemble(gridded_flux()).unwrap();
        let dataset = result.as_composite().unwrap();

        let flux = dataset.fgco2.values();
        let expected: FloatValue = (0..2)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .map(|(i, j)| flux[[0, i, j]] * dataset.area.values()[[j, i]] * 365.0)
            .sum();
        assert!(is_close!(dataset.fgco2_global.values()[[0]], expected));
    }

    #[test]
    fn test_global_flux_skips_masked_cells() {
        let mut flux = gridded_flux();
        let mut values = flux.values().clone();
        values[[0, 1, 2]] = FloatValue::NAN;
        flux = PhysicalField::labelled(values, FLUX_UNIT, flux.labels().cloned().unwrap()).unwrap();

        let assembler = ResultAssembler::with_area_provider(Box::new(UniformArea(1.0)));
        let result = assembler.assemble(flux).unwrap();
        let global = &result.as_composite().unwrap().fgco2_global;

        // Cell value 5 is masked in the first time step
        assert!(is_close!(global.values()[[0]], 10.0 * 365.0));
    }

    #[test]
    fn test_days_per_year_is_configurable() {
        let assembler =
            ResultAssembler::with_area_provider(Box::new(UniformArea(1.0))).days_per_year(366.0);
        let result = assembler.assemble(gridded_flux()).unwrap();
        let global = &result.as_composite().unwrap().fgco2_global;
        assert!(is_close!(global.values()[[0]], 15.0 * 366.0));
    }

    #[test]
    fn test_result_serialises_with_kind_tag() {
        let result = FluxResult::Plain(PhysicalField::scalar(0.5, FLUX_UNIT));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "plain");
    }
}
