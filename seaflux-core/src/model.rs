//! The bulk flux entry point
//!
//! [`BulkFlux`] chains unit conversion, the flux algebra and result assembly.
//! Its collaborators are injected when it is built, so the same model can be
//! used for point data (no area provider needed) and for gridded data.

use crate::area::AreaProvider;
use crate::config::FluxConfig;
use crate::errors::SeafluxResult;
use crate::field::PhysicalField;
use crate::flux::{FluxCalculator, FluxInputs};
use crate::ranges::RangePolicy;
use crate::result::{FluxResult, ResultAssembler};
use crate::solubility::Solubility;

/// Bulk air-sea CO2 flux model
#[derive(Debug)]
pub struct BulkFlux {
    calculator: FluxCalculator,
    assembler: ResultAssembler,
    range_policy: RangePolicy,
}

impl BulkFlux {
    /// A model without an area provider
    ///
    /// Fluxes on a latitude/longitude grid fail with
    /// [`SeafluxError::MissingAreaProvider`](crate::errors::SeafluxError::MissingAreaProvider)
    /// until one is added with [`with_area_provider`](Self::with_area_provider).
    pub fn new(solubility: Box<dyn Solubility>) -> Self {
        Self {
            calculator: FluxCalculator::new(solubility),
            assembler: ResultAssembler::new(),
            range_policy: RangePolicy::default(),
        }
    }

    pub fn with_area_provider(mut self, provider: Box<dyn AreaProvider>) -> Self {
        self.assembler.replace_area_provider(provider);
        self
    }

    /// Apply a configuration
    ///
    /// Keeps any area provider already set.
    pub fn with_config(mut self, config: &FluxConfig) -> Self {
        self.range_policy = config.range_policy;
        self.assembler = self.assembler.days_per_year(config.days_per_year);
        self
    }

    pub fn range_policy(&self) -> RangePolicy {
        self.range_policy
    }

    pub fn calculator(&self) -> &FluxCalculator {
        &self.calculator
    }

    pub fn assembler(&self) -> &ResultAssembler {
        &self.assembler
    }

    /// Calculate bulk air-sea CO2 flux
    ///
    /// # Arguments
    ///
    /// * `temp_c` - Sea surface temperature (degC), allowable range [-2, 45]
    /// * `salt` - Salinity (PSU), allowable range [5, 50]
    /// * `pco2_sea_uatm` - Partial pressure of CO2 in the sea (uatm), allowable range [50, 1000]
    /// * `pco2_air_uatm` - Partial pressure of CO2 in the air (uatm), allowable range [50, 1000]
    /// * `pres_hpa` - Atmospheric pressure (hPa), allowable range [500, 1500]
    /// * `kw_cmhr` - Gas transfer velocity (cm/hr)
    ///
    /// # Returns
    ///
    /// Sea-air flux in gC/m2/day, positive out of the ocean. Inputs on a
    /// latitude/longitude grid give a composite result with cell areas and
    /// the integrated annual flux.
    pub fn flux_bulk(
        &self,
        temp_c: &PhysicalField,
        salt: &PhysicalField,
        pco2_sea_uatm: &PhysicalField,
        pco2_air_uatm: &PhysicalField,
        pres_hpa: &PhysicalField,
        kw_cmhr: &PhysicalField,
    ) -> SeafluxResult<FluxResult> {
        self.calculate(&FluxInputs::new(
            temp_c.clone(),
            salt.clone(),
            pco2_sea_uatm.clone(),
            pco2_air_uatm.clone(),
            pres_hpa.clone(),
            kw_cmhr.clone(),
        ))
    }

    pub fn calculate(&self, inputs: &FluxInputs) -> SeafluxResult<FluxResult> {
        inputs.check_ranges(self.range_policy)?;
        let flux = self.calculator.calculate(inputs)?;
        self.assembler.assemble(flux)
    }
}
