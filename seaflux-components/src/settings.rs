//! Model settings loaded from TOML
//!
//! Selects the collaborators by name and carries the shared [`FluxConfig`]:
//!
//! ```toml
//! [flux]
//! range_policy = "strict"
//!
//! [solubility]
//! model = "Weiss1974"
//!
//! [solubility.parameters]
//! pressure_correction = true
//!
//! [area]
//! provider = "EllipsoidGridArea"
//! ```
//!
//! Every table is optional. Missing tables fall back to the Weiss (1974)
//! solubility, WGS84 cell areas and the default [`FluxConfig`].

use crate::components::{EllipsoidGridArea, Weiss1974};
use log::debug;
use seaflux_core::area::AreaProvider;
use seaflux_core::config::FluxConfig;
use seaflux_core::errors::{SeafluxError, SeafluxResult};
use seaflux_core::solubility::Solubility;
use seaflux_core::BulkFlux;
use serde::{Deserialize, Serialize};

fn default_solubility() -> Box<dyn Solubility> {
    Box::new(Weiss1974::new())
}

fn default_area() -> Option<Box<dyn AreaProvider>> {
    Some(Box::new(EllipsoidGridArea::default()))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkFluxSettings {
    #[serde(default)]
    pub flux: FluxConfig,
    #[serde(default = "default_solubility")]
    pub solubility: Box<dyn Solubility>,
    /// Absent only when explicitly disabled in code
    #[serde(default = "default_area")]
    pub area: Option<Box<dyn AreaProvider>>,
}

impl Default for BulkFluxSettings {
    fn default() -> Self {
        Self {
            flux: FluxConfig::default(),
            solubility: default_solubility(),
            area: default_area(),
        }
    }
}

impl BulkFluxSettings {
    pub fn from_toml_str(content: &str) -> SeafluxResult<Self> {
        let settings: BulkFluxSettings = toml::from_str(content)?;
        settings.flux.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> SeafluxResult<String> {
        toml::to_string(self).map_err(|e| SeafluxError::InvalidConfig(e.to_string()))
    }

    /// Build the model described by these settings
    pub fn build(self) -> BulkFlux {
        debug!(
            "Building bulk flux model with {} solubility and {} areas",
            self.solubility.name(),
            self.area.as_ref().map_or("no", |a| a.name())
        );
        let model = BulkFlux::new(self.solubility);
        let model = match self.area {
            Some(provider) => model.with_area_provider(provider),
            None => model,
        };
        model.with_config(&self.flux)
    }
}
