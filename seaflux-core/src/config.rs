//! Configuration shared by every flux calculation
//!
//! ```rust
//! use seaflux_core::config::FluxConfig;
//! use seaflux_core::ranges::RangePolicy;
//!
//! let config = FluxConfig::from_toml_str(r#"range_policy = "strict""#).unwrap();
//! assert_eq!(config.range_policy, RangePolicy::Strict);
//! assert_eq!(config.days_per_year, 365.0);
//! ```

use crate::errors::{SeafluxError, SeafluxResult};
use crate::field::FloatValue;
use crate::ranges::RangePolicy;
use crate::result::DAYS_PER_YEAR;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FluxConfig {
    /// Handling of inputs outside their documented range
    /// default: warn
    pub range_policy: RangePolicy,
    /// Days used to scale the daily flux to an annual total
    /// default: 365
    pub days_per_year: FloatValue,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::default(),
            days_per_year: DAYS_PER_YEAR,
        }
    }
}

impl FluxConfig {
    pub fn from_toml_str(content: &str) -> SeafluxResult<Self> {
        let config: FluxConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> SeafluxResult<String> {
        toml::to_string(self).map_err(|e| SeafluxError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> SeafluxResult<()> {
        if !(self.days_per_year.is_finite() && self.days_per_year > 0.0) {
            return Err(SeafluxError::InvalidConfig(format!(
                "days_per_year must be positive, got {}",
                self.days_per_year
            )));
        }
        Ok(())
    }
}
