//! Cell areas of a regular latitude/longitude grid
//!
//! Areas are computed from the coordinate values of the field's latitude and
//! longitude dimensions:
//!
//! $$ A_{ij} = |\Delta\phi_i R(\phi_i)| \cdot |\Delta\lambda_j R(\phi_i) \cos\phi_i| $$
//!
//! Where $\Delta\phi$ and $\Delta\lambda$ are the coordinate spacings (radians)
//! estimated with central differences, and $R(\phi)$ is the geocentric radius
//! of the reference ellipsoid (WGS84 unless configured) at latitude $\phi$.

use ndarray::Array2;
use seaflux_core::area::AreaProvider;
use seaflux_core::errors::{SeafluxError, SeafluxResult};
use seaflux_core::field::{FloatValue, GridLabels, PhysicalField, ATTR_DESCRIPTION, ATTR_UNITS};
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis (m)
pub const WGS84_SEMI_MAJOR: FloatValue = 6378137.0;
/// WGS84 semi-minor axis (m)
pub const WGS84_SEMI_MINOR: FloatValue = 6356752.3142;

/// Spacing of coordinate values
///
/// Central differences in the interior, one-sided at the edges.
pub fn gradient(values: &[FloatValue]) -> SeafluxResult<Vec<FloatValue>> {
    let n = values.len();
    if n < 2 {
        return Err(SeafluxError::Error(format!(
            "at least two coordinate values are needed to estimate grid spacing, got {}",
            n
        )));
    }

    Ok((0..n)
        .map(|i| match i {
            0 => values[1] - values[0],
            i if i == n - 1 => values[n - 1] - values[n - 2],
            i => (values[i + 1] - values[i - 1]) / 2.0,
        })
        .collect())
}

/// Cell areas on a reference ellipsoid from latitude/longitude coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipsoidGridArea {
    /// Semi-major axis (m)
    /// default: 6378137.0 (WGS84)
    pub semi_major: FloatValue,
    /// Semi-minor axis (m)
    /// default: 6356752.3142 (WGS84)
    pub semi_minor: FloatValue,
}

impl Default for EllipsoidGridArea {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl EllipsoidGridArea {
    pub fn wgs84() -> Self {
        Self {
            semi_major: WGS84_SEMI_MAJOR,
            semi_minor: WGS84_SEMI_MINOR,
        }
    }

    /// Geocentric radius (m) at a geodetic latitude (degrees)
    pub fn earth_radius(&self, lat_deg: FloatValue) -> FloatValue {
        let a = self.semi_major;
        let b = self.semi_minor;
        let e2 = 1.0 - (b * b) / (a * a);

        let lat_gc = ((1.0 - e2) * lat_deg.to_radians().tan()).atan();
        a * (1.0 - e2).sqrt() / (1.0 - e2 * lat_gc.cos().powi(2)).sqrt()
    }

    /// Cell areas (m^2) with shape `(lat.len(), lon.len())`
    pub fn area_grid(
        &self,
        lat: &[FloatValue],
        lon: &[FloatValue],
    ) -> SeafluxResult<Array2<FloatValue>> {
        let dlat = gradient(lat)?;
        let dlon = gradient(lon)?;

        Ok(Array2::from_shape_fn((lat.len(), lon.len()), |(i, j)| {
            let radius = self.earth_radius(lat[i]);
            let dy = dlat[i].to_radians() * radius;
            let dx = dlon[j].to_radians() * radius * lat[i].to_radians().cos();
            (dy * dx).abs()
        }))
    }
}

#[typetag::serde(name = "EllipsoidGridArea")]
impl AreaProvider for EllipsoidGridArea {
    fn name(&self) -> &str {
        "EllipsoidGridArea"
    }

    fn cell_area(&self, reference: &PhysicalField) -> SeafluxResult<PhysicalField> {
        let labels = reference
            .labels()
            .ok_or_else(|| SeafluxError::Error("field has no grid labels".to_string()))?;
        let (lat_dim, lon_dim) = match (labels.latitude_dim(), labels.longitude_dim()) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(SeafluxError::Error(
                    "field has no latitude and longitude dimensions".to_string(),
                ))
            }
        };
        let lat = labels
            .coord(lat_dim)
            .ok_or_else(|| SeafluxError::MissingCoordinate(lat_dim.to_string()))?;
        let lon = labels
            .coord(lon_dim)
            .ok_or_else(|| SeafluxError::MissingCoordinate(lon_dim.to_string()))?;

        let area = self.area_grid(lat, lon)?;
        let area_labels = GridLabels::new([lat_dim, lon_dim])
            .with_coord(lat_dim, lat.to_vec())
            .with_coord(lon_dim, lon.to_vec());

        Ok(
            PhysicalField::labelled(area.into_dyn(), "m^2", area_labels)?
                .with_attribute(ATTR_UNITS, "m^2")
                .with_attribute(ATTR_DESCRIPTION, "area of each grid cell"),
        )
    }
}
