//! Numeric fields carrying a unit and optional grid labels
//!
//! A [`PhysicalField`] is the value type passed through every stage of the flux
//! calculation. It wraps an N-dimensional array (0-d for a scalar) together with:
//!
//! - a unit string (e.g. `"degC"`, `"uatm"`, `"gC/m2/day"`),
//! - free-form string attributes (`units`, `description`, ...),
//! - optional [`GridLabels`] naming each axis and carrying coordinate values.
//!
//! Fields with both a latitude and a longitude dimension are "spatial". Only
//! those are assembled into a composite result with an area-integrated flux.
//!
//! # Examples
//!
//! ```rust
//! use ndarray::Array2;
//! use seaflux_core::field::{GridLabels, PhysicalField};
//!
//! let labels = GridLabels::new(["lat", "lon"])
//!     .with_coord("lat", vec![-0.5, 0.5])
//!     .with_coord("lon", vec![0.5, 1.5, 2.5]);
//! let sst = PhysicalField::labelled(Array2::from_elem((2, 3), 15.0).into_dyn(), "degC", labels)
//!     .unwrap();
//!
//! assert!(sst.has_spatial_labels());
//! assert_eq!(sst.shape(), &[2, 3]);
//! ```

use crate::errors::{SeafluxError, SeafluxResult};
use ndarray::{Array, ArrayD, ArrayViewD, Axis, Dimension, IxDyn};
use num::Float;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type FloatValue = f64;

/// Dimension names recognised as latitude
pub const LATITUDE_NAMES: [&str; 2] = ["lat", "latitude"];
/// Dimension names recognised as longitude
pub const LONGITUDE_NAMES: [&str; 2] = ["lon", "longitude"];

/// Attribute key used for the unit annotation of assembled fields
pub const ATTR_UNITS: &str = "units";
/// Attribute key used for human-readable descriptions
pub const ATTR_DESCRIPTION: &str = "description";

/// Names and coordinates for the axes of a labelled field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLabels {
    dims: Vec<String>,
    #[serde(default)]
    coords: BTreeMap<String, Vec<FloatValue>>,
}

impl GridLabels {
    pub fn new<S: Into<String>>(dims: impl IntoIterator<Item = S>) -> Self {
        Self {
            dims: dims.into_iter().map(Into::into).collect(),
            coords: BTreeMap::new(),
        }
    }

    /// Attach coordinate values to a dimension
    pub fn with_coord(mut self, dim: &str, values: Vec<FloatValue>) -> Self {
        self.coords.insert(dim.to_string(), values);
        self
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn coord(&self, dim: &str) -> Option<&[FloatValue]> {
        self.coords.get(dim).map(Vec::as_slice)
    }

    /// Position of a named dimension
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn latitude_dim(&self) -> Option<&str> {
        self.find_dim(&LATITUDE_NAMES)
    }

    pub fn longitude_dim(&self) -> Option<&str> {
        self.find_dim(&LONGITUDE_NAMES)
    }

    /// Whether the labels describe a latitude/longitude grid
    pub fn is_spatial(&self) -> bool {
        self.latitude_dim().is_some() && self.longitude_dim().is_some()
    }

    /// Axes holding the latitude and longitude dimensions, in ascending order
    pub fn spatial_axes(&self) -> Vec<usize> {
        let mut axes: Vec<usize> = [self.latitude_dim(), self.longitude_dim()]
            .into_iter()
            .flatten()
            .filter_map(|d| self.axis_of(d))
            .collect();
        axes.sort_unstable();
        axes
    }

    /// Labels with the given axes (and their coordinates) removed
    pub fn without_axes(&self, axes: &[usize]) -> GridLabels {
        let dims: Vec<String> = self
            .dims
            .iter()
            .enumerate()
            .filter(|(i, _)| !axes.contains(i))
            .map(|(_, d)| d.clone())
            .collect();
        let coords = self
            .coords
            .iter()
            .filter(|(k, _)| dims.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        GridLabels { dims, coords }
    }

    /// Combine two labellings of the same grid
    ///
    /// Dimension names must match. Coordinates present in both must be equal;
    /// coordinates present in only one are kept.
    fn merge(&self, name: &str, other: &GridLabels) -> SeafluxResult<GridLabels> {
        if self.dims != other.dims {
            return Err(SeafluxError::LabelMismatch {
                name: name.to_string(),
                expected: self.dims.clone(),
                found: other.dims.clone(),
            });
        }

        let mut merged = self.clone();
        for (dim, values) in &other.coords {
            match merged.coords.get(dim) {
                Some(existing) if existing != values => {
                    return Err(SeafluxError::CoordinateMismatch {
                        name: name.to_string(),
                        dim: dim.clone(),
                    })
                }
                Some(_) => {}
                None => {
                    merged.coords.insert(dim.clone(), values.clone());
                }
            }
        }
        Ok(merged)
    }

    fn find_dim(&self, names: &[&str]) -> Option<&str> {
        self.dims
            .iter()
            .map(String::as_str)
            .find(|d| names.contains(&d.to_ascii_lowercase().as_str()))
    }

    fn validate(&self, shape: &[usize]) -> SeafluxResult<()> {
        if self.dims.len() != shape.len() {
            return Err(SeafluxError::Error(format!(
                "{} dimension labels given for an array with {} dimensions",
                self.dims.len(),
                shape.len()
            )));
        }
        for (dim, values) in &self.coords {
            let axis = self.axis_of(dim).ok_or_else(|| {
                SeafluxError::Error(format!("coordinate `{dim}` does not name a dimension"))
            })?;
            if values.len() != shape[axis] {
                return Err(SeafluxError::Error(format!(
                    "coordinate `{dim}` has {} values but the dimension has length {}",
                    values.len(),
                    shape[axis]
                )));
            }
        }
        Ok(())
    }
}

/// A numeric array with a physical unit and optional grid labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalField {
    values: ArrayD<FloatValue>,
    unit: String,
    #[serde(default)]
    labels: Option<GridLabels>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

impl PhysicalField {
    /// A 0-dimensional field
    pub fn scalar(value: FloatValue, unit: &str) -> Self {
        Self::from_array(ndarray::arr0(value), unit)
    }

    /// A 1-dimensional unlabelled field
    pub fn from_vec(values: Vec<FloatValue>, unit: &str) -> Self {
        Self::from_array(Array::from_vec(values), unit)
    }

    /// An unlabelled field of any dimensionality
    pub fn from_array<D: Dimension>(values: Array<FloatValue, D>, unit: &str) -> Self {
        Self {
            values: values.into_dyn(),
            unit: unit.to_string(),
            labels: None,
            attributes: BTreeMap::new(),
        }
    }

    /// A field whose axes are named by `labels`
    ///
    /// Fails if the number of labels does not match the number of axes or a
    /// coordinate vector does not match the length of its dimension.
    pub fn labelled(
        values: ArrayD<FloatValue>,
        unit: &str,
        labels: GridLabels,
    ) -> SeafluxResult<Self> {
        labels.validate(values.shape())?;
        Ok(Self {
            values,
            unit: unit.to_string(),
            labels: Some(labels),
            attributes: BTreeMap::new(),
        })
    }

    pub fn values(&self) -> &ArrayD<FloatValue> {
        &self.values
    }

    pub fn into_values(self) -> ArrayD<FloatValue> {
        self.values
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn labels(&self) -> Option<&GridLabels> {
        self.labels.as_ref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether the field is associated with latitude and longitude dimensions
    pub fn has_spatial_labels(&self) -> bool {
        self.labels.as_ref().is_some_and(GridLabels::is_spatial)
    }

    /// The single value of a 0-d or one-element field
    pub fn scalar_value(&self) -> Option<FloatValue> {
        match self.values.len() {
            1 => self.values.iter().next().copied(),
            _ => None,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Apply an element-wise transform, producing a field in `unit`
    ///
    /// Labels are kept; attributes describe the old values and are dropped.
    pub fn map<F>(&self, unit: &str, f: F) -> PhysicalField
    where
        F: Fn(FloatValue) -> FloatValue,
    {
        PhysicalField {
            values: self.values.mapv(f),
            unit: unit.to_string(),
            labels: self.labels.clone(),
            attributes: BTreeMap::new(),
        }
    }

    /// View of the values broadcast to `shape`
    pub fn broadcast_to(
        &self,
        name: &str,
        shape: &[usize],
    ) -> SeafluxResult<ArrayViewD<'_, FloatValue>> {
        self.values
            .broadcast(IxDyn(shape))
            .ok_or_else(|| SeafluxError::ShapeMismatch {
                name: name.to_string(),
                expected: shape.to_vec(),
                found: self.shape().to_vec(),
            })
    }

    /// Values rearranged to follow `target` dimension order and broadcast to `shape`
    ///
    /// Every dimension of this field must appear in `target`. Dimensions of
    /// `target` missing from this field are broadcast.
    pub fn align_to(
        &self,
        name: &str,
        target: &GridLabels,
        shape: &[usize],
    ) -> SeafluxResult<ArrayD<FloatValue>> {
        let labels = match &self.labels {
            Some(labels) => labels,
            None => return Ok(self.broadcast_to(name, shape)?.to_owned()),
        };
        let label_mismatch = || SeafluxError::LabelMismatch {
            name: name.to_string(),
            expected: target.dims().to_vec(),
            found: labels.dims().to_vec(),
        };

        let mut order = Vec::with_capacity(labels.dims().len());
        for (axis, dim) in labels.dims().iter().enumerate() {
            let target_axis = target.axis_of(dim).ok_or_else(label_mismatch)?;
            order.push((target_axis, axis));
        }
        order.sort_unstable();
        let permutation: Vec<usize> = order.iter().map(|(_, axis)| *axis).collect();

        let mut view = self.values.view().permuted_axes(IxDyn(&permutation));
        for (target_axis, dim) in target.dims().iter().enumerate() {
            if labels.axis_of(dim).is_none() {
                view = view.insert_axis(Axis(target_axis));
            }
        }
        view.broadcast(IxDyn(shape))
            .map(|v| v.to_owned())
            .ok_or_else(|| SeafluxError::ShapeMismatch {
                name: name.to_string(),
                expected: shape.to_vec(),
                found: self.shape().to_vec(),
            })
    }

    /// Sum over the latitude and longitude dimensions, skipping NaN
    ///
    /// Remaining dimensions keep their labels and coordinates. An all-NaN
    /// slice sums to zero.
    pub fn sum_spatial(&self, unit: &str) -> SeafluxResult<PhysicalField> {
        let labels = self
            .labels
            .as_ref()
            .filter(|l| l.is_spatial())
            .ok_or_else(|| SeafluxError::Error("field has no spatial dimensions".to_string()))?;
        let axes = labels.spatial_axes();

        let mut values = self.values.clone();
        for &axis in axes.iter().rev() {
            values = values.map_axis(Axis(axis), |lane| nan_sum(lane.iter().copied()));
        }

        Ok(PhysicalField {
            values,
            unit: unit.to_string(),
            labels: Some(labels.without_axes(&axes)),
            attributes: BTreeMap::new(),
        })
    }

    pub(crate) fn from_parts(
        values: ArrayD<FloatValue>,
        unit: &str,
        labels: Option<GridLabels>,
    ) -> Self {
        Self {
            values,
            unit: unit.to_string(),
            labels,
            attributes: BTreeMap::new(),
        }
    }
}

fn nan_sum<T: Float>(values: impl Iterator<Item = T>) -> T {
    values
        .filter(|v| !v.is_nan())
        .fold(T::zero(), |acc, v| acc + v)
}

/// Common shape (and labels) for a set of broadcast-compatible inputs
#[derive(Debug, Clone, PartialEq)]
pub struct CommonGrid {
    pub shape: Vec<usize>,
    pub labels: Option<GridLabels>,
}

impl CommonGrid {
    /// Resolve the broadcast shape of named inputs
    ///
    /// Shapes combine with trailing-axis broadcasting. All labelled inputs
    /// must carry the same dimension names, and the broadcast shape must equal
    /// the shape of the labelled inputs. Coordinates are collected from every
    /// labelled input and must agree where more than one input provides them.
    pub fn resolve(inputs: &[(&str, &PhysicalField)]) -> SeafluxResult<Self> {
        let mut shape: Vec<usize> = vec![];
        for (name, field) in inputs {
            shape = co_broadcast(&shape, field.shape()).ok_or_else(|| {
                SeafluxError::ShapeMismatch {
                    name: name.to_string(),
                    expected: shape.clone(),
                    found: field.shape().to_vec(),
                }
            })?;
        }

        let mut labels: Option<GridLabels> = None;
        for (name, field) in inputs {
            let Some(field_labels) = field.labels() else {
                continue;
            };
            labels = Some(match labels {
                None => field_labels.clone(),
                Some(existing) => existing.merge(name, field_labels)?,
            });
            if field.shape() != shape.as_slice() {
                return Err(SeafluxError::ShapeMismatch {
                    name: name.to_string(),
                    expected: shape.clone(),
                    found: field.shape().to_vec(),
                });
            }
        }

        Ok(Self { shape, labels })
    }
}

/// The shape with the most dimensions
///
/// Used to pick the grid a set of inputs is defined on when some of them are
/// scalars or lower-dimensional. Ties keep the first shape.
pub fn widest_shape<'a>(shapes: impl IntoIterator<Item = &'a [usize]>) -> &'a [usize] {
    let scalar: &[usize] = &[];
    shapes.into_iter().fold(scalar, |widest, shape| {
        if shape.len() > widest.len() {
            shape
        } else {
            widest
        }
    })
}

fn co_broadcast(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let pad = |s: &[usize], i: usize| {
        let offset = ndim - s.len();
        if i < offset {
            1
        } else {
            s[i - offset]
        }
    };

    (0..ndim)
        .map(|i| match (pad(a, i), pad(b, i)) {
            (x, y) if x == y => Some(x),
            (1, y) => Some(y),
            (x, 1) => Some(x),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ndarray::{array, Array2, Array3};

    fn grid_labels() -> GridLabels {
        GridLabels::new(["time", "lat", "lon"])
            .with_coord("time", vec![0.0, 1.0])
            .with_coord("lat", vec![-1.0, 0.0, 1.0])
            .with_coord("lon", vec![10.0, 20.0, 30.0, 40.0])
    }

    #[test]
    fn test_scalar_field() {
        let field = PhysicalField::scalar(15.0, "degC");
        assert_eq!(field.shape(), &[] as &[usize]);
        assert_eq!(field.scalar_value(), Some(15.0));
        assert!(!field.has_spatial_labels());
    }

    #[test]
    fn test_labelled_rejects_wrong_rank() {
        let result = PhysicalField::labelled(
            Array3::zeros((2, 3, 4)).into_dyn(),
            "m^2",
            GridLabels::new(["lat", "lon"]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_labelled_rejects_wrong_coordinate_length() {
        let labels = GridLabels::new(["lat", "lon"]).with_coord("lat", vec![0.0]);
        let values = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let result = PhysicalField::labelled(values, "1", labels);
        assert!(result.is_err());
    }

    #[test]
    fn test_spatial_detection_accepts_long_names() {
        let labels = GridLabels::new(["Latitude", "longitude"]);
        assert!(labels.is_spatial());
        assert!(!GridLabels::new(["time", "lat"]).is_spatial());
    }

    #[test]
    fn test_map_keeps_labels_and_drops_attributes() {
        let values = Array3::from_elem((2, 3, 4), 10.0).into_dyn();
        let field = PhysicalField::labelled(values, "degC", grid_labels())
            .unwrap()
            .with_attribute(ATTR_DESCRIPTION, "sst");
        let kelvin = field.map("K", |t| t + 273.15);

        assert_eq!(kelvin.unit(), "K");
        assert_eq!(kelvin.labels(), field.labels());
        assert!(kelvin.attributes().is_empty());
        assert!(kelvin.values().iter().all(|v| is_close!(*v, 283.15)));
    }

    #[test]
    fn test_resolve_scalar_and_grid() {
        let grid =
            PhysicalField::labelled(Array3::zeros((2, 3, 4)).into_dyn(), "degC", grid_labels())
                .unwrap();
        let scalar = PhysicalField::scalar(35.0, "PSU");

        let common = CommonGrid::resolve(&[("temp_C", &grid), ("salt", &scalar)]).unwrap();
        assert_eq!(common.shape, vec![2, 3, 4]);
        assert_eq!(common.labels.as_ref(), Some(&grid_labels()));
    }

    #[test]
    fn test_resolve_rejects_incompatible_shapes() {
        let a = PhysicalField::from_vec(vec![1.0, 2.0, 3.0], "1");
        let b = PhysicalField::from_vec(vec![1.0, 2.0], "1");

        match CommonGrid::resolve(&[("a", &a), ("b", &b)]) {
            Err(SeafluxError::ShapeMismatch { name, .. }) => assert_eq!(name, "b"),
            other => panic!("Expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_rejects_conflicting_labels() {
        let labelled = |dims: [&str; 2]| {
            PhysicalField::labelled(array![[1.0]].into_dyn(), "1", GridLabels::new(dims)).unwrap()
        };
        let a = labelled(["lat", "lon"]);
        let b = labelled(["lon", "lat"]);

        assert!(matches!(
            CommonGrid::resolve(&[("a", &a), ("b", &b)]),
            Err(SeafluxError::LabelMismatch { .. })
        ));
    }

    fn band(lat: Vec<FloatValue>) -> PhysicalField {
        let labels = GridLabels::new(["lat", "lon"])
            .with_coord("lat", lat)
            .with_coord("lon", vec![0.5, 1.5, 2.5]);
        PhysicalField::labelled(Array2::from_elem((2, 3), 1.0).into_dyn(), "1", labels).unwrap()
    }

    #[test]
    fn test_resolve_rejects_conflicting_coordinates() {
        let tropics = band(vec![0.5, 1.5]);
        let arctic = band(vec![80.5, 81.5]);

        match CommonGrid::resolve(&[("temp_C", &tropics), ("salt", &arctic)]) {
            Err(SeafluxError::CoordinateMismatch { name, dim }) => {
                assert_eq!(name, "salt");
                assert_eq!(dim, "lat");
            }
            other => panic!("Expected CoordinateMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_collects_coordinates_from_any_input() {
        let bare = PhysicalField::labelled(
            Array2::from_elem((2, 3), 1.0).into_dyn(),
            "1",
            GridLabels::new(["lat", "lon"]),
        )
        .unwrap();
        let full = band(vec![0.5, 1.5]);

        let common = CommonGrid::resolve(&[("temp_C", &bare), ("salt", &full)]).unwrap();
        let labels = common.labels.unwrap();
        assert_eq!(labels.coord("lat"), Some(&[0.5, 1.5][..]));
        assert_eq!(labels.coord("lon"), Some(&[0.5, 1.5, 2.5][..]));
    }

    #[test]
    fn test_resolve_accepts_matching_coordinates() {
        let a = band(vec![0.5, 1.5]);
        let b = band(vec![0.5, 1.5]);
        assert!(CommonGrid::resolve(&[("a", &a), ("b", &b)]).is_ok());
    }

    #[test]
    fn test_align_reorders_and_broadcasts() {
        // Area stored as (lon, lat) aligned to a (time, lat, lon) grid
        let area = PhysicalField::labelled(
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn(),
            "m^2",
            GridLabels::new(["lon", "lat"]),
        )
        .unwrap();
        let target = GridLabels::new(["time", "lat", "lon"]);

        let aligned = area.align_to("area", &target, &[2, 3, 2]).unwrap();
        assert_eq!(aligned.shape(), &[2, 3, 2]);
        assert_eq!(aligned[[0, 0, 1]], 4.0);
        assert_eq!(aligned[[1, 2, 0]], 3.0);
    }

    #[test]
    fn test_align_rejects_unknown_dimension() {
        let area =
            PhysicalField::labelled(array![[1.0]].into_dyn(), "m^2", GridLabels::new(["y", "x"]))
                .unwrap();
        let target = GridLabels::new(["lat", "lon"]);
        assert!(area.align_to("area", &target, &[1, 1]).is_err());
    }

    #[test]
    fn test_sum_spatial_skips_nan_and_keeps_time() {
        let mut values = Array3::from_elem((2, 3, 4), 1.0);
        values[[0, 1, 1]] = FloatValue::NAN;
        let field = PhysicalField::labelled(values.into_dyn(), "gC/yr", grid_labels()).unwrap();

        let total = field.sum_spatial("gC/Yr").unwrap();
        assert_eq!(total.shape(), &[2]);
        assert_eq!(total.values()[[0]], 11.0);
        assert_eq!(total.values()[[1]], 12.0);

        let labels = total.labels().unwrap();
        assert_eq!(labels.dims(), &["time".to_string()]);
        assert_eq!(labels.coord("time"), Some(&[0.0, 1.0][..]));
    }

    #[test]
    fn test_sum_spatial_all_nan_is_zero() {
        let field = PhysicalField::labelled(
            array![[FloatValue::NAN, FloatValue::NAN]].into_dyn(),
            "gC/yr",
            GridLabels::new(["lat", "lon"]),
        )
        .unwrap();
        let total = field.sum_spatial("gC/Yr").unwrap();
        assert_eq!(total.scalar_value(), Some(0.0));
    }

    #[test]
    fn test_widest_shape_skips_scalars() {
        let shapes: [&[usize]; 3] = [&[], &[2, 3, 4], &[4]];
        assert_eq!(widest_shape(shapes), &[2, 3, 4]);
        assert_eq!(widest_shape(std::iter::empty()), &[] as &[usize]);
    }

    #[test]
    fn test_co_broadcast() {
        assert_eq!(co_broadcast(&[], &[3, 4]), Some(vec![3, 4]));
        assert_eq!(co_broadcast(&[1], &[3, 4]), Some(vec![3, 4]));
        assert_eq!(co_broadcast(&[4], &[3, 4]), Some(vec![3, 4]));
        assert_eq!(co_broadcast(&[3], &[3, 4]), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let field =
            PhysicalField::from_vec(vec![1.0, 2.0], "m^2").with_attribute(ATTR_UNITS, "m^2");
        let json = serde_json::to_string(&field).unwrap();
        let back: PhysicalField = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);
    }
}
