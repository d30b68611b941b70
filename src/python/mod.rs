//! Python bindings
//!
//! Exposes the bulk flux over numpy arrays:
//!
//! ```python
//! from seaflux._lib import flux_bulk, flux_bulk_grid
//!
//! flux = flux_bulk(temp_c, salt, pco2_sea_uatm, pco2_air_uatm, pres_hpa, kw_cmhr)
//! ds = flux_bulk_grid(temp_c, salt, pco2_sea_uatm, pco2_air_uatm, pres_hpa, kw_cmhr, lat, lon)
//! ds["fgco2_global"], ds["attrs"]["fgco2_global"]["units"]
//! ```

use crate::{FloatValue, GridLabels, PhysicalField, SeafluxError};
use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pythonize::pythonize;
use seaflux_core::field::widest_shape;
use seaflux_core::result::FluxResult;

fn to_py_err(e: SeafluxError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn plain_field(array: &PyReadonlyArrayDyn<'_, FloatValue>, unit: &str) -> PhysicalField {
    PhysicalField::from_array(array.as_array().to_owned(), unit)
}

/// Label every input with the grid's shape, leave broadcast inputs unlabelled
fn grid_field(
    array: &PyReadonlyArrayDyn<'_, FloatValue>,
    unit: &str,
    labels: &GridLabels,
    shape: &[usize],
) -> PyResult<PhysicalField> {
    let values = array.as_array().to_owned();
    if values.shape() == shape {
        PhysicalField::labelled(values, unit, labels.clone()).map_err(to_py_err)
    } else {
        Ok(PhysicalField::from_array(values, unit))
    }
}

/// Bulk air-sea CO2 flux (gC/m2/day) for arrays without spatial context
///
/// Positive values are out of the ocean.
#[pyfunction]
fn flux_bulk<'py>(
    py: Python<'py>,
    temp_c: PyReadonlyArrayDyn<'py, FloatValue>,
    salt: PyReadonlyArrayDyn<'py, FloatValue>,
    pco2_sea_uatm: PyReadonlyArrayDyn<'py, FloatValue>,
    pco2_air_uatm: PyReadonlyArrayDyn<'py, FloatValue>,
    pres_hpa: PyReadonlyArrayDyn<'py, FloatValue>,
    kw_cmhr: PyReadonlyArrayDyn<'py, FloatValue>,
) -> PyResult<Bound<'py, PyArrayDyn<FloatValue>>> {
    let result = crate::flux_bulk(
        &plain_field(&temp_c, "degC"),
        &plain_field(&salt, "PSU"),
        &plain_field(&pco2_sea_uatm, "uatm"),
        &plain_field(&pco2_air_uatm, "uatm"),
        &plain_field(&pres_hpa, "hPa"),
        &plain_field(&kw_cmhr, "cm/hr"),
    )
    .map_err(to_py_err)?;

    Ok(result.flux().values().clone().into_pyarray_bound(py))
}

/// Bulk air-sea CO2 flux on a (time, lat, lon) or (lat, lon) grid
///
/// Returns a dict with `fgco2`, `area` and `fgco2_global` arrays and an
/// `attrs` dict holding the attributes of each.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn flux_bulk_grid<'py>(
    py: Python<'py>,
    temp_c: PyReadonlyArrayDyn<'py, FloatValue>,
    salt: PyReadonlyArrayDyn<'py, FloatValue>,
    pco2_sea_uatm: PyReadonlyArrayDyn<'py, FloatValue>,
    pco2_air_uatm: PyReadonlyArrayDyn<'py, FloatValue>,
    pres_hpa: PyReadonlyArrayDyn<'py, FloatValue>,
    kw_cmhr: PyReadonlyArrayDyn<'py, FloatValue>,
    lat: Vec<FloatValue>,
    lon: Vec<FloatValue>,
) -> PyResult<Bound<'py, PyDict>> {
    let inputs = [&temp_c, &salt, &pco2_sea_uatm, &pco2_air_uatm, &pres_hpa, &kw_cmhr];
    let arrays: Vec<_> = inputs.iter().map(|a| a.as_array()).collect();
    let shape = widest_shape(arrays.iter().map(|a| a.shape())).to_vec();
    let dims: &[&str] = match shape.len() {
        2 => &["lat", "lon"],
        3 => &["time", "lat", "lon"],
        n => {
            return Err(PyValueError::new_err(format!(
                "expected a (lat, lon) or (time, lat, lon) grid, got {n} dimensions"
            )))
        }
    };
    let labels = GridLabels::new(dims.iter().copied())
        .with_coord("lat", lat)
        .with_coord("lon", lon);

    let result = crate::default_model()
        .flux_bulk(
            &grid_field(&temp_c, "degC", &labels, &shape)?,
            &grid_field(&salt, "PSU", &labels, &shape)?,
            &grid_field(&pco2_sea_uatm, "uatm", &labels, &shape)?,
            &grid_field(&pco2_air_uatm, "uatm", &labels, &shape)?,
            &grid_field(&pres_hpa, "hPa", &labels, &shape)?,
            &grid_field(&kw_cmhr, "cm/hr", &labels, &shape)?,
        )
        .map_err(to_py_err)?;

    let dataset = match result {
        FluxResult::Composite(dataset) => dataset,
        FluxResult::Plain(_) => {
            return Err(PyValueError::new_err("inputs do not describe a lat/lon grid"))
        }
    };

    let out = PyDict::new_bound(py);
    let attrs = PyDict::new_bound(py);
    for (name, field) in dataset.fields() {
        out.set_item(name, field.values().clone().into_pyarray_bound(py))?;
        attrs.set_item(name, pythonize(py, field.attributes())?)?;
    }
    out.set_item("attrs", attrs)?;
    Ok(out)
}

#[pymodule]
#[pyo3(name = "_lib")]
fn seaflux(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(flux_bulk, m)?)?;
    m.add_function(wrap_pyfunction!(flux_bulk_grid, m)?)?;
    Ok(())
}
