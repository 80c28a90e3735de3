//! # Forecast FFI
//!
//! Python 綁定層（PyO3）

use pyo3::prelude::*;

pub mod python;

/// Python 模組註冊
#[pymodule]
fn forecast_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyForecastConfig>()?;
    m.add_function(wrap_pyfunction!(python::smart_forecast, m)?)?;
    m.add_function(wrap_pyfunction!(python::evaluate_accuracy, m)?)?;
    m.add_function(wrap_pyfunction!(python::algorithm_ids, m)?)?;
    Ok(())
}
