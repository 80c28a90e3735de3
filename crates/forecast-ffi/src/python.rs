//! Python 綁定實現
//!
//! 輸入與輸出皆為 JSON 字串，格式與 forecast-core 的 serde 定義一致。

use forecast_calc::ForecastCalculator;
use forecast_core::{
    AlgorithmId, EnsembleWeighting, ErrorMetric, ForecastConfig, ForecastError, ForecastRequest,
    RawObservation,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(err: ForecastError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn load_config(config_json: Option<&str>) -> Result<ForecastConfig, ForecastError> {
    match config_json {
        Some(json) => ForecastConfig::from_json_str(json),
        None => Ok(ForecastConfig::default()),
    }
}

/// Python 預測配置
#[pyclass(name = "ForecastConfig")]
#[derive(Clone)]
pub struct PyForecastConfig {
    #[pyo3(get, set)]
    pub moving_average_window: usize,
    #[pyo3(get, set)]
    pub smoothing_alpha: f64,
    #[pyo3(get, set)]
    pub seasonal_period: usize,
    #[pyo3(get, set)]
    pub ar_weight: f64,
    #[pyo3(get, set)]
    pub backtest_window: usize,
    #[pyo3(get, set)]
    pub weighting_metric: String, // "mae" or "rmse"
    #[pyo3(get, set)]
    pub weighting_epsilon: f64,
    #[pyo3(get, set)]
    pub weighting_power: f64,
    #[pyo3(get, set)]
    pub max_horizon: u32,
    #[pyo3(get, set)]
    pub parallel_threshold: usize,
    #[pyo3(get, set)]
    pub strict_observations: bool,
}

#[pymethods]
impl PyForecastConfig {
    #[new]
    fn new() -> Self {
        Self::from(&ForecastConfig::default())
    }

    /// 轉為 JSON（可直接傳給 smart_forecast 的 config_json）
    fn to_json(&self) -> PyResult<String> {
        let config = self.to_config().map_err(to_py_err)?;
        serde_json::to_string(&config).map_err(|e| to_py_err(e.into()))
    }

    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = ForecastConfig::from_json_str(json).map_err(to_py_err)?;
        Ok(Self::from(&config))
    }
}

impl PyForecastConfig {
    /// 轉換為核心配置並驗證
    pub fn to_config(&self) -> Result<ForecastConfig, ForecastError> {
        let metric = match self.weighting_metric.as_str() {
            "mae" => ErrorMetric::Mae,
            "rmse" => ErrorMetric::Rmse,
            other => {
                return Err(ForecastError::InvalidConfig(format!(
                    "未知的誤差指標: {}",
                    other
                )))
            }
        };

        let config = ForecastConfig::new()
            .with_moving_average_window(self.moving_average_window)
            .with_smoothing_alpha(self.smoothing_alpha)
            .with_seasonal_period(self.seasonal_period)
            .with_ar_weight(self.ar_weight)
            .with_backtest_window(self.backtest_window)
            .with_weighting(EnsembleWeighting {
                metric,
                epsilon: self.weighting_epsilon,
                power: self.weighting_power,
            })
            .with_max_horizon(self.max_horizon)
            .with_parallel_threshold(self.parallel_threshold)
            .with_strict_observations(self.strict_observations);
        config.validate()?;
        Ok(config)
    }
}

impl From<&ForecastConfig> for PyForecastConfig {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            moving_average_window: config.moving_average_window,
            smoothing_alpha: config.smoothing_alpha,
            seasonal_period: config.seasonal_period,
            ar_weight: config.ar_weight,
            backtest_window: config.backtest_window,
            weighting_metric: match config.weighting.metric {
                ErrorMetric::Mae => "mae".to_string(),
                ErrorMetric::Rmse => "rmse".to_string(),
            },
            weighting_epsilon: config.weighting.epsilon,
            weighting_power: config.weighting.power,
            max_horizon: config.max_horizon,
            parallel_threshold: config.parallel_threshold,
            strict_observations: config.strict_observations,
        }
    }
}

/// 執行需求預測，回傳 ForecastRun 的 JSON
#[pyfunction]
#[pyo3(signature = (observations_json, request_json, config_json=None))]
pub fn smart_forecast(
    observations_json: &str,
    request_json: &str,
    config_json: Option<&str>,
) -> PyResult<String> {
    let run = || -> Result<String, ForecastError> {
        let observations: Vec<RawObservation> = serde_json::from_str(observations_json)?;
        let request: ForecastRequest = serde_json::from_str(request_json)?;
        let calculator = ForecastCalculator::new(load_config(config_json)?)?;

        let result = calculator.smart_forecast(&observations, &request)?;
        Ok(serde_json::to_string(&result)?)
    };
    run().map_err(to_py_err)
}

/// 執行回測評估，回傳 AccuracyReport 的 JSON
#[pyfunction]
#[pyo3(signature = (observations_json, test_window, algorithms=None, config_json=None))]
pub fn evaluate_accuracy(
    observations_json: &str,
    test_window: usize,
    algorithms: Option<Vec<String>>,
    config_json: Option<&str>,
) -> PyResult<String> {
    let run = || -> Result<String, ForecastError> {
        let observations: Vec<RawObservation> = serde_json::from_str(observations_json)?;
        let algorithms = algorithms
            .unwrap_or_default()
            .iter()
            .map(|name| name.parse::<AlgorithmId>())
            .collect::<Result<Vec<_>, _>>()?;
        let calculator = ForecastCalculator::new(load_config(config_json)?)?;

        let report = calculator.evaluate_accuracy(&observations, test_window, &algorithms)?;
        Ok(serde_json::to_string(&report)?)
    };
    run().map_err(to_py_err)
}

/// 可用的演算法ID
#[pyfunction]
pub fn algorithm_ids() -> Vec<&'static str> {
    AlgorithmId::ALL.iter().map(|id| id.as_str()).collect()
}
