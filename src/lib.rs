//! # Forecast
//!
//! 物料需求預測引擎：從每月消耗紀錄推算未來各月的消耗量，
//! 並以回測評估各演算法的準確度。
//!
//! - [`forecast_core`]：資料模型、配置、錯誤類型
//! - [`forecast_calc`]：演算法、組合、回測與主計算器
//! - [`forecast_cache`]：增量預測與更新通知

pub use forecast_cache::{DirtyTracker, ForecastChanged, IncrementalForecaster};
pub use forecast_calc::{
    AccuracyEvaluator, AccuracyReport, ForecastCalculator, ForecastRun, ForecastWarning,
    WarningSeverity,
};
pub use forecast_core::{
    AccuracyScore, AlgorithmId, EnsembleWeighting, ErrorMetric, ForecastConfig, ForecastError,
    ForecastPoint, ForecastRequest, ForecastResult, HistorySeries, InventoryLevel, ItemCategory,
    ItemInfo, Observation, RawObservation, RejectedObservation, Result, YearMonth,
};

pub use rust_decimal::Decimal;
