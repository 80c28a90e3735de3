//! # Forecast Calculation Engine
//!
//! 需求預測計算引擎：數值工具、預測演算法、組合預測、回測評估與預測入口

pub mod accuracy;
pub mod algorithms;
pub mod calculator;
pub mod ensemble;
pub mod grouping;
pub mod time_series;

// Re-export 主要類型
pub use accuracy::{AccuracyEvaluator, AccuracyReport};
pub use algorithms::{AlgorithmOutput, ForecastAlgorithms, ForecastContext};
pub use calculator::ForecastCalculator;
pub use ensemble::EnsembleCombiner;
pub use grouping::{GroupedObservations, ObservationGrouper};

use serde::Serialize;

/// 預測計算結果
#[derive(Debug, Clone, Serialize)]
pub struct ForecastRun {
    /// 各物料預測結果（依物料ID排序）
    pub results: Vec<forecast_core::ForecastResult>,

    /// 格式錯誤被拒絕的紀錄
    pub rejected: Vec<forecast_core::RejectedObservation>,

    /// 警告信息
    pub warnings: Vec<ForecastWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl ForecastRun {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            rejected: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ForecastWarning) {
        self.warnings.push(warning);
    }

    /// 查找指定物料的結果
    pub fn result_for(&self, item_id: &str) -> Option<&forecast_core::ForecastResult> {
        self.results.iter().find(|r| r.item_id == item_id)
    }
}

/// 預測警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastWarning {
    pub item_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ForecastWarning {
    pub fn new(item_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            item_id,
            message,
            severity,
        }
    }

    pub fn info(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Info)
    }

    pub fn warning(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Warning)
    }

    pub fn error(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
