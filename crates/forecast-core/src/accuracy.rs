//! 預測準確度模型

use serde::{Deserialize, Serialize};

use crate::{AlgorithmId, ErrorMetric};

/// 單一演算法的回測誤差
///
/// 樣本為空時 `mae`/`rmse` 為 None（不可用），絕不以 0 表示。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyScore {
    pub algorithm: AlgorithmId,
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    /// 參與計算的（實際, 預測）配對數
    pub sample_count: usize,
}

impl AccuracyScore {
    /// 創建不可用的分數（沒有樣本）
    pub fn unavailable(algorithm: AlgorithmId) -> Self {
        Self {
            algorithm,
            mae: None,
            rmse: None,
            sample_count: 0,
        }
    }

    /// 創建已計算的分數
    pub fn new(algorithm: AlgorithmId, mae: f64, rmse: f64, sample_count: usize) -> Self {
        Self {
            algorithm,
            mae: Some(mae),
            rmse: Some(rmse),
            sample_count,
        }
    }

    pub fn is_available(&self) -> bool {
        self.mae.is_some() && self.rmse.is_some()
    }

    /// 依指定指標取誤差
    pub fn error(&self, metric: ErrorMetric) -> Option<f64> {
        match metric {
            ErrorMetric::Mae => self.mae,
            ErrorMetric::Rmse => self.rmse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_not_zero() {
        let score = AccuracyScore::unavailable(AlgorithmId::MovingAverage);

        assert!(!score.is_available());
        assert_eq!(score.error(ErrorMetric::Mae), None);
        assert_eq!(score.error(ErrorMetric::Rmse), None);

        let json = serde_json::to_value(&score).unwrap();
        assert!(json["mae"].is_null());
    }

    #[test]
    fn test_error_by_metric() {
        let score = AccuracyScore::new(AlgorithmId::ArimaLike, 2.0, 3.0, 6);
        assert_eq!(score.error(ErrorMetric::Mae), Some(2.0));
        assert_eq!(score.error(ErrorMetric::Rmse), Some(3.0));
    }
}
