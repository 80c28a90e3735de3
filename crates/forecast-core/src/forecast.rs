//! 預測結果模型

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ForecastError, ItemCategory, YearMonth};

/// 預測演算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmId {
    /// 移動平均
    MovingAverage,
    /// 線性迴歸
    LinearRegression,
    /// 季節性趨勢
    SeasonalTrend,
    /// 指數平滑
    ExponentialSmoothing,
    /// 簡化 ARIMA（近似法）
    ArimaLike,
    /// 等權重組合
    Ensemble,
    /// 誤差加權組合
    WeightedEnsemble,
}

impl AlgorithmId {
    /// 全部演算法（預設順序）
    pub const ALL: [AlgorithmId; 7] = [
        AlgorithmId::MovingAverage,
        AlgorithmId::LinearRegression,
        AlgorithmId::SeasonalTrend,
        AlgorithmId::ExponentialSmoothing,
        AlgorithmId::ArimaLike,
        AlgorithmId::Ensemble,
        AlgorithmId::WeightedEnsemble,
    ];

    /// 基礎演算法（組合演算法的成員）
    pub const BASE: [AlgorithmId; 5] = [
        AlgorithmId::MovingAverage,
        AlgorithmId::LinearRegression,
        AlgorithmId::SeasonalTrend,
        AlgorithmId::ExponentialSmoothing,
        AlgorithmId::ArimaLike,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::MovingAverage => "moving_average",
            AlgorithmId::LinearRegression => "linear_regression",
            AlgorithmId::SeasonalTrend => "seasonal_trend",
            AlgorithmId::ExponentialSmoothing => "exponential_smoothing",
            AlgorithmId::ArimaLike => "arima_like",
            AlgorithmId::Ensemble => "ensemble",
            AlgorithmId::WeightedEnsemble => "weighted_ensemble",
        }
    }

    /// 是否為組合演算法
    pub fn is_ensemble(&self) -> bool {
        matches!(self, AlgorithmId::Ensemble | AlgorithmId::WeightedEnsemble)
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmId {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| ForecastError::Other(format!("未知的預測演算法: {}", s)))
    }
}

/// 單一月份、單一演算法的預測值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month: YearMonth,
    pub algorithm: AlgorithmId,
    /// 預測消耗量（數量單位，非負）
    pub predicted: f64,
}

impl ForecastPoint {
    pub fn new(month: YearMonth, algorithm: AlgorithmId, predicted: f64) -> Self {
        Self {
            month,
            algorithm,
            predicted,
        }
    }
}

/// 單一物料的預測結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub item_id: String,
    pub item_name: String,
    pub category: Option<ItemCategory>,
    /// 依（月份 × 演算法）排列的預測點
    pub forecasts: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// 指定演算法的預測點（依月份順序）
    pub fn points_for(&self, algorithm: AlgorithmId) -> impl Iterator<Item = &ForecastPoint> + '_ {
        self.forecasts
            .iter()
            .filter(move |point| point.algorithm == algorithm)
    }

    /// 指定演算法的預測值序列
    pub fn predictions_for(&self, algorithm: AlgorithmId) -> Vec<f64> {
        self.points_for(algorithm).map(|p| p.predicted).collect()
    }

    /// 指定演算法在整個預測期間的總消耗量
    ///
    /// 以 Decimal 回傳，供規劃畫面與庫存數量直接比較。
    /// 結果中沒有該演算法的預測點，或總和無法轉為 Decimal 時回傳 None。
    pub fn total_for(&self, algorithm: AlgorithmId) -> Option<Decimal> {
        let mut points = self.points_for(algorithm).peekable();
        points.peek()?;
        let total: f64 = points.map(|p| p.predicted).sum();
        Decimal::try_from(total).ok().map(|d| d.round_dp(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_id_round_trip() {
        for id in AlgorithmId::ALL {
            assert_eq!(id.as_str().parse::<AlgorithmId>().unwrap(), id);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
        assert!("holt_winters".parse::<AlgorithmId>().is_err());
    }

    #[test]
    fn test_base_excludes_ensembles() {
        assert!(AlgorithmId::BASE.iter().all(|id| !id.is_ensemble()));
        assert!(AlgorithmId::Ensemble.is_ensemble());
        assert!(AlgorithmId::WeightedEnsemble.is_ensemble());
    }

    #[test]
    fn test_total_for() {
        let jan = YearMonth::new(2025, 1).unwrap();
        let feb = YearMonth::new(2025, 2).unwrap();
        let result = ForecastResult {
            item_id: "FG-001".to_string(),
            item_name: "成品".to_string(),
            category: Some(ItemCategory::FinishedGood),
            forecasts: vec![
                ForecastPoint::new(jan, AlgorithmId::MovingAverage, 10.5),
                ForecastPoint::new(jan, AlgorithmId::LinearRegression, 99.0),
                ForecastPoint::new(feb, AlgorithmId::MovingAverage, 12.0),
            ],
        };

        assert_eq!(result.predictions_for(AlgorithmId::MovingAverage), vec![10.5, 12.0]);
        assert_eq!(
            result.total_for(AlgorithmId::MovingAverage),
            Some(Decimal::new(225, 1))
        );
        assert_eq!(result.total_for(AlgorithmId::Ensemble), None);
    }

    #[test]
    fn test_total_for_distinguishes_zero_from_missing() {
        let jan = YearMonth::new(2025, 1).unwrap();
        let result = ForecastResult {
            item_id: "PKG-002".to_string(),
            item_name: "包材".to_string(),
            category: None,
            forecasts: vec![
                ForecastPoint::new(jan, AlgorithmId::MovingAverage, 0.0),
                ForecastPoint::new(jan, AlgorithmId::ArimaLike, f64::MAX),
                ForecastPoint::new(jan, AlgorithmId::ArimaLike, f64::MAX),
            ],
        };

        assert_eq!(result.total_for(AlgorithmId::MovingAverage), Some(Decimal::ZERO));
        // 總和溢位為無限大，無法表示
        assert_eq!(result.total_for(AlgorithmId::ArimaLike), None);
        assert_eq!(result.total_for(AlgorithmId::LinearRegression), None);
    }
}
