//! 預測請求模型

use serde::{Deserialize, Serialize};

use crate::{AlgorithmId, ForecastError, ItemInfo, Result, YearMonth};

/// 一次預測請求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastRequest {
    /// 預測月數（未指定目標月份時使用）
    pub horizon_months: u32,

    /// 目標月份；非空時決定預測月份與月數
    pub target_months: Vec<YearMonth>,

    /// 要執行的演算法；空白代表全部
    pub algorithms: Vec<AlgorithmId>,

    /// 基準月份（整批資料都沒有歷史月份時，從此月之後起算）
    pub anchor_month: Option<YearMonth>,

    /// 物料主檔（顯示名稱、物料層級）
    pub items: Vec<ItemInfo>,
}

impl ForecastRequest {
    /// 創建新的預測請求
    pub fn new(horizon_months: u32) -> Self {
        Self {
            horizon_months,
            ..Self::default()
        }
    }

    /// 建構器模式：設置目標月份
    pub fn with_target_months(mut self, months: Vec<YearMonth>) -> Self {
        self.target_months = months;
        self
    }

    /// 建構器模式：以 "YYYY-MM" 標籤設置目標月份
    pub fn with_target_labels(mut self, labels: &[&str]) -> Result<Self> {
        self.target_months = labels
            .iter()
            .map(|label| YearMonth::parse(label))
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// 建構器模式：設置演算法
    pub fn with_algorithms(mut self, algorithms: Vec<AlgorithmId>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// 建構器模式：設置基準月份
    pub fn with_anchor_month(mut self, month: YearMonth) -> Self {
        self.anchor_month = Some(month);
        self
    }

    /// 建構器模式：設置物料主檔
    pub fn with_items(mut self, items: Vec<ItemInfo>) -> Self {
        self.items = items;
        self
    }

    /// 實際預測月數
    pub fn horizon(&self) -> u32 {
        if self.target_months.is_empty() {
            self.horizon_months
        } else {
            self.target_months.len() as u32
        }
    }

    /// 實際執行的演算法（去除重複，保留請求順序）
    pub fn resolved_algorithms(&self) -> Vec<AlgorithmId> {
        if self.algorithms.is_empty() {
            return AlgorithmId::ALL.to_vec();
        }

        let mut resolved = Vec::with_capacity(self.algorithms.len());
        for id in &self.algorithms {
            if !resolved.contains(id) {
                resolved.push(*id);
            }
        }
        resolved
    }

    /// 驗證預測月數
    pub fn validate(&self, max_horizon: u32) -> Result<()> {
        let horizon = self.horizon();
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }
        if horizon > max_horizon {
            return Err(ForecastError::HorizonTooLarge {
                requested: horizon,
                max: max_horizon,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_labels_define_horizon() {
        let request = ForecastRequest::new(12)
            .with_target_labels(&["2025-01", "2025-02"])
            .unwrap();

        assert_eq!(request.horizon(), 2);
        assert!(request.validate(120).is_ok());
    }

    #[test]
    fn test_invalid_target_label() {
        let result = ForecastRequest::new(1).with_target_labels(&["2025-1x"]);
        assert!(matches!(result, Err(ForecastError::InvalidMonth(_))));
    }

    #[test]
    fn test_resolved_algorithms() {
        assert_eq!(ForecastRequest::new(3).resolved_algorithms().len(), 7);

        let request = ForecastRequest::new(3).with_algorithms(vec![
            AlgorithmId::Ensemble,
            AlgorithmId::MovingAverage,
            AlgorithmId::Ensemble,
        ]);
        assert_eq!(
            request.resolved_algorithms(),
            vec![AlgorithmId::Ensemble, AlgorithmId::MovingAverage]
        );
    }

    #[test]
    fn test_horizon_bounds() {
        assert_eq!(
            ForecastRequest::new(0).validate(120),
            Err(ForecastError::InvalidHorizon(0))
        );
        assert_eq!(
            ForecastRequest::new(121).validate(120),
            Err(ForecastError::HorizonTooLarge {
                requested: 121,
                max: 120
            })
        );
    }
}
