//! 預測配置模型

use serde::{Deserialize, Serialize};

use crate::{ForecastError, Result};

/// 加權組合所使用的誤差指標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMetric {
    Mae,
    Rmse,
}

/// 誤差加權組合的權重公式：w = 1 / (誤差 + epsilon)^power，再正規化
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeighting {
    pub metric: ErrorMetric,
    pub epsilon: f64,
    pub power: f64,
}

impl Default for EnsembleWeighting {
    fn default() -> Self {
        Self {
            metric: ErrorMetric::Mae,
            epsilon: 1e-6,
            power: 1.0,
        }
    }
}

/// 預測參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// 移動平均視窗（月）
    pub moving_average_window: usize,

    /// 指數平滑係數 alpha，範圍 (0, 1]
    pub smoothing_alpha: f64,

    /// 季節週期長度（月）
    pub seasonal_period: usize,

    /// 簡化 ARIMA 的殘差延續係數，範圍 [0, 1]
    pub ar_weight: f64,

    /// 回測保留的尾端月數
    pub backtest_window: usize,

    /// 加權組合的權重公式
    pub weighting: EnsembleWeighting,

    /// 預測月數上限
    pub max_horizon: u32,

    /// 物料數量達到此值時改用並行計算
    pub parallel_threshold: usize,

    /// 嚴格模式：遇到格式錯誤的紀錄立即回傳錯誤
    /// - true: 第一筆格式錯誤即中止
    /// - false: 記錄於結果的 rejected 清單，繼續計算（預設）
    pub strict_observations: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            moving_average_window: 3,
            smoothing_alpha: 0.3,
            seasonal_period: 12,
            ar_weight: 0.7,
            backtest_window: 6,
            weighting: EnsembleWeighting::default(),
            max_horizon: 120,
            parallel_threshold: 64,
            strict_observations: false,
        }
    }
}

impl ForecastConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入配置（缺漏欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置移動平均視窗
    pub fn with_moving_average_window(mut self, window: usize) -> Self {
        self.moving_average_window = window;
        self
    }

    /// 建構器模式：設置指數平滑係數
    pub fn with_smoothing_alpha(mut self, alpha: f64) -> Self {
        self.smoothing_alpha = alpha;
        self
    }

    /// 建構器模式：設置季節週期
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// 建構器模式：設置殘差延續係數
    pub fn with_ar_weight(mut self, weight: f64) -> Self {
        self.ar_weight = weight;
        self
    }

    /// 建構器模式：設置回測視窗
    pub fn with_backtest_window(mut self, window: usize) -> Self {
        self.backtest_window = window;
        self
    }

    /// 建構器模式：設置加權公式
    pub fn with_weighting(mut self, weighting: EnsembleWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// 建構器模式：設置預測月數上限
    pub fn with_max_horizon(mut self, max_horizon: u32) -> Self {
        self.max_horizon = max_horizon;
        self
    }

    /// 建構器模式：設置並行門檻
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// 建構器模式：設置嚴格模式
    pub fn with_strict_observations(mut self, strict: bool) -> Self {
        self.strict_observations = strict;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.moving_average_window == 0 {
            return Err(ForecastError::InvalidConfig(
                "moving_average_window 必須至少為 1".to_string(),
            ));
        }
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "smoothing_alpha 必須在 (0, 1] 之間，收到 {}",
                self.smoothing_alpha
            )));
        }
        if self.seasonal_period < 2 {
            return Err(ForecastError::InvalidConfig(
                "seasonal_period 必須至少為 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ar_weight) {
            return Err(ForecastError::InvalidConfig(format!(
                "ar_weight 必須在 [0, 1] 之間，收到 {}",
                self.ar_weight
            )));
        }
        if self.backtest_window == 0 {
            return Err(ForecastError::InvalidConfig(
                "backtest_window 必須至少為 1".to_string(),
            ));
        }
        if !(self.weighting.epsilon > 0.0 && self.weighting.epsilon.is_finite()) {
            return Err(ForecastError::InvalidConfig(
                "weighting.epsilon 必須為正數".to_string(),
            ));
        }
        if !(self.weighting.power > 0.0 && self.weighting.power.is_finite()) {
            return Err(ForecastError::InvalidConfig(
                "weighting.power 必須為正數".to_string(),
            ));
        }
        if self.max_horizon == 0 {
            return Err(ForecastError::InvalidConfig(
                "max_horizon 必須至少為 1".to_string(),
            ));
        }
        Ok(())
    }
}
