//! 預測演算法實現
//!
//! 每個基礎演算法是一個純函數：輸入排序後的歷史序列與目標月份，
//! 輸出與目標月份一一對應的非負預測值。歷史不足時降級而不報錯。

use std::collections::BTreeMap;

use forecast_core::{AlgorithmId, ForecastConfig, HistorySeries, YearMonth};

use crate::accuracy::AccuracyEvaluator;
use crate::ensemble::EnsembleCombiner;
use crate::time_series::{self, clamp_quantity, LinearTrend};

/// 單一演算法的輸出
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmOutput {
    /// 預測值（與目標月份順序一致）
    pub predictions: Vec<f64>,

    /// 歷史資料不足，使用了降級策略（最後一筆或 0）
    pub degraded: bool,
}

impl AlgorithmOutput {
    /// 正常擬合的輸出
    pub fn fitted(predictions: Vec<f64>) -> Self {
        Self {
            predictions: predictions.into_iter().map(clamp_quantity).collect(),
            degraded: false,
        }
    }

    /// 降級輸出
    pub fn degraded(predictions: Vec<f64>) -> Self {
        Self {
            predictions: predictions.into_iter().map(clamp_quantity).collect(),
            degraded: true,
        }
    }
}

/// 演算法輸入
#[derive(Debug, Clone, Copy)]
pub struct ForecastContext<'a> {
    pub history: &'a HistorySeries,
    pub targets: &'a [YearMonth],
    pub config: &'a ForecastConfig,
}

impl<'a> ForecastContext<'a> {
    pub fn new(
        history: &'a HistorySeries,
        targets: &'a [YearMonth],
        config: &'a ForecastConfig,
    ) -> Self {
        Self {
            history,
            targets,
            config,
        }
    }

    /// 預測月數
    pub fn horizon(&self) -> usize {
        self.targets.len()
    }

    /// 每個目標月份距離最後觀測月份的步數（至少為 1）
    pub fn offsets(&self) -> Vec<f64> {
        match self.history.last_month() {
            Some(last) => self
                .targets
                .iter()
                .map(|target| last.months_until(*target).max(1) as f64)
                .collect(),
            None => (1..=self.targets.len()).map(|step| step as f64).collect(),
        }
    }

    /// 整段期間維持同一個值
    fn flat(&self, value: f64) -> Vec<f64> {
        vec![value; self.horizon()]
    }

    /// 降級策略：有資料時延用最後一筆，否則為 0
    fn fallback(&self) -> AlgorithmOutput {
        AlgorithmOutput::degraded(self.flat(self.history.last_value().unwrap_or(0.0)))
    }
}

/// 基礎演算法函數簽名
pub type AlgorithmFn = fn(&ForecastContext<'_>) -> AlgorithmOutput;

/// 預測演算法集合
pub struct ForecastAlgorithms;

impl ForecastAlgorithms {
    /// 依演算法ID查找基礎演算法（組合演算法回傳 None）
    pub fn lookup(id: AlgorithmId) -> Option<AlgorithmFn> {
        match id {
            AlgorithmId::MovingAverage => Some(Self::moving_average),
            AlgorithmId::LinearRegression => Some(Self::linear_regression),
            AlgorithmId::SeasonalTrend => Some(Self::seasonal_trend),
            AlgorithmId::ExponentialSmoothing => Some(Self::exponential_smoothing),
            AlgorithmId::ArimaLike => Some(Self::arima_like),
            AlgorithmId::Ensemble | AlgorithmId::WeightedEnsemble => None,
        }
    }

    /// 執行一組演算法
    ///
    /// 回傳順序與 `algorithms` 相同。只要請求了任一組合演算法，
    /// 五個基礎演算法都會執行以供組合使用。
    pub fn run(
        history: &HistorySeries,
        targets: &[YearMonth],
        algorithms: &[AlgorithmId],
        config: &ForecastConfig,
    ) -> Vec<(AlgorithmId, Vec<f64>)> {
        let ctx = ForecastContext::new(history, targets, config);
        let needs_all_base = algorithms.iter().any(|id| id.is_ensemble());

        let mut base_outputs: BTreeMap<AlgorithmId, AlgorithmOutput> = BTreeMap::new();
        for id in AlgorithmId::BASE {
            if needs_all_base || algorithms.contains(&id) {
                if let Some(algorithm) = Self::lookup(id) {
                    base_outputs.insert(id, algorithm(&ctx));
                }
            }
        }

        algorithms
            .iter()
            .map(|id| {
                let predictions = match id {
                    AlgorithmId::Ensemble => {
                        EnsembleCombiner::combine(&base_outputs, None, ctx.horizon())
                    }
                    AlgorithmId::WeightedEnsemble => {
                        let weights = AccuracyEvaluator::ensemble_weights(history, config);
                        EnsembleCombiner::combine(&base_outputs, Some(&weights), ctx.horizon())
                    }
                    _ => base_outputs
                        .get(id)
                        .map(|output| output.predictions.clone())
                        .unwrap_or_else(|| ctx.flat(0.0)),
                };
                (*id, predictions)
            })
            .collect()
    }

    /// 移動平均：尾端視窗平均值，整段期間持平
    pub fn moving_average(ctx: &ForecastContext<'_>) -> AlgorithmOutput {
        let values = ctx.history.values();
        if values.is_empty() {
            return ctx.fallback();
        }

        let window = ctx.config.moving_average_window.clamp(1, values.len());
        let average = time_series::mean(&values[values.len() - window..]);
        AlgorithmOutput::fitted(ctx.flat(average))
    }

    /// 線性迴歸：以觀測索引擬合後外推
    pub fn linear_regression(ctx: &ForecastContext<'_>) -> AlgorithmOutput {
        let values = ctx.history.values();
        if values.len() < 2 {
            return ctx.fallback();
        }

        let trend = time_series::linear_fit(values);
        let last_index = (values.len() - 1) as f64;
        AlgorithmOutput::fitted(
            ctx.offsets()
                .into_iter()
                .map(|offset| trend.at(last_index + offset))
                .collect(),
        )
    }

    /// 季節性趨勢：線性趨勢 + 目標月份所在相位的季節指數
    ///
    /// 歷史不足一個完整週期時季節指數全為 0，結果等同線性迴歸。
    pub fn seasonal_trend(ctx: &ForecastContext<'_>) -> AlgorithmOutput {
        let values = ctx.history.values();
        if values.len() < 2 {
            return ctx.fallback();
        }

        let period = ctx.config.seasonal_period;
        let phases: Vec<usize> = ctx
            .history
            .months()
            .iter()
            .map(|month| seasonal_phase(*month, period))
            .collect();
        let index = time_series::seasonal_index_by_phase(values, &phases, period);

        let trend = time_series::linear_fit(values);
        let last_index = (values.len() - 1) as f64;
        AlgorithmOutput::fitted(
            ctx.targets
                .iter()
                .zip(ctx.offsets())
                .map(|(target, offset)| {
                    let seasonal = index
                        .get(seasonal_phase(*target, period))
                        .copied()
                        .unwrap_or(0.0);
                    trend.at(last_index + offset) + seasonal
                })
                .collect(),
        )
    }

    /// 指數平滑：最後的平滑值，整段期間持平
    pub fn exponential_smoothing(ctx: &ForecastContext<'_>) -> AlgorithmOutput {
        let smoothed =
            time_series::exponential_smooth(ctx.history.values(), ctx.config.smoothing_alpha);
        match smoothed.last() {
            Some(&level) => AlgorithmOutput::fitted(ctx.flat(level)),
            None => ctx.fallback(),
        }
    }

    /// 簡化 ARIMA（近似法，非 Box-Jenkins 模型）
    ///
    /// 以最後觀測值與線性趨勢加權組合：最後一期相對趨勢線的殘差
    /// 每往後一期乘上 `ar_weight`（φ）逐步回歸趨勢線，
    /// 即 `trend(n-1+h) + φ^h * (last - trend(n-1))`。
    /// 沒有差分階數選擇，也沒有 AIC 搜尋。
    pub fn arima_like(ctx: &ForecastContext<'_>) -> AlgorithmOutput {
        let values = ctx.history.values();
        let Some(last) = ctx.history.last_value() else {
            return ctx.fallback();
        };
        if values.len() < 2 {
            return ctx.fallback();
        }

        let trend: LinearTrend = time_series::linear_fit(values);
        let last_index = (values.len() - 1) as f64;
        let residual = last - trend.at(last_index);
        let phi = ctx.config.ar_weight;

        AlgorithmOutput::fitted(
            ctx.offsets()
                .into_iter()
                .map(|h| trend.at(last_index + h) + phi.powf(h) * residual)
                .collect(),
        )
    }
}

/// 月份在季節週期中的相位（週期 12 時即為日曆月份位置）
fn seasonal_phase(month: YearMonth, period: usize) -> usize {
    if period == 0 {
        return 0;
    }
    let absolute = i64::from(month.year()) * 12 + i64::from(month.month0());
    absolute.rem_euclid(period as i64) as usize
}
