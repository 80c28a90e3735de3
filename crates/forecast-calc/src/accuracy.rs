//! 回測準確度評估

use std::collections::BTreeMap;

use forecast_core::{
    AccuracyScore, AlgorithmId, ForecastConfig, HistorySeries, RejectedObservation,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::algorithms::ForecastAlgorithms;
use crate::ensemble::EnsembleCombiner;
use crate::ForecastWarning;

/// （實際值, 預測值）配對
pub type ErrorPair = (f64, f64);

/// 多物料回測報告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    /// 保留的尾端月數
    pub test_window: usize,

    /// 各演算法的合併分數（所有物料的配對合併後計算）
    pub scores: BTreeMap<AlgorithmId, AccuracyScore>,

    /// 各物料的個別分數
    pub per_item: BTreeMap<String, Vec<AccuracyScore>>,

    /// 納入評估的物料
    pub evaluated_items: Vec<String>,

    /// 歷史長度不超過保留月數而略過的物料
    pub skipped_items: Vec<String>,

    /// 格式錯誤、未納入回測的紀錄
    pub rejected: Vec<RejectedObservation>,

    /// 警告信息
    pub warnings: Vec<ForecastWarning>,
}

impl AccuracyReport {
    /// 指定演算法的合併分數
    pub fn score(&self, algorithm: AlgorithmId) -> Option<&AccuracyScore> {
        self.scores.get(&algorithm)
    }
}

/// 準確度評估器
pub struct AccuracyEvaluator;

impl AccuracyEvaluator {
    /// 平均絕對誤差；沒有配對時回傳 None
    pub fn mae(pairs: &[ErrorPair]) -> Option<f64> {
        if pairs.is_empty() {
            return None;
        }
        let total: f64 = pairs.iter().map(|(actual, predicted)| (actual - predicted).abs()).sum();
        Some(total / pairs.len() as f64)
    }

    /// 均方根誤差；沒有配對時回傳 None
    pub fn rmse(pairs: &[ErrorPair]) -> Option<f64> {
        if pairs.is_empty() {
            return None;
        }
        let total: f64 = pairs
            .iter()
            .map(|(actual, predicted)| (actual - predicted).powi(2))
            .sum();
        Some((total / pairs.len() as f64).sqrt())
    }

    /// 由配對計算分數
    pub fn score(algorithm: AlgorithmId, pairs: &[ErrorPair]) -> AccuracyScore {
        match (Self::mae(pairs), Self::rmse(pairs)) {
            (Some(mae), Some(rmse)) => AccuracyScore::new(algorithm, mae, rmse, pairs.len()),
            _ => AccuracyScore::unavailable(algorithm),
        }
    }

    /// 單一序列回測
    ///
    /// 保留尾端 `test_window` 個月作為測試資料，以前段訓練並預測。
    /// 歷史長度不超過 `test_window` 時回傳 None（不產生退化分數）。
    pub fn backtest_series(
        series: &HistorySeries,
        test_window: usize,
        algorithms: &[AlgorithmId],
        config: &ForecastConfig,
    ) -> Option<Vec<(AlgorithmId, Vec<ErrorPair>)>> {
        if test_window == 0 || series.len() <= test_window {
            return None;
        }

        let (train, test) = series.split_at(series.len() - test_window);
        let predictions = ForecastAlgorithms::run(&train, test.months(), algorithms, config);

        Some(
            predictions
                .into_iter()
                .map(|(id, predicted)| {
                    let pairs = test
                        .values()
                        .iter()
                        .copied()
                        .zip(predicted)
                        .collect::<Vec<ErrorPair>>();
                    (id, pairs)
                })
                .collect(),
        )
    }

    /// 多物料回測
    ///
    /// 合併分數是把所有物料的配對合在一起後計算，
    /// 而不是平均各物料的分數，避免觀測數少的物料被放大。
    pub fn evaluate(
        series: &[HistorySeries],
        test_window: usize,
        algorithms: &[AlgorithmId],
        config: &ForecastConfig,
    ) -> AccuracyReport {
        let backtest = |s: &HistorySeries| {
            (
                s.item_id.clone(),
                Self::backtest_series(s, test_window, algorithms, config),
            )
        };

        let outcomes: Vec<(String, Option<Vec<(AlgorithmId, Vec<ErrorPair>)>>)> =
            if series.len() >= config.parallel_threshold {
                series.par_iter().map(backtest).collect()
            } else {
                series.iter().map(backtest).collect()
            };

        let mut pooled: BTreeMap<AlgorithmId, Vec<ErrorPair>> = algorithms
            .iter()
            .map(|id| (*id, Vec::new()))
            .collect();
        let mut per_item = BTreeMap::new();
        let mut evaluated_items = Vec::new();
        let mut skipped_items = Vec::new();

        for (item_id, outcome) in outcomes {
            match outcome {
                Some(pairs_by_algorithm) => {
                    let item_scores = pairs_by_algorithm
                        .iter()
                        .map(|(id, pairs)| Self::score(*id, pairs))
                        .collect();
                    for (id, pairs) in pairs_by_algorithm {
                        pooled.entry(id).or_default().extend(pairs);
                    }
                    per_item.insert(item_id.clone(), item_scores);
                    evaluated_items.push(item_id);
                }
                None => {
                    tracing::debug!("物料 {} 歷史不足 {} 個月，略過回測", item_id, test_window + 1);
                    skipped_items.push(item_id);
                }
            }
        }

        let scores = pooled
            .iter()
            .map(|(id, pairs)| (*id, Self::score(*id, pairs)))
            .collect();

        AccuracyReport {
            test_window,
            scores,
            per_item,
            evaluated_items,
            skipped_items,
            rejected: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 誤差加權組合的權重
    ///
    /// 以該物料自身歷史回測五個基礎演算法；短歷史時保留月數
    /// 縮為歷史長度的一半，仍無法回測則等權重。
    pub fn ensemble_weights(
        series: &HistorySeries,
        config: &ForecastConfig,
    ) -> BTreeMap<AlgorithmId, f64> {
        let window = config.backtest_window.min(series.len() / 2);

        let scores: Vec<AccuracyScore> =
            match Self::backtest_series(series, window, &AlgorithmId::BASE, config) {
                Some(pairs_by_algorithm) => pairs_by_algorithm
                    .iter()
                    .map(|(id, pairs)| Self::score(*id, pairs))
                    .collect(),
                None => AlgorithmId::BASE
                    .iter()
                    .map(|id| AccuracyScore::unavailable(*id))
                    .collect(),
            };

        EnsembleCombiner::inverse_error_weights(&scores, &config.weighting)
    }
}
