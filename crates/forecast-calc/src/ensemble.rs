//! 組合預測

use std::collections::BTreeMap;

use forecast_core::{AccuracyScore, AlgorithmId, EnsembleWeighting};

use crate::algorithms::AlgorithmOutput;
use crate::time_series::clamp_quantity;

/// 組合預測計算器
pub struct EnsembleCombiner;

impl EnsembleCombiner {
    /// 參與組合的演算法
    ///
    /// 排除降級（歷史不足）的輸出；全部都降級時才全部採用，
    /// 避免降級的 0 值拉低組合結果。
    pub fn contributors(
        outputs: &BTreeMap<AlgorithmId, AlgorithmOutput>,
    ) -> Vec<(AlgorithmId, &AlgorithmOutput)> {
        let fitted: Vec<(AlgorithmId, &AlgorithmOutput)> = outputs
            .iter()
            .filter(|(_, output)| !output.degraded)
            .map(|(id, output)| (*id, output))
            .collect();

        if fitted.is_empty() {
            outputs.iter().map(|(id, output)| (*id, output)).collect()
        } else {
            fitted
        }
    }

    /// 組合多個演算法的預測
    ///
    /// `weights` 為 None 時等權重平均；否則依權重加權平均，
    /// 權重只在參與者之間重新正規化。權重總和無效時退回等權重。
    pub fn combine(
        outputs: &BTreeMap<AlgorithmId, AlgorithmOutput>,
        weights: Option<&BTreeMap<AlgorithmId, f64>>,
        horizon: usize,
    ) -> Vec<f64> {
        let contributors = Self::contributors(outputs);
        if contributors.is_empty() {
            return vec![0.0; horizon];
        }

        let raw_weights: Vec<f64> = contributors
            .iter()
            .map(|(id, _)| match weights {
                Some(weights) => weights
                    .get(id)
                    .copied()
                    .filter(|w| w.is_finite() && *w >= 0.0)
                    .unwrap_or(0.0),
                None => 1.0,
            })
            .collect();

        let total: f64 = raw_weights.iter().sum();
        let normalized: Vec<f64> = if total > 0.0 && total.is_finite() {
            raw_weights.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / contributors.len() as f64; contributors.len()]
        };

        (0..horizon)
            .map(|step| {
                let value: f64 = contributors
                    .iter()
                    .zip(&normalized)
                    .map(|((_, output), weight)| {
                        output.predictions.get(step).copied().unwrap_or(0.0) * weight
                    })
                    .sum();
                clamp_quantity(value)
            })
            .collect()
    }

    /// 誤差倒數權重
    ///
    /// `w = 1 / (誤差 + epsilon)^power`，再正規化為總和 1。
    /// 沒有任何可用分數時等權重；個別缺分數的演算法以最差誤差計。
    pub fn inverse_error_weights(
        scores: &[AccuracyScore],
        weighting: &EnsembleWeighting,
    ) -> BTreeMap<AlgorithmId, f64> {
        if scores.is_empty() {
            return BTreeMap::new();
        }

        let errors: Vec<Option<f64>> = scores
            .iter()
            .map(|score| score.error(weighting.metric).filter(|e| e.is_finite()))
            .collect();

        let worst = errors.iter().flatten().copied().fold(None, |acc: Option<f64>, e| {
            Some(acc.map_or(e, |a| a.max(e)))
        });

        let Some(worst) = worst else {
            let equal = 1.0 / scores.len() as f64;
            return scores.iter().map(|s| (s.algorithm, equal)).collect();
        };

        let raw: Vec<f64> = errors
            .iter()
            .map(|error| {
                let error = error.unwrap_or(worst).max(0.0);
                1.0 / (error + weighting.epsilon).powf(weighting.power)
            })
            .collect();

        let total: f64 = raw.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            let equal = 1.0 / scores.len() as f64;
            return scores.iter().map(|s| (s.algorithm, equal)).collect();
        }

        scores
            .iter()
            .zip(raw)
            .map(|(score, w)| (score.algorithm, w / total))
            .collect()
    }
}
