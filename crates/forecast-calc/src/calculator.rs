//! 需求預測主計算器

use std::collections::HashMap;

use forecast_core::{
    AlgorithmId, ForecastConfig, ForecastError, ForecastPoint, ForecastRequest, ForecastResult,
    HistorySeries, ItemInfo, RawObservation, Result, YearMonth,
};
use rayon::prelude::*;

use crate::accuracy::{AccuracyEvaluator, AccuracyReport};
use crate::algorithms::ForecastAlgorithms;
use crate::grouping::ObservationGrouper;
use crate::{ForecastRun, ForecastWarning};

/// 需求預測計算器
///
/// 無狀態：每次呼叫都只依據傳入的歷史資料重新計算。
#[derive(Debug, Clone)]
pub struct ForecastCalculator {
    config: ForecastConfig,
}

impl ForecastCalculator {
    /// 創建新的計算器（配置無效時回傳錯誤）
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 獲取配置引用
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// 主預測入口
    ///
    /// 按物料分組後，對每個物料執行請求的演算法。有登記但沒有
    /// 有效歷史的物料仍會出現在結果中，預測值為 0。
    pub fn smart_forecast(
        &self,
        observations: &[RawObservation],
        request: &ForecastRequest,
    ) -> Result<ForecastRun> {
        tracing::info!(
            "開始需求預測：紀錄 {} 筆，預測 {} 個月",
            observations.len(),
            request.horizon()
        );

        let start_time = std::time::Instant::now();
        request.validate(self.config.max_horizon)?;
        let algorithms = request.resolved_algorithms();

        // Step 1: 正規化與分組
        tracing::debug!("Step 1: 紀錄分組");
        let grouped = ObservationGrouper::group(observations, self.config.strict_observations)?;
        tracing::debug!("物料數量: {}", grouped.series.len());

        let mut run = ForecastRun::empty();
        for rejected in &grouped.rejected {
            run.add_warning(ForecastWarning::error(
                rejected.item_id.clone().unwrap_or_default(),
                rejected.reason.clone(),
            ));
        }
        run.rejected = grouped.rejected;
        run.warnings.extend(grouped.warnings);

        if grouped.series.is_empty() {
            run.calculation_time_ms = Some(start_time.elapsed().as_millis());
            tracing::info!("沒有可預測的物料");
            return Ok(run);
        }

        // Step 2: 決定目標月份
        tracing::debug!("Step 2: 目標月份");
        let targets = self.resolve_target_months(request, grouped.latest_month)?;
        tracing::debug!("目標月份: {:?}", targets);

        // Step 3: 逐物料預測
        tracing::debug!("Step 3: 逐物料預測");
        let catalog: HashMap<&str, &ItemInfo> = request
            .items
            .iter()
            .map(|info| (info.item_id.as_str(), info))
            .collect();

        let series: Vec<&HistorySeries> = grouped.series.values().collect();
        let forecast_item = |history: &&HistorySeries| {
            self.forecast_item(history, &targets, &algorithms, catalog.get(history.item_id.as_str()).copied())
        };

        run.results = if series.len() >= self.config.parallel_threshold {
            tracing::debug!("物料數量 {} 達並行門檻，使用並行計算", series.len());
            series.par_iter().map(forecast_item).collect()
        } else {
            series.iter().map(forecast_item).collect()
        };

        for history in series.iter().filter(|s| s.is_empty()) {
            run.add_warning(ForecastWarning::info(
                history.item_id.clone(),
                "無有效歷史資料，預測值為 0".to_string(),
            ));
        }

        run.calculation_time_ms = Some(start_time.elapsed().as_millis());
        tracing::info!("需求預測完成，耗時 {:?}", start_time.elapsed());
        tracing::info!("預測物料數量: {}", run.results.len());

        Ok(run)
    }

    /// 單一物料預測
    ///
    /// 預測點依月份為主序、演算法請求順序為次序排列。
    pub fn forecast_series(
        &self,
        history: &HistorySeries,
        targets: &[YearMonth],
        algorithms: &[AlgorithmId],
    ) -> Vec<ForecastPoint> {
        let predictions = ForecastAlgorithms::run(history, targets, algorithms, &self.config);

        let mut points = Vec::with_capacity(targets.len() * predictions.len());
        for (step, month) in targets.iter().enumerate() {
            for (algorithm, values) in &predictions {
                points.push(ForecastPoint::new(
                    *month,
                    *algorithm,
                    values.get(step).copied().unwrap_or(0.0),
                ));
            }
        }
        points
    }

    /// 回測評估
    ///
    /// `algorithms` 為空時評估全部演算法。
    pub fn evaluate_accuracy(
        &self,
        observations: &[RawObservation],
        test_window: usize,
        algorithms: &[AlgorithmId],
    ) -> Result<AccuracyReport> {
        if test_window == 0 {
            return Err(ForecastError::InvalidConfig(
                "test_window 必須至少為 1".to_string(),
            ));
        }

        tracing::info!(
            "開始回測評估：紀錄 {} 筆，保留 {} 個月",
            observations.len(),
            test_window
        );

        let algorithms = if algorithms.is_empty() {
            AlgorithmId::ALL.to_vec()
        } else {
            algorithms.to_vec()
        };

        let grouped = ObservationGrouper::group(observations, self.config.strict_observations)?;
        let series: Vec<HistorySeries> = grouped.series.into_values().collect();

        let mut report =
            AccuracyEvaluator::evaluate(&series, test_window, &algorithms, &self.config);
        for rejected in &grouped.rejected {
            report.warnings.push(ForecastWarning::error(
                rejected.item_id.clone().unwrap_or_default(),
                rejected.reason.clone(),
            ));
        }
        report.warnings.extend(grouped.warnings);
        report.rejected = grouped.rejected;

        tracing::info!(
            "回測完成：評估 {} 個物料，略過 {} 個",
            report.evaluated_items.len(),
            report.skipped_items.len()
        );

        Ok(report)
    }

    fn forecast_item(
        &self,
        history: &HistorySeries,
        targets: &[YearMonth],
        algorithms: &[AlgorithmId],
        info: Option<&ItemInfo>,
    ) -> ForecastResult {
        tracing::debug!("預測物料: {} (歷史 {} 個月)", history.item_id, history.len());

        ForecastResult {
            item_id: history.item_id.clone(),
            item_name: info
                .map(|i| i.name.clone())
                .unwrap_or_else(|| history.item_id.clone()),
            category: info.and_then(|i| i.category),
            forecasts: self.forecast_series(history, targets, algorithms),
        }
    }

    /// 決定目標月份
    ///
    /// 優先使用請求指定的月份；否則從整批資料最晚的月份
    /// （沒有時用基準月份）之後連續推算。
    fn resolve_target_months(
        &self,
        request: &ForecastRequest,
        latest_month: Option<YearMonth>,
    ) -> Result<Vec<YearMonth>> {
        if !request.target_months.is_empty() {
            return Ok(request.target_months.clone());
        }

        let base = latest_month
            .or(request.anchor_month)
            .ok_or(ForecastError::MissingTargetMonths)?;
        base.following(request.horizon_months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use forecast_core::{ItemCategory, RawObservation};
    use serde_json::json;

    fn calculator() -> ForecastCalculator {
        ForecastCalculator::new(ForecastConfig::default()).unwrap()
    }

    fn monthly(item: &str, start_year: i32, values: &[f64]) -> Vec<RawObservation> {
        let start = YearMonth::new(start_year, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let month = start.checked_add_months(i as u32).unwrap();
                RawObservation::new(item, month.to_string(), *v)
            })
            .collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ForecastConfig::default().with_smoothing_alpha(0.0);
        assert!(ForecastCalculator::new(config).is_err());
    }

    #[test]
    fn test_smart_forecast_point_layout() {
        let observations = monthly("RAW-001", 2024, &[100.0; 12]);
        let request = ForecastRequest::new(3).with_algorithms(vec![
            AlgorithmId::LinearRegression,
            AlgorithmId::MovingAverage,
        ]);

        let run = calculator().smart_forecast(&observations, &request).unwrap();
        let result = run.result_for("RAW-001").unwrap();

        assert_eq!(result.forecasts.len(), 6);
        let layout: Vec<(String, AlgorithmId)> = result
            .forecasts
            .iter()
            .map(|p| (p.month.to_string(), p.algorithm))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("2025-01".to_string(), AlgorithmId::LinearRegression),
                ("2025-01".to_string(), AlgorithmId::MovingAverage),
                ("2025-02".to_string(), AlgorithmId::LinearRegression),
                ("2025-02".to_string(), AlgorithmId::MovingAverage),
                ("2025-03".to_string(), AlgorithmId::LinearRegression),
                ("2025-03".to_string(), AlgorithmId::MovingAverage),
            ]
        );
        for point in &result.forecasts {
            assert_relative_eq!(point.predicted, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_defaults_to_all_algorithms() {
        let observations = monthly("RAW-001", 2024, &[10.0, 12.0, 14.0]);
        let run = calculator()
            .smart_forecast(&observations, &ForecastRequest::new(2))
            .unwrap();

        assert_eq!(run.results[0].forecasts.len(), 2 * 7);
    }

    #[test]
    fn test_item_without_history_is_kept() {
        let mut observations = monthly("RAW-001", 2024, &[10.0, 20.0]);
        observations.push(RawObservation {
            item_id: Some("NEW-001".to_string()),
            month: None,
            quantity: json!(null),
        });

        let run = calculator()
            .smart_forecast(&observations, &ForecastRequest::new(2))
            .unwrap();

        let new_item = run.result_for("NEW-001").unwrap();
        assert_eq!(new_item.forecasts.len(), 2 * 7);
        assert!(new_item.forecasts.iter().all(|p| p.predicted == 0.0));
        assert!(run
            .warnings
            .iter()
            .any(|w| w.item_id == "NEW-001" && w.message.contains("預測值為 0")));
    }

    #[test]
    fn test_malformed_observation_is_reported() {
        let mut observations = monthly("RAW-001", 2024, &[10.0, 20.0, 30.0]);
        observations.push(
            RawObservation::new("RAW-001", "2024-04", 0.0).with_quantity_value(json!("n/a")),
        );

        let run = calculator()
            .smart_forecast(&observations, &ForecastRequest::new(1))
            .unwrap();

        assert_eq!(run.rejected.len(), 1);
        assert_eq!(run.rejected[0].month.as_deref(), Some("2024-04"));
        // 被拒絕的紀錄不影響其他月份
        let ma = run.results[0].predictions_for(AlgorithmId::MovingAverage);
        assert_relative_eq!(ma[0], 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_strict_mode_surfaces_error() {
        let calculator =
            ForecastCalculator::new(ForecastConfig::default().with_strict_observations(true)).unwrap();
        let observations =
            vec![RawObservation::new("RAW-001", "2024-01", 0.0).with_quantity_value(json!([1]))];

        let result = calculator.smart_forecast(&observations, &ForecastRequest::new(1));
        assert!(matches!(result, Err(ForecastError::MalformedObservation { .. })));
    }

    #[test]
    fn test_explicit_target_months() {
        let observations = monthly("RAW-001", 2024, &[10.0, 20.0, 30.0]);
        let request = ForecastRequest::new(99)
            .with_target_labels(&["2024-05", "2024-04"])
            .unwrap()
            .with_algorithms(vec![AlgorithmId::LinearRegression]);

        let run = calculator().smart_forecast(&observations, &request).unwrap();
        let points = &run.results[0].forecasts;

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].month.to_string(), "2024-05");
        assert_relative_eq!(points[0].predicted, 50.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].predicted, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_months_follow_latest_month_in_batch() {
        let mut observations = monthly("A", 2024, &[1.0, 2.0]);
        observations.extend(monthly("B", 2024, &[1.0, 2.0, 3.0, 4.0]));

        let run = calculator()
            .smart_forecast(
                &observations,
                &ForecastRequest::new(1).with_algorithms(vec![AlgorithmId::MovingAverage]),
            )
            .unwrap();

        for result in &run.results {
            assert_eq!(result.forecasts[0].month.to_string(), "2024-05");
        }
    }

    #[test]
    fn test_missing_target_months() {
        let observations = vec![RawObservation {
            item_id: Some("NEW-001".to_string()),
            ..RawObservation::default()
        }];

        let result = calculator().smart_forecast(&observations, &ForecastRequest::new(3));
        assert_eq!(result.unwrap_err(), ForecastError::MissingTargetMonths);

        let anchored = ForecastRequest::new(3).with_anchor_month(YearMonth::new(2025, 6).unwrap());
        let run = calculator().smart_forecast(&observations, &anchored).unwrap();
        assert_eq!(run.results[0].forecasts[0].month.to_string(), "2025-07");
    }

    #[test]
    fn test_horizon_limits() {
        let observations = monthly("RAW-001", 2024, &[1.0]);
        assert_eq!(
            calculator()
                .smart_forecast(&observations, &ForecastRequest::new(0))
                .unwrap_err(),
            ForecastError::InvalidHorizon(0)
        );
        assert!(matches!(
            calculator().smart_forecast(&observations, &ForecastRequest::new(121)),
            Err(ForecastError::HorizonTooLarge { .. })
        ));
    }

    #[test]
    fn test_item_catalog_names_and_categories() {
        let observations = monthly("PKG-001", 2024, &[5.0, 6.0]);
        let request = ForecastRequest::new(1).with_items(vec![ItemInfo::new(
            "PKG-001".to_string(),
            "紙箱".to_string(),
        )
        .with_category(ItemCategory::Packaging)]);

        let run = calculator().smart_forecast(&observations, &request).unwrap();
        assert_eq!(run.results[0].item_name, "紙箱");
        assert_eq!(run.results[0].category, Some(ItemCategory::Packaging));

        let unnamed = calculator()
            .smart_forecast(&monthly("RAW-9", 2024, &[1.0]), &ForecastRequest::new(1))
            .unwrap();
        assert_eq!(unnamed.results[0].item_name, "RAW-9");
        assert_eq!(unnamed.results[0].category, None);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut observations = Vec::new();
        for item in 0..20 {
            let values: Vec<f64> = (0..14).map(|m| (item * 3 + m) as f64).collect();
            observations.extend(monthly(&format!("ITEM-{:02}", item), 2023, &values));
        }
        let request = ForecastRequest::new(4);

        let sequential = calculator().smart_forecast(&observations, &request).unwrap();
        let parallel = ForecastCalculator::new(ForecastConfig::default().with_parallel_threshold(1))
            .unwrap()
            .smart_forecast(&observations, &request)
            .unwrap();

        assert_eq!(sequential.results, parallel.results);
    }

    #[test]
    fn test_evaluate_accuracy_rejects_zero_window() {
        assert!(calculator().evaluate_accuracy(&[], 0, &[]).is_err());
    }

    #[test]
    fn test_evaluate_accuracy_reports_malformed_rows() {
        let mut observations = monthly("RAW-001", 2024, &[10.0; 12]);
        observations.push(
            RawObservation::new("RAW-001", "2025-01", 0.0).with_quantity_value(json!("twelve")),
        );
        observations.push(RawObservation::new("RAW-002", "2025-13", 4.0));

        let report = calculator()
            .evaluate_accuracy(&observations, 6, &[AlgorithmId::MovingAverage])
            .unwrap();

        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].month.as_deref(), Some("2025-01"));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.item_id == "RAW-002" && w.severity == crate::WarningSeverity::Error));
        // 正常紀錄照常回測
        assert_eq!(report.score(AlgorithmId::MovingAverage).unwrap().sample_count, 6);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rejected"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_evaluate_accuracy_defaults_to_all() {
        let observations = monthly("RAW-001", 2024, &[10.0, 12.0, 11.0, 13.0, 12.0, 14.0, 13.0, 15.0]);
        let report = calculator().evaluate_accuracy(&observations, 3, &[]).unwrap();

        assert_eq!(report.scores.len(), 7);
        assert_eq!(report.evaluated_items, vec!["RAW-001".to_string()]);
    }
}
