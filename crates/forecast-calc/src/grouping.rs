//! 原始消耗紀錄正規化與分組

use std::collections::BTreeMap;

use forecast_core::{
    ForecastError, HistorySeries, Observation, RawObservation, RejectedObservation, Result,
    YearMonth,
};

use crate::ForecastWarning;

/// 分組結果
#[derive(Debug, Clone, Default)]
pub struct GroupedObservations {
    /// 每個物料的歷史序列（含沒有有效歷史的物料）
    pub series: BTreeMap<String, HistorySeries>,

    /// 格式錯誤、被拒絕的紀錄
    pub rejected: Vec<RejectedObservation>,

    /// 警告信息
    pub warnings: Vec<ForecastWarning>,

    /// 整批資料中最晚的觀測月份
    pub latest_month: Option<YearMonth>,
}

/// 消耗紀錄分組器
pub struct ObservationGrouper;

impl ObservationGrouper {
    /// 正規化並按物料分組
    ///
    /// - 缺少物料ID：略過並警告
    /// - 缺少月份：登記物料但不加入歷史
    /// - 月份或數量格式錯誤：拒絕該筆（嚴格模式下直接回傳錯誤）
    /// - 同物料同月份重複：以最後一筆為準
    pub fn group(raw: &[RawObservation], strict: bool) -> Result<GroupedObservations> {
        let mut grouped = GroupedObservations::default();
        let mut buckets: BTreeMap<String, Vec<Observation>> = BTreeMap::new();

        for record in raw {
            let Some(item_id) = record.item_id() else {
                tracing::warn!("消耗紀錄缺少物料ID，略過: {:?}", record);
                grouped.warnings.push(ForecastWarning::warning(
                    String::new(),
                    "消耗紀錄缺少物料ID，已略過".to_string(),
                ));
                continue;
            };

            let observations = buckets.entry(item_id.to_string()).or_default();

            let month_label = match record.month.as_deref().map(str::trim) {
                Some(label) if !label.is_empty() => label,
                _ => {
                    grouped.warnings.push(ForecastWarning::info(
                        item_id.to_string(),
                        "消耗紀錄缺少月份，未納入歷史".to_string(),
                    ));
                    continue;
                }
            };

            let parsed = YearMonth::parse(month_label)
                .map_err(|e| e.to_string())
                .and_then(|month| record.quantity_value().map(|quantity| (month, quantity)));

            match parsed {
                Ok((month, quantity)) => {
                    observations.push(Observation::new(item_id.to_string(), month, quantity));
                }
                Err(reason) => {
                    if strict {
                        return Err(ForecastError::MalformedObservation {
                            item_id: item_id.to_string(),
                            reason,
                        });
                    }
                    tracing::warn!("物料 {} 的消耗紀錄格式錯誤: {}", item_id, reason);
                    grouped
                        .rejected
                        .push(RejectedObservation::new(record, reason));
                }
            }
        }

        for (item_id, observations) in buckets {
            let (series, duplicates) = HistorySeries::from_observations(item_id.clone(), &observations);

            if duplicates > 0 {
                tracing::warn!(
                    "物料 {} 有 {} 筆重複月份紀錄，採用最後一筆",
                    item_id,
                    duplicates
                );
                grouped.warnings.push(ForecastWarning::warning(
                    item_id.clone(),
                    format!("{} 筆重複月份紀錄，採用最後一筆", duplicates),
                ));
            }

            if let Some(last) = series.last_month() {
                grouped.latest_month = Some(grouped.latest_month.map_or(last, |m| m.max(last)));
            }

            grouped.series.insert(item_id, series);
        }

        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_groups_mixed_items() {
        let raw = vec![
            RawObservation::new("PKG-01", "2025-02", 5.0),
            RawObservation::new("RAW-01", "2025-01", 10.0),
            RawObservation::new("PKG-01", "2025-01", 4.0),
            RawObservation::new("RAW-01", "2025-03", 30.0),
        ];

        let grouped = ObservationGrouper::group(&raw, false).unwrap();

        assert_eq!(grouped.series.len(), 2);
        assert_eq!(grouped.series["PKG-01"].values(), &[4.0, 5.0]);
        assert_eq!(grouped.series["RAW-01"].values(), &[10.0, 30.0]);
        assert_eq!(grouped.latest_month, Some(YearMonth::new(2025, 3).unwrap()));
        assert!(grouped.rejected.is_empty());
    }

    #[test]
    fn test_malformed_quantity_is_rejected_but_item_kept() {
        let raw = vec![
            RawObservation::new("RAW-01", "2025-01", 0.0).with_quantity_value(json!("lots")),
            RawObservation::new("RAW-01", "2025-13", 3.0),
        ];

        let grouped = ObservationGrouper::group(&raw, false).unwrap();

        assert_eq!(grouped.rejected.len(), 2);
        assert!(grouped.series["RAW-01"].is_empty());
        assert_eq!(grouped.latest_month, None);
    }

    #[test]
    fn test_strict_mode_returns_error() {
        let raw = vec![RawObservation::new("RAW-01", "2025-01", 0.0).with_quantity_value(json!(false))];

        let result = ObservationGrouper::group(&raw, true);
        assert!(matches!(
            result,
            Err(ForecastError::MalformedObservation { ref item_id, .. }) if item_id == "RAW-01"
        ));
    }

    #[test]
    fn test_missing_fields() {
        let raw = vec![
            RawObservation::default(),
            RawObservation {
                item_id: Some("SF-01".to_string()),
                month: None,
                quantity: json!(3),
            },
            RawObservation {
                item_id: Some("SF-02".to_string()),
                month: Some("2025-04".to_string()),
                quantity: json!(null),
            },
        ];

        let grouped = ObservationGrouper::group(&raw, false).unwrap();

        assert_eq!(grouped.series.len(), 2);
        assert!(grouped.series["SF-01"].is_empty());
        assert_eq!(grouped.series["SF-02"].values(), &[0.0]);
        assert_eq!(grouped.warnings.len(), 2);
        assert!(grouped.rejected.is_empty());
    }

    #[test]
    fn test_duplicate_months_warn() {
        let raw = vec![
            RawObservation::new("FG-01", "2025-01", 1.0),
            RawObservation::new("FG-01", "2025-01", 2.0),
        ];

        let grouped = ObservationGrouper::group(&raw, false).unwrap();

        assert_eq!(grouped.series["FG-01"].values(), &[2.0]);
        assert_eq!(grouped.warnings.len(), 1);
    }
}
