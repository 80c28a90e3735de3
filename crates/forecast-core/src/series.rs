//! 歷史消耗序列

use serde::{Deserialize, Serialize};

use crate::{Observation, YearMonth};

/// 單一物料依月份遞增排序、去重後的消耗序列
///
/// 反序列化同樣經過 [`HistorySeries::from_sorted`] 檢查。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesFields")]
pub struct HistorySeries {
    pub item_id: String,
    months: Vec<YearMonth>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct SeriesFields {
    item_id: String,
    months: Vec<YearMonth>,
    values: Vec<f64>,
}

impl TryFrom<SeriesFields> for HistorySeries {
    type Error = String;

    fn try_from(fields: SeriesFields) -> Result<Self, Self::Error> {
        let item_id = fields.item_id.clone();
        Self::from_sorted(fields.item_id, fields.months, fields.values)
            .ok_or_else(|| format!("物料 {} 的歷史月份必須嚴格遞增且與數量筆數一致", item_id))
    }
}

impl HistorySeries {
    /// 創建空序列
    pub fn empty(item_id: String) -> Self {
        Self {
            item_id,
            months: Vec::new(),
            values: Vec::new(),
        }
    }

    /// 由消耗紀錄建立序列
    ///
    /// 同一月份重複出現時，以輸入順序中最後一筆為準。
    /// 回傳序列以及被覆蓋的重複筆數。
    pub fn from_observations(item_id: String, observations: &[Observation]) -> (Self, usize) {
        let mut entries: Vec<(YearMonth, f64)> = observations
            .iter()
            .map(|obs| (obs.month, obs.quantity))
            .collect();

        // 穩定排序：同月份保留輸入順序
        entries.sort_by_key(|(month, _)| *month);

        let mut months: Vec<YearMonth> = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        let mut duplicates = 0;

        for (month, quantity) in entries {
            if months.last() == Some(&month) {
                duplicates += 1;
                if let Some(last) = values.last_mut() {
                    *last = quantity;
                }
            } else {
                months.push(month);
                values.push(quantity);
            }
        }

        (
            Self {
                item_id,
                months,
                values,
            },
            duplicates,
        )
    }

    /// 由已排序的月份與數量直接建立（測試與回測切分用）
    ///
    /// 月份必須嚴格遞增，否則回傳 None。
    pub fn from_sorted(item_id: String, months: Vec<YearMonth>, values: Vec<f64>) -> Option<Self> {
        if months.len() != values.len() || months.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Self {
            item_id,
            months,
            values,
        })
    }

    /// 由起始月份與連續數量建立
    pub fn from_values(item_id: String, start: YearMonth, values: Vec<f64>) -> Option<Self> {
        let months = std::iter::once(Some(start))
            .chain((1..values.len() as u32).map(|offset| start.checked_add_months(offset)))
            .take(values.len())
            .collect::<Option<Vec<_>>>()?;
        Self::from_sorted(item_id, months, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn months(&self) -> &[YearMonth] {
        &self.months
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 最後一個觀測月份
    pub fn last_month(&self) -> Option<YearMonth> {
        self.months.last().copied()
    }

    /// 最後一個觀測值
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// 在指定位置切分為（訓練, 測試）兩段
    pub fn split_at(&self, index: usize) -> (HistorySeries, HistorySeries) {
        let index = index.min(self.len());
        (
            Self {
                item_id: self.item_id.clone(),
                months: self.months[..index].to_vec(),
                values: self.values[..index].to_vec(),
            },
            Self {
                item_id: self.item_id.clone(),
                months: self.months[index..].to_vec(),
                values: self.values[index..].to_vec(),
            },
        )
    }
}
