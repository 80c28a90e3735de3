//! 消耗紀錄模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::YearMonth;

/// 單一物料單月的實際消耗量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 物料ID
    pub item_id: String,

    /// 消耗月份
    pub month: YearMonth,

    /// 消耗數量
    pub quantity: f64,
}

impl Observation {
    /// 創建新的消耗紀錄
    pub fn new(item_id: String, month: YearMonth, quantity: f64) -> Self {
        Self {
            item_id,
            month,
            quantity,
        }
    }
}

/// 後端查詢回傳的原始消耗紀錄
///
/// 欄位可能缺漏；數量可能是數字、數字字串或 null。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default, alias = "itemId")]
    pub item_id: Option<String>,

    #[serde(default)]
    pub month: Option<String>,

    #[serde(default)]
    pub quantity: Value,
}

impl RawObservation {
    /// 創建完整的原始紀錄
    pub fn new(item_id: impl Into<String>, month: impl Into<String>, quantity: f64) -> Self {
        Self {
            item_id: Some(item_id.into()),
            month: Some(month.into()),
            quantity: serde_json::Number::from_f64(quantity)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }

    /// 建構器模式：直接指定數量欄位的原始值
    pub fn with_quantity_value(mut self, quantity: Value) -> Self {
        self.quantity = quantity;
        self
    }

    /// 物料ID（去除空白後為空視同缺漏）
    pub fn item_id(&self) -> Option<&str> {
        self.item_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// 解析數量欄位
    ///
    /// 缺漏或 null 視為 0；非數值或非有限數回傳錯誤原因。
    pub fn quantity_value(&self) -> Result<f64, String> {
        let quantity = match &self.quantity {
            Value::Null => return Ok(0.0),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| format!("數量無法轉換為數值: {}", n))?,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("數量不是數值: {:?}", s))?,
            other => return Err(format!("數量不是數值: {}", other)),
        };

        if quantity.is_finite() {
            Ok(quantity)
        } else {
            Err(format!("數量不是有限數值: {}", quantity))
        }
    }
}

/// 被拒絕的原始紀錄（格式錯誤，回報給呼叫端）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedObservation {
    pub item_id: Option<String>,
    pub month: Option<String>,
    pub reason: String,
}

impl RejectedObservation {
    pub fn new(raw: &RawObservation, reason: String) -> Self {
        Self {
            item_id: raw.item_id.clone(),
            month: raw.month.clone(),
            reason,
        }
    }
}
