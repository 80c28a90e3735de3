//! 物料與庫存模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料層級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// 原物料
    RawMaterial,
    /// 包材
    Packaging,
    /// 半成品
    SemiFinished,
    /// 成品
    FinishedGood,
}

/// 物料主檔資訊（由呼叫端提供，預測核心不解析物料ID內容）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<ItemCategory>,
}

impl ItemInfo {
    pub fn new(item_id: String, name: String) -> Self {
        Self {
            item_id,
            name,
            category: None,
        }
    }

    /// 建構器模式：設置物料層級
    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// 目前庫存水位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub item_id: String,

    /// 現有庫存
    pub quantity: Decimal,

    /// 最低庫存
    pub min_stock: Decimal,

    /// 單位成本
    pub unit_cost: Decimal,
}

impl InventoryLevel {
    pub fn new(item_id: String, quantity: Decimal, min_stock: Decimal, unit_cost: Decimal) -> Self {
        Self {
            item_id,
            quantity,
            min_stock,
            unit_cost,
        }
    }

    /// 檢查庫存是否低於最低庫存
    pub fn is_below_min_stock(&self) -> bool {
        self.quantity < self.min_stock
    }

    /// 庫存金額
    pub fn stock_value(&self) -> Decimal {
        self.quantity * self.unit_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_level() {
        let level = InventoryLevel::new(
            "PKG-001".to_string(),
            Decimal::from(40),
            Decimal::from(50),
            Decimal::new(125, 2),
        );

        assert!(level.is_below_min_stock());
        assert_eq!(level.stock_value(), Decimal::from(50));
    }

    #[test]
    fn test_item_info_category() {
        let info = ItemInfo::new("SF-010".to_string(), "半成品 A".to_string())
            .with_category(ItemCategory::SemiFinished);

        assert_eq!(info.category, Some(ItemCategory::SemiFinished));
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["category"], "semi_finished");
    }
}
