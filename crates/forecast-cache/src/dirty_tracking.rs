//! 髒標記追蹤

use std::collections::BTreeSet;

/// 髒標記追蹤器（記錄歷史資料已變動、預測需重算的物料）
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_items: BTreeSet<String>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記物料為髒
    pub fn mark_dirty(&mut self, item_id: String) {
        self.dirty_items.insert(item_id);
    }

    /// 批次標記
    pub fn mark_all<I>(&mut self, item_ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.dirty_items.extend(item_ids);
    }

    /// 檢查物料是否為髒
    pub fn is_dirty(&self, item_id: &str) -> bool {
        self.dirty_items.contains(item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_items.is_empty()
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_items.clear();
    }

    /// 取出並清除所有髒物料（依物料ID排序）
    pub fn take_dirty(&mut self) -> Vec<String> {
        std::mem::take(&mut self.dirty_items).into_iter().collect()
    }

    /// 獲取所有髒物料
    pub fn get_dirty_items(&self) -> Vec<String> {
        self.dirty_items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_take() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty("RAW-002".to_string());
        tracker.mark_all(vec!["RAW-001".to_string(), "RAW-002".to_string()]);

        assert!(tracker.is_dirty("RAW-001"));
        assert!(!tracker.is_dirty("PKG-001"));
        assert_eq!(tracker.get_dirty_items().len(), 2);

        let taken = tracker.take_dirty();
        assert_eq!(taken, vec!["RAW-001".to_string(), "RAW-002".to_string()]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty("FG-001".to_string());
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
