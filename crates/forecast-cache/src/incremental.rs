//! 增量預測
//!
//! 保存各物料的消耗紀錄與上次預測結果；只有歷史變動的物料
//! 才重新計算，並透過通道通知訂閱者。

use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver, Sender};

use forecast_calc::{ForecastCalculator, ForecastRun, ObservationGrouper};
use forecast_core::{ForecastRequest, ForecastResult, RawObservation, Result};
use uuid::Uuid;

use crate::dirty_tracking::DirtyTracker;

/// 預測已更新的通知
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastChanged {
    /// 本次更新的版本
    pub revision: Uuid,

    /// 重新計算（或已無紀錄而移除）的物料
    pub item_ids: Vec<String>,
}

/// 增量預測器
pub struct IncrementalForecaster {
    calculator: ForecastCalculator,
    observations: BTreeMap<String, Vec<RawObservation>>,
    cache: BTreeMap<String, ForecastResult>,
    tracker: DirtyTracker,
    last_request: Option<ForecastRequest>,
    revision: Option<Uuid>,
    subscribers: Vec<Sender<ForecastChanged>>,
}

impl IncrementalForecaster {
    /// 創建新的增量預測器
    pub fn new(calculator: ForecastCalculator) -> Self {
        Self {
            calculator,
            observations: BTreeMap::new(),
            cache: BTreeMap::new(),
            tracker: DirtyTracker::new(),
            last_request: None,
            revision: None,
            subscribers: Vec::new(),
        }
    }

    /// 訂閱預測更新通知
    pub fn subscribe(&mut self) -> Receiver<ForecastChanged> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// 加入消耗紀錄，相關物料標記為髒
    ///
    /// 回傳接受的筆數；缺少物料ID的紀錄無法歸屬，直接略過。
    pub fn ingest(&mut self, records: Vec<RawObservation>) -> usize {
        let mut accepted = 0;
        for record in records {
            let Some(item_id) = record.item_id().map(str::to_string) else {
                tracing::warn!("消耗紀錄缺少物料ID，略過: {:?}", record);
                continue;
            };
            self.tracker.mark_dirty(item_id.clone());
            self.observations.entry(item_id).or_default().push(record);
            accepted += 1;
        }
        accepted
    }

    /// 以新查詢結果取代單一物料的全部歷史
    pub fn replace_history(&mut self, item_id: &str, records: Vec<RawObservation>) {
        self.observations.insert(item_id.to_string(), records);
        self.tracker.mark_dirty(item_id.to_string());
    }

    /// 所有已知物料標記為髒
    pub fn invalidate_all(&mut self) {
        self.tracker.mark_all(self.observations.keys().cloned());
    }

    /// 是否有待重算的物料
    pub fn has_pending(&self) -> bool {
        !self.tracker.is_empty()
    }

    /// 目前版本
    pub fn revision(&self) -> Option<Uuid> {
        self.revision
    }

    /// 快取中的單一物料結果
    pub fn result(&self, item_id: &str) -> Option<&ForecastResult> {
        self.cache.get(item_id)
    }

    /// 快取中的全部結果（依物料ID排序）
    pub fn results(&self) -> Vec<&ForecastResult> {
        self.cache.values().collect()
    }

    /// 重新計算髒物料
    ///
    /// 請求（含推算出的目標月份）與上次不同時全部重算。
    /// 回傳本次重算物料的計算結果；沒有需要重算的物料時回傳空結果且不通知。
    pub fn refresh(&mut self, request: &ForecastRequest) -> Result<ForecastRun> {
        let effective = self.effective_request(request)?;

        if self.last_request.as_ref() != Some(&effective) {
            tracing::debug!("預測請求變更，全部物料重算");
            self.invalidate_all();
        }

        let dirty = self.tracker.take_dirty();
        if dirty.is_empty() {
            tracing::debug!("沒有需要重算的物料");
            return Ok(ForecastRun::empty());
        }

        tracing::info!("增量預測：重算 {} 個物料", dirty.len());

        let records: Vec<RawObservation> = dirty
            .iter()
            .filter_map(|item_id| self.observations.get(item_id))
            .flatten()
            .cloned()
            .collect();

        let run = match self.calculator.smart_forecast(&records, &effective) {
            Ok(run) => run,
            Err(err) => {
                // 失敗時保留髒標記，下次再試
                self.tracker.mark_all(dirty);
                return Err(err);
            }
        };

        for result in &run.results {
            self.cache.insert(result.item_id.clone(), result.clone());
        }
        // 已沒有任何紀錄的物料不再出現在結果中
        for item_id in &dirty {
            if run.result_for(item_id).is_none() && self.cache.remove(item_id).is_some() {
                tracing::debug!("物料 {} 已無消耗紀錄，移除快取結果", item_id);
            }
        }

        let revision = Uuid::new_v4();
        self.revision = Some(revision);
        self.last_request = Some(effective);

        self.notify(ForecastChanged {
            revision,
            item_ids: dirty,
        });

        Ok(run)
    }

    /// 未指定目標月份時，以全部已知紀錄推算，確保局部重算與全量計算月份一致
    fn effective_request(&self, request: &ForecastRequest) -> Result<ForecastRequest> {
        if !request.target_months.is_empty() {
            return Ok(request.clone());
        }

        // 與全量計算相同：只有有效紀錄才推進最晚月份
        let records: Vec<RawObservation> =
            self.observations.values().flatten().cloned().collect();
        let latest = ObservationGrouper::group(&records, false)?.latest_month;

        match latest.or(request.anchor_month) {
            Some(base) => Ok(request
                .clone()
                .with_target_months(base.following(request.horizon_months)?)),
            None => Ok(request.clone()),
        }
    }

    fn notify(&mut self, event: ForecastChanged) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        tracing::debug!("已通知 {} 個訂閱者", self.subscribers.len());
    }
}
