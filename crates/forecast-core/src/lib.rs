//! # Forecast Core
//!
//! 需求預測的核心資料模型與類型定義

pub mod accuracy;
pub mod config;
pub mod forecast;
pub mod item;
pub mod month;
pub mod observation;
pub mod request;
pub mod series;

// Re-export 主要類型
pub use accuracy::AccuracyScore;
pub use config::{EnsembleWeighting, ErrorMetric, ForecastConfig};
pub use forecast::{AlgorithmId, ForecastPoint, ForecastResult};
pub use item::{InventoryLevel, ItemCategory, ItemInfo};
pub use month::YearMonth;
pub use observation::{Observation, RawObservation, RejectedObservation};
pub use request::ForecastRequest;
pub use series::HistorySeries;

/// 預測錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("預測月數必須至少為 1，收到: {0}")]
    InvalidHorizon(u32),

    #[error("預測月數超過上限：要求 {requested}，上限 {max}")]
    HorizonTooLarge { requested: u32, max: u32 },

    #[error("無效的月份標籤: {0}")]
    InvalidMonth(String),

    #[error("物料 {item_id} 的消耗紀錄格式錯誤: {reason}")]
    MalformedObservation { item_id: String, reason: String },

    #[error("無法推算預測月份：未指定目標月份，且沒有任何歷史月份或基準月份")]
    MissingTargetMonths,

    #[error("無效的預測配置: {0}")]
    InvalidConfig(String),

    #[error("序列化錯誤: {0}")]
    Serialization(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
