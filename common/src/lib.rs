//! Prediction Sheet Common Library
//!
//! 推論結果レコードの型・グループ化・シートレイアウトの共通実装

pub mod types;
pub mod layout;
pub mod error;
pub mod grouper;
pub mod export;

pub use types::{parse_records, validate_records, PredictionRecord, PredictionRow};
pub use layout::{OverflowPolicy, SheetColumn, BLOCK_ROWS, SHEET_COLUMNS};
pub use error::{Error, Result};
pub use grouper::{group_by_image, partition_by_category, sort_by_category, sort_by_image_name, RecordGroup};
