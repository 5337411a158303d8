//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 入力レコードの検証エラー（index は入力配列上の位置）
    #[error("Validation error: record #{index}: {reason}")]
    Validation { index: usize, reason: String },

    /// 1画像あたりのレコード数がブロック行数を超えた
    #[error("Block overflow: {image_name} has {records} records (max {max})")]
    BlockOverflow {
        image_name: String,
        records: usize,
        max: u32,
    },

    #[cfg(feature = "excel")]
    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
