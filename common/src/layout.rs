//! レイアウト設定モジュール
//!
//! 行番号はExcel表記（1始まり）で定義する。
//! rust_xlsxwriter へ渡す直前に `row_index` で0始まりへ変換すること。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================
// 行・ブロック定義
// ============================================

/// ヘッダ行
pub const HEADER_ROW: u32 = 1;

/// データ開始行
pub const FIRST_DATA_ROW: u32 = 2;

/// 1画像あたりの予約行数
pub const BLOCK_ROWS: u32 = 4;

/// サムネイル表示幅（px）
pub const THUMBNAIL_WIDTH_PX: u32 = 128;

/// ブロック内の行高さ（px）
pub const BLOCK_ROW_HEIGHT_PX: u32 = 32;

/// サムネイルを置く列（D:E、0始まり）
pub const THUMBNAIL_FIRST_COL: u16 = 3;
pub const THUMBNAIL_LAST_COL: u16 = 4;

/// D列・E列それぞれの幅（px）
pub const THUMBNAIL_COL_WIDTH_PX: u32 = 68;

/// 枠線と重ならないための余白（px）
pub const THUMBNAIL_PADDING_PX: u32 = 1;

// ============================================
// シート名
// ============================================

/// 単一シート出力時のシート名
pub const SINGLE_SHEET_NAME: &str = "表1";

/// カテゴリ別シートの接頭辞
pub const CATEGORY_SHEET_PREFIX: &str = "表_";

/// Excelのシート名最大長（文字数）
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

// ============================================
// 列定義
// ============================================

/// 列定義
#[derive(Debug, Clone, Copy)]
pub struct SheetColumn {
    pub key: &'static str,
    pub header: &'static str,
    /// None は既定幅
    pub width: Option<f64>,
}

/// 出力列（名前/パス、タスク種別、認識結果）
pub const SHEET_COLUMNS: &[SheetColumn] = &[
    SheetColumn { key: "name", header: "图片名称/路径", width: Some(40.0) },
    SheetColumn { key: "type", header: "任务类型", width: Some(15.0) },
    SheetColumn { key: "content", header: "识别结果", width: None },
];

pub const NAME_COL: u16 = 0;
pub const TYPE_COL: u16 = 1;
pub const CONTENT_COL: u16 = 2;

// ============================================
// ブロック超過ポリシー
// ============================================

/// 1画像のレコード数が BLOCK_ROWS を超えた場合の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// BLOCK_ROWS 単位でブロックを拡張
    #[default]
    Extend,
    /// 検証エラー
    Reject,
}

impl std::fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverflowPolicy::Extend => write!(f, "extend"),
            OverflowPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extend" => Ok(OverflowPolicy::Extend),
            "reject" => Ok(OverflowPolicy::Reject),
            _ => Err(format!("Unknown overflow policy: {}. Use extend or reject", s)),
        }
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// Excel行番号（1始まり）→ rust_xlsxwriter の行インデックス
#[inline]
pub fn row_index(row: u32) -> u32 {
    row - 1
}

/// `(row - FIRST_DATA_ROW) % BLOCK_ROWS == 0` となる行まで進める
pub fn align_to_block(row: u32) -> u32 {
    let row = row.max(FIRST_DATA_ROW);
    let offset = (row - FIRST_DATA_ROW) % BLOCK_ROWS;
    if offset == 0 {
        row
    } else {
        row + (BLOCK_ROWS - offset)
    }
}

/// レコード数から予約行数を計算（BLOCK_ROWS の倍数、最低1ブロック）
pub fn block_rows_for(records: usize) -> u32 {
    let blocks = (records as u32).div_ceil(BLOCK_ROWS).max(1);
    blocks * BLOCK_ROWS
}

/// ブロック内でサムネイルが占有できる領域（幅, 高さ px）
///
/// 下端・右端が次の行・列に掛からないよう、四辺の余白を差し引く。
pub fn thumbnail_box(rows: u32) -> (u32, u32) {
    let cols = (THUMBNAIL_LAST_COL - THUMBNAIL_FIRST_COL + 1) as u32;
    let width = THUMBNAIL_COL_WIDTH_PX * cols - THUMBNAIL_PADDING_PX * 2;
    let height = BLOCK_ROW_HEIGHT_PX * rows - THUMBNAIL_PADDING_PX * 2;
    (width, height)
}

/// ポリシーに従ってブロックを検証
pub fn check_block(image_name: &str, records: usize, policy: OverflowPolicy) -> Result<()> {
    if policy == OverflowPolicy::Reject && records > BLOCK_ROWS as usize {
        return Err(Error::BlockOverflow {
            image_name: image_name.to_string(),
            records,
            max: BLOCK_ROWS,
        });
    }
    Ok(())
}

/// Excelで使えない文字を置換し、長さを制限
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches('\'');
    let truncated: String = trimmed.chars().take(MAX_SHEET_NAME_CHARS).collect();
    if truncated.is_empty() {
        "_".to_string()
    } else {
        truncated
    }
}

/// カテゴリ別シート名
pub fn category_sheet_name(category: &str) -> String {
    sanitize_sheet_name(&format!("{}{}", CATEGORY_SHEET_PREFIX, category))
}

/// 既存シート名と（大文字小文字を無視して）重複しない名前を返す
pub fn unique_sheet_name(base: &str, used: &[String]) -> String {
    let taken = |candidate: &str| {
        used.iter()
            .any(|u| u.to_lowercase() == candidate.to_lowercase())
    };
    if !taken(base) {
        return base.to_string();
    }

    let mut n = 2;
    loop {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
        let head: String = base.chars().take(keep).collect();
        let candidate = format!("{}{}", head, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
