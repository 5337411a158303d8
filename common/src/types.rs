//! 推論結果レコードの型定義
//!
//! 外部の画像認識ステップが出力するレコード:
//! - PredictionRecord: 1画像につき1件以上
//! - PredictionRow: シート出力に必要な項目を取り出すトレイト

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 推論結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    /// 画像名（グループ化キー）
    #[serde(alias = "image_name")]
    pub image_name: String,

    /// 元画像のパス（無い場合はサムネイルなし）
    #[serde(default, alias = "orgin_path", alias = "origin_path")]
    pub origin_path: Option<String>,

    /// タスク種別（複数シート出力時の分割キー）
    #[serde(alias = "type")]
    pub category: String,

    /// 認識結果
    pub content: String,
}

impl PredictionRecord {
    pub fn new(image_name: &str, category: &str, content: &str) -> Self {
        Self {
            image_name: image_name.to_string(),
            origin_path: None,
            category: category.to_string(),
            content: content.to_string(),
        }
    }

    pub fn with_origin_path(mut self, path: impl Into<String>) -> Self {
        self.origin_path = Some(path.into());
        self
    }
}

/// シート出力用のデータトレイト（異なるレコード型に対応）
pub trait PredictionRow {
    fn image_name(&self) -> &str;
    /// 空文字列は「パスなし」として扱う
    fn origin_path(&self) -> Option<&str>;
    fn category(&self) -> &str;
    fn content(&self) -> &str;

    /// 名前/パス列に表示する値
    fn display_name(&self) -> &str {
        self.origin_path().unwrap_or_else(|| self.image_name())
    }
}

impl PredictionRow for PredictionRecord {
    fn image_name(&self) -> &str { &self.image_name }
    fn origin_path(&self) -> Option<&str> {
        self.origin_path.as_deref().filter(|p| !p.trim().is_empty())
    }
    fn category(&self) -> &str { &self.category }
    fn content(&self) -> &str { &self.content }
}

/// レコード列を検証
///
/// レイアウト開始前に呼び出し、書き込み途中での失敗を防ぐ。
pub fn validate_records<T: PredictionRow>(records: &[T]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        if record.image_name().trim().is_empty() {
            return Err(Error::Validation {
                index,
                reason: "imageName が空です".to_string(),
            });
        }
    }
    Ok(())
}

/// JSON配列をパースして検証
pub fn parse_records(json: &str) -> Result<Vec<PredictionRecord>> {
    let records: Vec<PredictionRecord> = serde_json::from_str(json)?;
    validate_records(&records)?;
    Ok(records)
}
