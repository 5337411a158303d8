use crate::error::{SheetError, Result};
use predict_sheet_common::layout::THUMBNAIL_WIDTH_PX;
use predict_sheet_common::OverflowPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// サムネイル読み込み失敗時の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailPolicy {
    /// 警告を出してテキスト行のみ出力
    #[default]
    Skip,
    /// エクスポート全体を失敗させる
    Fail,
}

impl std::str::FromStr for ThumbnailPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(ThumbnailPolicy::Skip),
            "fail" => Ok(ThumbnailPolicy::Fail),
            _ => Err(format!("Unknown thumbnail policy: {}. Use skip or fail", s)),
        }
    }
}

impl std::fmt::Display for ThumbnailPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThumbnailPolicy::Skip => write!(f, "skip"),
            ThumbnailPolicy::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 出力先ディレクトリ（未設定ならドキュメントフォルダ）
    pub output_dir: Option<PathBuf>,
    pub thumbnail_width: u32,
    pub overflow: OverflowPolicy,
    pub thumbnail_errors: ThumbnailPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            thumbnail_width: THUMBNAIL_WIDTH_PX,
            overflow: OverflowPolicy::Extend,
            thumbnail_errors: ThumbnailPolicy::Skip,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SheetError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("predict-sheet").join("config.json"))
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.output_dir = Some(dir);
        self.save()
    }

    /// 出力先の解決: 設定値 → ドキュメント → ホーム → カレント
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::document_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
