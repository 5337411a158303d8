//! 入力ファイル収集モジュール
//!
//! ファイル指定・フォルダ指定を認識対象ファイルの一覧に展開する。

use crate::error::{SheetError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// 認識対象ファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub file_type: String,
    /// 読み込み確認済みのバイト数（`check_sources` 実行時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// 読み込んだファイル内容
#[derive(Debug, Clone)]
pub struct SourceData {
    pub buffer: Vec<u8>,
    pub file_name: String,
    pub file_type: String,
}

/// 拡張子からMIMEタイプを判定
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn source_file(path: &Path) -> SourceFile {
    SourceFile {
        path: path.to_path_buf(),
        file_name: file_name_of(path),
        file_type: mime_type(path).to_string(),
        size: None,
    }
}

/// フォルダ直下のファイルを列挙（再帰しない）
pub fn scan_folder(folder: &Path) -> Result<Vec<SourceFile>> {
    if !folder.is_dir() {
        return Err(SheetError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<SourceFile> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)  // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| source_file(e.path()))
        .collect();

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    debug!(folder = %folder.display(), count = files.len(), "フォルダをスキャン");
    Ok(files)
}

/// ファイル・フォルダ指定を展開
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            files.extend(scan_folder(path)?);
        } else if path.is_file() {
            files.push(source_file(path));
        } else {
            return Err(SheetError::FileNotFound(path.display().to_string()));
        }
    }

    Ok(files)
}

/// ファイルを読み込む
pub fn read_source(path: &Path) -> Result<SourceData> {
    let buffer = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SheetError::FileNotFound(path.display().to_string()),
        _ => SheetError::Io(e),
    })?;

    Ok(SourceData {
        buffer,
        file_name: file_name_of(path),
        file_type: mime_type(path).to_string(),
    })
}

/// 各ファイルを実際に読み込み、バイト数を付与する
///
/// 読めないファイルが1つでもあればエラー。
pub fn check_sources(files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
    files
        .into_iter()
        .map(|file| {
            let data = read_source(&file.path)?;
            debug!(file = %data.file_name, mime = %data.file_type, bytes = data.buffer.len(), "読み込み確認");
            Ok(SourceFile {
                size: Some(data.buffer.len() as u64),
                ..file
            })
        })
        .collect()
}
