//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use predict_sheet::config::Config;
use predict_sheet::error::SheetError;
use predict_sheet::export::{self, ExportContext};
use predict_sheet::scanner;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(SheetError::FolderNotFound(_))));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path());

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// 出力先がファイルの場合はパス付きのエラー
#[tokio::test]
async fn test_output_dir_is_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    let ctx = ExportContext::from_config(&Config::default()).with_output_dir(&blocker);
    let result = export::export_json("[]", false, &ctx).await;

    match result {
        Err(SheetError::OutputDir { path, .. }) => assert_eq!(path, blocker),
        other => panic!("OutputDir エラーを期待: {:?}", other.map(|r| r.path)),
    }
}

/// 検証エラーは共通エラーとして透過的に表示される
#[tokio::test]
async fn test_validation_error_transparent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let ctx = ExportContext::from_config(&Config::default()).with_output_dir(dir.path());
    let json = r#"[{"imageName":"","category":"c","content":"X"}]"#;

    let err = export::export_json(json, true, &ctx).await.unwrap_err();
    assert!(matches!(
        err,
        SheetError::Common(predict_sheet_common::Error::Validation { index: 0, .. })
    ));
    assert!(format!("{}", err).contains("record #0"));
}

/// SheetErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        SheetError::Config("テスト設定エラー".to_string()),
        SheetError::FileNotFound("test.json".to_string()),
        SheetError::FolderNotFound("/path/to/folder".to_string()),
        SheetError::ImageLoad {
            path: "a.png".to_string(),
            reason: "broken".to_string(),
        },
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 保存エラーには対象パスが含まれる
#[test]
fn test_serialization_error_mentions_path() {
    let source = rust_xlsxwriter::Image::new_from_buffer(b"not an image")
        .err()
        .expect("不正な画像はエラーになるはず");
    let err = SheetError::Serialization {
        path: PathBuf::from("/out/2026_1_2_3_4_5.xlsx"),
        source,
    };
    assert!(format!("{}", err).contains("/out/2026_1_2_3_4_5.xlsx"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: SheetError = io_err.into();

    assert!(matches!(err, SheetError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// common::Errorからの変換
#[test]
fn test_common_error_conversion() {
    let common_err = predict_sheet_common::Error::BlockOverflow {
        image_name: "a.png".to_string(),
        records: 5,
        max: 4,
    };
    let err: SheetError = common_err.into();

    assert!(matches!(err, SheetError::Common(_)));
    assert!(format!("{}", err).contains("a.png"));
}
