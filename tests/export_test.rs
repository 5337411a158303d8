//! Excel出力の統合テスト
//!
//! 書き出したファイルを calamine で読み戻して検証する。

use calamine::{open_workbook, Data, Dimensions, Range, Reader, Xlsx};
use predict_sheet::config::{Config, ThumbnailPolicy};
use predict_sheet::error::SheetError;
use predict_sheet::export::{self, ExportContext};
use predict_sheet_common::{OverflowPolicy, PredictionRecord};
use std::io::Read;
use std::path::Path;
use tempfile::tempdir;

fn test_context(dir: &Path) -> ExportContext {
    ExportContext::from_config(&Config::default()).with_output_dir(dir)
}

fn rec(image: &str, category: &str, content: &str) -> PredictionRecord {
    PredictionRecord::new(image, category, content)
}

fn cell(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn write_png(path: &Path) {
    let img = image::RgbImage::from_fn(300, 200, |x, _| image::Rgb([x as u8, 64, 128]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn write_square_png(path: &Path, size: u32) {
    let img = image::RgbImage::from_fn(size, size, |x, y| image::Rgb([x as u8, y as u8, 200]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// 結合範囲を (開始行, 開始列, 終了行, 終了列)（0始まり）で取得
fn merged_ranges(path: &Path, sheet: &str) -> Vec<(u32, u32, u32, u32)> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("読み込み失敗");
    workbook.load_merged_regions().expect("結合セル読み込み失敗");
    let regions: Vec<Dimensions> = workbook
        .worksheet_merge_cells(sheet)
        .expect("シートが見つからない")
        .expect("結合セル取得失敗");
    let mut ranges: Vec<_> = regions
        .iter()
        .map(|d| (d.start.0, d.start.1, d.end.0, d.end.1))
        .collect();
    ranges.sort();
    ranges
}

/// drawing XML から各画像アンカーの (from行, to行)（0始まり）を取得
fn drawing_anchor_rows(path: &Path) -> Vec<(u32, u32)> {
    let file = std::fs::File::open(path).expect("出力ファイルを開けない");
    let mut archive = zip::ZipArchive::new(file).expect("xlsx の展開に失敗");
    let mut xml = String::new();
    archive
        .by_name("xl/drawings/drawing1.xml")
        .expect("drawing1.xml が無い")
        .read_to_string(&mut xml)
        .unwrap();

    let first_row = |section: &str| -> u32 {
        let start = section.find("<xdr:row>").expect("xdr:row が無い") + "<xdr:row>".len();
        let end = section[start..].find("</xdr:row>").unwrap() + start;
        section[start..end].parse().unwrap()
    };

    xml.split("<xdr:from>")
        .skip(1)
        .map(|anchor| {
            let (from, to) = anchor.split_once("<xdr:to>").expect("xdr:to が無い");
            (first_row(from), first_row(to))
        })
        .collect()
}

fn contains_media(path: &Path) -> bool {
    let bytes = std::fs::read(path).expect("出力ファイル読み込み失敗");
    bytes.windows(b"xl/media/".len()).any(|w| w == b"xl/media/")
}

#[tokio::test]
async fn test_single_sheet_two_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    let json = r#"[
        {"imageName":"b.png","category":"cat","content":"Y","originPath":null},
        {"imageName":"a.png","category":"cat","content":"X","originPath":null}
    ]"#;

    let report = export::export_json(json, false, &test_context(dir.path()))
        .await
        .expect("Excel生成に失敗");

    assert!(report.path.exists(), "Excelファイルが作成されていない");
    assert_eq!(report.sheets.len(), 1);
    assert_eq!(report.sheets[0].name, "表1");
    assert_eq!(report.sheets[0].blocks[0].start_row, 2);
    assert_eq!(report.sheets[0].blocks[1].start_row, 6);

    let mut workbook: Xlsx<_> = open_workbook(&report.path).expect("読み込み失敗");
    assert_eq!(workbook.sheet_names(), vec!["表1".to_string()]);
    let range = workbook.worksheet_range("表1").expect("シート読み込み失敗");

    // ヘッダ（行1）
    assert_eq!(cell(&range, 0, 0), "图片名称/路径");
    assert_eq!(cell(&range, 0, 1), "任务类型");
    assert_eq!(cell(&range, 0, 2), "识别结果");

    // a.png: 行2〜5、内容は行2
    assert_eq!(cell(&range, 1, 0), "a.png");
    assert_eq!(cell(&range, 1, 1), "cat");
    assert_eq!(cell(&range, 1, 2), "X");
    for row in 2..5 {
        assert_eq!(cell(&range, row, 2), "", "行{}は空行のはず", row + 1);
    }

    // b.png: 行6〜9、内容は行6
    assert_eq!(cell(&range, 5, 0), "b.png");
    assert_eq!(cell(&range, 5, 2), "Y");

    assert!(!contains_media(&report.path));
}

#[tokio::test]
async fn test_many_sheets_by_category() {
    let dir = tempdir().expect("Failed to create temp dir");
    let records = vec![
        rec("1.png", "x", "first"),
        rec("3.png", "y", "third"),
        rec("2.png", "x", "second"),
    ];

    let report = export::export_records(records, true, &test_context(dir.path()))
        .await
        .expect("Excel生成に失敗");

    let names: Vec<_> = report.sheets.iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["表_x".to_string(), "表_y".to_string()]);

    let mut workbook: Xlsx<_> = open_workbook(&report.path).expect("読み込み失敗");
    assert_eq!(workbook.sheet_names(), names);

    let x = workbook.worksheet_range("表_x").unwrap();
    assert_eq!(cell(&x, 1, 0), "1.png");
    assert_eq!(cell(&x, 1, 2), "first");
    assert_eq!(cell(&x, 5, 0), "2.png");
    assert_eq!(cell(&x, 5, 2), "second");

    let y = workbook.worksheet_range("表_y").unwrap();
    assert_eq!(cell(&y, 1, 0), "3.png");
    assert_eq!(cell(&y, 1, 1), "y");
    assert_eq!(cell(&y, 5, 0), "");
}

#[tokio::test]
async fn test_round_trip_cell_values() {
    let dir = tempdir().expect("Failed to create temp dir");
    let records = vec![
        rec("a.png", "ocr", "一行目"),
        rec("a.png", "det", "二行目"),
        rec("a.png", "cls", "三行目"),
        rec("c.png", "ocr", "single"),
        rec("b.png", "ocr", "b1").with_origin_path("/not/read/b.png"),
    ];

    let ctx = test_context(dir.path());
    let report = export::export_records(records, false, &ctx).await.unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&report.path).unwrap();
    let range = workbook.worksheet_range("表1").unwrap();

    let expected = [
        (1, "a.png", "ocr", "一行目"),
        (2, "a.png", "det", "二行目"),
        (3, "a.png", "cls", "三行目"),
        (5, "/not/read/b.png", "ocr", "b1"),
        (9, "c.png", "ocr", "single"),
    ];
    for (row, name, category, content) in expected {
        assert_eq!(cell(&range, row, 0), name);
        assert_eq!(cell(&range, row, 1), category);
        assert_eq!(cell(&range, row, 2), content);
    }
    assert_eq!(report.data_rows(), 5);
    assert_eq!(report.groups(), 3);
}

#[tokio::test]
async fn test_thumbnail_embedded() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image_path = dir.path().join("photo.png");
    write_png(&image_path);

    let records = vec![
        rec("photo.png", "ocr", "X").with_origin_path(image_path.to_string_lossy()),
        rec("plain.png", "ocr", "Y"),
    ];
    let out = dir.path().join("out");
    let report = export::export_records(records, false, &test_context(&out))
        .await
        .unwrap();

    assert_eq!(report.thumbnails_embedded(), 1);
    assert!(report.skipped.is_empty());
    assert!(report.sheets[0].blocks[0].has_thumbnail);
    assert!(!report.sheets[0].blocks[1].has_thumbnail);
    assert!(contains_media(&report.path));
}

#[tokio::test]
async fn test_missing_thumbnail_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let records = vec![
        rec("gone.jpg", "ocr", "X").with_origin_path("/nonexistent/gone.jpg"),
        rec("next.png", "ocr", "Y"),
    ];

    let report = export::export_records(records, false, &test_context(dir.path()))
        .await
        .expect("サムネイル失敗でエクスポート全体が失敗してはならない");

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].image_name, "gone.jpg");
    assert_eq!(report.thumbnails_embedded(), 0);
    assert_eq!(report.data_rows(), 2);
}

#[tokio::test]
async fn test_missing_thumbnail_fails_when_strict() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut ctx = test_context(dir.path());
    ctx.thumbnail_errors = ThumbnailPolicy::Fail;

    let records = vec![rec("gone.png", "ocr", "X").with_origin_path("/nonexistent/gone.png")];
    let result = export::export_records(records, false, &ctx).await;

    assert!(matches!(result, Err(SheetError::ImageLoad { .. })));
}

#[tokio::test]
async fn test_empty_input_both_modes() {
    for many_sheets in [false, true] {
        let dir = tempdir().expect("Failed to create temp dir");
        let report = export::export_json("[]", many_sheets, &test_context(dir.path()))
            .await
            .expect("空の入力でエラーになってはならない");

        assert_eq!(report.sheets.len(), 1);
        assert_eq!(report.sheets[0].name, "表1");
        assert_eq!(report.data_rows(), 0);

        let mut workbook: Xlsx<_> = open_workbook(&report.path).unwrap();
        let range = workbook.worksheet_range("表1").unwrap();
        assert_eq!(cell(&range, 0, 0), "图片名称/路径");
    }
}

#[tokio::test]
async fn test_overflow_extend_and_reject() {
    let records: Vec<_> = (0..6).map(|i| rec("many.png", "ocr", &i.to_string())).collect();

    let dir = tempdir().expect("Failed to create temp dir");
    let report = export::export_records(records.clone(), false, &test_context(dir.path()))
        .await
        .unwrap();
    assert_eq!(report.sheets[0].blocks[0].rows, 8);

    let mut ctx = test_context(dir.path());
    ctx.overflow = OverflowPolicy::Reject;
    let result = export::export_records(records, false, &ctx).await;
    assert!(matches!(
        result,
        Err(SheetError::Common(predict_sheet_common::Error::BlockOverflow { records: 6, .. }))
    ));
}

#[tokio::test]
async fn test_invalid_json_rejected_before_write() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("never");
    let result = export::export_json(r#"[{"imageName":""#, false, &test_context(&out)).await;

    assert!(result.is_err());
    assert!(!out.exists(), "検証エラー時に出力先を作成してはならない");
}

#[tokio::test]
async fn test_merged_ranges_and_thumbnail_anchor_within_block() {
    let dir = tempdir().expect("Failed to create temp dir");
    let first = dir.path().join("a.png");
    let second = dir.path().join("b.png");
    write_square_png(&first, 256);
    write_square_png(&second, 256);

    // a.png: 1件（行2〜5）、b.png: 6件で拡張ブロック（行6〜13）
    let mut records = vec![rec("a.png", "ocr", "X").with_origin_path(first.to_string_lossy())];
    for i in 0..6 {
        records.push(rec("b.png", "ocr", &i.to_string()).with_origin_path(second.to_string_lossy()));
    }

    let out = dir.path().join("out");
    let report = export::export_records(records, false, &test_context(&out))
        .await
        .unwrap();
    assert_eq!(report.thumbnails_embedded(), 2);

    assert_eq!(
        merged_ranges(&report.path, "表1"),
        vec![
            (1, 0, 4, 0),  // A2:A5
            (1, 3, 4, 4),  // D2:E5
            (5, 0, 12, 0), // A6:A13
            (5, 3, 12, 4), // D6:E13
        ]
    );

    // 画像はブロック内に収まり、次のブロックへはみ出さない
    let anchors = drawing_anchor_rows(&report.path);
    assert_eq!(anchors.len(), 2);
    assert_eq!(anchors[0].0, 1);
    assert!(anchors[0].1 <= 4, "a.png の画像が行{}まで伸びている", anchors[0].1 + 1);
    assert_eq!(anchors[1].0, 5);
    assert!(anchors[1].1 <= 12, "b.png の画像が行{}まで伸びている", anchors[1].1 + 1);
}
