//! Excel生成（共通ライブラリ）
//!
//! layout.rs の定義を使用して推論結果シートを生成する。
//! 画像1枚につき BLOCK_ROWS 行のブロックを確保し、名前列を結合、
//! D:E列の結合範囲にサムネイルを収める。保存は呼び出し側の責務。

use crate::error::Result;
use crate::grouper::RecordGroup;
use crate::layout::{
    align_to_block, block_rows_for, row_index, thumbnail_box,
    BLOCK_ROW_HEIGHT_PX, CONTENT_COL, FIRST_DATA_ROW, HEADER_ROW, NAME_COL, SHEET_COLUMNS,
    THUMBNAIL_COL_WIDTH_PX, THUMBNAIL_FIRST_COL, THUMBNAIL_LAST_COL, THUMBNAIL_PADDING_PX,
    TYPE_COL,
};
use crate::types::PredictionRow;
use rust_xlsxwriter::*;
use std::path::Path;

/// サムネイルの画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// 拡張子から判定（jpg/jpeg は大文字小文字を問わずJPEG、それ以外はPNG）
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageKind::Jpeg,
            _ => ImageKind::Png,
        }
    }

    /// 元画像パスの拡張子で判定し、無ければ画像名で判定
    pub fn for_source(origin_path: &str, image_name: &str) -> Self {
        let ext = Path::new(origin_path)
            .extension()
            .or_else(|| Path::new(image_name).extension())
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
        }
    }
}

/// 埋め込み用サムネイル（エンコード済みバイト列）
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    pub kind: ImageKind,
}

/// 1グループ分のブロック配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub image_name: String,
    /// ブロック開始行（Excel表記）
    pub start_row: u32,
    pub rows: u32,
    pub records: usize,
    pub has_thumbnail: bool,
}

/// シート全体の配置結果
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    pub name: String,
    pub blocks: Vec<BlockLayout>,
    pub data_rows: usize,
}

/// シート書き込み
///
/// `currentRow` カーソルを保持し、グループ単位で書き込む。
pub struct SheetWriter {
    worksheet: Worksheet,
    current_row: u32,
    layout: SheetLayout,
    name_format: Format,
    value_format: Format,
}

impl SheetWriter {
    /// シートを作成し、列幅とヘッダ行を設定
    pub fn new(name: &str) -> Result<Self> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(name)?;

        let header_format = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(Color::RGB(0xF5F5F5))
            .set_border(FormatBorder::Hair)
            .set_border_color(Color::RGB(0xAAAAAA));

        for (col, column) in SHEET_COLUMNS.iter().enumerate() {
            let col = col as u16;
            if let Some(width) = column.width {
                worksheet.set_column_width(col, width)?;
            }
            worksheet.write_string_with_format(row_index(HEADER_ROW), col, column.header, &header_format)?;
        }
        for col in THUMBNAIL_FIRST_COL..=THUMBNAIL_LAST_COL {
            worksheet.set_column_width_pixels(col, THUMBNAIL_COL_WIDTH_PX)?;
        }

        let name_format = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();

        let value_format = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter);

        Ok(Self {
            worksheet,
            current_row: FIRST_DATA_ROW,
            layout: SheetLayout {
                name: name.to_string(),
                ..SheetLayout::default()
            },
            name_format,
            value_format,
        })
    }

    /// 次に書き込む行（Excel表記）
    pub fn current_row(&self) -> u32 {
        self.current_row
    }

    /// 1グループを書き込む
    ///
    /// `thumbnail` は代表レコードに元画像パスがある場合のみ配置される。
    pub fn write_group<T: PredictionRow>(
        &mut self,
        group: &RecordGroup<'_, T>,
        thumbnail: Option<&Thumbnail>,
    ) -> Result<()> {
        if group.is_empty() {
            return Ok(());
        }

        self.current_row = align_to_block(self.current_row);
        let start_row = self.current_row;
        let rows = block_rows_for(group.len());
        let first = row_index(start_row);
        let last = row_index(start_row + rows - 1);

        let representative = group.representative();

        // 行高さ設定（サムネイル領域の高さを固定）
        for r in first..=last {
            self.worksheet.set_row_height_pixels(r, BLOCK_ROW_HEIGHT_PX)?;
        }

        // 名前列（A列）- マージ
        self.worksheet.merge_range(
            first,
            NAME_COL,
            last,
            NAME_COL,
            representative.display_name(),
            &self.name_format,
        )?;

        // 画像埋め込み（D:E列）
        let thumbnail = thumbnail.filter(|_| representative.origin_path().is_some());
        if let Some(thumbnail) = thumbnail {
            self.worksheet.merge_range(
                first,
                THUMBNAIL_FIRST_COL,
                last,
                THUMBNAIL_LAST_COL,
                "",
                &Format::new(),
            )?;

            // 縦横比を維持してブロック内に収める
            let (box_width, box_height) = thumbnail_box(rows);
            let image = Image::new_from_buffer(&thumbnail.data)?
                .set_scale_to_size(box_width, box_height, true)
                .set_alt_text(group.image_name)
                .set_object_movement(ObjectMovement::MoveButDontSizeWithCells);
            self.worksheet.insert_image_with_offset(
                first,
                THUMBNAIL_FIRST_COL,
                &image,
                THUMBNAIL_PADDING_PX,
                THUMBNAIL_PADDING_PX,
            )?;
        }

        // レコード行（1レコード1行、ブロック内の残りは空行）
        for record in group.records {
            let row = row_index(self.current_row);
            self.worksheet
                .write_string_with_format(row, NAME_COL, record.display_name(), &self.name_format)?;
            self.worksheet
                .write_string_with_format(row, TYPE_COL, record.category(), &self.value_format)?;
            self.worksheet
                .write_string_with_format(row, CONTENT_COL, record.content(), &self.value_format)?;
            self.current_row += 1;
        }

        self.layout.data_rows += group.len();
        self.layout.blocks.push(BlockLayout {
            image_name: group.image_name.to_string(),
            start_row,
            rows,
            records: group.len(),
            has_thumbnail: thumbnail.is_some(),
        });

        Ok(())
    }

    /// 書き込みを終了し、シートと配置結果を返す
    pub fn finish(self) -> (Worksheet, SheetLayout) {
        (self.worksheet, self.layout)
    }
}
