//! レコードのグループ化モジュール
//!
//! 画像名・カテゴリによる安定ソートと、連続する同一キーのまとまり（グループ）への分割。

use crate::layout::{check_block, OverflowPolicy};
use crate::error::Result;
use crate::types::PredictionRow;
use std::cmp::Ordering;

/// 同一画像のレコードのまとまり
#[derive(Debug, Clone)]
pub struct RecordGroup<'a, T> {
    pub image_name: &'a str,
    pub records: &'a [T],
}

impl<'a, T: PredictionRow> RecordGroup<'a, T> {
    /// 代表レコード（グループ先頭）
    pub fn representative(&self) -> &'a T {
        &self.records[0]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// ロケール風の文字列比較
///
/// 大文字小文字を無視して比較し、同値なら小文字を先にする。全順序。
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

/// 画像名で安定ソート
pub fn sort_by_image_name<T: PredictionRow>(records: &mut [T]) {
    records.sort_by(|a, b| locale_cmp(a.image_name(), b.image_name()));
}

/// カテゴリで安定ソート
pub fn sort_by_category<T: PredictionRow>(records: &mut [T]) {
    records.sort_by(|a, b| locale_cmp(a.category(), b.category()));
}

/// 連続する同一画像名のレコードをグループ化
///
/// 呼び出し側で事前にソートしておくこと。重複は除去しない。
pub fn group_by_image<T: PredictionRow>(records: &[T]) -> Vec<RecordGroup<'_, T>> {
    records
        .chunk_by(|a, b| a.image_name() == b.image_name())
        .map(|chunk| RecordGroup {
            image_name: chunk[0].image_name(),
            records: chunk,
        })
        .collect()
}

/// 連続する同一カテゴリのレコードを分割
pub fn partition_by_category<T: PredictionRow>(records: &[T]) -> Vec<(&str, &[T])> {
    records
        .chunk_by(|a, b| a.category() == b.category())
        .map(|chunk| (chunk[0].category(), chunk))
        .collect()
}

/// 全グループのブロック超過を事前検証
pub fn check_groups<T: PredictionRow>(
    groups: &[RecordGroup<'_, T>],
    policy: OverflowPolicy,
) -> Result<()> {
    for group in groups {
        check_block(group.image_name, group.len(), policy)?;
    }
    Ok(())
}
