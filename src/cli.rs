use crate::config::ThumbnailPolicy;
use clap::{Parser, Subcommand};
use predict_sheet_common::OverflowPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "predict-sheet")]
#[command(about = "画像認識結果をサムネイル付きExcelに出力するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 認識結果JSONからExcelを生成
    Export {
        /// 入力JSONファイル（`-` で標準入力）
        #[arg(required = true)]
        input: PathBuf,

        /// カテゴリごとにシートを分ける
        #[arg(short, long)]
        many_sheets: bool,

        /// 出力ディレクトリ（省略時は設定値またはドキュメントフォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サムネイル幅（px）
        #[arg(long)]
        thumbnail_width: Option<u32>,

        /// 1画像5件以上の扱い (extend/reject)
        #[arg(long)]
        overflow: Option<OverflowPolicy>,

        /// サムネイル読み込み失敗時の扱い (skip/fail)
        #[arg(long)]
        on_thumbnail_error: Option<ThumbnailPolicy>,
    },

    /// ファイル/フォルダを認識対象の一覧（JSON）に展開
    Scan {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 各ファイルを読み込んで確認し、バイト数を付与
        #[arg(long)]
        check: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 既定の出力ディレクトリを設定
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
