//! predict-sheet
//!
//! 画像認識結果（PredictionRecord）をサムネイル付きExcelに出力する。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod scanner;
pub mod thumbnail;
