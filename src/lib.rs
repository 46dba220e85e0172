//! 食品ラベル画像のOCR解析・有害成分チェック

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ocr;
pub mod scanner;

pub use label_scan_common::{find_substances, SubstanceList, SubstanceMatcher};
