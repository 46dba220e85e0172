//! 検査結果の出力
//!
//! - text: 画像ごとの人向けサマリ
//! - lines: 検出成分を1行1件（成分リスト順、画像間で重複なし）
//! - json: 集計付きJSON

use crate::analyzer::ScanReport;
use crate::cli::OutputFormat;
use crate::error::Result;
use chrono::{DateTime, Local};
use label_scan_common::highlight;
use serde::Serialize;
use std::path::Path;

/// ハイライト表示のマーカー
const HIGHLIGHT_OPEN: &str = "[[";
const HIGHLIGHT_CLOSE: &str = "]]";

/// text形式の判定メッセージ
pub const FLAGGED_PREFIX: &str = "⚠ 有害成分の可能性: ";
pub const CLEAN_MESSAGE: &str = "✔ 有害成分は検出されませんでした";
pub const FAILED_PREFIX: &str = "✖ 読み取り失敗: ";

/// 出力オプション
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// 抽出テキストを表示
    pub show_text: bool,
    /// 抽出テキスト中の検出箇所をマーカーで囲む（show_text時のみ）
    pub highlight: bool,
}

/// JSON出力用の集計
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary<'a> {
    pub scanned_at: DateTime<Local>,
    pub substances_checked: usize,
    pub total_images: usize,
    pub flagged_images: usize,
    pub failed_images: usize,
    pub reports: &'a [ScanReport],
}

impl<'a> ScanSummary<'a> {
    pub fn new(reports: &'a [ScanReport], substances_checked: usize) -> Self {
        Self {
            scanned_at: Local::now(),
            substances_checked,
            total_images: reports.len(),
            flagged_images: reports.iter().filter(|r| r.is_flagged()).count(),
            failed_images: reports.iter().filter(|r| r.is_failed()).count(),
            reports,
        }
    }
}

pub fn render(
    reports: &[ScanReport],
    format: OutputFormat,
    substances_checked: usize,
    options: RenderOptions,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(reports, options)),
        OutputFormat::Lines => Ok(render_lines(reports)),
        OutputFormat::Json => {
            let summary = ScanSummary::new(reports, substances_checked);
            Ok(serde_json::to_string_pretty(&summary)?)
        }
    }
}

pub fn render_text(reports: &[ScanReport], options: RenderOptions) -> String {
    let mut out = String::new();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if reports.len() > 1 || !report.file_name.is_empty() {
            out.push_str(&format!("== {} ==\n", report.file_name));
        }

        if let Some(error) = &report.error {
            out.push_str(&format!("{}{}\n", FAILED_PREFIX, error));
        }

        if options.show_text {
            let text = if options.highlight {
                highlight(&report.extracted_text, &report.occurrences, HIGHLIGHT_OPEN, HIGHLIGHT_CLOSE)
            } else {
                report.extracted_text.clone()
            };
            out.push_str("抽出テキスト:\n");
            out.push_str(text.trim_end());
            out.push_str("\n\n");
        }

        if report.is_flagged() {
            out.push_str(&format!("{}{}\n", FLAGGED_PREFIX, report.matches.join(", ")));
        } else {
            out.push_str(CLEAN_MESSAGE);
            out.push('\n');
        }
    }

    out
}

pub fn render_lines(reports: &[ScanReport]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for name in reports.iter().flat_map(|r| r.matches.iter()) {
        if !seen.contains(&name.as_str()) {
            seen.push(name);
        }
    }

    let mut out = seen.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// ファイルまたは標準出力へ書き出す
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            tracing::debug!(path = %path.display(), "結果を保存");
        }
        None => print!("{}", content),
    }
    Ok(())
}
