//! ラベル検査モジュール
//!
//! 画像 → テキストソース（OCR） → 成分照合 の流れで画像ごとの検査結果を作る。
//! OCRの失敗は画像単位で結果に記録し、他の画像の処理は続ける。

pub mod cache;
mod types;

pub use cache::CacheFile;
pub use types::ScanReport;

use crate::error::Result;
use crate::ocr::TextSource;
use crate::scanner::{self, ImageInfo};
use indicatif::{ProgressBar, ProgressStyle};
use label_scan_common::SubstanceMatcher;
use std::path::Path;

/// 画像1枚を検査
pub async fn scan_image<T: TextSource>(
    image: &ImageInfo,
    source: &T,
    matcher: &SubstanceMatcher,
) -> ScanReport {
    match extract_text(image, source).await {
        Ok(text) => from_text(image, text, matcher),
        Err(e) => {
            tracing::warn!(file = %image.file_name, error = %e, "テキスト抽出に失敗");
            ScanReport::failed(&image.file_name, image.path.display().to_string(), e.to_string(), matcher)
        }
    }
}

/// 複数画像を順に検査
pub async fn scan_images<T: TextSource>(
    images: &[ImageInfo],
    source: &T,
    matcher: &SubstanceMatcher,
    show_progress: bool,
) -> Vec<ScanReport> {
    let progress = progress_bar(images.len(), show_progress);
    let mut reports = Vec::with_capacity(images.len());

    for image in images {
        progress.set_message(image.file_name.clone());
        reports.push(scan_image(image, source, matcher).await);
        progress.inc(1);
    }

    progress.finish_and_clear();
    reports
}

/// キャッシュを使用して複数画像を検査
///
/// キャッシュ済みの画像はOCRを省略する。OCRに成功した画像のテキストは
/// キャッシュに追加して `folder` に保存する。結果はファイル名順。
pub async fn scan_images_with_cache<T: TextSource>(
    images: &[ImageInfo],
    folder: &Path,
    source: &T,
    matcher: &SubstanceMatcher,
    show_progress: bool,
) -> Result<Vec<ScanReport>> {
    let mut cache = CacheFile::load(folder);
    let (cached, uncached) = cache::filter_cached_images(images, &cache);

    tracing::info!(cached = cached.len(), uncached = uncached.len(), "キャッシュ照会");

    let mut reports: Vec<ScanReport> = cached
        .into_iter()
        .map(|(image, text)| from_text(&image, text, matcher))
        .collect();

    let progress = progress_bar(uncached.len(), show_progress);
    let mut cache_updated = false;

    for (image, hash) in &uncached {
        progress.set_message(image.file_name.clone());

        match extract_text(image, source).await {
            Ok(text) => {
                if !hash.is_empty() {
                    let file_size = std::fs::metadata(&image.path).map(|m| m.len()).unwrap_or(0);
                    cache.insert(hash.clone(), image.file_name.clone(), file_size, text.clone());
                    cache_updated = true;
                }
                reports.push(from_text(image, text, matcher));
            }
            Err(e) => {
                tracing::warn!(file = %image.file_name, error = %e, "テキスト抽出に失敗");
                reports.push(ScanReport::failed(
                    &image.file_name,
                    image.path.display().to_string(),
                    e.to_string(),
                    matcher,
                ));
            }
        }

        progress.inc(1);
    }
    progress.finish_and_clear();

    if cache_updated {
        cache.save(folder)?;
    }

    reports.sort_by(|a, b| {
        a.file_name
            .cmp(&b.file_name)
            .then_with(|| a.file_path.cmp(&b.file_path))
    });
    Ok(reports)
}

/// 抽出済みテキストを検査（OCRなし）
pub fn check_text(name: &str, text: String, matcher: &SubstanceMatcher) -> ScanReport {
    ScanReport::from_text(name, String::new(), text, matcher)
}

async fn extract_text<T: TextSource>(image: &ImageInfo, source: &T) -> Result<String> {
    scanner::validate_image(&image.path)?;
    tracing::debug!(file = %image.file_name, source = source.name(), "テキスト抽出");
    source.extract_text(&image.path).await
}

fn from_text(image: &ImageInfo, text: String, matcher: &SubstanceMatcher) -> ScanReport {
    ScanReport::from_text(&image.file_name, image.path.display().to_string(), text, matcher)
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show || len < 2 {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}
