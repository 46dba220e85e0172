use crate::error::{LabelScanError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

/// 画像ファイル、またはフォルダ内の画像を列挙する
///
/// ファイルを渡した場合は拡張子を問わずそのファイルだけを返す。
pub fn scan_path(path: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !path.exists() {
        return Err(LabelScanError::PathNotFound(path.display().to_string()));
    }

    if path.is_file() {
        return Ok(vec![ImageInfo::from_path(path)]);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images = Vec::new();

    for entry in WalkDir::new(path)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();

        if !entry_path.is_file() {
            continue;
        }

        if let Some(ext) = entry_path.extension() {
            if is_image_extension(&ext.to_string_lossy()) {
                images.push(ImageInfo::from_path(entry_path));
            }
        }
    }

    // ファイル名でソート（同名はパスで）
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name).then_with(|| a.path.cmp(&b.path)));

    tracing::debug!(count = images.len(), path = %path.display(), "画像スキャン完了");
    Ok(images)
}

/// 画像として読み取れるか確認し、サイズを返す
pub fn validate_image(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path)
        .map_err(|e| LabelScanError::ImageLoad(format!("{}: {}", path.display(), e)))
}

fn is_image_extension(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&lower.as_str())
}
