//! キャッシュ機能テスト
//!
//! OCRテキストキャッシュの動作を検証

use label_scan::analyzer::cache::{compute_file_hash, filter_cached_images, CacheFile};
use label_scan::scanner::ImageInfo;
use tempfile::tempdir;

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert(
        "abc123".to_string(),
        "label.jpg".to_string(),
        1024,
        "INGREDIENTS: SUGAR, MSG".to_string(),
    );
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get("abc123"), Some("INGREDIENTS: SUGAR, MSG"));
    assert!(loaded.get("nonexistent_hash").is_none());
}

/// キャッシュの上書き
#[test]
fn test_cache_overwrite() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert("same_hash".into(), "label.jpg".into(), 1000, "old".into());
    cache.insert("same_hash".into(), "label.jpg".into(), 1000, "new".into());

    assert_eq!(cache.get("same_hash"), Some("new"));
    assert_eq!(cache.len(), 1);
}

/// キャッシュファイルが破損している場合
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(CacheFile::cache_path(dir.path()), "{ invalid json }").unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// バージョン不一致は空として扱う
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        CacheFile::cache_path(dir.path()),
        r#"{"version": 999, "entries": {"h": {"file_name": "a.jpg", "file_size": 1, "text": "msg"}}}"#,
    )
    .unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// キャッシュの削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");

    assert!(!CacheFile::clear(dir.path()).unwrap());

    let mut cache = CacheFile::load(dir.path());
    cache.insert("h".into(), "a.jpg".into(), 1, "text".into());
    cache.save(dir.path()).unwrap();

    assert!(CacheFile::clear(dir.path()).unwrap());
    assert!(!CacheFile::cache_path(dir.path()).exists());
}

/// 同じ内容のファイルは同じハッシュ
#[test]
fn test_compute_file_hash() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = dir.path().join("a.jpg");
    let b = dir.path().join("b.jpg");
    let c = dir.path().join("c.jpg");
    std::fs::write(&a, b"same bytes").unwrap();
    std::fs::write(&b, b"same bytes").unwrap();
    std::fs::write(&c, b"other bytes").unwrap();

    let hash_a = compute_file_hash(&a).unwrap();
    assert_eq!(hash_a.len(), 64);
    assert_eq!(hash_a, compute_file_hash(&b).unwrap());
    assert_ne!(hash_a, compute_file_hash(&c).unwrap());
}

/// filter_cached_imagesのテスト
#[test]
fn test_filter_cached_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    let img1_path = dir.path().join("img1.jpg");
    let img2_path = dir.path().join("img2.jpg");
    std::fs::write(&img1_path, b"fake image 1").unwrap();
    std::fs::write(&img2_path, b"fake image 2").unwrap();

    let images = vec![ImageInfo::from_path(&img1_path), ImageInfo::from_path(&img2_path)];

    // 空のキャッシュ → 全て未キャッシュ
    let mut cache = CacheFile::load(dir.path());
    let (cached, uncached) = filter_cached_images(&images, &cache);
    assert!(cached.is_empty());
    assert_eq!(uncached.len(), 2);

    // img1だけキャッシュ
    let hash1 = compute_file_hash(&img1_path).unwrap();
    cache.insert(hash1, "img1.jpg".into(), 12, "red 40".into());

    let (cached, uncached) = filter_cached_images(&images, &cache);
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].0.file_name, "img1.jpg");
    assert_eq!(cached[0].1, "red 40");
    assert_eq!(uncached.len(), 1);
    assert_eq!(uncached[0].0.file_name, "img2.jpg");
    assert!(!uncached[0].1.is_empty());
}
