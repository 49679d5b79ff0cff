mod common;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{jpeg_bytes, pattern, with_comment, write_file, write_jpeg};
use photo_tidy_core::deduplication::{find_duplicates_between, find_duplicates_in_directory, group_duplicates};
use photo_tidy_core::{Config, Error, PhotoTidy};
use tempfile::tempdir;

#[test]
fn test_resaved_copy_is_a_duplicate() {
    let dir = tempdir().unwrap();
    let original = jpeg_bytes(&pattern(1));
    let first = write_file(dir.path(), "first.jpg", &original);
    let second = write_file(dir.path(), "second.jpg", &with_comment(&original, "edited"));
    let other = write_jpeg(dir.path(), "other.jpg", &pattern(90));
    write_file(dir.path(), "notes.txt", b"not an image");

    assert_ne!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());

    let report = find_duplicates_in_directory(dir.path(), &Config::default(), &AtomicBool::new(false)).unwrap();

    assert_eq!(report.classes.len(), 2);
    assert_eq!(report.duplicate_count(), 1);

    let duplicated: Vec<_> = report.with_duplicates().collect();
    assert_eq!(duplicated.len(), 1);
    assert_eq!(duplicated[0].representative.path(), first.as_path());
    assert_eq!(duplicated[0].similar_paths().collect::<Vec<_>>(), vec![second.as_path()]);

    let singleton = report.classes.iter().find(|c| !c.has_duplicates()).unwrap();
    assert_eq!(singleton.representative.path(), other.as_path());
}

#[test]
fn test_two_directory_mode() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();

    let x = jpeg_bytes(&pattern(10));
    let img1 = write_file(dir_a.path(), "img1.jpg", &x);
    let img2 = write_jpeg(dir_a.path(), "img2.jpg", &pattern(20));
    let img3 = write_file(dir_b.path(), "img3.jpg", &with_comment(&x, "copy"));
    let img4 = write_jpeg(dir_b.path(), "img4.jpg", &pattern(30));

    let report = find_duplicates_between(dir_a.path(), dir_b.path(), &Config::default(), &AtomicBool::new(false)).unwrap();

    assert_eq!(report.classes.len(), 2);
    let summary = report.summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].representative, img1);
    assert_eq!(summary[0].similar, vec![img3]);

    let all_paths: Vec<&Path> = report
        .classes
        .iter()
        .flat_map(|c| std::iter::once(c.representative.path()).chain(c.similar_paths()))
        .collect();
    assert!(all_paths.contains(&img2.as_path()));
    assert!(!all_paths.contains(&img4.as_path()));
}

#[test]
fn test_no_images_means_no_duplicates() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "readme.txt", b"hello");

    let report = find_duplicates_in_directory(dir.path(), &Config::default(), &AtomicBool::new(false)).unwrap();
    assert!(report.is_clean());
    assert!(report.classes.is_empty());
}

#[test]
fn test_corrupt_files_are_skipped() {
    let dir = tempdir().unwrap();
    let bytes = jpeg_bytes(&pattern(5));
    write_file(dir.path(), "good.jpg", &bytes);
    write_file(dir.path(), "truncated.jpg", &bytes[..20]);
    write_file(dir.path(), "garbage.jpg", b"\xFF\xD8\xFFgarbage");

    let report = find_duplicates_in_directory(dir.path(), &Config::default(), &AtomicBool::new(false)).unwrap();
    assert_eq!(report.image_count(), 1);
}

#[test]
fn test_png_only_when_configured() {
    let dir = tempdir().unwrap();
    pattern(3).save(dir.path().join("a.png")).unwrap();
    pattern(3).save(dir.path().join("b.png")).unwrap();

    let jpeg_only = find_duplicates_in_directory(dir.path(), &Config::default(), &AtomicBool::new(false)).unwrap();
    assert_eq!(jpeg_only.image_count(), 0);

    let config = Config {
        recognised_formats: vec![photo_tidy_core::ImageFormat::Jpeg, photo_tidy_core::ImageFormat::Png],
        threads: 2,
        ..Config::default()
    };
    let widened = find_duplicates_in_directory(dir.path(), &config, &AtomicBool::new(false)).unwrap();
    assert_eq!(widened.image_count(), 2);
    assert_eq!(widened.duplicate_count(), 1);
}

#[test]
fn test_missing_directory_fails_before_scanning() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let result = find_duplicates_between(dir.path(), &missing, &Config::default(), &AtomicBool::new(false));
    match result {
        Err(Error::InvalidDirectory(path)) => assert_eq!(path, missing),
        other => panic!("expected InvalidDirectory, got {:?}", other),
    }
}

#[test]
fn test_relative_directory_reports_absolute_paths() {
    let dir = tempfile::Builder::new().prefix("scan-").tempdir_in(".").unwrap();
    let original = write_jpeg(dir.path(), "a.jpg", &pattern(11));
    let copy = write_file(dir.path(), "b.jpg", &jpeg_bytes(&pattern(11)));
    let relative = Path::new(".").join(dir.path().file_name().unwrap());

    let report = find_duplicates_in_directory(&relative, &Config::default(), &AtomicBool::new(false)).unwrap();

    let class = report.with_duplicates().next().unwrap();
    assert!(class.representative.path().is_absolute());
    assert_eq!(class.representative.path(), original.as_path());
    assert_eq!(class.similar_paths().collect::<Vec<_>>(), vec![copy.as_path()]);
}

#[test]
fn test_shutdown_interrupts_scan() {
    let dir = tempdir().unwrap();
    let path = write_jpeg(dir.path(), "a.jpg", &pattern(7));

    let shutdown = AtomicBool::new(true);
    let result = group_duplicates(&[path], &Config::default(), &shutdown);
    assert!(matches!(result, Err(Error::Interrupted)));
}

#[test]
fn test_facade_shutdown_handle() {
    let dir = tempdir().unwrap();
    write_jpeg(dir.path(), "a.jpg", &pattern(7));

    let tidy = PhotoTidy::new(Config::default()).unwrap();
    assert_eq!(tidy.find_duplicates(dir.path()).unwrap().image_count(), 1);

    tidy.shutdown_handle().store(true, Ordering::SeqCst);
    assert!(matches!(tidy.find_duplicates(dir.path()), Err(Error::Interrupted)));
}
