//! レポート生成の統合テスト（小さな合成 NIfTI を使う）

mod common;

use common::{file_names, manifest_row, write_mask, write_mask_with_shape, write_volume, SHAPE};
use fetal_brain_qc::render::RenderOptions;
use fetal_brain_qc::report::{generate_reports, has_script, ReportOptions};
use fetal_brain_qc::run_log::{RunLog, WarningKind};
use fetal_brain_qc::volume::{Mask, Volume};
use std::fs;
use tempfile::tempdir;

/// 書き出した NIfTI が同じ形状で読める
#[test]
fn test_volume_loads_synthetic_nifti() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = dir.path().join("sub-01_run-1_T2w.nii.gz");
    let mask = dir.path().join("sub-01_run-1_mask.nii.gz");
    write_volume(&image);
    write_mask(&mask);

    let volume = Volume::open(&image).unwrap();
    assert_eq!(volume.shape(), [SHAPE.0, SHAPE.1, SHAPE.2]);
    assert_eq!(volume.data()[[2, 1, 3]], (2 * 3 + 1 * 2 + 3) as f32);

    let mask = Mask::open(&mask).unwrap();
    assert_eq!(mask.voxel_count(), 8 * 8 * 4);
    assert_eq!(mask.bounding_box(), Some([(8, 15), (8, 15), (4, 7)]));
}

/// レポートが生成され、スナップショットとフォームを含む
#[test]
fn test_generate_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = dir.path().join("sub-01_run-1_T2w.nii.gz");
    let mask = dir.path().join("sub-01_run-1_mask.nii.gz");
    write_volume(&image);
    write_mask(&mask);

    let rows = vec![manifest_row(&image, &mask, "01", "1")];
    let out = dir.path().join("reports");
    let options = ReportOptions {
        render: RenderOptions {
            n_slices: 3,
            boundary_mm: 2.0,
        },
        add_js: true,
    };
    let mut log = RunLog::new();
    let written = generate_reports(&rows, &out, &options, &mut log).unwrap();

    assert!(log.is_clean(), "{:?}", log.warnings());
    assert_eq!(written, vec![out.join("sub-01_run-1_T2w_report.html")]);

    let html = fs::read_to_string(&written[0]).unwrap();
    assert!(html.contains("sub-01_run-1_T2w"));
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("id=\"axial\""));
    assert!(html.contains("id=\"coronal\""));
    assert!(html.contains("id=\"sagittal\""));
    assert!(html.contains("id=\"rating-form\""));
    assert!(has_script(&html));
    // 3断面 × 3スライス × 2枚
    assert_eq!(html.matches("data:image/png;base64,").count(), 18);
}

/// --no-add-js ではスクリプトを埋め込まない
#[test]
fn test_generate_report_without_nav_script() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = dir.path().join("sub-01_run-1_T2w.nii.gz");
    let mask = dir.path().join("sub-01_run-1_mask.nii.gz");
    write_volume(&image);
    write_mask(&mask);

    let rows = vec![manifest_row(&image, &mask, "01", "1")];
    let out = dir.path().join("reports");
    let mut log = RunLog::new();
    let written = generate_reports(&rows, &out, &ReportOptions::default(), &mut log).unwrap();

    let html = fs::read_to_string(&written[0]).unwrap();
    assert!(!has_script(&html));
}

/// 読めない行・空マスク・形状不一致はスキップされ、ファイルは残らない
#[test]
fn test_failed_rows_are_skipped_in_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = dir.path().join("sub-01_run-1_T2w.nii.gz");
    let good_mask = dir.path().join("good_mask.nii.gz");
    let empty_mask = dir.path().join("empty_mask.nii.gz");
    let small_mask = dir.path().join("small_mask.nii.gz");
    write_volume(&image);
    write_mask(&good_mask);
    write_mask_with_shape(&empty_mask, SHAPE, false);
    write_mask_with_shape(&small_mask, (10, 10, 10), true);

    let rows = vec![
        manifest_row(&image, &empty_mask, "01", "1"),
        manifest_row(&image, &good_mask, "02", "1"),
        manifest_row(&image, &small_mask, "03", "1"),
        manifest_row(&dir.path().join("missing.nii.gz"), &good_mask, "04", "1"),
    ];
    let out = dir.path().join("reports");
    let mut log = RunLog::new();
    let written = generate_reports(&rows, &out, &ReportOptions::default(), &mut log).unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(file_names(&out), vec!["sub-02_run-1_T2w_report.html"]);

    let skipped: Vec<_> = log
        .warnings()
        .iter()
        .filter(|w| w.kind == WarningKind::ReportSkipped)
        .map(|w| w.message.clone())
        .collect();
    assert_eq!(skipped.len(), 3);
    assert!(skipped[0].contains("sub-01_run-1_T2w"));
    assert!(skipped[1].contains("sub-03_run-1_T2w"));
    assert!(skipped[2].contains("sub-04_run-1_T2w"));
}

/// 匿名化名があればファイル名と見出しに使い、実IDは出さない
#[test]
fn test_anonymized_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = dir.path().join("img.nii.gz");
    let mask = dir.path().join("mask.nii.gz");
    write_volume(&image);
    write_mask(&mask);

    let mut row = manifest_row(&image, &mask, "01", "1");
    row.anon_name = Some("anon-002_run-1".to_string());
    let out = dir.path().join("reports");
    let mut log = RunLog::new();
    let written = generate_reports(&[row], &out, &ReportOptions::default(), &mut log).unwrap();

    assert_eq!(written, vec![out.join("anon-002_run-1_report.html")]);
    let html = fs::read_to_string(&written[0]).unwrap();
    assert!(html.contains("anon-002_run-1"));
    assert!(!html.contains("sub-01"));
    assert!(!html.contains("img.nii.gz"));
}
