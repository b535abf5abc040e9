//! インデックス生成と評価者フォルダ配置の統合テスト

mod common;

use common::file_names;
use fetal_brain_qc::index::{generate_index, scan_reports, INDEX_FILE};
use fetal_brain_qc::report::{has_script, nav_script, SCRIPT_MARKER};
use fetal_brain_qc::run_log::RunLog;
use fetal_brain_qc::split::place_assignments;
use fetal_qc_common::{assign_raters, AnonymizationMap, ManifestRow, SeriesEntry};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_report(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{}_report.html", name));
    fs::write(&path, format!("<html><body><h1>{}</h1></body></html>", name)).unwrap();
    path
}

fn index_links(dir: &Path) -> Vec<String> {
    let html = fs::read_to_string(dir.join(INDEX_FILE)).unwrap();
    html.lines()
        .filter_map(|l| l.split("data-file=\"").nth(1))
        .filter_map(|rest| rest.split('"').next())
        .map(String::from)
        .collect()
}

/// index.html はディレクトリにあるレポートだけを並べる
#[test]
fn test_index_lists_existing_reports() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_report(dir.path(), "sub-02_run-1_T2w");
    write_report(dir.path(), "sub-01_run-2_T2w");
    write_report(dir.path(), "sub-01_run-1_T2w");
    fs::write(dir.path().join("notes.txt"), "x").unwrap();

    let mut log = RunLog::new();
    generate_index(dir.path(), None, false, &mut log).unwrap();

    assert_eq!(
        index_links(dir.path()),
        vec![
            "sub-01_run-1_T2w_report.html",
            "sub-01_run-2_T2w_report.html",
            "sub-02_run-1_T2w_report.html",
        ]
    );
    let index = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
    assert!(has_script(&index));
}

/// レポートを1件消すと、インデックスの項目もちょうど1件減る
#[test]
fn test_removing_report_removes_one_entry() {
    let dir = tempdir().expect("Failed to create temp dir");
    for name in ["sub-01_run-1_T2w", "sub-02_run-1_T2w", "sub-03_run-1_T2w"] {
        write_report(dir.path(), name);
    }
    let mut log = RunLog::new();
    generate_index(dir.path(), None, false, &mut log).unwrap();
    let before = index_links(dir.path());

    fs::remove_file(dir.path().join("sub-02_run-1_T2w_report.html")).unwrap();
    generate_index(dir.path(), None, false, &mut log).unwrap();
    let after = index_links(dir.path());

    assert_eq!(after.len(), before.len() - 1);
    assert!(!after.contains(&"sub-02_run-1_T2w_report.html".to_string()));
    for link in &after {
        assert!(dir.path().join(link).is_file());
    }
}

/// スクリプト挿入は何度実行しても1回分だけ
#[test]
fn test_add_script_to_reports_is_idempotent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let report = write_report(dir.path(), "sub-01_run-1_T2w");

    let mut log = RunLog::new();
    generate_index(dir.path(), None, true, &mut log).unwrap();
    generate_index(dir.path(), None, true, &mut log).unwrap();

    let html = fs::read_to_string(&report).unwrap();
    assert_eq!(html.matches(SCRIPT_MARKER).count(), 1);
    assert!(html.contains(nav_script().trim()));
    assert!(log.is_clean());
}

fn row(sub: &str, run: &str) -> ManifestRow {
    let series = SeriesEntry {
        subject: sub.into(),
        session: None,
        acquisition: None,
        run: Some(run.into()),
        datatype: "anat".into(),
        suffix: "T2w".into(),
        path: PathBuf::from(format!("/d/sub-{}_run-{}_T2w.nii.gz", sub, run)),
    };
    ManifestRow::new(series, PathBuf::from("/d/mask.nii.gz"))
}

/// 匿名化レポートは実IDの順で並ぶ
#[test]
fn test_anonymized_reports_sorted_by_real_key() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut rows = vec![row("01", "1"), row("02", "1"), row("03", "1"), row("04", "1")];
    let map = AnonymizationMap::build(&rows, 42);
    map.apply(&mut rows);
    for r in &rows {
        write_report(dir.path(), r.anon_name.as_deref().unwrap());
    }

    let restored = AnonymizationMap::from_rows(&rows);
    let entries = scan_reports(dir.path(), Some(&restored)).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.display_name.clone()).collect();
    let expected: Vec<_> = rows.iter().map(|r| r.anon_name.clone().unwrap()).collect();
    assert_eq!(names, expected);
}

/// 評価者フォルダには順番付きのコピーと index.html がある
#[test]
fn test_place_assignments() {
    let dir = tempdir().expect("Failed to create temp dir");
    let report_dir = dir.path().join("reports");
    fs::create_dir_all(&report_dir).unwrap();
    let reports: Vec<PathBuf> = (1..=5)
        .map(|i| write_report(&report_dir, &format!("sub-0{}_run-1_T2w", i)))
        .collect();
    let originals = file_names(&report_dir);

    let assignments = assign_raters(reports.len(), 3, 2, 42).unwrap();
    let mut log = RunLog::new();
    let indexes =
        place_assignments(&reports, &assignments, dir.path(), None, true, &mut log).unwrap();
    assert_eq!(indexes.len(), 2);

    for assignment in &assignments {
        let split = dir.path().join(format!("split_{}", assignment.rater));
        let expected: Vec<String> = assignment
            .indices
            .iter()
            .enumerate()
            .map(|(pos, &i)| {
                let name = reports[i].file_name().unwrap().to_string_lossy().to_string();
                format!("{:03}_{}", pos + 1, name)
            })
            .collect();

        // インデックスは割り当て順
        assert_eq!(index_links(&split), expected);
        for name in &expected {
            assert!(has_script(&fs::read_to_string(split.join(name)).unwrap()));
        }
    }

    // 元のレポートは変更されない
    assert_eq!(file_names(&report_dir), originals);
    for path in &reports {
        assert!(!has_script(&fs::read_to_string(path).unwrap()));
    }
}
