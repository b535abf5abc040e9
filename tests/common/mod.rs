//! 統合テスト用のヘルパー
#![allow(dead_code)]

use fetal_qc_common::{ManifestRow, SeriesEntry};
use ndarray::{s, Array3};
use nifti::writer::WriterOptions;
use std::fs;
use std::path::{Path, PathBuf};

pub const SHAPE: (usize, usize, usize) = (24, 24, 12);

/// 輝度勾配のある画像
pub fn write_volume(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut data = Array3::<f32>::zeros(SHAPE);
    for ((x, y, z), v) in data.indexed_iter_mut() {
        *v = (x * 3 + y * 2 + z) as f32;
    }
    WriterOptions::new(path).write_nifti(&data).unwrap();
}

/// 中央に直方体のある2値マスク
pub fn write_mask(path: &Path) {
    write_mask_with_shape(path, SHAPE, true);
}

pub fn write_mask_with_shape(path: &Path, shape: (usize, usize, usize), filled: bool) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut data = Array3::<f32>::zeros(shape);
    if filled {
        data.slice_mut(s![8..16, 8..16, 4..8]).fill(1.0);
    }
    WriterOptions::new(path).write_nifti(&data).unwrap();
}

/// `sub-<sub>[/ses-<ses>]/anat/<name>_T2w.nii.gz` を作り、パスを返す
pub fn write_series(root: &Path, sub: &str, ses: Option<&str>, run: &str) -> PathBuf {
    let mut dir = root.join(format!("sub-{}", sub));
    let mut name = format!("sub-{}", sub);
    if let Some(ses) = ses {
        dir = dir.join(format!("ses-{}", ses));
        name.push_str(&format!("_ses-{}", ses));
    }
    let path = dir
        .join("anat")
        .join(format!("{}_run-{}_T2w.nii.gz", name, run));
    write_volume(&path);
    path
}

/// 既定パターンの手動マスク位置にマスクを置く
pub fn write_default_mask(root: &Path, sub: &str, ses: Option<&str>, run: &str) -> PathBuf {
    let mut dir = root.join("derivatives/masks").join(format!("sub-{}", sub));
    let mut name = format!("sub-{}", sub);
    if let Some(ses) = ses {
        dir = dir.join(format!("ses-{}", ses));
        name.push_str(&format!("_ses-{}", ses));
    }
    let path = dir
        .join("anat")
        .join(format!("{}_run-{}_mask.nii.gz", name, run));
    write_mask(&path);
    path
}

/// 画像とマスクを持つ BIDS ツリーを作る
pub fn bids_tree(root: &Path, series: &[(&str, Option<&str>, &str)]) {
    for &(sub, ses, run) in series {
        write_series(root, sub, ses, run);
        write_default_mask(root, sub, ses, run);
    }
}

pub fn manifest_row(image: &Path, mask: &Path, sub: &str, run: &str) -> ManifestRow {
    let series = SeriesEntry {
        subject: sub.into(),
        session: None,
        acquisition: None,
        run: Some(run.into()),
        datatype: "anat".into(),
        suffix: "T2w".into(),
        path: image.to_path_buf(),
    };
    ManifestRow::new(series, mask.to_path_buf())
}

/// ディレクトリ直下のファイル名（ソート済み）
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
