//! 評価者ごとのフォルダへのレポート配置

use crate::error::{QcError, Result};
use crate::index::{clear_outputs, generate_index};
use crate::run_log::{RunLog, WarningKind};
use fetal_qc_common::{AnonymizationMap, RaterAssignment};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// `<out>/split_<r>`
pub fn rater_dir(out_dir: &Path, rater: usize) -> PathBuf {
    out_dir.join(format!("split_{}", rater))
}

/// 提示順を保つための接頭辞付きファイル名（`001_<name>`）
pub fn ordered_file_name(position: usize, file_name: &str) -> String {
    format!("{:03}_{}", position, file_name)
}

/// 既存の `split_<r>` フォルダから以前の出力を削除する。空になったフォルダは消す。
pub fn clear_rater_dirs(out_dir: &Path) -> Result<()> {
    lazy_static::lazy_static! {
        static ref RATER_DIR_RE: Regex = Regex::new(r"^split_\d+$").unwrap();
    }
    if !out_dir.is_dir() {
        return Ok(());
    }
    let dirs: Vec<PathBuf> = WalkDir::new(out_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| RATER_DIR_RE.is_match(&e.file_name().to_string_lossy()))
        .map(|e| e.into_path())
        .collect();
    for dir in dirs {
        clear_outputs(&dir)?;
        // 利用者のファイルが残っていれば失敗するので無視
        let _ = std::fs::remove_dir(&dir);
    }
    Ok(())
}

/// 割り当てに従ってレポートをコピーし、評価者ごとの index.html を作る。
///
/// 元のレポートは変更しない。評価者フォルダに残った以前のレポートは先に削除する。
/// 戻り値は各評価者の index.html のパス。
pub fn place_assignments(
    reports: &[PathBuf],
    assignments: &[RaterAssignment],
    out_dir: &Path,
    anon: Option<&AnonymizationMap>,
    add_script_to_reports: bool,
    log: &mut RunLog,
) -> Result<Vec<PathBuf>> {
    let mut indexes = Vec::with_capacity(assignments.len());

    for assignment in assignments {
        let dir = rater_dir(out_dir, assignment.rater);
        std::fs::create_dir_all(&dir)?;
        clear_outputs(&dir)?;

        for (pos, &idx) in assignment.indices.iter().enumerate() {
            let source = reports.get(idx).ok_or_else(|| {
                QcError::Config(format!(
                    "割り当て位置 {} がレポート数 {} を超えています",
                    idx,
                    reports.len()
                ))
            })?;
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let dest = dir.join(ordered_file_name(pos + 1, &file_name));
            if let Err(e) = std::fs::copy(source, &dest) {
                log.warn(
                    WarningKind::Output,
                    format!("failed to copy {} to {}: {}", source.display(), dest.display(), e),
                );
            }
        }

        indexes.push(generate_index(&dir, anon, add_script_to_reports, log)?);
        info!(
            rater = assignment.rater,
            reports = assignment.indices.len(),
            "評価者フォルダ作成"
        );
    }

    Ok(indexes)
}
