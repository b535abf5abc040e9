pub mod entities;

use crate::error::{QcError, Result};
use crate::run_log::{RunLog, WarningKind};
use fetal_qc_common::SeriesEntry;
use std::path::{Component, Path};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

pub use entities::{parse_file_name, parse_stem, BidsName};

/// ルート直下で走査しないディレクトリ
const SKIPPED_TOP_LEVEL: &[&str] = &["derivatives", "sourcedata", "code"];

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if entry.depth() == 0 {
        return false;
    }
    if name.starts_with('.') {
        return true;
    }
    entry.depth() == 1 && entry.file_type().is_dir() && SKIPPED_TOP_LEVEL.contains(&&*name)
}

/// `root` からの相対パスが `sub-X[/ses-Y]/<datatype>/<file>` で、
/// ディレクトリ名とファイル名のエンティティが一致していれば datatype を返す
fn datatype_for(root: &Path, path: &Path, name: &BidsName) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let dirs: Vec<String> = rel
        .parent()?
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    let (sub_dir, ses_dir, datatype) = match dirs.as_slice() {
        [sub, datatype] => (sub, None, datatype),
        [sub, ses, datatype] => (sub, Some(ses), datatype),
        _ => return None,
    };

    if *sub_dir != format!("sub-{}", name.subject) {
        return None;
    }
    match (ses_dir, &name.session) {
        (None, None) => {}
        (Some(dir), Some(ses)) if *dir == format!("ses-{}", ses) => {}
        _ => return None,
    }
    Some(datatype.clone())
}

/// BIDS ディレクトリから `suffix` の LR 系列を列挙する。
///
/// 結果は (subject, session, acquisition, run) の順に並び、キーは一意。
/// 同じキーが複数あれば最初の1件を残して警告する。
pub fn scan_bids(root: &Path, suffix: &str, log: &mut RunLog) -> Result<Vec<SeriesEntry>> {
    if !root.is_dir() {
        return Err(QcError::FolderNotFound(root.display().to_string()));
    }
    let root = root.canonicalize()?;

    let mut series = Vec::new();

    for entry in WalkDir::new(&root)
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        let Some(name) = parse_file_name(&file_name) else {
            continue;
        };
        if name.suffix != suffix {
            continue;
        }
        let Some(datatype) = datatype_for(&root, path, &name) else {
            debug!(path = %path.display(), "BIDS構造外のファイルをスキップ");
            continue;
        };

        series.push(SeriesEntry {
            subject: name.subject,
            session: name.session,
            acquisition: name.acquisition,
            run: name.run,
            datatype,
            suffix: name.suffix,
            path: path.to_path_buf(),
        });
    }

    // キー → パスの順でソートし、走査順に依存しないようにする
    series.sort_by(|a, b| a.key().cmp(&b.key()).then_with(|| a.path.cmp(&b.path)));

    let mut unique: Vec<SeriesEntry> = Vec::with_capacity(series.len());
    for entry in series {
        if let Some(prev) = unique.last() {
            if prev.key() == entry.key() {
                log.warn(
                    WarningKind::DuplicateSeries,
                    format!(
                        "duplicate series for {}: keeping {}, skipping {}",
                        entry.label(),
                        prev.path.display(),
                        entry.path.display()
                    ),
                );
                continue;
            }
        }
        unique.push(entry);
    }

    Ok(unique)
}
