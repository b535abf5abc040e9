//! レポート一覧（index.html）の生成
//!
//! ディレクトリ直下の `*_report.html` を並べ、ナビゲーションスクリプト付きの
//! 一覧ページを書き出す。

use crate::error::{QcError, Result};
use crate::report::{escape_html, inject_script, nav_script, REPORT_SUFFIX};
use crate::run_log::{RunLog, WarningKind};
use crate::scanner::parse_stem;
use fetal_qc_common::{AnonymizationMap, SeriesKey};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const INDEX_FILE: &str = "index.html";

/// 一覧の1項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub file_name: String,
    /// 評価者フォルダでの順番（`001_` 接頭辞）
    pub ordinal: Option<u32>,
    /// `_report.html` と順番を除いた名前
    pub display_name: String,
    /// 並び替え用の実キー。解析できなければ None。
    pub key: Option<SeriesKey>,
}

impl IndexEntry {
    fn sort_key(&self) -> (Option<u32>, Option<&SeriesKey>, &str) {
        (self.ordinal, self.key.as_ref(), &self.file_name)
    }
}

/// `[NNN_]<name>_report.html` を (順番, 名前) に分解する
pub fn parse_report_name(file_name: &str) -> Option<(Option<u32>, String)> {
    lazy_static::lazy_static! {
        static ref ORDINAL_RE: Regex = Regex::new(r"^(\d+)_(.+)$").unwrap();
    }

    let stem = file_name.strip_suffix(REPORT_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    match ORDINAL_RE.captures(stem) {
        Some(caps) => Some((caps[1].parse().ok(), caps[2].to_string())),
        None => Some((None, stem.to_string())),
    }
}

fn key_for(display_name: &str, anon: Option<&AnonymizationMap>) -> Option<SeriesKey> {
    if let Some(key) = anon.and_then(|m| m.real_key(display_name)) {
        return Some(key.clone());
    }
    parse_stem(display_name).map(|n| (n.subject, n.session, n.acquisition, n.run))
}

/// ディレクトリ直下のレポートを列挙し、(順番, 実キー, ファイル名) で並べる
pub fn scan_reports(dir: &Path, anon: Option<&AnonymizationMap>) -> Result<Vec<IndexEntry>> {
    if !dir.is_dir() {
        return Err(QcError::FolderNotFound(dir.display().to_string()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        let Some((ordinal, display_name)) = parse_report_name(&file_name) else {
            continue;
        };
        let key = key_for(&display_name, anon);
        if key.is_none() {
            debug!(file = %file_name, "キーを解析できないレポート");
        }
        entries.push(IndexEntry {
            file_name,
            ordinal,
            display_name,
            key,
        });
    }

    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    Ok(entries)
}

pub fn build_index_html(title: &str, entries: &[IndexEntry]) -> String {
    let title = escape_html(title);
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str(&format!("  <title>{}</title>\n", title));
    html.push_str("  <style>\n");
    html.push_str("    body { font-family: -apple-system, \"Segoe UI\", Helvetica, Arial, sans-serif; margin: 2rem; }\n");
    html.push_str("    #qc-index li { margin: 0.2rem 0; }\n");
    html.push_str("    #qc-index li.reviewed::after { content: \" ✔\"; color: #3a3; }\n");
    html.push_str("  </style>\n</head>\n<body>\n");
    html.push_str(&format!("  <h1>{}</h1>\n", title));
    html.push_str(&format!("  <p>{} reports</p>\n", entries.len()));
    html.push_str("  <ol id=\"qc-index\">\n");
    for entry in entries {
        let file = escape_html(&entry.file_name);
        html.push_str(&format!(
            "    <li><a class=\"qc-report\" data-file=\"{}\" href=\"{}\">{}</a></li>\n",
            file,
            file,
            escape_html(&entry.display_name)
        ));
    }
    html.push_str("  </ol>\n");
    html.push_str(&nav_script());
    html.push_str("</body>\n</html>\n");
    html
}

/// スクリプトが無いレポートに挿入する。挿入した件数を返す。
fn inject_into_reports(dir: &Path, entries: &[IndexEntry], log: &mut RunLog) -> usize {
    let mut injected = 0;
    for entry in entries {
        let path = dir.join(&entry.file_name);
        let result = std::fs::read_to_string(&path).and_then(|html| match inject_script(&html) {
            Some(updated) => std::fs::write(&path, updated).map(|_| true),
            None => Ok(false),
        });
        match result {
            Ok(true) => injected += 1,
            Ok(false) => {}
            Err(e) => log.warn(
                WarningKind::Output,
                format!("failed to add script to {}: {}", path.display(), e),
            ),
        }
    }
    injected
}

/// 以前の実行が残したレポートと index.html を削除する。
///
/// 対象は直下の `[NNN_]<name>_report.html` と `index.html` のみ。戻り値は削除数。
pub fn clear_outputs(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name == INDEX_FILE || parse_report_name(&file_name).is_some() {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    if removed > 0 {
        info!(dir = %dir.display(), removed, "古い出力を削除");
    }
    Ok(removed)
}

/// `dir/index.html` を書き出す
pub fn generate_index(
    dir: &Path,
    anon: Option<&AnonymizationMap>,
    add_script_to_reports: bool,
    log: &mut RunLog,
) -> Result<PathBuf> {
    let entries = scan_reports(dir, anon)?;
    if entries.is_empty() {
        return Err(QcError::NoReportsFound(dir.display().to_string()));
    }

    if add_script_to_reports {
        let n = inject_into_reports(dir, &entries, log);
        debug!(injected = n, "ナビゲーションスクリプトを挿入");
    }

    let title = dir
        .file_name()
        .map(|n| format!("QC reports: {}", n.to_string_lossy()))
        .unwrap_or_else(|| "QC reports".to_string());
    let path = dir.join(INDEX_FILE);
    std::fs::write(&path, build_index_html(&title, &entries))?;
    info!(path = %path.display(), reports = entries.len(), "インデックス出力");
    Ok(path)
}
