//! QC レポート生成
//!
//! マニフェストの各行について画像とマスクを読み込み、スナップショットを
//! 埋め込んだ単独で開ける HTML を書き出す。

pub mod html;
pub mod script;

pub use html::{build_html, escape_html, ReportPage};
pub use script::{has_script, inject_script, nav_script, SCRIPT_MARKER};

use crate::error::Result;
use crate::render::{render_volume, RenderOptions};
use crate::run_log::{RunLog, WarningKind};
use crate::volume::{Mask, Volume};
use fetal_qc_common::ManifestRow;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// レポートファイル名の接尾辞
pub const REPORT_SUFFIX: &str = "_report.html";

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub render: RenderOptions,
    pub add_js: bool,
}

pub fn report_file_name(row: &ManifestRow) -> String {
    format!("{}{}", row.display_name(), REPORT_SUFFIX)
}

/// 1行分の HTML を作る（書き込みはしない）
pub fn render_report(row: &ManifestRow, options: &ReportOptions) -> Result<String> {
    let image = Volume::open(&row.series.path)?;
    let mask = Mask::open(&row.mask)?;
    let planes = render_volume(&image, &mask, &options.render)?;

    let page = ReportPage {
        row,
        shape: image.shape(),
        voxel_mm: image.voxel_mm(),
        mask_volume_ml: mask.volume_ml(),
        planes: &planes,
        add_js: options.add_js,
    };
    Ok(build_html(&page))
}

/// 一時ファイルに書いてから置き換える
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("html.tmp");
    std::fs::write(&tmp, content)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn write_report(row: &ManifestRow, out_dir: &Path, options: &ReportOptions) -> Result<PathBuf> {
    let html = render_report(row, options)?;
    let path = out_dir.join(report_file_name(row));
    write_atomic(&path, &html)?;
    debug!(path = %path.display(), "レポート出力");
    Ok(path)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// 全行のレポートを並列に生成する。
///
/// 失敗した行は警告してスキップし、ファイルは残さない。
/// 警告はマニフェスト順に記録する。戻り値は書き出したレポートのパス（マニフェスト順）。
pub fn generate_reports(
    rows: &[ManifestRow],
    out_dir: &Path,
    options: &ReportOptions,
    log: &mut RunLog,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let pb = progress_bar(rows.len());
    let results: Vec<Result<PathBuf>> = rows
        .par_iter()
        .map(|row| {
            let result = write_report(row, out_dir, options);
            pb.inc(1);
            result
        })
        .collect();
    pb.finish_and_clear();

    let mut written = Vec::with_capacity(rows.len());
    for (row, result) in rows.iter().zip(results) {
        match result {
            Ok(path) => written.push(path),
            Err(e) => log.warn(
                WarningKind::ReportSkipped,
                format!("skipping report for {}: {}", row.display_name(), e),
            ),
        }
    }

    info!(
        written = written.len(),
        skipped = rows.len() - written.len(),
        "レポート生成完了"
    );
    Ok(written)
}
