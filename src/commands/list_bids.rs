use crate::cli::{ListBidsArgs, MaskArgs};
use crate::config::Config;
use crate::error::{QcError, Result};
use crate::manifest::write_manifest;
use crate::matcher::{build_candidates, resolve_manifest};
use crate::run_log::RunLog;
use crate::scanner::scan_bids;
use fetal_qc_common::{AnonymizationMap, ManifestRow};
use std::path::{Path, PathBuf};
use tracing::info;

/// 走査・照合・匿名化までを行いマニフェストを返す。
///
/// `skip_masks` なら照合せず、mask が空の行を返す（レポート生成では除外される）。
pub(crate) fn build_manifest(
    bids_dir: &Path,
    mask: &MaskArgs,
    skip_masks: bool,
    anonymize: bool,
    seed: u64,
    config: &Config,
    log: &mut RunLog,
) -> Result<Vec<ManifestRow>> {
    let (patterns, bases) = super::mask_patterns(mask, config);
    let candidates = build_candidates(&patterns, &bases)?;
    let suffix = mask.suffix.as_deref().unwrap_or(&config.suffix);
    let mask_suffix = mask.mask_suffix.as_deref().unwrap_or(&config.mask_suffix);

    if !bids_dir.is_dir() {
        return Err(QcError::FolderNotFound(bids_dir.display().to_string()));
    }
    let root = bids_dir.canonicalize()?;

    let series = scan_bids(&root, suffix, log)?;
    let n_series = series.len();
    let mut rows = if skip_masks {
        info!(series = n_series, "マスク照合を省略");
        series
            .into_iter()
            .map(|s| ManifestRow::new(s, PathBuf::new()))
            .collect()
    } else {
        let rows = resolve_manifest(series, &candidates, &root, mask_suffix, log);
        info!(series = n_series, resolved = rows.len(), "マスク照合完了");
        rows
    };

    if anonymize {
        AnonymizationMap::build(&rows, seed).apply(&mut rows);
    }
    Ok(rows)
}

pub fn run(args: &ListBidsArgs, config: &Config, log: &mut RunLog) -> Result<Vec<ManifestRow>> {
    println!("🔎 fetal-qc - BIDS 走査\n");

    println!("[1/2] 系列を走査・マスクを照合中...");
    let seed = args.seed.unwrap_or(config.seed);
    let rows = build_manifest(
        &args.bids_dir,
        &args.mask,
        args.skip_masks(),
        args.anonymize(),
        seed,
        config,
        log,
    )?;
    if args.skip_masks() {
        println!("✔ {}件の系列を列挙（マスク照合なし）\n", rows.len());
    } else {
        println!("✔ {}件の系列にマスクを割り当て\n", rows.len());
    }

    println!("[2/2] CSV を保存中...");
    write_manifest(&args.out_csv, &rows)?;
    println!("✔ 保存: {}", args.out_csv.display());

    Ok(rows)
}
