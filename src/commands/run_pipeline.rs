use crate::cli::RunPipelineArgs;
use crate::config::Config;
use crate::error::{QcError, Result};
use crate::index::{clear_outputs, generate_index};
use crate::manifest::write_manifest;
use crate::report::{generate_reports, ReportOptions};
use crate::run_log::RunLog;
use crate::split::{clear_rater_dirs, place_assignments};
use fetal_qc_common::assignment::validate;
use fetal_qc_common::shuffle::STREAM_MANIFEST_ORDER;
use fetal_qc_common::{assign_raters, AnonymizationMap, RaterAssignment, SeededShuffler};
use std::path::PathBuf;

/// 一括実行の結果
#[derive(Debug)]
pub struct PipelineSummary {
    pub manifest: PathBuf,
    pub rows: usize,
    pub reports: Vec<PathBuf>,
    pub index: PathBuf,
    pub assignments: Vec<RaterAssignment>,
    /// 評価者ごとの index.html
    pub rater_indexes: Vec<PathBuf>,
}

pub fn run(args: &RunPipelineArgs, config: &Config, log: &mut RunLog) -> Result<PipelineSummary> {
    let seed = args.seed.unwrap_or(config.seed);
    let options = ReportOptions {
        render: super::render_options(config, args.n_slices, args.boundary_mm)?,
        add_js: true,
    };
    if args.randomize() {
        if args.n_raters == 0 {
            return Err(QcError::Config("n_raters は 1 以上が必要です".into()));
        }
        if args.n_reports == 0 {
            return Err(QcError::Config("n_reports は 1 以上が必要です".into()));
        }
    }

    let steps = if args.randomize() { 5 } else { 4 };
    println!("🚀 fetal-qc - 一括処理\n");

    // 1. 走査・照合
    println!("[1/{}] 系列を走査・マスクを照合中...", steps);
    let mut rows = super::list_bids::build_manifest(
        &args.bids_dir,
        &args.mask,
        false,
        args.anonymize(),
        seed,
        config,
        log,
    )?;
    if args.randomize() {
        validate(rows.len(), args.n_reports, args.n_raters)?;
        SeededShuffler::with_stream(seed, STREAM_MANIFEST_ORDER).shuffle(&mut rows);
    }
    println!("✔ {}件の系列にマスクを割り当て\n", rows.len());

    // 2. CSV
    println!("[2/{}] CSV を保存中...", steps);
    let manifest = args
        .bids_csv
        .clone()
        .unwrap_or_else(|| args.out_path.join("bids.csv"));
    write_manifest(&manifest, &rows)?;
    println!("✔ 保存: {}\n", manifest.display());

    // 3. レポート
    println!("[3/{}] レポートを生成中...", steps);
    let report_dir = args.out_path.join("reports");
    // 以前の実行の出力は匿名ラベルや割り当てが異なりうる
    clear_outputs(&report_dir)?;
    clear_rater_dirs(&args.out_path)?;
    let reports = generate_reports(&rows, &report_dir, &options, log)?;
    println!("✔ {}/{}件のレポートを出力\n", reports.len(), rows.len());

    let anon = args.anonymize().then(|| AnonymizationMap::from_rows(&rows));

    // 4. 評価者への割り当て
    let (assignments, rater_indexes) = if args.randomize() {
        println!("[4/{}] 評価者フォルダを作成中...", steps);
        let assignments = assign_raters(reports.len(), args.n_reports, args.n_raters, seed)?;
        let indexes = place_assignments(
            &reports,
            &assignments,
            &args.out_path,
            anon.as_ref(),
            false,
            log,
        )?;
        println!("✔ {}人分のフォルダを作成\n", assignments.len());
        (assignments, indexes)
    } else {
        (Vec::new(), Vec::new())
    };

    // 5. インデックス
    println!("[{}/{}] インデックスを生成中...", steps, steps);
    let index = generate_index(&report_dir, anon.as_ref(), false, log)?;
    println!("✔ 保存: {}", index.display());

    Ok(PipelineSummary {
        manifest,
        rows: rows.len(),
        reports,
        index,
        assignments,
        rater_indexes,
    })
}
