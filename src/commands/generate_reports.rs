use crate::cli::GenerateReportsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::read_manifest;
use crate::report::{generate_reports, ReportOptions};
use crate::run_log::RunLog;
use std::path::PathBuf;

pub fn run(args: &GenerateReportsArgs, config: &Config, log: &mut RunLog) -> Result<Vec<PathBuf>> {
    let options = ReportOptions {
        render: super::render_options(config, args.n_slices, args.boundary_mm)?,
        add_js: args.add_js(),
    };

    println!("🧠 fetal-qc - レポート生成\n");

    println!("[1/2] CSV を読み込み中...");
    let rows = read_manifest(&args.bids_csv, log)?;
    println!("✔ {}件\n", rows.len());

    println!("[2/2] レポートを生成中...");
    let reports = generate_reports(&rows, &args.out_path, &options, log)?;
    println!(
        "✔ {}/{}件のレポートを出力: {}",
        reports.len(),
        rows.len(),
        args.out_path.display()
    );

    Ok(reports)
}
