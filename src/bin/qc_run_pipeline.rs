use clap::Parser;
use fetal_brain_qc::cli::RunPipelineArgs;
use fetal_brain_qc::commands;
use fetal_brain_qc::config::Config;
use fetal_brain_qc::error::Result;
use fetal_brain_qc::init_tracing;
use fetal_brain_qc::run_log::RunLog;
use tracing::error;

/// 走査からインデックス生成まで一括実行
#[derive(Parser)]
#[command(name = "qc_run_pipeline")]
struct Cli {
    #[command(flatten)]
    args: RunPipelineArgs,

    /// 詳細ログを出力
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    let mut log = RunLog::new();
    commands::run_pipeline::run(&cli.args, &config, &mut log)?;
    log.print_summary();
    Ok(())
}
