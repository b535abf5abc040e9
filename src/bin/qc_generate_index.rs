use clap::Parser;
use fetal_brain_qc::cli::GenerateIndexArgs;
use fetal_brain_qc::commands;
use fetal_brain_qc::error::Result;
use fetal_brain_qc::init_tracing;
use fetal_brain_qc::run_log::RunLog;
use tracing::error;

/// レポートフォルダの index.html を生成
#[derive(Parser)]
#[command(name = "qc_generate_index")]
struct Cli {
    #[command(flatten)]
    args: GenerateIndexArgs,

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
    let mut log = RunLog::new();
    commands::generate_index::run(&cli.args, &mut log)?;
    log.print_summary();
    Ok(())
}
