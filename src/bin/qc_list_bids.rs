use clap::Parser;
use fetal_brain_qc::cli::ListBidsArgs;
use fetal_brain_qc::commands;
use fetal_brain_qc::config::Config;
use fetal_brain_qc::error::Result;
use fetal_brain_qc::init_tracing;
use fetal_brain_qc::run_log::RunLog;
use tracing::error;

/// BIDS ディレクトリを走査し、マスクを照合してCSVを出力
#[derive(Parser)]
#[command(name = "qc_list_bids")]
struct Cli {
    #[command(flatten)]
    args: ListBidsArgs,

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
    commands::list_bids::run(&cli.args, &config, &mut log)?;
    log.print_summary();
    Ok(())
}
