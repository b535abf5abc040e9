use clap::Parser;
use fetal_brain_qc::{cli, commands, config, error, init_tracing, run_log};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use run_log::RunLog;
use tracing::error;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut log = RunLog::new();

    match cli.command {
        Commands::ListBids(args) => {
            commands::list_bids::run(&args, &config, &mut log)?;
        }

        Commands::GenerateReports(args) => {
            commands::generate_reports::run(&args, &config, &mut log)?;
        }

        Commands::GenerateIndex(args) => {
            commands::generate_index::run(&args, &mut log)?;
        }

        Commands::RunPipeline(args) => {
            commands::run_pipeline::run(&args, &config, &mut log)?;
            println!("\n✅ 完了");
        }

        Commands::Config { show, init } => {
            if init {
                config.save()?;
                println!("✔ 設定ファイルを作成: {}", Config::config_path()?.display());
            }

            if show {
                println!("設定:");
                println!("  マスクパターン:");
                for pattern in &config.mask_patterns {
                    println!("    - {}", pattern);
                }
                println!("  画像の接尾辞: {}", config.suffix);
                println!("  マスクの接尾辞: {}", config.mask_suffix);
                println!("  スライス数: {}", config.n_slices);
                println!("  余白: {}mm", config.boundary_mm);
                println!("  シード: {}", config.seed);
            }
        }
    }

    log.print_summary();
    Ok(())
}
