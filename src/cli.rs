use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fetal-qc")]
#[command(about = "胎児脳 MRI の目視QCレポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// BIDS ディレクトリを走査し、マスクを照合してCSVを出力
    ListBids(ListBidsArgs),

    /// CSV の各行についてQCレポートを生成
    GenerateReports(GenerateReportsArgs),

    /// レポートフォルダの index.html を生成
    GenerateIndex(GenerateIndexArgs),

    /// 走査からインデックス生成まで一括実行
    RunPipeline(RunPipelineArgs),

    /// 設定管理
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}

/// マスク探索の指定
#[derive(Args, Debug, Clone, Default)]
pub struct MaskArgs {
    /// マスクのパスパターン（先に書いたものを優先）
    #[arg(long, num_args = 1..)]
    pub mask_patterns: Vec<String>,

    /// 各パターンの基準ディレクトリ（パターンと同数）
    #[arg(long, num_args = 1..)]
    pub mask_patterns_base: Vec<PathBuf>,

    /// 画像の接尾辞（既定: T2w）
    #[arg(long)]
    pub suffix: Option<String>,

    /// マスクの接尾辞（既定: mask）
    #[arg(long)]
    pub mask_suffix: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListBidsArgs {
    /// BIDS ディレクトリ
    #[arg(long)]
    pub bids_dir: PathBuf,

    #[command(flatten)]
    pub mask: MaskArgs,

    /// 出力CSV
    #[arg(long, default_value = "bids_csv.csv")]
    pub out_csv: PathBuf,

    /// 被験者IDを匿名化する
    #[arg(long, overrides_with = "no_anonymize_name")]
    pub anonymize_name: bool,

    #[arg(long, overrides_with = "anonymize_name")]
    pub no_anonymize_name: bool,

    /// マスクを照合せず系列だけを列挙する（mask 列は空）
    #[arg(long, overrides_with = "no_skip_masks")]
    pub skip_masks: bool,

    #[arg(long, overrides_with = "skip_masks")]
    pub no_skip_masks: bool,

    /// 乱数シード
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ListBidsArgs {
    pub fn anonymize(&self) -> bool {
        !self.no_anonymize_name
    }

    pub fn skip_masks(&self) -> bool {
        self.skip_masks && !self.no_skip_masks
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateReportsArgs {
    /// レポートの出力先
    #[arg(short, long, default_value = "reports")]
    pub out_path: PathBuf,

    /// 入力CSV（list-bids の出力）
    #[arg(long, default_value = "bids_csv.csv")]
    pub bids_csv: PathBuf,

    /// ナビゲーションスクリプトを埋め込む
    #[arg(long, overrides_with = "no_add_js")]
    pub add_js: bool,

    #[arg(long, overrides_with = "add_js")]
    pub no_add_js: bool,

    /// 断面あたりのスライス数
    #[arg(long)]
    pub n_slices: Option<usize>,

    /// マスク周りの余白 (mm)
    #[arg(long)]
    pub boundary_mm: Option<f32>,
}

impl GenerateReportsArgs {
    pub fn add_js(&self) -> bool {
        !self.no_add_js
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateIndexArgs {
    /// レポートのあるディレクトリ
    #[arg(long, default_value = "reports")]
    pub report_path: PathBuf,

    /// 匿名化名を実IDで並べるためのCSV
    #[arg(long)]
    pub bids_csv: Option<PathBuf>,

    /// 各レポートにナビゲーションスクリプトを挿入する
    #[arg(long, overrides_with = "no_add_script_to_reports")]
    pub add_script_to_reports: bool,

    #[arg(long, overrides_with = "add_script_to_reports")]
    pub no_add_script_to_reports: bool,
}

impl GenerateIndexArgs {
    pub fn add_script(&self) -> bool {
        self.add_script_to_reports && !self.no_add_script_to_reports
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunPipelineArgs {
    /// BIDS ディレクトリ
    pub bids_dir: PathBuf,

    /// 出力ディレクトリ
    pub out_path: PathBuf,

    #[command(flatten)]
    pub mask: MaskArgs,

    /// CSV の出力先（既定: <out_path>/bids.csv）
    #[arg(long)]
    pub bids_csv: Option<PathBuf>,

    #[arg(long, overrides_with = "no_anonymize_name")]
    pub anonymize_name: bool,

    #[arg(long, overrides_with = "anonymize_name")]
    pub no_anonymize_name: bool,

    /// 評価順のランダム化と評価者への分割
    #[arg(long, overrides_with = "no_randomize")]
    pub randomize: bool,

    #[arg(long, overrides_with = "randomize")]
    pub no_randomize: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    /// 評価者1人あたりのレポート数
    #[arg(long, default_value = "100")]
    pub n_reports: usize,

    /// 評価者数
    #[arg(long, default_value = "3")]
    pub n_raters: usize,

    #[arg(long)]
    pub n_slices: Option<usize>,

    #[arg(long)]
    pub boundary_mm: Option<f32>,
}

impl RunPipelineArgs {
    pub fn anonymize(&self) -> bool {
        !self.no_anonymize_name
    }

    pub fn randomize(&self) -> bool {
        !self.no_randomize
    }
}
