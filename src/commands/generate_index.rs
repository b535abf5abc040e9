use crate::cli::GenerateIndexArgs;
use crate::error::Result;
use crate::index::generate_index;
use crate::manifest::read_manifest;
use crate::run_log::RunLog;
use fetal_qc_common::AnonymizationMap;
use std::path::PathBuf;

pub fn run(args: &GenerateIndexArgs, log: &mut RunLog) -> Result<PathBuf> {
    println!("📑 fetal-qc - インデックス生成\n");

    let anon = match &args.bids_csv {
        Some(csv) => Some(AnonymizationMap::from_rows(&read_manifest(csv, log)?)),
        None => None,
    };

    let index = generate_index(&args.report_path, anon.as_ref(), args.add_script(), log)?;
    println!("✔ 保存: {}", index.display());
    Ok(index)
}
