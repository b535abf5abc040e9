//! マニフェスト CSV の読み書き
//!
//! 列: `name,sub,ses,acq,run,datatype,im,mask,anon_name`（空セルは値なし）

use crate::error::{QcError, Result};
use crate::run_log::{RunLog, WarningKind};
use crate::scanner::{parse_file_name, parse_stem};
use fetal_qc_common::{ManifestRow, SeriesEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const DEFAULT_SUFFIX: &str = "T2w";
const REQUIRED_COLUMNS: &[&str] = &["sub", "im", "mask"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ManifestRecord {
    #[serde(default)]
    name: String,
    sub: String,
    #[serde(default)]
    ses: String,
    #[serde(default)]
    acq: String,
    #[serde(default)]
    run: String,
    #[serde(default)]
    datatype: String,
    im: String,
    mask: String,
    #[serde(default)]
    anon_name: String,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ManifestRecord {
    fn from_row(row: &ManifestRow) -> Self {
        let s = &row.series;
        Self {
            name: row.name(),
            sub: s.subject.clone(),
            ses: s.session.clone().unwrap_or_default(),
            acq: s.acquisition.clone().unwrap_or_default(),
            run: s.run.clone().unwrap_or_default(),
            datatype: s.datatype.clone(),
            im: s.path.to_string_lossy().to_string(),
            mask: row.mask.to_string_lossy().to_string(),
            anon_name: row.anon_name.clone().unwrap_or_default(),
        }
    }

    fn into_row(self) -> std::result::Result<ManifestRow, String> {
        let subject = non_empty(&self.sub).ok_or("`sub` が空です")?;
        let im = non_empty(&self.im).ok_or("`im` が空です")?;
        let mask = non_empty(&self.mask).ok_or("`mask` が空です")?;

        let im_name = Path::new(&im)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let suffix = parse_file_name(&im_name)
            .or_else(|| parse_stem(&self.name))
            .map(|n| n.suffix)
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());

        let series = SeriesEntry {
            subject,
            session: non_empty(&self.ses),
            acquisition: non_empty(&self.acq),
            run: non_empty(&self.run),
            datatype: non_empty(&self.datatype).unwrap_or_else(|| "anat".to_string()),
            suffix,
            path: PathBuf::from(im),
        };
        Ok(ManifestRow {
            series,
            mask: PathBuf::from(mask),
            anon_name: non_empty(&self.anon_name),
        })
    }
}

pub fn write_manifest(path: &Path, rows: &[ManifestRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(ManifestRecord::from_row(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// 読み込み。不正な行・重複キーは警告して除外する。
pub fn read_manifest(path: &Path, log: &mut RunLog) -> Result<Vec<ManifestRow>> {
    if !path.is_file() {
        return Err(QcError::FileNotFound(path.display().to_string()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *required) {
            return Err(QcError::Manifest(format!(
                "{}: 列 `{}` がありません",
                path.display(),
                required
            )));
        }
    }
    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for (i, record) in reader.deserialize::<ManifestRecord>().enumerate() {
        // ヘッダーが1行目
        let line = i + 2;
        let row = match record.map_err(|e| e.to_string()).and_then(ManifestRecord::into_row) {
            Ok(row) => row,
            Err(reason) => {
                log.warn(
                    WarningKind::ManifestRow,
                    format!("{}:{}: skipping row: {}", path.display(), line, reason),
                );
                continue;
            }
        };
        if !seen.insert(row.key()) {
            log.warn(
                WarningKind::ManifestRow,
                format!(
                    "{}:{}: duplicate entry for {}",
                    path.display(),
                    line,
                    row.series.label()
                ),
            );
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}
