//! BIDS ファイル名のエンティティ解析

use regex::Regex;

/// ファイル名から取り出したエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidsName {
    pub subject: String,
    pub session: Option<String>,
    pub acquisition: Option<String>,
    pub run: Option<String>,
    pub suffix: String,
}

/// 拡張子を除いた名前（`sub-01_ses-01_run-1_T2w`）を解析
pub fn parse_stem(stem: &str) -> Option<BidsName> {
    lazy_static::lazy_static! {
        static ref STEM_RE: Regex = Regex::new(
            r"^sub-([A-Za-z0-9]+)(?:_ses-([A-Za-z0-9]+))?(?:_acq-([A-Za-z0-9]+))?(?:_ce-[A-Za-z0-9]+)?(?:_rec-[A-Za-z0-9]+)?(?:_run-([0-9]+))?_([A-Za-z0-9]+)$"
        ).unwrap();
    }

    let caps = STEM_RE.captures(stem)?;
    let opt = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
    Some(BidsName {
        subject: caps[1].to_string(),
        session: opt(2),
        acquisition: opt(3),
        run: opt(4),
        suffix: caps[5].to_string(),
    })
}

/// NIfTI ファイル名を解析。`.nii` / `.nii.gz` 以外は None。
pub fn parse_file_name(file_name: &str) -> Option<BidsName> {
    let stem = file_name
        .strip_suffix(".nii.gz")
        .or_else(|| file_name.strip_suffix(".nii"))?;
    parse_stem(stem)
}
