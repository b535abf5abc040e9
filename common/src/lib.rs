//! Fetal brain QC Common Library
//!
//! レポート生成CLIが使う I/O を伴わない型とアルゴリズム:
//! - 系列・マニフェストの型
//! - マスクパスのテンプレート展開
//! - シード固定シャッフルと評価者への割り当て
//! - 匿名化マッピング

pub mod types;
pub mod error;
pub mod pattern;
pub mod shuffle;
pub mod assignment;
pub mod anonymize;

pub use types::{Entities, ManifestRow, SeriesEntry, SeriesKey};
pub use error::{Error, Result};
pub use pattern::{Field, MaskPattern, Segment};
pub use shuffle::SeededShuffler;
pub use assignment::{assign_raters, RaterAssignment};
pub use anonymize::AnonymizationMap;
