//! マスクパスのテンプレート
//!
//! `sub-{subject}[/ses-{session}][/{datatype}]/sub-{subject}[_run-{run}]_{suffix}.nii.gz`
//! のような文字列をパースし、系列ごとのフィールドで展開する。
//!
//! - `{field}`: 必須フィールド。値がなければパターン自体が適用不可
//! - `[...]`: 任意セグメント。中のフィールドが全て揃っている時だけ出力
//! - それ以外: リテラル

use crate::error::{Error, Result};
use crate::types::Entities;
use std::fmt;
use std::str::FromStr;

/// 置換可能なフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Subject,
    Session,
    Acquisition,
    Run,
    Datatype,
    Suffix,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Subject,
        Field::Session,
        Field::Acquisition,
        Field::Run,
        Field::Datatype,
        Field::Suffix,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Subject => "subject",
            Field::Session => "session",
            Field::Acquisition => "acquisition",
            Field::Run => "run",
            Field::Datatype => "datatype",
            Field::Suffix => "suffix",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// 空文字列は「値なし」と同じ扱い
    pub fn value<'a>(&self, entities: &'a Entities) -> Option<&'a str> {
        let value = match self {
            Field::Subject => Some(entities.subject.as_str()),
            Field::Session => entities.session.as_deref(),
            Field::Acquisition => entities.acquisition.as_deref(),
            Field::Run => entities.run.as_deref(),
            Field::Datatype => entities.datatype.as_deref(),
            Field::Suffix => entities.suffix.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// テンプレートの構成要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field(Field),
    /// 入れ子不可。中身は Literal と Field のみ
    Optional(Vec<Segment>),
}

/// パース済みマスクパターン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPattern {
    source: String,
    segments: Vec<Segment>,
}

impl MaskPattern {
    pub fn parse(source: &str) -> Result<Self> {
        let err = |reason: String| Error::Pattern {
            pattern: source.to_string(),
            reason,
        };

        let mut segments: Vec<Segment> = Vec::new();
        let mut optional: Option<Vec<Segment>> = None;
        let mut chars = source.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '[' => {
                    if optional.is_some() {
                        return Err(err("nested optional segment".into()));
                    }
                    optional = Some(Vec::new());
                }
                ']' => match optional.take() {
                    Some(inner) if inner.is_empty() => {
                        return Err(err("empty optional segment".into()));
                    }
                    Some(inner) => segments.push(Segment::Optional(inner)),
                    None => return Err(err("unbalanced `]`".into())),
                },
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(err("unterminated `{`".into()));
                    }
                    if name.is_empty() {
                        return Err(err("empty field name".into()));
                    }
                    let field = Field::from_name(&name)
                        .ok_or_else(|| err(format!("unknown field `{}`", name)))?;
                    current(&mut optional, &mut segments).push(Segment::Field(field));
                }
                '}' => return Err(err("unbalanced `}`".into())),
                c => {
                    let target = current(&mut optional, &mut segments);
                    match target.last_mut() {
                        Some(Segment::Literal(lit)) => lit.push(c),
                        _ => target.push(Segment::Literal(c.to_string())),
                    }
                }
            }
        }

        if optional.is_some() {
            return Err(err("unterminated `[`".into()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// フィールドを展開する。必須フィールドが欠けていれば None。
    pub fn expand(&self, entities: &Entities) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Field(field) => out.push_str(field.value(entities)?),
                Segment::Optional(inner) => {
                    if let Some(text) = expand_all(inner, entities) {
                        out.push_str(&text);
                    }
                }
            }
        }
        Some(out)
    }
}

/// 任意セグメントの中なら、そのセグメント列に追加する
fn current<'a>(
    optional: &'a mut Option<Vec<Segment>>,
    segments: &'a mut Vec<Segment>,
) -> &'a mut Vec<Segment> {
    match optional {
        Some(inner) => inner,
        None => segments,
    }
}

fn expand_all(segments: &[Segment], entities: &Entities) -> Option<String> {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(lit) => out.push_str(lit),
            Segment::Field(field) => out.push_str(field.value(entities)?),
            // parse() が入れ子を拒否する
            Segment::Optional(_) => return None,
        }
    }
    Some(out)
}

impl FromStr for MaskPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MaskPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
