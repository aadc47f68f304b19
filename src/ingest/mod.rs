// src/ingest/mod.rs
//! Raw record → [`Article`] reconciliation and batch input shapes.
//!
//! Feeds disagree on field names (`summary` vs `description`, `publisher` vs
//! `source`, ...). [`FIELD_TABLE`] lists, per canonical field, the candidate keys
//! in priority order; it is evaluated once per record and nowhere else.

pub mod types;

pub use types::{Article, CanonicalField, RawRecord};

use serde_json::Value;

use crate::error::{json_kind, EngineError};

/// Reconciliation rule for one canonical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: CanonicalField,
    /// Candidate keys in priority order; the first is the canonical key itself.
    pub candidates: &'static [&'static str],
    /// When true, an empty string under a candidate falls through to the next one.
    pub skip_empty: bool,
}

pub const FIELD_TABLE: &[FieldRule] = &[
    FieldRule {
        field: CanonicalField::Title,
        candidates: &["title"],
        skip_empty: false,
    },
    FieldRule {
        field: CanonicalField::Description,
        candidates: &["description", "summary"],
        skip_empty: false,
    },
    FieldRule {
        field: CanonicalField::Source,
        candidates: &["source", "publisher"],
        skip_empty: true,
    },
    FieldRule {
        field: CanonicalField::PublishedAt,
        candidates: &["published_at", "published"],
        skip_empty: false,
    },
    FieldRule {
        field: CanonicalField::FetchedAt,
        candidates: &["fetched_at", "created_at"],
        skip_empty: true,
    },
    FieldRule {
        field: CanonicalField::Url,
        candidates: &["url"],
        skip_empty: false,
    },
    FieldRule {
        field: CanonicalField::Category,
        candidates: &["category"],
        skip_empty: false,
    },
];

/// Resolve one field from the raw record. `null` and non-string values count as absent.
fn resolve(record: &RawRecord, rule: &FieldRule) -> String {
    for key in rule.candidates {
        if let Some(Value::String(s)) = record.get(*key) {
            if rule.skip_empty && s.is_empty() {
                continue;
            }
            return s.clone();
        }
    }
    String::new()
}

impl Article {
    /// Apply [`FIELD_TABLE`] to a raw record. String-valued canonical keys move into
    /// typed fields; all other keys (aliases and non-string canonical values
    /// included) stay in `extra` verbatim.
    pub fn from_record(mut record: RawRecord) -> Self {
        let mut article = Article::default();
        for rule in FIELD_TABLE {
            *article.field_mut(rule.field) = resolve(&record, rule);
        }
        for rule in FIELD_TABLE {
            let key = rule.field.key();
            if matches!(record.get(key), Some(Value::String(_))) {
                record.shift_remove(key);
            }
        }
        article.extra = record;
        article
    }
}

/// Put the group key into `category` when the record has none or an empty string.
/// Any other value is left as it came.
fn fill_category(record: &mut RawRecord, category: &str) {
    let is_gap = match record.get("category") {
        None => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };
    if is_gap {
        record.insert("category".to_string(), Value::String(category.to_string()));
    }
}

/// A batch as accepted by the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchInput {
    /// Records grouped by category, in document order.
    Grouped(Vec<(String, Vec<RawRecord>)>),
    /// A flat sequence, treated as one implicit category.
    Flat(Vec<RawRecord>),
}

impl BatchInput {
    /// Validate the top-level JSON shape.
    pub fn from_value(value: Value) -> Result<Self, EngineError> {
        match value {
            Value::Object(groups) => {
                let mut out = Vec::with_capacity(groups.len());
                for (category, items) in groups {
                    let items = match items {
                        Value::Array(items) => items,
                        other => {
                            return Err(EngineError::CategoryShape {
                                category,
                                found: json_kind(&other),
                            })
                        }
                    };
                    let records = records_from(items, &category)?;
                    out.push((category, records));
                }
                Ok(BatchInput::Grouped(out))
            }
            Value::Array(items) => Ok(BatchInput::Flat(records_from(items, "")?)),
            other => Err(EngineError::InputShape {
                found: json_kind(&other),
            }),
        }
    }

    /// Number of records across all categories.
    pub fn len(&self) -> usize {
        match self {
            BatchInput::Grouped(groups) => groups.iter().map(|(_, v)| v.len()).sum(),
            BatchInput::Flat(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten to raw records in processing order; grouped records get their category filled.
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            BatchInput::Grouped(groups) => groups
                .into_iter()
                .flat_map(|(category, records)| {
                    records.into_iter().map(move |mut r| {
                        fill_category(&mut r, &category);
                        r
                    })
                })
                .collect(),
            BatchInput::Flat(records) => records,
        }
    }

    /// Reconciled articles in processing order.
    pub fn into_articles(self) -> Vec<Article> {
        self.into_records()
            .into_iter()
            .map(Article::from_record)
            .collect()
    }
}

fn records_from(items: Vec<Value>, category: &str) -> Result<Vec<RawRecord>, EngineError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(m) => Ok(m),
            other => Err(EngineError::InvalidRecord {
                category: category.to_string(),
                index,
                found: json_kind(&other),
            }),
        })
        .collect()
}

/// Merge several fetch results (e.g. category-grouped API data and a flat RSS list)
/// into one flat batch, in argument order.
pub fn combine<I>(inputs: I) -> BatchInput
where
    I: IntoIterator<Item = BatchInput>,
{
    let mut out = Vec::new();
    for input in inputs {
        out.extend(input.into_records());
    }
    BatchInput::Flat(out)
}
