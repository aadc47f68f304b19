// src/ingest/types.rs
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// A raw input record: arbitrary string keys, no fixed schema.
pub type RawRecord = Map<String, Value>;

/// One article after field reconciliation.
///
/// Canonical fields are always strings (empty when absent) and are what the engine
/// computes on. Every other key of the raw record is kept in `extra`, untouched.
/// A canonical key whose raw value was not a string (`null`, a number, ...) also
/// stays in `extra`; on output that raw value wins over the typed field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub source: String,
    pub published_at: String,
    pub fetched_at: String,
    pub url: String,
    pub category: String,
    pub extra: RawRecord,
}

impl Serialize for Article {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for f in CanonicalField::ALL {
            if !self.extra.contains_key(f.key()) {
                map.serialize_entry(f.key(), self.field(f))?;
            }
        }
        for (k, v) in &self.extra {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Canonical article fields, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Title,
    Description,
    Source,
    PublishedAt,
    FetchedAt,
    Url,
    Category,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Title,
        CanonicalField::Description,
        CanonicalField::Source,
        CanonicalField::PublishedAt,
        CanonicalField::FetchedAt,
        CanonicalField::Url,
        CanonicalField::Category,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CanonicalField::Title => "title",
            CanonicalField::Description => "description",
            CanonicalField::Source => "source",
            CanonicalField::PublishedAt => "published_at",
            CanonicalField::FetchedAt => "fetched_at",
            CanonicalField::Url => "url",
            CanonicalField::Category => "category",
        }
    }
}

impl Article {
    pub fn field(&self, f: CanonicalField) -> &str {
        match f {
            CanonicalField::Title => &self.title,
            CanonicalField::Description => &self.description,
            CanonicalField::Source => &self.source,
            CanonicalField::PublishedAt => &self.published_at,
            CanonicalField::FetchedAt => &self.fetched_at,
            CanonicalField::Url => &self.url,
            CanonicalField::Category => &self.category,
        }
    }

    pub(crate) fn field_mut(&mut self, f: CanonicalField) -> &mut String {
        match f {
            CanonicalField::Title => &mut self.title,
            CanonicalField::Description => &mut self.description,
            CanonicalField::Source => &mut self.source,
            CanonicalField::PublishedAt => &mut self.published_at,
            CanonicalField::FetchedAt => &mut self.fetched_at,
            CanonicalField::Url => &mut self.url,
            CanonicalField::Category => &mut self.category,
        }
    }
}
