//! Document records and per-field locale resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::{Collection, DocumentStatus, Locale};

/// A document as stored: shared fields plus one field object per locale.
///
/// Collection-specific fields are carried as JSON; the store owns their
/// shape and this crate never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub collection: Collection,
    pub slug: String,
    pub status: DocumentStatus,
    pub sort_order: i32,
    pub category_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub shared: Map<String, Value>,
    pub localized: BTreeMap<Locale, Map<String, Value>>,
    /// Embedded category document, populated by the store at depth >= 1.
    pub category: Option<Box<Document>>,
}

impl Document {
    /// Flatten this document for one locale.
    ///
    /// Shared fields pass through untouched. For each localized field the
    /// requested locale's value wins unless it is missing, null, or an
    /// empty string, in which case the fallback locale's value substitutes
    /// for that field alone.
    pub fn resolve(&self, locale: Locale, fallback: Locale) -> ResolvedDocument {
        let mut fields = self.shared.clone();

        let requested = self.localized.get(&locale);
        if let Some(base) = self.localized.get(&fallback) {
            for (key, value) in base {
                fields.insert(key.clone(), value.clone());
            }
        }
        if let Some(requested) = requested {
            for (key, value) in requested {
                if !is_empty_field(value) {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }

        ResolvedDocument {
            id: self.id,
            collection: self.collection,
            slug: self.slug.clone(),
            status: self.status,
            published_at: self.published_at,
            updated_at: self.updated_at,
            fields,
            category: self
                .category
                .as_ref()
                .map(|category| Box::new(category.resolve(locale, fallback))),
        }
    }
}

fn is_empty_field(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A document flattened for one locale, ready for serialization to clients
/// and for the query cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDocument {
    pub id: Uuid,
    pub collection: Collection,
    pub slug: String,
    pub status: DocumentStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub fields: Map<String, Value>,
    pub category: Option<Box<ResolvedDocument>>,
}

impl ResolvedDocument {
    /// Convenience accessor for a string field, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc_with_locales(pl: Value, en: Value) -> Document {
        let mut localized = BTreeMap::new();
        localized.insert(Locale::Pl, pl.as_object().cloned().unwrap_or_default());
        localized.insert(Locale::En, en.as_object().cloned().unwrap_or_default());

        Document {
            id: Uuid::new_v4(),
            collection: Collection::News,
            slug: "hello".to_string(),
            status: DocumentStatus::Published,
            sort_order: 0,
            category_id: None,
            published_at: Some(OffsetDateTime::now_utc()),
            updated_at: OffsetDateTime::now_utc(),
            shared: json!({"readTime": 4}).as_object().cloned().unwrap(),
            localized,
            category: None,
        }
    }

    #[test]
    fn requested_locale_wins_when_present() {
        let doc = doc_with_locales(
            json!({"title": "Cześć", "excerpt": "Zajawka"}),
            json!({"title": "Hello", "excerpt": "Teaser"}),
        );

        let resolved = doc.resolve(Locale::En, Locale::Pl);
        assert_eq!(resolved.field_str("title"), Some("Hello"));
        assert_eq!(resolved.field_str("excerpt"), Some("Teaser"));
    }

    #[test]
    fn empty_fields_fall_back_per_field() {
        let doc = doc_with_locales(
            json!({"title": "Cześć", "excerpt": "Zajawka"}),
            json!({"title": "Hello", "excerpt": ""}),
        );

        let resolved = doc.resolve(Locale::En, Locale::Pl);
        assert_eq!(resolved.field_str("title"), Some("Hello"));
        // Empty string in the requested locale substitutes the fallback value.
        assert_eq!(resolved.field_str("excerpt"), Some("Zajawka"));
    }

    #[test]
    fn null_and_missing_fields_fall_back() {
        let doc = doc_with_locales(
            json!({"title": "Cześć", "excerpt": "Zajawka", "body": "Treść"}),
            json!({"title": null}),
        );

        let resolved = doc.resolve(Locale::En, Locale::Pl);
        assert_eq!(resolved.field_str("title"), Some("Cześć"));
        assert_eq!(resolved.field_str("excerpt"), Some("Zajawka"));
        assert_eq!(resolved.field_str("body"), Some("Treść"));
    }

    #[test]
    fn shared_fields_pass_through() {
        let doc = doc_with_locales(json!({"title": "Cześć"}), json!({}));
        let resolved = doc.resolve(Locale::En, Locale::Pl);
        assert_eq!(resolved.fields.get("readTime"), Some(&json!(4)));
    }

    #[test]
    fn embedded_category_is_resolved_too() {
        let mut doc = doc_with_locales(json!({"title": "Cześć"}), json!({}));
        let mut category = doc_with_locales(json!({"name": "Produkt"}), json!({"name": "Product"}));
        category.collection = Collection::NewsCategories;
        doc.category = Some(Box::new(category));

        let resolved = doc.resolve(Locale::En, Locale::Pl);
        let category = resolved.category.expect("embedded category");
        assert_eq!(category.field_str("name"), Some("Product"));
    }
}
