//! Shared domain enumerations aligned with the document store's collection slugs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content collections served by this crate.
///
/// The serialized names match the slugs the document store uses, so the
/// values round-trip through query strings and hook payloads unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    News,
    NewsCategories,
    Faq,
    FaqCategories,
    Integrations,
    IntegrationCategories,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::News => "news",
            Collection::NewsCategories => "news-categories",
            Collection::Faq => "faq",
            Collection::FaqCategories => "faq-categories",
            Collection::Integrations => "integrations",
            Collection::IntegrationCategories => "integration-categories",
        }
    }

    /// The category collection a content collection's `category` relation
    /// points into, if it has one.
    pub fn category_collection(self) -> Option<Collection> {
        match self {
            Collection::News => Some(Collection::NewsCategories),
            Collection::Faq => Some(Collection::FaqCategories),
            Collection::Integrations => Some(Collection::IntegrationCategories),
            Collection::NewsCategories
            | Collection::FaqCategories
            | Collection::IntegrationCategories => None,
        }
    }
}

impl TryFrom<&str> for Collection {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "news" => Ok(Collection::News),
            "news-categories" => Ok(Collection::NewsCategories),
            "faq" => Ok(Collection::Faq),
            "faq-categories" => Ok(Collection::FaqCategories),
            "integrations" => Ok(Collection::Integrations),
            "integration-categories" => Ok(Collection::IntegrationCategories),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Published,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Published => "published",
        }
    }
}

impl TryFrom<&str> for DocumentStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(DocumentStatus::Draft),
            "published" => Ok(DocumentStatus::Published),
            _ => Err(()),
        }
    }
}

/// Locales the site publishes in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Pl,
    En,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Pl => "pl",
            Locale::En => "en",
        }
    }
}

impl TryFrom<&str> for Locale {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pl" => Ok(Locale::Pl),
            "en" => Ok(Locale::En),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_slugs_round_trip() {
        for collection in [
            Collection::News,
            Collection::NewsCategories,
            Collection::Faq,
            Collection::FaqCategories,
            Collection::Integrations,
            Collection::IntegrationCategories,
        ] {
            assert_eq!(Collection::try_from(collection.as_str()), Ok(collection));
        }
        assert!(Collection::try_from("users").is_err());
    }

    #[test]
    fn content_collections_have_category_collections() {
        assert_eq!(
            Collection::News.category_collection(),
            Some(Collection::NewsCategories)
        );
        assert_eq!(Collection::NewsCategories.category_collection(), None);
    }

    #[test]
    fn locale_parsing() {
        assert_eq!(Locale::try_from("pl"), Ok(Locale::Pl));
        assert_eq!(Locale::try_from("en"), Ok(Locale::En));
        assert!(Locale::try_from("de").is_err());
        assert_eq!(Locale::default(), Locale::Pl);
    }
}
