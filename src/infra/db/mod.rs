//! Postgres-backed content store.
//!
//! Documents live in a single `documents` table owned by the publishing
//! side: shared fields and per-locale fields as `jsonb`, status and
//! collection as text columns. This adapter only reads documents; the one
//! write path is the `form_submissions` sink.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::application::repos::{
    ContentStore, DocumentPage, Filter, FindRequest, NewSubmission, RepoError, SortOrder,
    SubmissionSink,
};
use crate::domain::documents::Document;
use crate::domain::types::{Collection, DocumentStatus, Locale};
use crate::infra::error::InfraError;

const DOCUMENT_COLUMNS: &str =
    "id, collection, slug, status, sort_order, category_id, published_at, updated_at, shared, localized";

pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, InfraError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|err| InfraError::database(err.to_string()))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PostgresContentStore {
    async fn find(&self, request: &FindRequest) -> Result<DocumentPage, RepoError> {
        if request.limit == 0 {
            return Err(RepoError::invalid_query("limit must be greater than zero"));
        }

        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM documents");
        push_conditions(&mut count_query, request);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let page = request.page.max(1);
        let offset = i64::from(page - 1) * i64::from(request.limit);

        let mut select: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {DOCUMENT_COLUMNS} FROM documents"));
        push_conditions(&mut select, request);
        select.push(match request.sort {
            SortOrder::PublishedAtDesc => " ORDER BY published_at DESC NULLS LAST, slug ASC",
            SortOrder::OrderAsc => " ORDER BY sort_order ASC, slug ASC",
        });
        select.push(" LIMIT ").push_bind(i64::from(request.limit));
        select.push(" OFFSET ").push_bind(offset);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut docs = rows
            .iter()
            .map(row_to_document)
            .collect::<Result<Vec<_>, _>>()?;

        if request.depth >= 1 {
            self.embed_categories(&mut docs).await?;
        }

        let total_pages = (total as u32).div_ceil(request.limit);
        Ok(DocumentPage {
            docs,
            total_pages,
            page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        })
    }
}

impl PostgresContentStore {
    async fn embed_categories(&self, docs: &mut [Document]) -> Result<(), RepoError> {
        let category_ids: Vec<Uuid> = docs.iter().filter_map(|doc| doc.category_id).collect();
        if category_ids.is_empty() {
            return Ok(());
        }

        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ANY($1)"
        ))
        .bind(&category_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let categories = rows
            .iter()
            .map(row_to_document)
            .collect::<Result<Vec<_>, _>>()?;

        for doc in docs {
            if let Some(category_id) = doc.category_id {
                doc.category = categories
                    .iter()
                    .find(|c| c.id == category_id)
                    .cloned()
                    .map(Box::new);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SubmissionSink for PostgresContentStore {
    async fn create_submission(&self, submission: NewSubmission) -> Result<Uuid, RepoError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO form_submissions \
             (id, kind, full_name, email, company_name, phone_country_code, phone_number, \
              preferred_date, privacy_consent, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'new') \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(submission.kind)
        .bind(&submission.full_name)
        .bind(&submission.email)
        .bind(&submission.company_name)
        .bind(&submission.phone_country_code)
        .bind(&submission.phone_number)
        .bind(submission.preferred_date)
        .bind(submission.privacy_consent)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(id)
    }
}

fn push_conditions<'args>(builder: &mut QueryBuilder<'args, Postgres>, request: &'args FindRequest) {
    builder
        .push(" WHERE collection = ")
        .push_bind(request.collection.as_str());

    if !request.draft {
        builder
            .push(" AND status = ")
            .push_bind(DocumentStatus::Published.as_str());
    }

    for filter in &request.filters {
        match filter {
            Filter::SlugEquals(slug) => {
                builder.push(" AND slug = ").push_bind(slug.as_str());
            }
            Filter::CategoryEquals(id) => {
                builder.push(" AND category_id = ").push_bind(*id);
            }
            Filter::IdNotEquals(id) => {
                builder.push(" AND id <> ").push_bind(*id);
            }
            Filter::SearchContains(needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                builder
                    .push(" AND (shared->>'title' ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR shared->>'subtitle' ILIKE ")
                    .push_bind(pattern.clone())
                    .push(
                        " OR EXISTS (SELECT 1 FROM jsonb_each(localized) AS loc \
                         WHERE loc.value->>'title' ILIKE ",
                    )
                    .push_bind(pattern.clone())
                    .push(" OR loc.value->>'subtitle' ILIKE ")
                    .push_bind(pattern)
                    .push("))");
            }
        }
    }
}

fn row_to_document(row: &PgRow) -> Result<Document, RepoError> {
    let collection: String = row.try_get("collection").map_err(map_sqlx_error)?;
    let collection = Collection::try_from(collection.as_str())
        .map_err(|()| RepoError::Persistence(format!("unknown collection `{collection}`")))?;

    let status: String = row.try_get("status").map_err(map_sqlx_error)?;
    let status = DocumentStatus::try_from(status.as_str())
        .map_err(|()| RepoError::Persistence(format!("unknown document status `{status}`")))?;

    let shared: Value = row.try_get("shared").map_err(map_sqlx_error)?;
    let shared = shared
        .as_object()
        .cloned()
        .ok_or_else(|| RepoError::Persistence("shared fields are not a JSON object".into()))?;

    let localized: Value = row.try_get("localized").map_err(map_sqlx_error)?;
    let localized: BTreeMap<Locale, serde_json::Map<String, Value>> =
        serde_json::from_value(localized)
            .map_err(|err| RepoError::Persistence(format!("malformed localized fields: {err}")))?;

    Ok(Document {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        collection,
        slug: row.try_get("slug").map_err(map_sqlx_error)?,
        status,
        sort_order: row.try_get("sort_order").map_err(map_sqlx_error)?,
        category_id: row.try_get("category_id").map_err(map_sqlx_error)?,
        published_at: row.try_get("published_at").map_err(map_sqlx_error)?,
        updated_at: row.try_get("updated_at").map_err(map_sqlx_error)?,
        shared,
        localized,
        category: None,
    })
}

fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        other => RepoError::from_persistence(other),
    }
}

fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
