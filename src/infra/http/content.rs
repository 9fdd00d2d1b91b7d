//! Public content handlers: the JSON surface the rendering layer consumes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::content::{ListQuery, ResolvedPage};
use crate::application::error::HttpError;
use crate::application::repos::SortOrder;
use crate::domain::documents::ResolvedDocument;
use crate::domain::types::Collection;

use super::context::{parse_locale, request_context};
use super::{HttpState, repo_error_to_http};

const SOURCE: &str = "infra::http::content";

const NEWS_PAGE_SIZE: u32 = 10;
const CATEGORY_LIST_LIMIT: u32 = 100;
const FULL_LIST_LIMIT: u32 = 1000;
const RELATED_LIMIT: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct NewsListParams {
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct NewsListResponse {
    pub posts: ResolvedPage,
    pub categories: Vec<ResolvedDocument>,
}

/// `GET /{locale}/news`
pub async fn list_news(
    State(state): State<HttpState>,
    Path(locale): Path<String>,
    headers: HeaderMap,
    Query(params): Query<NewsListParams>,
) -> Result<impl IntoResponse, HttpError> {
    let locale = parse_locale(&locale)?;
    let ctx = request_context(&state.preview, &headers, locale);

    let query = ListQuery {
        category_slug: params.category,
        sort: SortOrder::PublishedAtDesc,
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(NEWS_PAGE_SIZE).clamp(1, 100),
        depth: 1,
        ..Default::default()
    };

    let posts = state
        .content
        .find_many(&ctx, Collection::News, &query)
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;

    let categories = state
        .content
        .find_many(&ctx, Collection::NewsCategories, &category_list_query())
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;

    Ok(Json(NewsListResponse {
        posts,
        categories: categories.docs,
    }))
}

#[derive(Debug, Serialize)]
pub struct NewsDetailResponse {
    pub post: ResolvedDocument,
    pub related: Vec<ResolvedDocument>,
}

/// `GET /{locale}/news/{slug}`
pub async fn news_detail(
    State(state): State<HttpState>,
    Path((locale, slug)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let locale = parse_locale(&locale)?;
    let ctx = request_context(&state.preview, &headers, locale);

    let post = state
        .content
        .find_one(&ctx, Collection::News, &slug, 2)
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?
        .ok_or_else(|| {
            HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Resource not found",
                format!("no news document with slug `{slug}`"),
            )
        })?;

    let related = state
        .content
        .find_related(
            &ctx,
            Collection::News,
            post.id,
            post.category.as_ref().map(|category| category.id),
            RELATED_LIMIT,
        )
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;

    Ok(Json(NewsDetailResponse { post, related }))
}

#[derive(Debug, Serialize)]
pub struct FaqResponse {
    pub categories: Vec<ResolvedDocument>,
    pub items: Vec<ResolvedDocument>,
}

/// `GET /{locale}/faq`
pub async fn faq(
    State(state): State<HttpState>,
    Path(locale): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let locale = parse_locale(&locale)?;
    let ctx = request_context(&state.preview, &headers, locale);

    let categories = state
        .content
        .find_many(&ctx, Collection::FaqCategories, &category_list_query())
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;

    let items_query = ListQuery {
        sort: SortOrder::OrderAsc,
        limit: FULL_LIST_LIMIT,
        depth: 1,
        ..Default::default()
    };
    let items = state
        .content
        .find_many(&ctx, Collection::Faq, &items_query)
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;

    Ok(Json(FaqResponse {
        categories: categories.docs,
        items: items.docs,
    }))
}

#[derive(Debug, Deserialize)]
pub struct IntegrationsParams {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationsResponse {
    pub categories: Vec<ResolvedDocument>,
    pub integrations: Vec<ResolvedDocument>,
}

/// `GET /{locale}/integrations`
pub async fn integrations(
    State(state): State<HttpState>,
    Path(locale): Path<String>,
    headers: HeaderMap,
    Query(params): Query<IntegrationsParams>,
) -> Result<impl IntoResponse, HttpError> {
    let locale = parse_locale(&locale)?;
    let ctx = request_context(&state.preview, &headers, locale);

    let categories = state
        .content
        .find_many(
            &ctx,
            Collection::IntegrationCategories,
            &category_list_query(),
        )
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;

    let query = ListQuery {
        category_slug: params.category,
        search: params.q,
        sort: SortOrder::OrderAsc,
        limit: FULL_LIST_LIMIT,
        depth: 1,
        ..Default::default()
    };
    let integrations = state
        .content
        .find_many(&ctx, Collection::Integrations, &query)
        .await
        .map_err(|err| repo_error_to_http(SOURCE, err))?;

    Ok(Json(IntegrationsResponse {
        categories: categories.docs,
        integrations: integrations.docs,
    }))
}

fn category_list_query() -> ListQuery {
    ListQuery {
        sort: SortOrder::OrderAsc,
        limit: CATEGORY_LIST_LIMIT,
        depth: 0,
        ..Default::default()
    }
}
