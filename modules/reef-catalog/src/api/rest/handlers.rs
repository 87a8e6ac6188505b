use std::sync::{Arc, LazyLock};

use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};
use reef_guard::{Access, MessageLevel, OwnershipGuard};
use uuid::Uuid;

use crate::api::rest::dto::{
    ArticleDto, CreateArticleReq, CreateReefReq, EventDetailDto, EventDto, HealthDto, HomeDto,
    ReefDto, ReportEventReq, UpdateArticleReq, UpdateEventReq,
};
use crate::domain::error::DomainError;
use crate::domain::models::{ARTICLE_OWNER_FIELD, EVENT_OWNER_FIELD};
use crate::domain::repo::CatalogRepository;
use crate::domain::service::CatalogService;

type ApiResult<T> = Result<T, DomainError>;

static EVENT_OWNER: LazyLock<OwnershipGuard> =
    LazyLock::new(|| OwnershipGuard::new().with_owner_field(EVENT_OWNER_FIELD));

static ARTICLE_OWNER: LazyLock<OwnershipGuard> =
    LazyLock::new(|| OwnershipGuard::new().with_owner_field(ARTICLE_OWNER_FIELD));

fn flash_success(access: &Access, text: &str) {
    access.messages().add(MessageLevel::Success, text.to_owned());
}

pub async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_owned(),
    })
}

pub async fn home<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
) -> ApiResult<Json<HomeDto>> {
    Ok(Json(svc.home().await?.into()))
}

// ==================== Event Handlers ====================

pub async fn list_events<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
) -> ApiResult<Json<Vec<EventDetailDto>>> {
    let events = svc.list_events().await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip(svc), fields(event.id = %id))]
pub async fn get_event<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventDetailDto>> {
    Ok(Json(svc.get_event(id).await?.into()))
}

/// Report an event; the requester becomes its owner.
#[tracing::instrument(
    skip(svc, access, req_body),
    fields(reef.id = %req_body.reef_id, reporter.id = %access.principal().subject_id())
)]
pub async fn report_event<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    access: Access,
    Json(req_body): Json<ReportEventReq>,
) -> ApiResult<impl IntoResponse> {
    let event = svc
        .report_event(access.principal(), req_body.into())
        .await?;
    flash_success(&access, "Event reported.");
    Ok((StatusCode::CREATED, Json(EventDto::from(event))))
}

#[tracing::instrument(skip(svc, access, req_body), fields(event.id = %id))]
pub async fn update_event<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateEventReq>,
) -> ApiResult<Json<EventDto>> {
    let service: &CatalogService<R> = &svc;
    let event = EVENT_OWNER
        .dispatch(&access, &service.events(), id, |event| async move {
            service.apply_event_patch(event, req_body.into()).await
        })
        .await?;
    flash_success(&access, "Event updated.");
    Ok(Json(event.into()))
}

#[tracing::instrument(skip(svc, access), fields(event.id = %id))]
pub async fn delete_event<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    access: Access,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let event = EVENT_OWNER.resolve(&access, &svc.events(), id).await?;
    svc.delete_event(event.id).await?;
    flash_success(&access, "Event deleted.");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Reef Handlers ====================

pub async fn list_reefs<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
) -> ApiResult<Json<Vec<ReefDto>>> {
    let reefs = svc.list_reefs().await?;
    Ok(Json(reefs.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip(svc, access, req_body), fields(reef.name = %req_body.name))]
pub async fn create_reef<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    access: Access,
    Json(req_body): Json<CreateReefReq>,
) -> ApiResult<impl IntoResponse> {
    let reef = svc.create_reef(req_body.into()).await?;
    flash_success(&access, "Reef created.");
    Ok((StatusCode::CREATED, Json(ReefDto::from(reef))))
}

#[tracing::instrument(skip(svc, access), fields(reef.id = %id))]
pub async fn delete_reef<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    access: Access,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    svc.delete_reef(id).await?;
    flash_success(&access, "Reef deleted.");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Article Handlers ====================

pub async fn list_articles<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
) -> ApiResult<Json<Vec<ArticleDto>>> {
    let articles = svc.list_articles().await?;
    Ok(Json(articles.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(
    skip(svc, access, req_body),
    fields(article.title = %req_body.title, author.id = %access.principal().subject_id())
)]
pub async fn create_article<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    access: Access,
    Json(req_body): Json<CreateArticleReq>,
) -> ApiResult<impl IntoResponse> {
    let article = svc
        .create_article(access.principal(), req_body.into())
        .await?;
    flash_success(&access, "Article created.");
    Ok((StatusCode::CREATED, Json(ArticleDto::from(article))))
}

#[tracing::instrument(skip(svc, access, req_body), fields(article.id = %id))]
pub async fn update_article<R: CatalogRepository + 'static>(
    Extension(svc): Extension<Arc<CatalogService<R>>>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateArticleReq>,
) -> ApiResult<Json<ArticleDto>> {
    let service: &CatalogService<R> = &svc;
    let article = ARTICLE_OWNER
        .dispatch(&access, &service.articles(), id, |article| async move {
            service.apply_article_patch(article, req_body.into()).await
        })
        .await?;
    flash_success(&access, "Article updated.");
    Ok(Json(article.into()))
}
