//! Exam HTTP Routes
//!
//! Every handler authorizes first, then delegates to the query router.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::errors::{ApiError, ApiResult};
use super::response::{ok, respond, ApiResponse, CachePolicy};
use super::state::SharedState;
use crate::auth::{Operation, Principal};
use crate::cache::TierStatsSnapshot;
use crate::observability::RequestMetricsSnapshot;
use crate::query::{page_request, ExamFilters, QuerySpec};
use crate::store::{ExamField, NewExam, PageRequest, DEFAULT_PAGE_SIZE};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
}

impl PageParams {
    fn request(&self) -> ApiResult<PageRequest> {
        Ok(page_request(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
        )?)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: i64,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ==================
// Exam Routes
// ==================

/// Routes mounted under `/api`
pub fn exam_routes(state: SharedState) -> Router {
    Router::new()
        .route("/exams", get(list_exams_handler).post(create_exam_handler))
        .route("/exams/search", get(search_exams_handler))
        .route("/exams/upcoming", get(upcoming_exams_handler))
        .route("/exams/current-period", get(current_period_handler))
        .route("/exams/date-range", get(date_range_handler))
        .route("/exams/degree/:degree", get(exams_by_degree_handler))
        .route("/exams/subject/:subject", get(exams_by_subject_handler))
        .route(
            "/exams/year/:year/semester/:semester",
            get(exams_by_year_semester_handler),
        )
        // Reference values
        .route("/exams/degrees", get(degrees_handler))
        .route("/exams/years", get(years_handler))
        .route("/exams/semesters", get(semesters_handler))
        .route("/exams/schools", get(schools_handler))
        .route("/exams/rooms", get(rooms_handler))
        .route("/exams/stats/degrees", get(degree_counts_handler))
        .route("/exams/stats/years", get(year_counts_handler))
        // Single exam
        .route(
            "/exams/:id",
            get(get_exam_handler)
                .put(update_exam_handler)
                .delete(delete_exam_handler),
        )
        // Operator views
        .route("/cache/stats", get(cache_stats_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Unauthenticated liveness probe
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

// ==================
// Helper Functions
// ==================

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::InvalidParam(format!("'{}' is not a valid exam id", raw)))
}

/// Accepts `YYYY-MM-DDTHH:MM:SS` or a bare date (start or end of day)
fn parse_date_param(name: &str, raw: Option<&str>, end_of_day: bool) -> ApiResult<NaiveDateTime> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidParam(format!("{} is required", name)))?;

    if let Ok(datetime) = raw.parse::<NaiveDateTime>() {
        return Ok(datetime);
    }
    let date = raw.parse::<NaiveDate>().map_err(|_| {
        ApiError::InvalidParam(format!("{} '{}' is not an ISO date or date-time", name, raw))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_opt(23, 59, 59)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    };
    Ok(date.and_time(time.unwrap_or_default()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::InvalidParam(rejection.body_text()))
}

fn path_params<T>(path: Result<Path<T>, PathRejection>) -> ApiResult<T> {
    path.map(|Path(params)| params)
        .map_err(|rejection| ApiError::InvalidParam(rejection.body_text()))
}

fn exam_payload(body: Result<Json<NewExam>, JsonRejection>) -> ApiResult<NewExam> {
    body.map(|Json(exam)| exam)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

fn log_write(principal: &Principal, action: &str, id: i64) {
    tracing::info!(
        subject = principal.subject_id.as_deref().unwrap_or("-"),
        role = %principal.role,
        action,
        id,
        "exam write"
    );
}

// ==================
// Listing Handlers
// ==================

async fn list_exams_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadList)?;
    let params = query_params(params)?;
    let spec = QuerySpec::new(
        params.page.unwrap_or(0),
        params.size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
    )?
    .with_sort(params.sort_by.as_deref(), params.sort_dir.as_deref())?;

    let page = state.router.route(&spec).await?;
    Ok(ok(
        CachePolicy::Listing,
        ApiResponse::paged(page, "Exams retrieved successfully"),
    ))
}

async fn search_exams_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::Search)?;
    let params = query_params(params)?;
    let spec = QuerySpec::new(
        params.page.unwrap_or(0),
        params.size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
    )?
    .with_filters(ExamFilters::new(
        params.degree.as_deref(),
        params.year.as_deref(),
        params.semester.as_deref(),
    ));

    let page = state.router.search(params.q.as_deref(), &spec).await?;
    Ok(ok(
        CachePolicy::Listing,
        ApiResponse::paged(page, "Search completed successfully"),
    ))
}

async fn exams_by_degree_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    degree: Result<Path<String>, PathRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadList)?;
    let degree = path_params(degree)?;
    let params = query_params(params)?;
    let page = state.router.by_degree(&degree, &params.request()?).await?;
    Ok(ok(
        CachePolicy::Filtered,
        ApiResponse::paged(page, format!("Exams for degree {} retrieved", degree)),
    ))
}

async fn exams_by_subject_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    subject: Result<Path<String>, PathRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadList)?;
    let subject = path_params(subject)?;
    let params = query_params(params)?;
    let page = state.router.by_subject(&subject, &params.request()?).await?;
    Ok(ok(
        CachePolicy::Filtered,
        ApiResponse::paged(page, format!("Exams for subject {} retrieved", subject)),
    ))
}

async fn exams_by_year_semester_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadList)?;
    let (year, semester) = path_params(path)?;
    let exams = state.router.by_year_semester(&year, &semester).await?;
    Ok(ok(
        CachePolicy::Listing,
        ApiResponse::list(exams, "Exams retrieved successfully"),
    ))
}

async fn date_range_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    params: Result<Query<DateRangeParams>, QueryRejection>,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadList)?;
    let params = query_params(params)?;
    let start = parse_date_param("startDate", params.start_date.as_deref(), false)?;
    let end = parse_date_param("endDate", params.end_date.as_deref(), true)?;
    let exams = state.router.date_range(start, end).await?;
    Ok(ok(
        CachePolicy::Listing,
        ApiResponse::list(exams, "Exams in date range retrieved"),
    ))
}

async fn upcoming_exams_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadList)?;
    let exams = state.router.upcoming().await?;
    Ok(ok(
        CachePolicy::Listing,
        ApiResponse::list(exams, "Upcoming exams retrieved"),
    ))
}

async fn current_period_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadList)?;
    let exams = state.router.current_period().await?;
    Ok(ok(
        CachePolicy::Listing,
        ApiResponse::list(exams, "Current period exams retrieved"),
    ))
}

// ==================
// Reference Handlers
// ==================

async fn reference_values(
    state: &SharedState,
    headers: &HeaderMap,
    field: ExamField,
) -> ApiResult<Response> {
    state.authorize(headers, Operation::BrowseReference)?;
    let values = state.router.distinct(field).await?;
    Ok(ok(
        CachePolicy::Reference,
        ApiResponse::list(values, format!("Distinct {} values retrieved", field)),
    ))
}

async fn degrees_handler(State(state): State<SharedState>, headers: HeaderMap) -> ApiResult<Response> {
    reference_values(&state, &headers, ExamField::Degree).await
}

async fn years_handler(State(state): State<SharedState>, headers: HeaderMap) -> ApiResult<Response> {
    reference_values(&state, &headers, ExamField::Year).await
}

async fn semesters_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    reference_values(&state, &headers, ExamField::Semester).await
}

async fn schools_handler(State(state): State<SharedState>, headers: HeaderMap) -> ApiResult<Response> {
    reference_values(&state, &headers, ExamField::School).await
}

async fn rooms_handler(State(state): State<SharedState>, headers: HeaderMap) -> ApiResult<Response> {
    reference_values(&state, &headers, ExamField::Room).await
}

async fn degree_counts_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::BrowseReference)?;
    let counts = state.router.counts_by_degree().await?;
    Ok(ok(
        CachePolicy::Reference,
        ApiResponse::list(counts, "Exam counts by degree retrieved"),
    ))
}

async fn year_counts_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::BrowseReference)?;
    let counts = state.router.counts_by_year().await?;
    Ok(ok(
        CachePolicy::Reference,
        ApiResponse::list(counts, "Exam counts by year retrieved"),
    ))
}

// ==================
// Single Exam Handlers
// ==================

async fn get_exam_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::ReadOne)?;
    let id = parse_id(&path_params(id)?)?;
    let exam = state
        .router
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    Ok(ok(
        CachePolicy::Entity,
        ApiResponse::ok(exam, "Exam retrieved successfully"),
    ))
}

async fn create_exam_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<NewExam>, JsonRejection>,
) -> ApiResult<Response> {
    let principal = state.authorize(&headers, Operation::Create)?;
    let exam = state.router.create(exam_payload(body)?).await?;
    log_write(&principal, "create", exam.id);
    Ok(respond(
        StatusCode::CREATED,
        CachePolicy::NoStore,
        ApiResponse::ok(exam, "Exam created successfully"),
    ))
}

async fn update_exam_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<NewExam>, JsonRejection>,
) -> ApiResult<Response> {
    let principal = state.authorize(&headers, Operation::Update)?;
    let id = parse_id(&path_params(id)?)?;
    let exam = state
        .router
        .update(id, exam_payload(body)?)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    log_write(&principal, "update", id);
    Ok(respond(
        StatusCode::OK,
        CachePolicy::NoStore,
        ApiResponse::ok(exam, "Exam updated successfully"),
    ))
}

async fn delete_exam_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let principal = state.authorize(&headers, Operation::Delete)?;
    let id = parse_id(&path_params(id)?)?;
    if !state.router.delete(id).await? {
        return Err(ApiError::NotFound(id));
    }
    log_write(&principal, "delete", id);
    Ok(respond(
        StatusCode::OK,
        CachePolicy::NoStore,
        ApiResponse::ok(DeletedResponse { id, deleted: true }, "Exam deleted successfully"),
    ))
}

// ==================
// Operator Handlers
// ==================

async fn cache_stats_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::Inspect)?;
    let stats: Vec<TierStatsSnapshot> = state.router.cache().all_stats();
    Ok(respond(
        StatusCode::OK,
        CachePolicy::NoStore,
        ApiResponse::list(stats, "Cache statistics"),
    ))
}

async fn metrics_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    state.authorize(&headers, Operation::Inspect)?;
    let snapshot: RequestMetricsSnapshot = state.metrics.snapshot();
    Ok(respond(
        StatusCode::OK,
        CachePolicy::NoStore,
        ApiResponse::ok(snapshot, "Request metrics"),
    ))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidParam(_))));
    }

    #[test]
    fn test_query_rejection_is_invalid_param() {
        let uri: axum::http::Uri = "/api/exams?page=abc".parse().unwrap();
        let err = query_params(Query::<ListParams>::try_from_uri(&uri)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParam(_)));
        assert_eq!(err.code(), "INVALID_PARAMETER");

        let uri: axum::http::Uri = "/api/exams?page=2".parse().unwrap();
        let params = query_params(Query::<ListParams>::try_from_uri(&uri)).unwrap();
        assert_eq!(params.page, Some(2));
    }

    #[test]
    fn test_parse_date_param_forms() {
        let start = parse_date_param("startDate", Some("2025-01-10"), false).unwrap();
        let end = parse_date_param("endDate", Some("2025-01-10"), true).unwrap();
        assert_eq!(start.to_string(), "2025-01-10 00:00:00");
        assert_eq!(end.to_string(), "2025-01-10 23:59:59");

        let exact = parse_date_param("startDate", Some("2025-01-10T09:30:00"), false).unwrap();
        assert_eq!(exact.to_string(), "2025-01-10 09:30:00");
    }

    #[test]
    fn test_parse_date_param_missing_or_bad() {
        assert!(parse_date_param("startDate", None, false).is_err());
        assert!(parse_date_param("startDate", Some("yesterday"), false).is_err());
    }

    #[test]
    fn test_page_params_default() {
        let request = PageParams::default().request().unwrap();
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), DEFAULT_PAGE_SIZE);
    }
}
