use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Router, extract::State, http::StatusCode};

use crate::api::{deleted, require_text};
use crate::db::courses::{self, CourseFilter};
use crate::db::enrollments::{self, EnrollmentFilter};
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route(
            "/enrollments/{id}",
            get(get_enrollment)
                .patch(update_enrollment)
                .delete(delete_enrollment),
        )
}

async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = courses::fetch_courses(&state.db, &filter).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    require_text(&req.title, "Course title")?;
    let course = courses::insert_course(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    let course = courses::find_course_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = courses::update_course(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(courses::delete_course(&state.db, id).await?)
}

async fn list_enrollments(
    State(state): State<AppState>,
    Query(filter): Query<EnrollmentFilter>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let enrollments = enrollments::fetch_enrollments(&state.db, &filter).await?;
    Ok(Json(enrollments))
}

async fn create_enrollment(
    State(state): State<AppState>,
    Json(req): Json<NewEnrollmentRequest>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = enrollments::insert_enrollment(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = enrollments::find_enrollment_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(enrollment))
}

async fn update_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEnrollmentRequest>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = enrollments::update_enrollment(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(enrollment))
}

async fn delete_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(enrollments::delete_enrollment(&state.db, id).await?)
}
