use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tracing::debug;

use crate::error::AppError;
use crate::models::*;
use crate::services::CourseService;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_courses)
                .post(create_course)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{id}", get(get_course))
        .route("/{id}/enrollments", post(enroll))
}

fn service(state: &AppState) -> CourseService {
    CourseService::new(state.db.clone(), state.storage.clone())
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = service(&state).list_courses(params.published).await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = service(&state).get_course(&id).await?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let new_course = read_course_form(multipart).await?;
    let course = service(&state).create_course(new_course).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let enrollment = service(&state).enroll(&id, req).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn read_course_form(mut multipart: Multipart) -> Result<NewCourse, AppError> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("image").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {}", e)))?;
            image = Some(CourseImage {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field {}: {}", name, e)))?;
            fields.insert(name, value);
        }
    }

    debug!("Received course form with fields {:?}", fields.keys().collect::<Vec<_>>());
    build_new_course(fields, image)
}

fn build_new_course(
    mut fields: HashMap<String, String>,
    image: Option<CourseImage>,
) -> Result<NewCourse, AppError> {
    let mut take = |key: &str| {
        fields
            .remove(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let title = take("title").ok_or_else(|| missing("title"))?;
    let description = take("description").ok_or_else(|| missing("description"))?;
    let duration = take("duration").ok_or_else(|| missing("duration"))?;
    let video_link = take("videoLink").unwrap_or_default();
    let tags = parse_tags(take("tags").as_deref())?;
    let is_published = match take("isPublished") {
        None => true,
        Some(v) => parse_bool(&v)?,
    };
    let price = parse_number("payment", take("payment").as_deref())?
        .ok_or_else(|| missing("payment"))?;
    if price < 0.0 {
        return Err(AppError::Validation("payment cannot be negative".to_string()));
    }
    let discount = parse_number("discount", take("discount").as_deref())?.unwrap_or(0.0);

    let instructor = Instructor {
        id: take("instructor[id]").ok_or_else(|| missing("instructor[id]"))?,
        name: take("instructor[name]").ok_or_else(|| missing("instructor[name]"))?,
        email: take("instructor[email]"),
    };

    let image = image
        .filter(|img| !img.data.is_empty())
        .ok_or_else(|| AppError::Validation("An image file is required".to_string()))?;

    Ok(NewCourse {
        title,
        description,
        duration,
        video_link,
        tags,
        is_published,
        price,
        discount,
        instructor,
        image,
    })
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("{} is required", field))
}

fn parse_tags(raw: Option<&str>) -> Result<Vec<String>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let tags: Vec<String> = serde_json::from_str(raw)
        .map_err(|_| AppError::Validation("tags must be a JSON array of strings".to_string()))?;
    Ok(tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

fn parse_bool(raw: &str) -> Result<bool, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(AppError::Validation(format!("isPublished must be true or false, got {:?}", raw))),
    }
}

fn parse_number(field: &str, raw: Option<&str>) -> Result<Option<f64>, AppError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{} must be a number, got {:?}", field, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn complete() -> HashMap<String, String> {
        fields(&[
            ("title", "Rust for Web"),
            ("description", "Build services with axum"),
            ("duration", "4 weeks"),
            ("videoLink", "https://videos.test/rust"),
            ("tags", r#"["rust", " web ", ""]"#),
            ("isPublished", "false"),
            ("payment", "5000"),
            ("discount", "150"),
            ("instructor[id]", "i1"),
            ("instructor[name]", "Ferris"),
        ])
    }

    fn image() -> Option<CourseImage> {
        Some(CourseImage {
            file_name: "cover.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        })
    }

    #[test]
    fn builds_course_from_form_fields() {
        let course = build_new_course(complete(), image()).unwrap();
        assert_eq!(course.tags, vec!["rust", "web"]);
        assert!(!course.is_published);
        assert_eq!(course.price, 5000.0);
        // no upper bound on discount
        assert_eq!(course.discount, 150.0);
        assert_eq!(course.instructor.email, None);
    }

    #[test]
    fn rejects_non_numeric_payment() {
        let mut form = complete();
        form.insert("payment".to_string(), "abc".to_string());
        assert!(matches!(build_new_course(form, image()), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_negative_payment() {
        let mut form = complete();
        form.insert("payment".to_string(), "-1".to_string());
        assert!(matches!(build_new_course(form, image()), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_missing_image() {
        assert!(matches!(build_new_course(complete(), None), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_malformed_tags() {
        let mut form = complete();
        form.insert("tags".to_string(), "rust, web".to_string());
        assert!(matches!(build_new_course(form, image()), Err(AppError::Validation(_))));
    }

    #[test]
    fn defaults_when_optional_fields_absent() {
        let mut form = complete();
        form.remove("tags");
        form.remove("isPublished");
        form.remove("discount");
        form.remove("videoLink");
        let course = build_new_course(form, image()).unwrap();
        assert!(course.tags.is_empty());
        assert!(course.is_published);
        assert_eq!(course.discount, 0.0);
        assert_eq!(course.video_link, "");
    }
}
