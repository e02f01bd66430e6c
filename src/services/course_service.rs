use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, EnrollRequest, Enrollment, NewCourse};
use crate::storage::ObjectStorage;

pub struct CourseService {
    db: SqlitePool,
    storage: Arc<dyn ObjectStorage>,
}

impl CourseService {
    pub fn new(db: SqlitePool, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { db, storage }
    }

    /// Uploads the cover image, then records the course.
    pub async fn create_course(&self, new: NewCourse) -> Result<Course, AppError> {
        let id = Uuid::new_v4().to_string();
        let key = format!("courses/{}/{}", id, sanitize_file_name(&new.image.file_name));

        let image_ref = self
            .storage
            .put_object(&key, &new.image.content_type, new.image.data)
            .await?;

        let course = Course {
            id,
            title: new.title,
            description: new.description,
            duration: new.duration,
            video_link: new.video_link,
            tags: new.tags,
            is_published: new.is_published,
            price: new.price,
            discount: new.discount,
            image_ref,
            instructor: new.instructor,
            created_at: repository::now_timestamp(),
        };

        if let Err(e) = repository::insert_course(&self.db, &course).await {
            warn!(
                "Course {} was not saved; uploaded image {} ({}) is orphaned",
                course.id, key, course.image_ref
            );
            return Err(e.into());
        }
        info!("Course {} created by instructor {}", course.id, course.instructor.id);
        Ok(course)
    }

    pub async fn list_courses(&self, published: Option<bool>) -> Result<Vec<Course>, AppError> {
        let rows = repository::fetch_courses(&self.db, published).await?;
        let courses = rows
            .into_iter()
            .map(Course::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    pub async fn get_course(&self, id: &str) -> Result<Course, AppError> {
        let row = repository::find_course_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))?;
        Ok(Course::try_from(row)?)
    }

    pub async fn enroll(&self, course_id: &str, req: EnrollRequest) -> Result<Enrollment, AppError> {
        let student_id = required(req.student_id, "studentId")?;
        let student_name = required(req.student_name, "studentName")?;
        let student_email = required(req.student_email, "studentEmail")?;

        if !repository::course_exists(&self.db, course_id).await? {
            return Err(AppError::NotFound(format!("Course {} not found", course_id)));
        }

        match repository::insert_enrollment(&self.db, course_id, &student_id, &student_name, &student_email).await {
            Ok(enrollment) => {
                info!("Student {} enrolled in course {}", student_id, course_id);
                Ok(enrollment)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!("Duplicate enrollment: student {} in course {}", student_id, course_id);
                Err(AppError::Conflict(format!(
                    "Student {} is already enrolled in course {}",
                    student_id, course_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Keeps object keys to a single path segment of safe characters.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::{CourseImage, Instructor};
    use crate::storage::NoopObjectStorage;

    fn new_course(instructor_id: &str) -> NewCourse {
        NewCourse {
            title: "Web Development".to_string(),
            description: "HTML, CSS and a bit of JS".to_string(),
            duration: "6 weeks".to_string(),
            video_link: "https://videos.test/intro".to_string(),
            tags: vec!["web".to_string()],
            is_published: true,
            price: 4999.0,
            discount: 10.0,
            instructor: Instructor {
                id: instructor_id.to_string(),
                name: "Ada".to_string(),
                email: Some("ada@x.com".to_string()),
            },
            image: CourseImage {
                file_name: "../my cover.png".to_string(),
                content_type: "image/png".to_string(),
                data: vec![0x89, 0x50, 0x4e, 0x47],
            },
        }
    }

    fn service(db: SqlitePool) -> CourseService {
        CourseService::new(db, Arc::new(NoopObjectStorage))
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../my cover.png"), "my_cover.png");
        assert_eq!(sanitize_file_name("C:\\pics\\a.jpg"), "a.jpg");
        assert_eq!(sanitize_file_name(".."), "image");
    }

    #[tokio::test]
    async fn test_create_and_get_course() {
        let service = service(test_pool().await);

        let created = service.create_course(new_course("i1")).await.expect("Failed to create");
        assert!(created.image_ref.starts_with("memory://courses/"));
        assert!(created.image_ref.ends_with("/my_cover.png"));

        let fetched = service.get_course(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_failed_insert_surfaces_database_error() {
        let service = service(test_pool().await);
        let mut course = new_course("i1");
        // violates CHECK(price >= 0)
        course.price = -1.0;

        let err = service.create_course(course).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(service.list_courses(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_course() {
        let service = service(test_pool().await);
        assert!(matches!(service.get_course("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_enroll_conflict_and_validation() {
        let service = service(test_pool().await);
        let course = service.create_course(new_course("i1")).await.unwrap();

        let req = EnrollRequest {
            student_id: Some("s1".to_string()),
            student_name: Some("Taro".to_string()),
            student_email: Some("taro@x.com".to_string()),
        };
        let enrollment = service.enroll(&course.id, req.clone()).await.unwrap();
        assert_eq!(enrollment.course_id, course.id);

        assert!(matches!(service.enroll(&course.id, req.clone()).await, Err(AppError::Conflict(_))));
        assert!(matches!(service.enroll("missing", req).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.enroll(&course.id, EnrollRequest::default()).await,
            Err(AppError::Validation(_))
        ));
    }
}
