use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{EnrolledInstructor, EnrolledStudent, Message, SendMessageRequest};

pub struct MessageService {
    db: SqlitePool,
}

impl MessageService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn send_message(&self, req: SendMessageRequest) -> Result<Message, AppError> {
        let msg = req.validate()?;

        if let Some(course_id) = msg.target.course_id() {
            if !repository::course_exists(&self.db, course_id).await? {
                return Err(AppError::NotFound(format!("Course {} not found", course_id)));
            }
        }

        let message = repository::insert_message(&self.db, msg).await?;
        info!(
            "Message {} sent by {} ({:?})",
            message.id, message.sender_email, message.target
        );
        Ok(message)
    }

    /// Messages the user sent or received, oldest first.
    pub async fn messages_for_user(&self, email: &str) -> Result<Vec<Message>, AppError> {
        let rows = repository::fetch_messages_for_user(&self.db, email.trim()).await?;
        debug!("Fetched {} messages for {}", rows.len(), email);
        rows.into_iter().map(Message::try_from).collect()
    }

    pub async fn messages_by_course(&self, course_id: &str) -> Result<Vec<Message>, AppError> {
        let rows = repository::fetch_messages_by_course(&self.db, course_id.trim()).await?;
        debug!("Fetched {} messages for course {}", rows.len(), course_id);
        rows.into_iter().map(Message::try_from).collect()
    }

    /// Students enrolled in any course the instructor owns. An instructor who
    /// owns no course is unknown and yields `NotFound`.
    pub async fn enrolled_students_for_instructor(
        &self,
        instructor_id: &str,
    ) -> Result<Vec<EnrolledStudent>, AppError> {
        if !repository::instructor_exists(&self.db, instructor_id).await? {
            return Err(AppError::NotFound(format!("Instructor {} not found", instructor_id)));
        }
        Ok(repository::fetch_enrolled_students(&self.db, instructor_id).await?)
    }

    pub async fn enrolled_instructors_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<EnrolledInstructor>, AppError> {
        Ok(repository::fetch_enrolled_instructors(&self.db, student_id).await?)
    }
}
