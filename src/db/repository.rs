use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    Course, CourseRow, EnrolledInstructor, EnrolledStudent, Enrollment, Message, MessageRow,
    NewMessage,
};

/// Fixed-width RFC3339 so that lexical order in SQL matches time order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---- messages ----

pub async fn insert_message(db: &SqlitePool, msg: NewMessage) -> Result<Message, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now_timestamp();

    sqlx::query(
        r#"
        INSERT INTO messages
            (id, sender_email, recipient_email, course_id, body, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(&msg.sender_email)
    .bind(msg.target.recipient_email())
    .bind(msg.target.course_id())
    .bind(&msg.body)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Message {
        id,
        sender_email: msg.sender_email,
        target: msg.target,
        body: msg.body,
        created_at: now,
    })
}

pub async fn fetch_messages_for_user(
    db: &SqlitePool,
    email: &str,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, sender_email, recipient_email, course_id, body, created_at
        FROM messages
        WHERE sender_email = ?1 OR recipient_email = ?1
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(email)
    .fetch_all(db)
    .await
}

pub async fn fetch_messages_by_course(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, sender_email, recipient_email, course_id, body, created_at
        FROM messages
        WHERE course_id = ?1
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(course_id)
    .fetch_all(db)
    .await
}

// ---- courses ----

pub async fn insert_course(db: &SqlitePool, course: &Course) -> Result<(), sqlx::Error> {
    let tags = serde_json::to_string(&course.tags)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, title, description, duration, video_link, tags, is_published,
            price, discount, image_ref, instructor_id, instructor_name,
            instructor_email, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&course.id)
    .bind(&course.title)
    .bind(&course.description)
    .bind(&course.duration)
    .bind(&course.video_link)
    .bind(tags)
    .bind(course.is_published)
    .bind(course.price)
    .bind(course.discount)
    .bind(&course.image_ref)
    .bind(&course.instructor.id)
    .bind(&course.instructor.name)
    .bind(&course.instructor.email)
    .bind(&course.created_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(
        "SELECT id, title, description, duration, video_link, tags, is_published, price, discount, image_ref, instructor_id, instructor_name, instructor_email, created_at FROM courses WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_courses(
    db: &SqlitePool,
    published: Option<bool>,
) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, title, description, duration, video_link, tags, is_published,
            price, discount, image_ref, instructor_id, instructor_name,
            instructor_email, created_at
        FROM courses
        WHERE ?1 IS NULL OR is_published = ?1
        ORDER BY created_at DESC
        "#,
    )
    .bind(published)
    .fetch_all(db)
    .await
}

pub async fn course_exists(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

/// An instructor is known once they own at least one course.
pub async fn instructor_exists(db: &SqlitePool, instructor_id: &str) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses WHERE instructor_id = ?")
        .bind(instructor_id)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

// ---- enrollments ----

pub async fn insert_enrollment(
    db: &SqlitePool,
    course_id: &str,
    student_id: &str,
    student_name: &str,
    student_email: &str,
) -> Result<Enrollment, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now_timestamp();

    sqlx::query(
        r#"
        INSERT INTO enrollments
            (id, course_id, student_id, student_name, student_email, enrolled_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(course_id)
    .bind(student_id)
    .bind(student_name)
    .bind(student_email)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Enrollment {
        id,
        course_id: course_id.to_string(),
        student_id: student_id.to_string(),
        student_name: student_name.to_string(),
        student_email: student_email.to_string(),
        enrolled_at: now,
    })
}

pub async fn fetch_enrolled_students(
    db: &SqlitePool,
    instructor_id: &str,
) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledStudent>(
        r#"
        SELECT
            e.student_id AS id,
            MIN(e.student_name) AS name,
            MIN(e.student_email) AS email
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE c.instructor_id = ?1
        GROUP BY e.student_id
        ORDER BY e.student_id
        "#,
    )
    .bind(instructor_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_enrolled_instructors(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<EnrolledInstructor>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledInstructor>(
        r#"
        SELECT
            c.instructor_id AS id,
            MIN(c.instructor_name) AS name,
            MIN(c.instructor_email) AS email
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE e.student_id = ?1
        GROUP BY c.instructor_id
        ORDER BY c.instructor_id
        "#,
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}
