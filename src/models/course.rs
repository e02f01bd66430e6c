use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub video_link: String,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub price: f64,
    pub discount: f64,
    pub image_ref: String,
    pub instructor: Instructor,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub video_link: String,
    pub tags: String,
    pub is_published: bool,
    pub price: f64,
    pub discount: f64,
    pub image_ref: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub instructor_email: Option<String>,
    pub created_at: String,
}

impl TryFrom<CourseRow> for Course {
    type Error = serde_json::Error;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let tags: Vec<String> = serde_json::from_str(&row.tags)?;
        Ok(Course {
            id: row.id,
            title: row.title,
            description: row.description,
            duration: row.duration,
            video_link: row.video_link,
            tags,
            is_published: row.is_published,
            price: row.price,
            discount: row.discount,
            image_ref: row.image_ref,
            instructor: Instructor {
                id: row.instructor_id,
                name: row.instructor_name,
                email: row.instructor_email,
            },
            created_at: row.created_at,
        })
    }
}

/// An uploaded course image, as received from the multipart form.
#[derive(Debug, Clone)]
pub struct CourseImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Course fields parsed from the creation form, before the image is stored.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub video_link: String,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub price: f64,
    pub discount: f64,
    pub instructor: Instructor,
    pub image: CourseImage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseQueryParams {
    #[serde(default)]
    pub published: Option<bool>,
}
