//! Course-creation client: the typed form an instructor fills in, its
//! validation, and the multipart submission to the courses endpoint.

use std::fmt;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::{CourseImage, Instructor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid course form: {}", join_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One field per form control. Numeric inputs are kept as the text the user
/// typed and checked by [`CourseForm::validate`].
#[derive(Debug, Clone)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub video_link: String,
    /// Comma separated.
    pub tags: String,
    pub is_published: bool,
    pub payment: String,
    pub discount: String,
    pub image: Option<CourseImage>,
}

impl Default for CourseForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            duration: String::new(),
            video_link: String::new(),
            tags: String::new(),
            is_published: true,
            payment: String::new(),
            discount: String::new(),
            image: None,
        }
    }
}

impl CourseForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("duration", &self.duration),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    message: format!("{} is required", field),
                });
            }
        }

        for (field, value) in [("payment", &self.payment), ("discount", &self.discount)] {
            if parse_amount(value).is_none() {
                errors.push(FieldError {
                    field,
                    message: "Please enter a valid numeric value".to_string(),
                });
            }
        }

        if self.image.is_none() {
            errors.push(FieldError {
                field: "image",
                message: "Please select an image for the course".to_string(),
            });
        }

        errors
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCourse {
    pub id: String,
}

pub struct CourseApiClient {
    client: Client,
    config: ApiConfig,
}

impl CourseApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn courses_url(&self) -> String {
        format!("{}/courses", self.config.base_url)
    }

    /// Validates locally first; an invalid form never reaches the network.
    pub async fn create_course(
        &self,
        form: &CourseForm,
        instructor: &Instructor,
    ) -> Result<CreatedCourse, ClientError> {
        let errors = form.validate();
        if !errors.is_empty() {
            tracing::warn!("Course form rejected: {}", join_errors(&errors));
            return Err(ClientError::Validation(errors));
        }

        let multipart = build_multipart(form, instructor)?;
        let url = self.courses_url();

        let response = self.client.post(&url).multipart(multipart).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Course creation failed: {} {}", status, body);
            return Err(ClientError::Status { status, body });
        }

        let created = response.json::<CreatedCourse>().await?;
        tracing::info!("Course {} created via {}", created.id, url);
        Ok(created)
    }
}

fn build_multipart(form: &CourseForm, instructor: &Instructor) -> Result<Form, ClientError> {
    let missing = |field: &'static str, message: &str| {
        ClientError::Validation(vec![FieldError {
            field,
            message: message.to_string(),
        }])
    };
    let payment = parse_amount(&form.payment)
        .ok_or_else(|| missing("payment", "Please enter a valid numeric value"))?;
    let discount = parse_amount(&form.discount)
        .ok_or_else(|| missing("discount", "Please enter a valid numeric value"))?;
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| missing("image", "Please select an image for the course"))?;

    let tags = serde_json::to_string(&form.tag_list())
        .map_err(|e| missing("tags", &e.to_string()))?;

    let image_part = Part::bytes(image.data.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)?;

    let mut multipart = Form::new()
        .text("title", form.title.trim().to_string())
        .text("description", form.description.trim().to_string())
        .text("duration", form.duration.trim().to_string())
        .text("videoLink", form.video_link.trim().to_string())
        .text("tags", tags)
        .text("isPublished", form.is_published.to_string())
        .text("payment", payment.to_string())
        .text("discount", discount.to_string())
        .part("image", image_part)
        .text("instructor[id]", instructor.id.clone())
        .text("instructor[name]", instructor.name.clone());
    if let Some(email) = &instructor.email {
        multipart = multipart.text("instructor[email]", email.clone());
    }

    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CourseForm {
        CourseForm {
            title: "Data Structures".to_string(),
            description: "Lists, trees and graphs".to_string(),
            duration: "8 weeks".to_string(),
            video_link: String::new(),
            tags: " algorithms, ,cs ".to_string(),
            is_published: true,
            payment: "5000".to_string(),
            discount: "50".to_string(),
            image: Some(CourseImage {
                file_name: "ds.png".to_string(),
                content_type: "image/png".to_string(),
                data: vec![1, 2, 3],
            }),
        }
    }

    fn fields_of(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(filled().validate().is_empty());
    }

    #[test]
    fn default_form_reports_every_missing_field() {
        let errors = CourseForm::default().validate();
        assert_eq!(
            fields_of(&errors),
            vec!["title", "description", "duration", "payment", "discount", "image"]
        );
    }

    #[test]
    fn non_numeric_discount() {
        let mut form = filled();
        form.discount = "half".to_string();
        assert_eq!(fields_of(&form.validate()), vec!["discount"]);
    }

    #[test]
    fn tags_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(filled().tag_list(), vec!["algorithms", "cs"]);
    }

    #[test]
    fn multipart_builds_for_valid_form() {
        let instructor = Instructor {
            id: "i1".to_string(),
            name: "Grace".to_string(),
            email: Some("grace@x.com".to_string()),
        };
        assert!(build_multipart(&filled(), &instructor).is_ok());
    }
}
