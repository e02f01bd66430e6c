use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Who a message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MessageTarget {
    #[serde(rename_all = "camelCase")]
    Direct { recipient_email: String },
    /// Scoped to a course, optionally addressed to one participant as well.
    #[serde(rename_all = "camelCase")]
    Course {
        course_id: String,
        recipient_email: Option<String>,
    },
}

impl MessageTarget {
    pub fn recipient_email(&self) -> Option<&str> {
        match self {
            MessageTarget::Direct { recipient_email } => Some(recipient_email.as_str()),
            MessageTarget::Course { recipient_email, .. } => recipient_email.as_deref(),
        }
    }

    pub fn course_id(&self) -> Option<&str> {
        match self {
            MessageTarget::Direct { .. } => None,
            MessageTarget::Course { course_id, .. } => Some(course_id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_email: String,
    #[serde(flatten)]
    pub target: MessageTarget,
    pub body: String,
    pub created_at: String,
}

/// Flat row as stored in the `messages` table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: String,
    pub sender_email: String,
    pub recipient_email: Option<String>,
    pub course_id: Option<String>,
    pub body: String,
    pub created_at: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let target = match (row.course_id, row.recipient_email) {
            (Some(course_id), recipient_email) => MessageTarget::Course {
                course_id,
                recipient_email,
            },
            (None, Some(recipient_email)) => MessageTarget::Direct { recipient_email },
            (None, None) => {
                tracing::error!("message {} has neither recipient nor course", row.id);
                return Err(AppError::InternalServerError);
            }
        };

        Ok(Message {
            id: row.id,
            sender_email: row.sender_email,
            target,
            body: row.body,
            created_at: row.created_at,
        })
    }
}

/// Body of `POST /api/messages`. Every field is optional here so that missing
/// values surface as validation errors instead of extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub sender_email: Option<String>,
    pub recipient_email: Option<String>,
    pub course_id: Option<String>,
    pub body: Option<String>,
}

/// A validated message, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub sender_email: String,
    pub target: MessageTarget,
    pub body: String,
}

impl SendMessageRequest {
    pub fn validate(self) -> Result<NewMessage, AppError> {
        let sender_email = non_empty(self.sender_email)
            .ok_or_else(|| AppError::Validation("senderEmail is required".to_string()))?;
        let body = self
            .body
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Message body cannot be empty".to_string()))?;
        let recipient_email = non_empty(self.recipient_email);

        let target = match (non_empty(self.course_id), recipient_email) {
            (Some(course_id), recipient_email) => MessageTarget::Course {
                course_id,
                recipient_email,
            },
            (None, Some(recipient_email)) => MessageTarget::Direct { recipient_email },
            (None, None) => {
                return Err(AppError::Validation(
                    "Either recipientEmail or courseId is required".to_string(),
                ));
            }
        };

        Ok(NewMessage {
            sender_email,
            target,
            body,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(recipient: Option<&str>, course: Option<&str>, body: &str) -> SendMessageRequest {
        SendMessageRequest {
            sender_email: Some("a@x.com".to_string()),
            recipient_email: recipient.map(str::to_string),
            course_id: course.map(str::to_string),
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn direct_message_target() {
        let msg = request(Some(" b@x.com "), None, "hello").validate().unwrap();
        assert_eq!(
            msg.target,
            MessageTarget::Direct { recipient_email: "b@x.com".to_string() }
        );
    }

    #[test]
    fn course_message_keeps_optional_recipient() {
        let msg = request(Some("b@x.com"), Some("c1"), "hello").validate().unwrap();
        assert_eq!(msg.target.course_id(), Some("c1"));
        assert_eq!(msg.target.recipient_email(), Some("b@x.com"));
    }

    #[test]
    fn blank_body_is_rejected() {
        let err = request(Some("b@x.com"), None, "   ").validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn body_is_kept_verbatim() {
        let msg = request(Some("b@x.com"), None, "    fn main() {}\n").validate().unwrap();
        assert_eq!(msg.body, "    fn main() {}\n");
    }

    #[test]
    fn missing_target_is_rejected() {
        let err = request(None, Some(""), "hi").validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn missing_sender_is_rejected() {
        let mut req = request(Some("b@x.com"), None, "hi");
        req.sender_email = None;
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn serializes_flat_with_kind_tag() {
        let msg = Message {
            id: "m1".to_string(),
            sender_email: "a@x.com".to_string(),
            target: MessageTarget::Course {
                course_id: "c1".to_string(),
                recipient_email: None,
            },
            body: "hi".to_string(),
            created_at: "2026-01-01T00:00:00.000000Z".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "course");
        assert_eq!(json["courseId"], "c1");
        assert_eq!(json["senderEmail"], "a@x.com");
    }
}
