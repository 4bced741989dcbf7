use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::journeys::repo_types::{Journey, JourneyRow};

#[derive(Debug, Serialize)]
pub struct JourneyOwner {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct JourneyItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: JourneyOwner,
    pub bookmarks: i64,
}

impl From<JourneyRow> for JourneyItem {
    fn from(r: JourneyRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            image: r.image,
            created_at: r.created_at,
            user: JourneyOwner {
                id: r.user_id,
                fullname: r.user_fullname,
                email: r.user_email,
                image: r.user_image,
            },
            bookmarks: r.bookmark_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JourneySummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<Journey> for JourneySummary {
    fn from(j: Journey) -> Self {
        Self {
            id: j.id,
            title: j.title,
            description: j.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateJourneyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateJourneyRequest {
    /// Trims provided fields; rejects empty ones and an empty patch.
    pub fn normalized(self) -> Result<Self, AppError> {
        let clean = |field: &str, v: Option<String>| -> Result<Option<String>, AppError> {
            match v.map(|s| s.trim().to_string()) {
                Some(s) if s.is_empty() => Err(AppError::Validation(format!(
                    "\"{field}\" is not allowed to be empty"
                ))),
                other => Ok(other),
            }
        };
        let title = clean("title", self.title)?;
        let description = clean("description", self.description)?;
        if title.is_none() && description.is_none() {
            return Err(AppError::Validation(
                "\"value\" must contain at least one of [title, description]".into(),
            ));
        }
        Ok(Self { title, description })
    }
}

/// Uploaded image part of the create form.
pub struct ImageUpload {
    pub body: Bytes,
    pub content_type: String,
}

/// Parsed `multipart/form-data` body of `POST /journeys`.
#[derive(Default)]
pub struct NewJourneyForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_requires_a_field() {
        let req = UpdateJourneyRequest {
            title: None,
            description: None,
        };
        assert!(matches!(req.normalized(), Err(AppError::Validation(_))));
    }

    #[test]
    fn update_rejects_blank_title() {
        let req = UpdateJourneyRequest {
            title: Some("   ".into()),
            description: Some("ok".into()),
        };
        match req.normalized() {
            Err(AppError::Validation(m)) => assert_eq!(m, "\"title\" is not allowed to be empty"),
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn update_trims_fields() {
        let req = UpdateJourneyRequest {
            title: Some("  Bali  ".into()),
            description: None,
        }
        .normalized()
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("Bali"));
        assert!(req.description.is_none());
    }

    #[test]
    fn item_nests_owner() {
        let row = JourneyRow {
            id: Uuid::new_v4(),
            title: "Lombok".into(),
            description: "Three days of hiking".into(),
            image: "http://img/journeys/a.jpg".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            user_id: Uuid::new_v4(),
            user_fullname: "Jane Doe".into(),
            user_email: "jane@x.com".into(),
            user_image: "http://img/profile.png".into(),
            bookmark_count: 3,
        };
        let json = serde_json::to_value(JourneyItem::from(row)).unwrap();
        assert_eq!(json["user"]["fullname"], "Jane Doe");
        assert_eq!(json["bookmarks"], 3);
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
        assert!(json["user"].get("password_hash").is_none());
    }
}
