use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{ImageUpload, JourneySummary, NewJourneyForm};
use super::repo_types::NewJourney;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn image_key(user_id: Uuid, image_id: Uuid, ext: &str) -> String {
    format!("journeys/{}/{}.{}", user_id, image_id, ext)
}

/// Storage key behind a public image URL, if it lives under `img_url`.
fn key_from_url<'a>(img_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(img_url).filter(|k| k.starts_with("journeys/"))
}

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(AppError::Validation(format!(
            "\"{field}\" is not allowed to be empty"
        ))),
        None => Err(AppError::Validation(format!("\"{field}\" is required"))),
    }
}

/// Checked form contents, ready to persist.
pub struct ValidJourney {
    pub title: String,
    pub description: String,
    pub image: ImageUpload,
    pub ext: &'static str,
}

pub fn validate(form: NewJourneyForm) -> AppResult<ValidJourney> {
    let title = required("title", form.title)?;
    let description = required("description", form.description)?;
    let image = form
        .image
        .ok_or_else(|| AppError::Validation("\"image\" is required".into()))?;
    if image.body.is_empty() {
        return Err(AppError::Validation("\"image\" is not allowed to be empty".into()));
    }
    let ext = ext_from_mime(&image.content_type).ok_or_else(|| {
        AppError::Validation("\"image\" must be a jpeg, png, webp or gif file".into())
    })?;
    Ok(ValidJourney {
        title,
        description,
        image,
        ext,
    })
}

pub async fn create_journey(
    st: &AppState,
    user_id: Uuid,
    journey: ValidJourney,
) -> AppResult<JourneySummary> {
    // Pre-check saves an upload; the unique index still decides races.
    if st.journeys.title_taken(&journey.title).await? {
        return Err(AppError::JourneyExists);
    }

    let key = image_key(user_id, Uuid::new_v4(), journey.ext);
    st.storage
        .put_object(&key, journey.image.body, &journey.image.content_type)
        .await
        .with_context(|| format!("put_object {}", key))
        .map_err(AppError::Storage)?;

    let image = st.config.image_url(&key);
    let created = match st
        .journeys
        .insert(NewJourney {
            user_id,
            title: journey.title,
            description: journey.description,
            image,
        })
        .await
    {
        Ok(j) => j,
        Err(e) => {
            if let Err(cleanup) = st.storage.delete_object(&key).await {
                warn!(error = %cleanup, %key, "orphaned journey image");
            }
            return Err(e);
        }
    };

    info!(journey_id = %created.id, %user_id, "journey created");
    Ok(created.into())
}

pub async fn delete_journey(st: &AppState, user_id: Uuid, id: Uuid) -> AppResult<()> {
    let image = st
        .journeys
        .delete_owned(id, user_id)
        .await?
        .ok_or(AppError::NotFound("journey"))?;

    if let Some(key) = key_from_url(&st.config.img_url, &image) {
        if let Err(e) = st.storage.delete_object(key).await {
            warn!(error = %e, %key, "delete journey image failed");
        }
    }

    info!(journey_id = %id, %user_id, "journey deleted");
    Ok(())
}
