use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::Deserialize;

use crate::models::{Category, EventChanges, NewEvent};
use crate::uploads::ThumbnailUpload;
use crate::utils::error::AppError;

/// Event columns as submitted by a client; absent keys stay `None`.
#[derive(Debug, Default, Deserialize)]
pub struct EventFields {
    pub name: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "detailedDescription")]
    pub detailed_description: Option<String>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: Option<String>,
    #[serde(alias = "facebookLink")]
    pub facebook_link: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(alias = "creatorEmail")]
    pub creator_email: Option<String>,
}

/// Body of an event create/update, from either JSON or `multipart/form-data`.
#[derive(Debug, Default)]
pub struct EventSubmission {
    pub fields: EventFields,
    pub upload: Option<ThumbnailUpload>,
}

impl EventFields {
    pub fn into_new_event(self) -> Result<NewEvent, AppError> {
        let name = required_name(self.name.as_deref())?;
        let category = parse_category(self.category.as_deref())?.unwrap_or_default();

        Ok(NewEvent {
            name,
            date: self.date.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            detailed_description: self.detailed_description.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            lat: self.lat.unwrap_or_default(),
            lng: self.lng.unwrap_or_default(),
            category,
            facebook_link: self.facebook_link.unwrap_or_default(),
            thumbnail: self.thumbnail.filter(|t| !t.trim().is_empty()),
            creator_email: self.creator_email.filter(|e| !e.trim().is_empty()),
        })
    }

    pub fn into_changes(self) -> Result<EventChanges, AppError> {
        let name = match self.name.as_deref() {
            Some(raw) => Some(required_name(Some(raw))?),
            None => None,
        };

        Ok(EventChanges {
            name,
            date: self.date,
            description: self.description,
            detailed_description: self.detailed_description,
            location: self.location,
            lat: self.lat,
            lng: self.lng,
            category: parse_category(self.category.as_deref())?,
            facebook_link: self.facebook_link,
            thumbnail: self.thumbnail.filter(|t| !t.trim().is_empty()),
        })
    }
}

fn required_name(raw: Option<&str>) -> Result<String, AppError> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AppError::ValidationError("Name is required".to_string())),
    }
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, AppError> {
    raw.map(Category::parse_or_default)
        .transpose()
        .map_err(|e| {
            AppError::ValidationError(format!(
                "Invalid category: {} (expected one of 24h, 12h, Skirmish)",
                e.0
            ))
        })
}

fn parse_coordinate(key: &str, raw: &str) -> Result<Option<f64>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| AppError::ValidationError(format!("Invalid {key}")))
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_multipart(mut multipart: Multipart) -> Result<EventSubmission, AppError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::ValidationError(format!("Invalid form data: {e}"))
    };

    let mut submission = EventSubmission::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "thumbnail" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(invalid)?;
            // Browsers send an empty part when no file was picked.
            let picked = file_name.as_deref().is_some_and(|n| !n.is_empty());
            if picked || !bytes.is_empty() {
                submission.upload = Some(ThumbnailUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let value = field.text().await.map_err(invalid)?;
        let fields = &mut submission.fields;
        match name.as_str() {
            "name" => fields.name = Some(value),
            "date" => fields.date = Some(value),
            "description" => fields.description = Some(value),
            "detailedDescription" | "detailed_description" => {
                fields.detailed_description = Some(value)
            }
            "location" => fields.location = Some(value),
            "lat" => fields.lat = parse_coordinate("lat", &value)?,
            "lng" => fields.lng = parse_coordinate("lng", &value)?,
            "category" => fields.category = Some(value),
            "facebookLink" | "facebook_link" => fields.facebook_link = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}

#[axum::async_trait]
impl<S> FromRequest<S> for EventSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::ValidationError(format!("Invalid form data: {e}")))?;
            return read_multipart(multipart).await;
        }

        let Json(fields) = Json::<EventFields>::from_request(req, state)
            .await
            .map_err(|e| AppError::ValidationError(format!("Invalid input: {}", e.body_text())))?;
        Ok(EventSubmission {
            fields,
            upload: None,
        })
    }
}
