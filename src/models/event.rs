use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Kind of game an event runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "24h")]
    TwentyFourHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[default]
    Skirmish,
}

#[derive(Debug, Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl Category {
    pub const ALL: [Category; 3] = [
        Category::TwentyFourHours,
        Category::TwelveHours,
        Category::Skirmish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TwentyFourHours => "24h",
            Category::TwelveHours => "12h",
            Category::Skirmish => "Skirmish",
        }
    }

    /// Blank input falls back to the default category.
    pub fn parse_or_default(raw: &str) -> Result<Self, UnknownCategory> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Category::default());
        }
        trimmed.parse()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::parse_or_default(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub date: String,
    pub description: String,
    pub detailed_description: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    #[sqlx(try_from = "String")]
    pub category: Category,
    pub facebook_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_email: Option<String>,
}

/// A validated event that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub date: String,
    pub description: String,
    pub detailed_description: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
    pub facebook_link: String,
    pub thumbnail: Option<String>,
    pub creator_email: Option<String>,
}

impl NewEvent {
    pub fn into_event(self, id: i32) -> Event {
        Event {
            id,
            name: self.name,
            date: self.date,
            description: self.description,
            detailed_description: self.detailed_description,
            location: self.location,
            lat: self.lat,
            lng: self.lng,
            category: self.category,
            facebook_link: self.facebook_link,
            thumbnail: self.thumbnail,
            creator_email: self.creator_email,
        }
    }
}

/// Column-wise update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub name: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: Option<Category>,
    pub facebook_link: Option<String>,
    pub thumbnail: Option<String>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        *self == EventChanges::default()
    }

    pub fn apply_to(self, event: &mut Event) {
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(detailed) = self.detailed_description {
            event.detailed_description = detailed;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(lat) = self.lat {
            event.lat = lat;
        }
        if let Some(lng) = self.lng {
            event.lng = lng;
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(link) = self.facebook_link {
            event.facebook_link = link;
        }
        if let Some(thumbnail) = self.thumbnail {
            event.thumbnail = Some(thumbnail);
        }
    }
}
