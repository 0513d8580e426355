use super::{Resource, deserialize_id, impl_record};
use crate::core::{AdminError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub guest_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(Banner, GalleryImage, Review);

impl Resource for Banner {
    const PATH: &'static str = "/banners";
    const NAME: &'static str = "banner";
}

impl Resource for GalleryImage {
    const PATH: &'static str = "/gallery";
    const NAME: &'static str = "gallery image";
}

impl Resource for Review {
    const PATH: &'static str = "/reviews";
    const NAME: &'static str = "review";

    fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(AdminError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if self.guest_name.trim().is_empty() {
            return Err(AdminError::Validation("Guest name is required".to_string()));
        }
        Ok(())
    }
}
