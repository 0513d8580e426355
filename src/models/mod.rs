//! Records managed by the dashboard screens.
//!
//! Each type maps to one REST collection (`Resource::PATH`) and is keyed by
//! the backend id (`Record::record_id`). Backends disagree on whether ids are
//! numbers or strings, so ids are normalised to strings on the way in.

pub mod access;
pub mod food;
pub mod inventory;
pub mod purchase;
pub mod website;

pub use access::{Permission, Role};
pub use food::{FoodItem, Ingredient, Recipe};
pub use inventory::{InventoryCategory, VendorCategory};
pub use purchase::{PaymentStatus, PaymentStatusUpdate, PurchaseOrder};
pub use website::{Banner, GalleryImage, Review};

use crate::coordination::Record;
use serde::{Deserialize, Deserializer};

/// A record type served from its own REST collection.
pub trait Resource: Record {
    /// Collection path, e.g. `/food-items`.
    const PATH: &'static str;
    /// Human-readable name used in logs and notifications.
    const NAME: &'static str;

    fn item_path(id: &str) -> String {
        format!("{}/{}", Self::PATH, id)
    }

    /// Client-side checks run before a record is written.
    fn validate(&self) -> crate::core::Result<()> {
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

/// Accepts `"12"` or `12` and yields `"12"`.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(number) => number.to_string(),
    })
}

pub(crate) fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<RawId>::deserialize(deserializer)?
        .into_iter()
        .map(|raw| match raw {
            RawId::Text(text) => text,
            RawId::Integer(number) => number.to_string(),
        })
        .collect())
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Integer(number) => number.to_string(),
    }))
}

/// Implements `Record` for a struct with an `id: String` field.
macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl crate::coordination::Record for $ty {
                fn record_id(&self) -> &str {
                    &self.id
                }
            }
        )+
    };
}

pub(crate) use impl_record;
