use super::client::ApiClient;
use crate::core::Result;
use crate::models::{PaymentStatusUpdate, PurchaseOrder, Resource};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Query parameter used for free-text search on list endpoints.
pub const SEARCH_PARAM: &str = "search";

/// List endpoints answer either with a bare array or with an envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<R> {
    Items(Vec<R>),
    Envelope {
        #[serde(alias = "data", alias = "results")]
        items: Vec<R>,
    },
}

impl<R> Listing<R> {
    fn into_items(self) -> Vec<R> {
        match self {
            Listing::Items(items) | Listing::Envelope { items } => items,
        }
    }
}

impl ApiClient {
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>> {
        let listing: Listing<R> = self.get(R::PATH).await?;
        Ok(listing.into_items())
    }

    pub async fn search<R: Resource>(&self, query: &str) -> Result<Vec<R>> {
        let listing: Listing<R> = self
            .get_with_query(R::PATH, &[(SEARCH_PARAM, query)])
            .await?;
        Ok(listing.into_items())
    }

    pub async fn fetch<R: Resource>(&self, id: &str) -> Result<R> {
        self.get(&R::item_path(id)).await
    }

    pub async fn create<R: Resource>(&self, record: &R) -> Result<R> {
        self.post(R::PATH, record).await
    }

    /// Full replacement of the record with `id`.
    pub async fn save<R: Resource>(&self, id: &str, record: &R) -> Result<R> {
        self.put(&R::item_path(id), record).await
    }

    /// Partial update; only the fields present in `patch` change.
    pub async fn patch_record<R: Resource>(&self, id: &str, patch: &JsonValue) -> Result<R> {
        self.patch(&R::item_path(id), patch).await
    }

    pub async fn remove<R: Resource>(&self, id: &str) -> Result<()> {
        self.delete(&R::item_path(id)).await
    }

    pub async fn update_payment_status(
        &self,
        order_id: &str,
        update: &PaymentStatusUpdate,
    ) -> Result<PurchaseOrder> {
        update.validate()?;
        let path = format!("{}/payment-status", PurchaseOrder::item_path(order_id));
        self.patch(&path, update).await
    }
}
