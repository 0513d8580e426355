//! Per-screen resource state.
//!
//! A [`ResourceStore`] backs one CRUD screen: it keeps the optimistic list
//! of records, collapses concurrent reloads into one request, and debounces
//! the search box.

use crate::api::ApiClient;
use crate::coordination::{
    Debouncer, ErrorHandling, ListEntry, OptimisticList, SingleFlight, merge_patch,
};
use crate::core::{AdminError, Result};
use crate::models::Resource;
use crate::notify::{Notification, Notifier};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{Level, event};

pub struct ResourceStore<R: Resource> {
    client: ApiClient,
    list: Arc<OptimisticList<R>>,
    fetches: SingleFlight<Vec<R>>,
    search: Debouncer<String>,
    notifier: Arc<dyn Notifier>,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        let list = Arc::new(OptimisticList::new(R::NAME).with_notifier(Arc::clone(&notifier)));
        let fetches = SingleFlight::new();
        let delay = client.config().search_debounce;

        let search = {
            let notifier = Arc::clone(&notifier);
            let client = client.clone();
            let list = Arc::clone(&list);
            let fetches = fetches.clone();
            Debouncer::new(
                move |query: String| {
                    let client = client.clone();
                    let list = Arc::clone(&list);
                    let fetches = fetches.clone();
                    let notifier = Arc::clone(&notifier);
                    async move {
                        match load(&client, &fetches, &query).await {
                            Ok(records) => list.replace_all(records),
                            Err(err) => {
                                event!(Level::WARN, resource = R::NAME, error = %err, "search failed");
                                notifier.notify(Notification::error(err.user_message()));
                            }
                        }
                    }
                },
                delay,
            )
        };

        Self {
            client,
            list,
            fetches,
            search,
            notifier,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn list(&self) -> &OptimisticList<R> {
        &self.list
    }

    pub fn items(&self) -> Vec<R> {
        self.list.items()
    }

    pub fn entries(&self) -> Vec<ListEntry<R>> {
        self.list.entries()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ListEntry<R>>> {
        self.list.subscribe()
    }

    pub fn is_updating(&self) -> bool {
        self.list.is_updating()
    }

    pub fn is_loading(&self) -> bool {
        self.fetches.in_flight(R::PATH)
    }

    /// Reloads the full collection. Concurrent reloads share one request.
    pub async fn refresh(&self) -> Result<Vec<R>> {
        let records = load(&self.client, &self.fetches, "").await?;
        self.list.replace_all(records.clone());
        Ok(records)
    }

    /// Schedules a search once typing pauses; an empty query reloads everything.
    pub fn search(&self, query: impl Into<String>) {
        self.search.call(query.into());
    }

    pub fn cancel_search(&self) -> bool {
        self.search.cancel()
    }

    /// Validates `draft`, then adds it optimistically and posts it.
    pub async fn create(&self, draft: R) -> Result<R> {
        if let Err(err) = draft.validate() {
            return Err(self.reject(err));
        }
        let client = self.client.clone();
        let body = draft.clone();
        self.list
            .create(
                async move { client.create(&body).await },
                draft,
                ErrorHandling::Notify,
            )
            .await
    }

    /// Validates the patched record, then applies the patch optimistically
    /// and sends it. An unknown `id` is left to the backend to reject.
    pub async fn update(&self, id: &str, patch: JsonValue) -> Result<R> {
        if let Some(current) = self.list.get(id) {
            if let Err(err) = merge_patch(&current, &patch).and_then(|merged| merged.validate()) {
                return Err(self.reject(err));
            }
        }
        let client = self.client.clone();
        let target = id.to_string();
        let body = patch.clone();
        self.list
            .update(
                id,
                async move { client.patch_record::<R>(&target, &body).await },
                patch,
                ErrorHandling::Notify,
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let client = self.client.clone();
        let target = id.to_string();
        self.list
            .delete(
                id,
                async move { client.remove::<R>(&target).await },
                ErrorHandling::Notify,
            )
            .await
    }

    fn reject(&self, err: AdminError) -> AdminError {
        let err = match err {
            AdminError::Serialization(msg) => AdminError::Validation(msg),
            other => other,
        };
        event!(Level::WARN, resource = R::NAME, error = %err, "rejected before sending");
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }
}

async fn load<R: Resource>(
    client: &ApiClient,
    fetches: &SingleFlight<Vec<R>>,
    query: &str,
) -> Result<Vec<R>> {
    let query = query.trim().to_string();
    if query.is_empty() {
        let client = client.clone();
        return fetches
            .run(R::PATH, move || async move { client.list::<R>().await })
            .await;
    }

    let key = format!("{}?search={}", R::PATH, query);
    let client = client.clone();
    fetches
        .run(&key, move || async move { client.search::<R>(&query).await })
        .await
}
