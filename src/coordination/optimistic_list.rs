use super::optimistic::{ErrorHandling, OptimisticExecutor, OptimisticUpdate, StateHandle};
use crate::core::{AdminError, Result};
use crate::notify::Notifier;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Prefix of ids handed out to optimistically created entries.
pub const TEMP_ID_PREFIX: &str = "temp-";

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A record the backend identifies by a string id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn record_id(&self) -> &str;
}

/// A row of an optimistic list.
///
/// `id` equals the record's own id once the backend has confirmed it;
/// optimistic creates carry a temporary id and `unconfirmed` until then.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry<T> {
    pub id: String,
    pub record: T,
    pub unconfirmed: bool,
}

impl<T: Record> ListEntry<T> {
    pub fn confirmed(record: T) -> Self {
        Self {
            id: record.record_id().to_string(),
            record,
            unconfirmed: false,
        }
    }
}

/// Time-based id, unique for the lifetime of the process.
pub fn temp_id() -> String {
    let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{TEMP_ID_PREFIX}{}-{sequence}",
        Utc::now().timestamp_millis()
    )
}

pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Shallow-merges a JSON object `patch` into `record`, field by field.
pub fn merge_patch<T>(record: &T, patch: &JsonValue) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let JsonValue::Object(changes) = patch else {
        return Err(AdminError::Validation(
            "patch must be a JSON object".to_string(),
        ));
    };

    let mut value = serde_json::to_value(record)?;
    let JsonValue::Object(fields) = &mut value else {
        return Err(AdminError::Validation(
            "record does not serialize to a JSON object".to_string(),
        ));
    };
    for (field, change) in changes {
        fields.insert(field.clone(), change.clone());
    }

    Ok(serde_json::from_value(value)?)
}

/// Ordered collection whose create, update and delete calls show up locally
/// before the backend answers.
pub struct OptimisticList<T: Record> {
    name: String,
    executor: OptimisticExecutor<Vec<ListEntry<T>>>,
}

impl<T: Record> OptimisticList<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executor: OptimisticExecutor::new(Vec::new()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.executor = self.executor.with_notifier(notifier);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &StateHandle<Vec<ListEntry<T>>> {
        self.executor.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ListEntry<T>>> {
        self.executor.state().subscribe()
    }

    pub fn is_updating(&self) -> bool {
        self.executor.is_updating()
    }

    pub fn entries(&self) -> Vec<ListEntry<T>> {
        self.executor.state().snapshot()
    }

    /// Records in list order.
    ///
    /// An optimistic create shows up here with the draft's own id, usually
    /// empty, until the backend confirms it. Screens that need to key or
    /// flag pending rows should use [`entries`](Self::entries), which carries
    /// the temporary id and the `unconfirmed` marker.
    pub fn items(&self) -> Vec<T> {
        self.executor
            .state()
            .read(|entries| entries.iter().map(|entry| entry.record.clone()).collect())
    }

    pub fn ids(&self) -> Vec<String> {
        self.executor
            .state()
            .read(|entries| entries.iter().map(|entry| entry.id.clone()).collect())
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.executor.state().read(|entries| {
            entries
                .iter()
                .find(|entry| entry.id == id)
                .map(|entry| entry.record.clone())
        })
    }

    pub fn len(&self) -> usize {
        self.executor.state().read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the whole list with freshly fetched records.
    pub fn replace_all(&self, records: Vec<T>) {
        self.executor
            .state()
            .replace(records.into_iter().map(ListEntry::confirmed).collect());
    }

    /// Prepends `data` under a temporary id, then swaps in the record the
    /// backend returns. On failure the temporary entry is removed again.
    pub async fn create<Fut>(&self, operation: Fut, data: T, on_error: ErrorHandling) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let temp = temp_id();
        let entry = ListEntry {
            id: temp.clone(),
            record: data,
            unconfirmed: true,
        };
        let rollback_id = temp.clone();

        let update = OptimisticUpdate::new(operation)
            .label(format!("create {}", self.name))
            .optimistic(move |entries: &mut Vec<ListEntry<T>>| entries.insert(0, entry))
            .rollback(move |entries: &mut Vec<ListEntry<T>>| {
                entries.retain(|entry| entry.id != rollback_id)
            })
            .on_success(move |entries: &mut Vec<ListEntry<T>>, created: &T| {
                if let Some(slot) = entries.iter_mut().find(|entry| entry.id == temp) {
                    *slot = ListEntry::confirmed(created.clone());
                }
            })
            .error_handling(on_error);

        self.executor.execute(update).await
    }

    /// Merges `patch` into the entry with `id` in place, then replaces it
    /// with the backend's version. On failure the exact prior record is
    /// restored. An unknown `id` leaves the list untouched.
    pub async fn update<Fut>(
        &self,
        id: &str,
        operation: Fut,
        patch: JsonValue,
        on_error: ErrorHandling,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let prior = self.get(id);
        let merged = match &prior {
            Some(record) => Some(merge_patch(record, &patch)?),
            None => None,
        };

        let target = id.to_string();
        let optimistic_target = target.clone();
        let rollback_target = target.clone();

        let update = OptimisticUpdate::new(operation)
            .label(format!("update {}", self.name))
            .optimistic(move |entries: &mut Vec<ListEntry<T>>| {
                if let Some(merged) = merged {
                    if let Some(slot) = find_entry(entries, &optimistic_target) {
                        slot.record = merged;
                    }
                }
            })
            .rollback(move |entries: &mut Vec<ListEntry<T>>| {
                if let Some(prior) = prior {
                    if let Some(slot) = find_entry(entries, &rollback_target) {
                        slot.record = prior;
                    }
                }
            })
            .on_success(move |entries: &mut Vec<ListEntry<T>>, updated: &T| {
                if let Some(slot) = find_entry(entries, &target) {
                    *slot = ListEntry::confirmed(updated.clone());
                }
            })
            .error_handling(on_error);

        self.executor.execute(update).await
    }

    /// Removes the entry with `id`. On failure it is put back at the index it
    /// was taken from. An unknown `id` leaves the list untouched.
    pub async fn delete<R, Fut>(&self, id: &str, operation: Fut, on_error: ErrorHandling) -> Result<R>
    where
        Fut: Future<Output = Result<R>>,
    {
        let captured = self.executor.state().read(|entries| {
            entries
                .iter()
                .enumerate()
                .find(|(_, entry)| entry.id == id)
                .map(|(index, entry)| (index, entry.clone()))
        });

        let target = id.to_string();
        let update = OptimisticUpdate::new(operation)
            .label(format!("delete {}", self.name))
            .optimistic(move |entries: &mut Vec<ListEntry<T>>| {
                entries.retain(|entry| entry.id != target)
            })
            .rollback(move |entries: &mut Vec<ListEntry<T>>| {
                let Some((index, entry)) = captured else {
                    return;
                };
                if entries.iter().any(|existing| existing.id == entry.id) {
                    return;
                }
                let at = index.min(entries.len());
                entries.insert(at, entry);
            })
            .error_handling(on_error);

        self.executor.execute(update).await
    }
}

fn find_entry<'a, T>(entries: &'a mut [ListEntry<T>], id: &str) -> Option<&'a mut ListEntry<T>> {
    entries.iter_mut().find(|entry| entry.id == id)
}
