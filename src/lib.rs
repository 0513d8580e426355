// ============================================================================
// Resort Admin Client Library
// ============================================================================

pub mod core;
pub mod api;
pub mod coordination;
pub mod models;
pub mod notify;
pub mod quantity;
pub mod store;

// Re-export main types for convenience
pub use crate::core::{AdminError, Result};
pub use api::{ApiClient, ApiConfig, FileTokenStore, MemoryTokenStore, TokenStore};
pub use coordination::{
    Debouncer, ErrorHandling, ListEntry, OptimisticExecutor, OptimisticList, OptimisticUpdate,
    Record, SingleFlight, StateHandle, UpdateState, debounce,
};
pub use models::{
    Banner, FoodItem, GalleryImage, Ingredient, InventoryCategory, PaymentStatus,
    PaymentStatusUpdate, Permission, PurchaseOrder, Recipe, Resource, Review, Role,
    VendorCategory,
};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use quantity::{Dimension, Quantity, Unit};
pub use store::ResourceStore;

use std::sync::Arc;

// ============================================================================
// High-level Client API
// ============================================================================

/// Dashboard client
///
/// Bundles the REST client with the notifier every screen reports to.
/// This is the recommended entry point for front ends.
///
/// # Examples
///
/// ```no_run
/// use resortadmin::{AdminClient, ApiConfig, FoodItem, MemoryTokenStore};
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ApiConfig::from_url("https://resort.example.com/api")?;
/// let client = AdminClient::connect(config, Arc::new(MemoryTokenStore::new()))?;
/// client.set_token("secret-token")?;
///
/// let food = client.store::<FoodItem>();
/// food.refresh().await?;
/// food.create(FoodItem::new("Masala Dosa", 4.5)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl AdminClient {
    /// Connect with the default (tracing) notifier
    pub fn connect(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config, tokens)?,
            notifier: notify::default_notifier(),
        })
    }

    /// Connect using `RESORT_API_URL` and a token file
    pub fn from_env(token_file: &std::path::Path) -> Result<Self> {
        let config = ApiConfig::from_env().map_err(AdminError::Config)?;
        Self::connect(config, Arc::new(FileTokenStore::new(token_file)))
    }

    /// Route failure notifications to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Store the session token used for subsequent requests
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.api.set_token(token)
    }

    /// Forget the session token
    pub fn logout(&self) -> Result<()> {
        self.api.clear_token()
    }

    /// State for one CRUD screen
    pub fn store<R: Resource>(&self) -> ResourceStore<R> {
        ResourceStore::new(self.api.clone(), Arc::clone(&self.notifier))
    }

    /// Change a purchase order's payment status
    ///
    /// Reports failures through the notifier before returning them.
    pub async fn update_payment_status(
        &self,
        order_id: &str,
        update: PaymentStatusUpdate,
    ) -> Result<PurchaseOrder> {
        match self.api.update_payment_status(order_id, &update).await {
            Ok(order) => {
                self.notifier.notify(Notification::success(format!(
                    "Payment status set to {}",
                    order.payment_status
                )));
                Ok(order)
            }
            Err(err) => {
                self.notifier.notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }
}
