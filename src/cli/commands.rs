use super::{Cli, Command, ResourceKind, TokenAction};
use anyhow::{Context, Result, anyhow};
use resortadmin::{
    AdminClient, ApiConfig, Banner, FileTokenStore, FoodItem, GalleryImage, InventoryCategory,
    PaymentStatus, PaymentStatusUpdate, Permission, PurchaseOrder, Quantity, Recipe, Resource,
    Review, Role, VendorCategory,
};
use std::path::Path;
use std::sync::Arc;

/// Calls `$body` with `$ty` bound to the model type behind a [`ResourceKind`].
macro_rules! with_resource {
    ($kind:expr, $ty:ident => $body:expr) => {
        match $kind {
            ResourceKind::FoodItems => {
                type $ty = FoodItem;
                $body
            }
            ResourceKind::Recipes => {
                type $ty = Recipe;
                $body
            }
            ResourceKind::Roles => {
                type $ty = Role;
                $body
            }
            ResourceKind::Permissions => {
                type $ty = Permission;
                $body
            }
            ResourceKind::VendorCategories => {
                type $ty = VendorCategory;
                $body
            }
            ResourceKind::InventoryCategories => {
                type $ty = InventoryCategory;
                $body
            }
            ResourceKind::Banners => {
                type $ty = Banner;
                $body
            }
            ResourceKind::Gallery => {
                type $ty = GalleryImage;
                $body
            }
            ResourceKind::Reviews => {
                type $ty = Review;
                $body
            }
            ResourceKind::PurchaseOrders => {
                type $ty = PurchaseOrder;
                $body
            }
        }
    };
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::List { resource, search } => {
            let client = connect(cli.api_url.as_deref(), &cli.token_file)?;
            with_resource!(resource, R => list::<R>(&client, search.as_deref()).await)
        }
        Command::Get { resource, id } => {
            let client = connect(cli.api_url.as_deref(), &cli.token_file)?;
            with_resource!(resource, R => get::<R>(&client, &id).await)
        }
        Command::Delete { resource, id } => {
            let client = connect(cli.api_url.as_deref(), &cli.token_file)?;
            with_resource!(resource, R => delete::<R>(&client, &id).await)
        }
        Command::PaymentStatus {
            order_id,
            status,
            amount,
            note,
        } => {
            let client = connect(cli.api_url.as_deref(), &cli.token_file)?;
            let update = payment_update(&status, amount, note.as_deref())?;
            let order = client.update_payment_status(&order_id, update).await?;
            println!(
                "Order {} is now {} (balance due {:.2})",
                order.order_number,
                order.payment_status,
                order.balance_due()
            );
            Ok(())
        }
        Command::Token { action } => token(action, &cli.token_file),
        Command::CheckQuantity { amount, stock } => {
            println!("{}", check_quantity(&amount, stock.as_deref())?);
            Ok(())
        }
    }
}

fn connect(api_url: Option<&str>, token_file: &Path) -> Result<AdminClient> {
    let config = match api_url {
        Some(url) => ApiConfig::from_url(url),
        None => ApiConfig::from_env(),
    }
    .map_err(|e| anyhow!("Invalid API configuration: {}", e))?;

    Ok(AdminClient::connect(
        config,
        Arc::new(FileTokenStore::new(token_file)),
    )?)
}

async fn list<R: Resource>(client: &AdminClient, search: Option<&str>) -> Result<()> {
    let records = match search {
        Some(query) => client.api().search::<R>(query).await,
        None => client.api().list::<R>().await,
    }
    .with_context(|| format!("Failed to load {}", R::NAME))?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    eprintln!("{} {} record(s)", records.len(), R::NAME);
    Ok(())
}

async fn get<R: Resource>(client: &AdminClient, id: &str) -> Result<()> {
    let record = client
        .api()
        .fetch::<R>(id)
        .await
        .with_context(|| format!("Failed to load {} '{}'", R::NAME, id))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn delete<R: Resource>(client: &AdminClient, id: &str) -> Result<()> {
    client
        .api()
        .remove::<R>(id)
        .await
        .with_context(|| format!("Failed to delete {} '{}'", R::NAME, id))?;
    println!("Deleted {} '{}'", R::NAME, id);
    Ok(())
}

fn token(action: TokenAction, token_file: &Path) -> Result<()> {
    let config = ApiConfig::default();
    let store = FileTokenStore::new(token_file);
    match action {
        TokenAction::Set { value } => {
            let value = value.trim();
            if value.is_empty() {
                return Err(anyhow!("Token cannot be empty"));
            }
            resortadmin::TokenStore::set(&store, &config.token_key, value)?;
            println!("Token saved to '{}'", token_file.display());
        }
        TokenAction::Clear => {
            resortadmin::TokenStore::remove(&store, &config.token_key)?;
            println!("Token cleared");
        }
    }
    Ok(())
}

pub fn payment_update(
    status: &str,
    amount: Option<f64>,
    note: Option<&str>,
) -> Result<PaymentStatusUpdate> {
    let status: PaymentStatus = status.parse()?;
    let mut update = PaymentStatusUpdate::new(status);
    if let Some(amount) = amount {
        update = update.amount_paid(amount);
    }
    if let Some(note) = note {
        update = update.note(note);
    }
    update.validate()?;
    Ok(update)
}

pub fn check_quantity(amount: &str, stock: Option<&str>) -> Result<String> {
    let requested = Quantity::parse(amount)?;
    match stock {
        Some(stock) => {
            let available = Quantity::parse(stock).context("Invalid stock quantity")?;
            requested.ensure_available(&available)?;
            Ok(format!("{requested} is available (stock {available})"))
        }
        None => Ok(format!(
            "{requested} is valid ({} {})",
            requested.base_amount(),
            base_symbol(&requested)
        )),
    }
}

fn base_symbol(quantity: &Quantity) -> &'static str {
    match quantity.dimension() {
        resortadmin::Dimension::Mass => "g",
        resortadmin::Dimension::Volume => "ml",
        resortadmin::Dimension::Count => "pcs",
    }
}
