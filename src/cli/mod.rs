pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default location of the session token file, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = ".resortadmin/tokens.json";

#[derive(Parser)]
#[command(name = "resortadmin")]
#[command(about = "Command-line companion for the resort admin dashboard")]
pub struct Cli {
    /// Backend base URL; falls back to RESORT_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Where the session token is kept
    #[arg(long, global = true, default_value = DEFAULT_TOKEN_FILE)]
    pub token_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print every record of a collection
    List {
        resource: ResourceKind,
        #[arg(long)]
        search: Option<String>,
    },
    /// Print one record
    Get { resource: ResourceKind, id: String },
    /// Delete one record
    Delete { resource: ResourceKind, id: String },
    /// Change a purchase order's payment status
    PaymentStatus {
        order_id: String,
        status: String,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        note: Option<String>,
    },
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Validate a quantity such as "1.5 kg", optionally against stock on hand
    CheckQuantity {
        amount: String,
        #[arg(long)]
        stock: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TokenAction {
    Set { value: String },
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    FoodItems,
    Recipes,
    Roles,
    Permissions,
    VendorCategories,
    InventoryCategories,
    Banners,
    Gallery,
    Reviews,
    PurchaseOrders,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_global_options() {
        let cli = Cli::try_parse_from([
            "resortadmin",
            "list",
            "vendor-categories",
            "--api-url",
            "http://localhost:8000",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(cli.token_file, PathBuf::from(DEFAULT_TOKEN_FILE));
        assert!(matches!(
            cli.command,
            Command::List {
                resource: ResourceKind::VendorCategories,
                search: None
            }
        ));
    }

    #[test]
    fn parses_payment_status_flags() {
        let cli = Cli::try_parse_from([
            "resortadmin",
            "payment-status",
            "42",
            "partially-paid",
            "--amount",
            "150.5",
        ])
        .unwrap();

        match cli.command {
            Command::PaymentStatus {
                order_id,
                status,
                amount,
                note,
            } => {
                assert_eq!(order_id, "42");
                assert_eq!(status, "partially-paid");
                assert_eq!(amount, Some(150.5));
                assert_eq!(note, None);
            }
            _ => panic!("expected payment-status"),
        }
    }

    #[test]
    fn rejects_unknown_resource() {
        assert!(Cli::try_parse_from(["resortadmin", "list", "guests"]).is_err());
    }
}
