use super::{Resource, deserialize_id, deserialize_optional_id, impl_record};
use crate::core::{AdminError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 5] = [
        PaymentStatus::Pending,
        PaymentStatus::PartiallyPaid,
        PaymentStatus::Paid,
        PaymentStatus::Refunded,
        PaymentStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| AdminError::Validation(format!("Unknown payment status '{}'", s.trim())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered_at: Option<DateTime<Utc>>,
}

impl PurchaseOrder {
    pub fn balance_due(&self) -> f64 {
        (self.total_amount - self.amount_paid).max(0.0)
    }
}

/// Body of `PATCH /purchase-orders/<id>/payment-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PaymentStatusUpdate {
    pub fn new(payment_status: PaymentStatus) -> Self {
        Self {
            payment_status,
            amount_paid: None,
            note: None,
        }
    }

    pub fn amount_paid(mut self, amount: f64) -> Self {
        self.amount_paid = Some(amount);
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.amount_paid {
            Some(amount) if !amount.is_finite() || amount < 0.0 => Err(AdminError::Validation(
                "Amount paid must be zero or a positive number".to_string(),
            )),
            None if self.payment_status == PaymentStatus::PartiallyPaid => {
                Err(AdminError::Validation(
                    "A partial payment needs the amount paid".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl_record!(PurchaseOrder);

impl Resource for PurchaseOrder {
    const PATH: &'static str = "/purchase-orders";
    const NAME: &'static str = "purchase order";
}
