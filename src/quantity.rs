//! Unit-aware quantities for recipes and inventory.
//!
//! Amounts are validated against their unit's dimension: mass and volume
//! allow up to three decimals, counted units must come out as whole pieces.

use crate::core::{AdminError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of decimal places accepted for an amount.
pub const MAX_DECIMALS: i32 = 3;

const EPSILON: f64 = 1e-9;

lazy_static! {
    static ref QUANTITY_PATTERN: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*([A-Za-z]+)\s*$").expect("valid quantity regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mg,
    G,
    Kg,
    Ml,
    L,
    Pcs,
    Dozen,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Mg | Unit::G | Unit::Kg => Dimension::Mass,
            Unit::Ml | Unit::L => Dimension::Volume,
            Unit::Pcs | Unit::Dozen => Dimension::Count,
        }
    }

    /// Size of one unit in the dimension's base unit (g, ml, pcs).
    pub fn base_factor(self) -> f64 {
        match self {
            Unit::Mg => 0.001,
            Unit::G | Unit::Ml | Unit::Pcs => 1.0,
            Unit::Kg | Unit::L => 1000.0,
            Unit::Dozen => 12.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Mg => "mg",
            Unit::G => "g",
            Unit::Kg => "kg",
            Unit::Ml => "ml",
            Unit::L => "l",
            Unit::Pcs => "pcs",
            Unit::Dozen => "dozen",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        let unit = match s.trim().to_ascii_lowercase().as_str() {
            "mg" | "milligram" | "milligrams" => Unit::Mg,
            "g" | "gm" | "gram" | "grams" => Unit::G,
            "kg" | "kilogram" | "kilograms" => Unit::Kg,
            "ml" | "millilitre" | "milliliter" | "millilitres" | "milliliters" => Unit::Ml,
            "l" | "ltr" | "litre" | "liter" | "litres" | "liters" => Unit::L,
            "pc" | "pcs" | "piece" | "pieces" | "nos" => Unit::Pcs,
            "dz" | "doz" | "dozen" => Unit::Dozen,
            other => {
                return Err(AdminError::Validation(format!("Unknown unit '{other}'")));
            }
        };
        Ok(unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: f64,
    pub unit: Unit,
}

impl Quantity {
    /// Validated quantity.
    pub fn new(amount: f64, unit: Unit) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AdminError::Validation(
                "Quantity must be a number greater than zero".to_string(),
            ));
        }

        let scaled = amount * 10f64.powi(MAX_DECIMALS);
        if (scaled - scaled.round()).abs() > 1e-6 {
            return Err(AdminError::Validation(format!(
                "Quantity can have at most {MAX_DECIMALS} decimal places"
            )));
        }

        let quantity = Self { amount, unit };
        if unit.dimension() == Dimension::Count {
            let pieces = quantity.base_amount();
            if (pieces - pieces.round()).abs() > EPSILON {
                return Err(AdminError::Validation(format!(
                    "{quantity} is not a whole number of pieces"
                )));
            }
        }

        Ok(quantity)
    }

    /// Parses input such as `"1.5 kg"` or `"12pcs"`.
    pub fn parse(input: &str) -> Result<Self> {
        let captures = QUANTITY_PATTERN.captures(input).ok_or_else(|| {
            AdminError::Validation(format!("Invalid quantity '{}'", input.trim()))
        })?;
        let amount: f64 = captures[1]
            .parse()
            .map_err(|_| AdminError::Validation(format!("Invalid amount '{}'", &captures[1])))?;
        let unit: Unit = captures[2].parse()?;
        Self::new(amount, unit)
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// Amount in the dimension's base unit.
    pub fn base_amount(&self) -> f64 {
        self.amount * self.unit.base_factor()
    }

    pub fn convert_to(&self, unit: Unit) -> Result<Quantity> {
        if self.unit.dimension() != unit.dimension() {
            return Err(AdminError::Validation(format!(
                "Cannot convert {} to {}",
                self.unit, unit
            )));
        }
        Ok(Quantity {
            amount: self.base_amount() / unit.base_factor(),
            unit,
        })
    }

    /// Fails when `self` is more than `stock`, or measured differently.
    pub fn ensure_available(&self, stock: &Quantity) -> Result<()> {
        let requested = self.convert_to(stock.unit)?;
        if requested.amount > stock.amount + EPSILON {
            return Err(AdminError::Validation(format!(
                "Requested {self} exceeds available {stock}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

impl FromStr for Quantity {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
