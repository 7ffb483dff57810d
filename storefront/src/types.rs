//! Core validated types for the storefront domain.
//!
//! All types use smart constructors so that a value, once constructed, is
//! always valid - following the "parse, don't validate" principle. Raw input
//! is parsed into these types at the API boundary and the rest of the code
//! never re-checks them.

use nutype::nutype;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Errors produced by the smart constructors in this module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Invalid money amount
    #[error("Invalid money amount: {0}")]
    InvalidMoney(String),
    /// Invalid quantity value
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    /// Invalid review rating
    #[error("Invalid rating: {0}")]
    InvalidRating(String),
    /// Invalid discount percentage
    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh identifier (version 7 UUID, time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

entity_id!(
    /// Identifier of a user account.
    UserId
);
entity_id!(
    /// Identifier of a catalog product.
    ProductId
);
entity_id!(
    /// Identifier of an order.
    OrderId
);
entity_id!(
    /// Identifier of a review embedded in a product.
    ReviewId
);
entity_id!(
    /// Identifier of an address embedded in a user account.
    AddressId
);
entity_id!(
    /// Identifier of an image embedded in a product.
    ImageId
);

/// An email address, lowercased and trimmed on construction.
#[nutype(
    sanitize(trim, lowercase),
    validate(
        not_empty,
        len_char_max = 255,
        regex = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct EmailAddress(String);

/// A person's display name (2-50 characters).
#[nutype(
    sanitize(trim),
    validate(len_char_min = 2, len_char_max = 50),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct PersonName(String);

/// A 10-digit phone number.
#[nutype(
    sanitize(trim),
    validate(regex = r"^[0-9]{10}$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct PhoneNumber(String);

/// A 6-digit postal code.
#[nutype(
    sanitize(trim),
    validate(regex = r"^[0-9]{6}$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct Pincode(String);

/// A product name (3-200 characters).
#[nutype(
    sanitize(trim),
    validate(len_char_min = 3, len_char_max = 200),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct ProductName(String);

/// A product description (at least 10 characters).
#[nutype(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 5000),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct ProductDescription(String);

/// A brand name.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 100),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct Brand(String);

/// Free-text review comment (10-500 characters).
#[nutype(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 500),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct ReviewComment(String);

/// A monetary amount with at most two decimal places, never negative.
///
/// Backed by [`Decimal`] so pricing arithmetic is exact to the cent.
/// Deserialization goes through [`Money::new`], so malformed amounts are
/// rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // The inherent `Decimal::deserialize([u8; 16])` shadows the trait
        // method, so the trait call must be fully qualified.
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create money from a decimal amount.
    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount.is_sign_negative() {
            return Err(DomainError::InvalidMoney(format!(
                "amount cannot be negative: {amount}"
            )));
        }
        if amount.scale() > 2 {
            return Err(DomainError::InvalidMoney(format!(
                "amount cannot have more than 2 decimal places: {amount}"
            )));
        }
        Ok(Self(amount))
    }

    /// Create money from an integral number of cents.
    pub fn from_cents(cents: u64) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        Self(Decimal::new(cents as i64, 2))
    }

    /// The underlying decimal value.
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Value in cents, for exact comparisons in tests.
    pub fn to_cents(&self) -> u64 {
        (self.0 * Decimal::from(100)).to_u64().unwrap_or(0)
    }

    /// Add two amounts, rejecting overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(other.0)
            .ok_or_else(|| DomainError::InvalidMoney("amount overflow".to_string()))
            .and_then(Self::new)
    }

    /// Multiply a unit price by an ordered quantity.
    pub fn multiply_by(self, quantity: Quantity) -> Result<Self, DomainError> {
        self.0
            .checked_mul(Decimal::from(quantity.value()))
            .ok_or_else(|| DomainError::InvalidMoney("amount overflow".to_string()))
            .and_then(Self::new)
    }

    /// Apply a percentage discount, rounding to the cent.
    pub fn discounted_by(self, discount: DiscountPercent) -> Self {
        let off = (self.0 * Decimal::from(discount.value()) / Decimal::from(100)).round_dp(2);
        Self(self.0 - off)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

/// An ordered quantity. Positive, capped per line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl Quantity {
    /// Maximum quantity per cart line.
    pub const MAX_PER_LINE: u32 = 10;

    /// Create a new quantity (1 to [`Self::MAX_PER_LINE`]).
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidQuantity(
                "quantity must be greater than 0".to_string(),
            ));
        }
        if value > Self::MAX_PER_LINE {
            return Err(DomainError::InvalidQuantity(format!(
                "quantity {value} exceeds maximum {}",
                Self::MAX_PER_LINE
            )));
        }
        Ok(Self(value))
    }

    /// The underlying value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A review rating from 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl Rating {
    /// Create a new rating (1-5).
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRating(format!(
                "rating must be between 1 and 5, got {value}"
            )))
        }
    }

    /// The underlying value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A discount percentage from 0 to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DiscountPercent(u8);

impl<'de> Deserialize<'de> for DiscountPercent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl DiscountPercent {
    /// No discount.
    pub const NONE: Self = Self(0);

    /// Create a new discount percentage (0-100).
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if value <= 100 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidDiscount(format!(
                "discount must be between 0 and 100, got {value}"
            )))
        }
    }

    /// The underlying value.
    pub const fn value(self) -> u8 {
        self.0
    }
}
