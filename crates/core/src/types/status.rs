//! Status enums for various entities.
//!
//! Each enum serializes to the lowercase wire value the API uses and
//! round-trips through `FromStr`/`Display` for HTML form fields.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Generates `as_str`, `Display` and `FromStr` from a value table.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($name), ": {}"), s)),
                }
            }
        }
    };
}

/// Whether a product is visible on the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Draft,
}

wire_enum!(ProductStatus {
    Active => "active",
    Draft => "draft",
});

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

wire_enum!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Whether the order still needs work from the store.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing | Self::Shipped)
    }
}

/// Delivery zone used to pick the delivery charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryZone {
    #[default]
    InsideValley,
    OutsideValley,
}

wire_enum!(DeliveryZone {
    InsideValley => "inside_valley",
    OutsideValley => "outside_valley",
});

impl DeliveryZone {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InsideValley => "Inside valley",
            Self::OutsideValley => "Outside valley",
        }
    }
}

/// Platform-level tenant status managed from the super-admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[default]
    Active,
    Suspended,
}

wire_enum!(TenantStatus {
    Active => "active",
    Suspended => "suspended",
});

/// Staff role within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Owner,
    Admin,
    #[default]
    Staff,
    SuperAdmin,
}

wire_enum!(UserRole {
    Owner => "owner",
    Admin => "admin",
    Staff => "staff",
    SuperAdmin => "super_admin",
});

impl UserRole {
    /// Whether the role may use the super-admin console.
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(*status));
        }
        assert_eq!("Outside_Valley".parse::<DeliveryZone>(), Ok(DeliveryZone::OutsideValley));
    }

    #[test]
    fn test_invalid_value() {
        let err = "archived".parse::<ProductStatus>().unwrap_err();
        assert_eq!(err, "invalid ProductStatus: archived");
    }

    #[test]
    fn test_serde_matches_wire_value() {
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).ok().as_deref(),
            Some("\"super_admin\"")
        );
        assert_eq!(
            serde_json::to_string(&DeliveryZone::InsideValley).ok().as_deref(),
            Some("\"inside_valley\"")
        );
    }

    #[test]
    fn test_open_orders() {
        assert!(OrderStatus::Pending.is_open());
        assert!(!OrderStatus::Delivered.is_open());
        assert!(!OrderStatus::Cancelled.is_open());
    }
}
