//! Status enums and the rules that move records between them.

use serde::{Deserialize, Serialize};

use crate::types::price::Price;

/// Error returned when a status label cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Normalize a client-supplied label: trim, uppercase, spaces and dashes to `_`.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

// =============================================================================
// Roles
// =============================================================================

/// Who a request is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    /// Authority string carried in access tokens.
    #[must_use]
    pub const fn claim(self) -> &'static str {
        match self {
            Self::Customer => "ROLE_CUSTOMER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Inverse of [`Role::claim`].
    #[must_use]
    pub fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "ROLE_CUSTOMER" => Some(Self::Customer),
            "ROLE_ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "CUSTOMER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Fulfillment status of an order.
///
/// ```text
/// PENDING ──> APPROVED ──> SHIPPED ──> DELIVERED
///    │           │
///    └───────────┴──> CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order may move from `self` to `next`.
    ///
    /// Staying in the same status is not a transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Cancelled)
                | (Self::Approved, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// No further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Items in the order may be reviewed once an admin has approved it.
    #[must_use]
    pub const fn is_reviewable(self) -> bool {
        matches!(self, Self::Approved | Self::Shipped | Self::Delivered)
    }

    /// Counts towards income.
    #[must_use]
    pub const fn is_billable(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            // Label the mobile client shows for a freshly placed order
            "PENDING" | "TO_RECEIVE" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" | "CANCELED" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError::new("order status", s)),
        }
    }
}

/// Settlement status of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl std::str::FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            "REFUNDED" => Ok(Self::Refunded),
            _ => Err(ParseStatusError::new("payment status", s)),
        }
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    #[serde(alias = "Cash on Delivery", alias = "COD")]
    CashOnDelivery,
    #[serde(alias = "Online", alias = "GCash")]
    Online,
}

impl std::str::FromStr for PaymentMethod {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "CASH_ON_DELIVERY" | "COD" => Ok(Self::CashOnDelivery),
            "ONLINE" | "GCASH" => Ok(Self::Online),
            _ => Err(ParseStatusError::new("payment method", s)),
        }
    }
}

// =============================================================================
// Appointments
// =============================================================================

/// Display status of an appointment, derived from its two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl AppointmentStatus {
    /// Cancellation wins over confirmation.
    #[must_use]
    pub const fn from_flags(canceled: bool, confirmed: bool) -> Self {
        if canceled {
            Self::Canceled
        } else if confirmed {
            Self::Confirmed
        } else {
            Self::Pending
        }
    }
}

/// Services that can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pet_service", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetService {
    #[serde(alias = "Grooming")]
    Grooming,
    #[serde(alias = "Boarding")]
    Boarding,
}

impl PetService {
    /// Flat price of the service.
    #[must_use]
    pub fn price(self) -> Price {
        match self {
            Self::Grooming => Price::from_pesos(500),
            Self::Boarding => Price::from_pesos(800),
        }
    }
}

impl std::str::FromStr for PetService {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "GROOMING" => Ok(Self::Grooming),
            "BOARDING" => Ok(Self::Boarding),
            _ => Err(ParseStatusError::new("service", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_order_forward_path() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Approved));
        assert!(OrderStatus::Approved.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_cancel_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Approved.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_order_no_skipping_or_going_back() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Approved.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_order_same_state_is_not_a_transition() {
        for status in ALL {
            assert!(!status.can_transition_to(status), "{status}");
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_order_status_parse_accepts_client_labels() {
        assert_eq!(
            "To Receive".parse::<OrderStatus>().unwrap(),
            OrderStatus::Pending
        );
        assert_eq!(
            "approved".parse::<OrderStatus>().unwrap(),
            OrderStatus::Approved
        );
        assert_eq!(
            "Canceled".parse::<OrderStatus>().unwrap(),
            OrderStatus::Cancelled
        );
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_reviewable_and_billable() {
        assert!(!OrderStatus::Pending.is_reviewable());
        assert!(OrderStatus::Approved.is_reviewable());
        assert!(OrderStatus::Delivered.is_reviewable());
        assert!(!OrderStatus::Cancelled.is_reviewable());
        assert!(OrderStatus::Pending.is_billable());
        assert!(!OrderStatus::Cancelled.is_billable());
    }

    #[test]
    fn test_appointment_status_from_flags() {
        use AppointmentStatus::{Canceled, Confirmed, Pending};
        assert_eq!(AppointmentStatus::from_flags(false, false), Pending);
        assert_eq!(AppointmentStatus::from_flags(false, true), Confirmed);
        assert_eq!(AppointmentStatus::from_flags(true, false), Canceled);
        assert_eq!(AppointmentStatus::from_flags(true, true), Canceled);
    }

    #[test]
    fn test_service_prices() {
        assert_eq!(PetService::Grooming.price(), Price::from_pesos(500));
        assert_eq!(PetService::Boarding.price(), Price::from_pesos(800));
    }

    #[test]
    fn test_service_accepts_display_labels() {
        let svc: PetService = serde_json::from_str("\"Grooming\"").unwrap();
        assert_eq!(svc, PetService::Grooming);
        let svc: PetService = serde_json::from_str("\"BOARDING\"").unwrap();
        assert_eq!(svc, PetService::Boarding);
    }

    #[test]
    fn test_payment_method_labels() {
        let m: PaymentMethod = serde_json::from_str("\"Cash on Delivery\"").unwrap();
        assert_eq!(m, PaymentMethod::CashOnDelivery);
        assert_eq!(
            "cash-on-delivery".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CashOnDelivery
        );
    }

    #[test]
    fn test_role_claims_roundtrip() {
        for role in [Role::Customer, Role::Admin] {
            assert_eq!(Role::from_claim(role.claim()), Some(role));
        }
        assert_eq!(Role::from_claim("ROLE_ROOT"), None);
    }
}
