//! Status enums for orders and payments.
//!
//! The QuickShop backend and its clients have used English status codes and
//! localized display strings interchangeably. [`OrderStatus`] is the single
//! canonical vocabulary: it parses either form, serializes to the English
//! code, and owns the presentation table (label, tone, icon, next step).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Visual tone used when presenting a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    /// Informational (blue).
    Info,
    /// Needs attention (orange).
    Warning,
    /// Positive outcome (green).
    Success,
    /// Finished or inactive (grey).
    Neutral,
    /// Failure or cancellation (red).
    Danger,
}

impl StatusTone {
    /// Hex colour used by the mobile screens for this tone.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Info => "#007AFF",
            Self::Warning => "#FF9500",
            Self::Success => "#34C759",
            Self::Neutral => "#8E8E93",
            Self::Danger => "#FF3B30",
        }
    }
}

/// Order lifecycle status.
///
/// Unknown values received from the server are preserved verbatim in
/// [`OrderStatus::Other`] so they round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    New,
    Approved,
    Preparing,
    Ready,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    AbandonedCart,
    /// A status this client does not know about.
    Other(String),
}

/// One row of the presentation table.
struct StatusRow {
    kind: OrderStatusKind,
    code: &'static str,
    label: &'static str,
    aliases: &'static [&'static str],
    tone: StatusTone,
    icon: &'static str,
}

const fn row(
    kind: OrderStatusKind,
    code: &'static str,
    label: &'static str,
    aliases: &'static [&'static str],
    tone: StatusTone,
    icon: &'static str,
) -> StatusRow {
    StatusRow {
        kind,
        code,
        label,
        aliases,
        tone,
        icon,
    }
}

const STATUS_TABLE: &[StatusRow] = &[
    row(OrderStatusKind::New, "new", "חדשה", &[], StatusTone::Info, "ellipse-outline"),
    row(OrderStatusKind::Approved, "approved", "מאושרת", &[], StatusTone::Success, "thumbs-up-outline"),
    row(OrderStatusKind::Preparing, "preparing", "בהכנה", &["processing"], StatusTone::Warning, "time-outline"),
    row(OrderStatusKind::Ready, "ready", "מוכנה", &["מוכן"], StatusTone::Success, "checkmark-circle-outline"),
    row(OrderStatusKind::Shipped, "shipped", "הועבר למשלוח", &[], StatusTone::Info, "car-outline"),
    row(OrderStatusKind::Delivered, "delivered", "נמסרה", &[], StatusTone::Neutral, "checkmark-done-circle-outline"),
    row(OrderStatusKind::Completed, "completed", "הושלם", &[], StatusTone::Success, "checkmark-done-outline"),
    row(OrderStatusKind::Cancelled, "cancelled", "בוטלה", &["canceled", "הזמנה מבוטלת"], StatusTone::Danger, "close-circle-outline"),
    row(OrderStatusKind::AbandonedCart, "abandoned_cart", "עגלה נטושה", &["abandoned"], StatusTone::Neutral, "cart-outline"),
];

/// Fieldless mirror of the known [`OrderStatus`] variants, used as the table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderStatusKind {
    New,
    Approved,
    Preparing,
    Ready,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    AbandonedCart,
}

impl OrderStatusKind {
    const fn into_status(self) -> OrderStatus {
        match self {
            Self::New => OrderStatus::New,
            Self::Approved => OrderStatus::Approved,
            Self::Preparing => OrderStatus::Preparing,
            Self::Ready => OrderStatus::Ready,
            Self::Shipped => OrderStatus::Shipped,
            Self::Delivered => OrderStatus::Delivered,
            Self::Completed => OrderStatus::Completed,
            Self::Cancelled => OrderStatus::Cancelled,
            Self::AbandonedCart => OrderStatus::AbandonedCart,
        }
    }
}

impl OrderStatus {
    /// All known statuses in lifecycle order.
    pub const KNOWN: [Self; 9] = [
        Self::New,
        Self::Approved,
        Self::Preparing,
        Self::Ready,
        Self::Shipped,
        Self::Delivered,
        Self::Completed,
        Self::Cancelled,
        Self::AbandonedCart,
    ];

    const fn kind(&self) -> Option<OrderStatusKind> {
        match self {
            Self::New => Some(OrderStatusKind::New),
            Self::Approved => Some(OrderStatusKind::Approved),
            Self::Preparing => Some(OrderStatusKind::Preparing),
            Self::Ready => Some(OrderStatusKind::Ready),
            Self::Shipped => Some(OrderStatusKind::Shipped),
            Self::Delivered => Some(OrderStatusKind::Delivered),
            Self::Completed => Some(OrderStatusKind::Completed),
            Self::Cancelled => Some(OrderStatusKind::Cancelled),
            Self::AbandonedCart => Some(OrderStatusKind::AbandonedCart),
            Self::Other(_) => None,
        }
    }

    fn row(&self) -> Option<&'static StatusRow> {
        let kind = self.kind()?;
        STATUS_TABLE.iter().find(|row| row.kind == kind)
    }

    /// Parse a status from an English code or any localized label.
    ///
    /// Matching is case-insensitive for codes. Unknown input becomes
    /// [`OrderStatus::Other`] holding the trimmed original text.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();

        STATUS_TABLE
            .iter()
            .find(|row| {
                row.code == lowered
                    || row.label == trimmed
                    || row.aliases.iter().any(|a| *a == lowered || *a == trimmed)
            })
            .map_or_else(
                || Self::Other(trimmed.to_owned()),
                |row| row.kind.into_status(),
            )
    }

    /// English wire code sent to the server.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Other(raw) => raw,
            known => known.row().map_or("", |row| row.code),
        }
    }

    /// Localized display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Other(raw) => raw,
            known => known.row().map_or("", |row| row.label),
        }
    }

    /// Presentation tone.
    #[must_use]
    pub fn tone(&self) -> StatusTone {
        self.row().map_or(StatusTone::Neutral, |row| row.tone)
    }

    /// Icon name used by the mobile screens.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.row().map_or("ellipse-outline", |row| row.icon)
    }

    /// Next step in the fulfilment workflow.
    ///
    /// `New → Preparing → Ready → Delivered`; every other status stays put.
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::New => Self::Preparing,
            Self::Preparing => Self::Ready,
            Self::Ready => Self::Delivered,
            other => other.clone(),
        }
    }

    /// Whether the order can no longer change state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::Completed | Self::Cancelled | Self::AbandonedCart
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.code().to_owned(),
        }
    }
}

/// Payment state derived from an order's `paid_status` and payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment captured.
    Paid,
    /// Waiting for the customer to pay.
    AwaitingPayment,
    /// Paid in cash on delivery or pickup.
    Cash,
}

impl PaymentStatus {
    /// Localized display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "שולם",
            Self::AwaitingPayment => "ממתין לתשלום",
            Self::Cash => "תשלום במזומן",
        }
    }

    /// Presentation tone.
    #[must_use]
    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Paid => StatusTone::Success,
            Self::AwaitingPayment => StatusTone::Warning,
            Self::Cash => StatusTone::Info,
        }
    }
}
