use chrono::{DateTime, Utc};
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Order status graph:
/// `Pending -> Accepted -> Paid -> Shipped -> Completed`, with `Refunded`
/// reachable from `Paid`, `Shipped` and `Completed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Accepted, Paid)
                | (Paid, Shipped)
                | (Paid, Refunded)
                | (Shipped, Completed)
                | (Shipped, Refunded)
                | (Completed, Refunded)
        )
    }

    pub fn implies_paid(self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Shipped | OrderStatus::Completed
        )
    }

    /// Payment state derived from the order status; `is_paid` must always
    /// agree with `payment_status == "paid"`.
    pub fn payment_status(self) -> &'static str {
        match self {
            OrderStatus::Refunded => "refunded",
            s if s.implies_paid() => "paid",
            _ => "unpaid",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Return status graph:
/// `Submitted -> Approved -> Refunded`, with `Submitted -> Rejected` as the
/// alternative terminal branch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "refunded")]
    Refunded,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ReturnStatus {
    pub fn can_transition_to(self, next: ReturnStatus) -> bool {
        use ReturnStatus::*;
        matches!(
            (self, next),
            (Submitted, Approved) | (Submitted, Rejected) | (Approved, Refunded)
        )
    }

    /// Statuses whose first entry credits stock back to the product.
    pub fn restocks(self) -> bool {
        matches!(self, ReturnStatus::Approved | ReturnStatus::Refunded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnStatus::Submitted => "submitted",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Refunded => "refunded",
            ReturnStatus::Rejected => "rejected",
        }
    }
}

/// Ordered sequence of alternate contact values, deduplicated under a
/// canonicalizer from [`crate::normalize`]. Stored as JSONB on the customer row.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct Alternates(pub Vec<String>);

impl Alternates {
    pub fn contains(&self, value: &str, canon: fn(Option<&str>) -> String) -> bool {
        let needle = canon(Some(value));
        self.0.iter().any(|v| canon(Some(v)) == needle)
    }

    /// Appends `value` unless an equivalent entry already exists.
    /// Returns true when the sequence changed.
    pub fn push_unique(&mut self, value: &str, canon: fn(Option<&str>) -> String) -> bool {
        if canon(Some(value)).is_empty() || self.contains(value, canon) {
            return false;
        }
        self.0.push(value.trim().to_string());
        true
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimelineEntry {
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
}

/// Append-only order event log, stored as JSONB on the order row.
/// Entries are never edited or removed.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct Timeline(pub Vec<TimelineEntry>);

impl Timeline {
    pub fn record(&mut self, description: impl Into<String>, actor: impl Into<String>) {
        self.0.push(TimelineEntry {
            description: description.into(),
            timestamp: Utc::now(),
            actor: actor.into(),
        });
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReturnHistoryEntry {
    pub status: ReturnStatus,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub note: Option<String>,
}

/// Append-only return audit history, stored as JSONB on the return row.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct ReturnHistory(pub Vec<ReturnHistoryEntry>);

impl ReturnHistory {
    pub fn record(&mut self, status: ReturnStatus, actor: impl Into<String>, note: Option<String>) {
        self.0.push(ReturnHistoryEntry {
            status,
            timestamp: Utc::now(),
            actor: actor.into(),
            note,
        });
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub currency: String,
    pub is_demo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub alternative_names: Alternates,
    pub alternative_emails: Alternates,
    pub alternative_phones: Alternates,
    pub alternative_addresses: Alternates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i32,
    pub reorder_threshold: i32,
    pub low_stock: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub store_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub product_id: Uuid,
    pub product_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub quantity: i32,
    pub unit_price: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub payment_status: String,
    pub timeline: Timeline,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Return {
    pub id: Uuid,
    pub store_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub product_id: Uuid,
    pub reason: String,
    pub returned_quantity: i32,
    pub refund_amount: i64,
    pub status: ReturnStatus,
    pub history: ReturnHistory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_name, normalize_phone};
    use sea_orm::Iterable;

    #[test]
    fn order_graph_allows_only_listed_edges() {
        use OrderStatus::*;
        let allowed = [
            (Pending, Accepted),
            (Accepted, Paid),
            (Paid, Shipped),
            (Paid, Refunded),
            (Shipped, Completed),
            (Shipped, Refunded),
            (Completed, Refunded),
        ];
        for from in OrderStatus::iter() {
            for to in OrderStatus::iter() {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn return_graph_allows_only_listed_edges() {
        use ReturnStatus::*;
        let allowed = [
            (Submitted, Approved),
            (Submitted, Rejected),
            (Approved, Refunded),
        ];
        for from in ReturnStatus::iter() {
            for to in ReturnStatus::iter() {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn payment_state_follows_status() {
        assert_eq!(OrderStatus::Pending.payment_status(), "unpaid");
        assert_eq!(OrderStatus::Accepted.payment_status(), "unpaid");
        assert_eq!(OrderStatus::Paid.payment_status(), "paid");
        assert_eq!(OrderStatus::Shipped.payment_status(), "paid");
        assert_eq!(OrderStatus::Completed.payment_status(), "paid");
        assert_eq!(OrderStatus::Refunded.payment_status(), "refunded");

        for status in OrderStatus::iter() {
            assert_eq!(status.implies_paid(), status.payment_status() == "paid");
        }
    }

    #[test]
    fn restock_applies_to_approved_and_refunded_only() {
        assert!(ReturnStatus::Approved.restocks());
        assert!(ReturnStatus::Refunded.restocks());
        assert!(!ReturnStatus::Submitted.restocks());
        assert!(!ReturnStatus::Rejected.restocks());
    }

    #[test]
    fn alternates_dedupe_is_format_insensitive() {
        let mut phones = Alternates::default();
        assert!(phones.push_unique("555-2222", normalize_phone));
        assert!(!phones.push_unique("(555) 2222", normalize_phone));
        assert!(phones.push_unique("555-3333", normalize_phone));
        assert_eq!(phones.0, vec!["555-2222", "555-3333"]);
    }

    #[test]
    fn alternates_reject_blank_values() {
        let mut names = Alternates::default();
        assert!(!names.push_unique("   ", normalize_name));
        assert!(names.0.is_empty());
    }

    #[test]
    fn timeline_appends_in_order() {
        let mut timeline = Timeline::default();
        timeline.record("Order created", "Jane Doe");
        timeline.record("Status changed to accepted", "Staff");
        assert_eq!(timeline.0.len(), 2);
        assert_eq!(timeline.0[0].description, "Order created");
        assert_eq!(timeline.0[1].actor, "Staff");
    }
}
