use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment status reported by the upstream billing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartialPaid,
    Paid,
    FullyPaid,
    Overdue,
    #[serde(other)]
    Unknown,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unknown
    }
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::PartialPaid => "partially paid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::FullyPaid => "fully paid",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorRef {
    pub name: Option<String>,
}

/// One debt record as received from the upstream listing.
///
/// Amounts default to zero when absent; the upstream occasionally omits them
/// for cancelled transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtRecord {
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub shop: Option<ShopRef>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub created_by: Option<CreatorRef>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub paid_amount: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub repayment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub contact_phones: Vec<String>,
}

impl DebtRecord {
    pub fn remaining(&self) -> f64 {
        self.amount - self.paid_amount
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.id.as_deref())
    }
}

/// Aging/payment bucket assigned to every record. Mutually exclusive: the
/// first four apply to open debts, the last two to settled ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtBucket {
    #[serde(rename = "<30d")]
    Under30,
    #[serde(rename = "30-60d")]
    Days30To60,
    #[serde(rename = "60-90d")]
    Days60To90,
    #[serde(rename = ">90d-problem")]
    Problem,
    #[serde(rename = "paid-on-time")]
    PaidOnTime,
    #[serde(rename = "paid-late")]
    PaidLate,
}

impl DebtBucket {
    pub fn is_open(&self) -> bool {
        !matches!(self, DebtBucket::PaidOnTime | DebtBucket::PaidLate)
    }
}

/// Per-record row of the detailed snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedDebt {
    pub debt_id: String,
    pub created_by: String,
    pub order_number: String,
    pub shop: String,
    pub customer: String,
    pub customer_id: Option<String>,
    pub amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub phones: String,
    pub payment_status: String,
    pub created_date: String,
    pub repayment_date: String,
    pub bucket: DebtBucket,
    pub days_passed: Option<i64>,
}

/// Per-customer row of the summary snapshot. Only customers whose aggregated
/// remaining amount is positive make it into the persisted list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub customer: String,
    pub created_by: String,
    pub amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub phones: String,
    pub note_count: i64,
}
