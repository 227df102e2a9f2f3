use crate::domain::model::{CustomerSummary, DebtBucket, DebtRecord, DetailedDebt};
use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::HashMap;

const GRACE_DAYS: i64 = 30;

/// Classify one record into its aging/payment bucket.
///
/// `today` is a calendar date; the time of day has already been dropped.
/// Returns the bucket and, for open debts, the whole days elapsed since the
/// record was created.
pub fn classify(record: &DebtRecord, today: NaiveDate) -> (DebtBucket, Option<i64>) {
    let remaining = record.remaining();

    if remaining > 0.0 {
        let today_start = today.and_time(NaiveTime::MIN).and_utc();
        let days_passed = (today_start - record.created_at).num_days();
        let bucket = if days_passed < 30 {
            DebtBucket::Under30
        } else if days_passed < 60 {
            DebtBucket::Days30To60
        } else if days_passed < 90 {
            DebtBucket::Days60To90
        } else {
            DebtBucket::Problem
        };
        (bucket, Some(days_passed))
    } else {
        // Grace deadline is computed from a fresh value; created_at itself is
        // never touched.
        let deadline = record.created_at + Duration::days(GRACE_DAYS);
        let on_time = record
            .repayment_date
            .map(|repaid| repaid <= deadline)
            .unwrap_or(false);
        let bucket = if on_time {
            DebtBucket::PaidOnTime
        } else {
            DebtBucket::PaidLate
        };
        (bucket, None)
    }
}

/// Build the per-record detailed view.
pub fn build_detailed(records: &[DebtRecord], today: NaiveDate) -> Vec<DetailedDebt> {
    records
        .iter()
        .map(|record| {
            let (bucket, days_passed) = classify(record, today);
            DetailedDebt {
                debt_id: record.id.clone(),
                created_by: record
                    .created_by
                    .as_ref()
                    .and_then(|c| c.name.clone())
                    .unwrap_or_default(),
                order_number: record.order_number.clone().unwrap_or_default(),
                shop: record
                    .shop
                    .as_ref()
                    .and_then(|s| s.name.clone())
                    .unwrap_or_default(),
                customer: record
                    .customer
                    .as_ref()
                    .and_then(|c| c.name.clone())
                    .unwrap_or_default(),
                customer_id: record.customer_id().map(str::to_string),
                amount: record.amount,
                paid_amount: record.paid_amount,
                remaining_amount: record.remaining(),
                phones: record.contact_phones.join(", "),
                payment_status: record.status.label().to_string(),
                created_date: record.created_at.date_naive().to_string(),
                repayment_date: record
                    .repayment_date
                    .map(|d| d.date_naive().to_string())
                    .unwrap_or_default(),
                bucket,
                days_passed,
            }
        })
        .collect()
}

struct CustomerAccumulator {
    customer: String,
    created_by: String,
    amount: f64,
    paid_amount: f64,
    remaining_amount: f64,
    phones: Vec<String>,
}

/// Reduce the detailed rows to one entry per customer, keep only customers
/// who still owe something, and sort by remaining amount descending.
///
/// Rows without a customer id are skipped. All of a customer's rows feed the
/// sums, settled ones included; they simply contribute zero (or a negative
/// correction) to the remaining total.
pub fn summarize(detailed: &[DetailedDebt], note_counts: &HashMap<String, i64>) -> Vec<CustomerSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut by_customer: HashMap<String, CustomerAccumulator> = HashMap::new();

    for debt in detailed {
        let Some(customer_id) = debt.customer_id.as_deref() else {
            continue;
        };

        let entry = by_customer
            .entry(customer_id.to_string())
            .or_insert_with(|| {
                order.push(customer_id.to_string());
                CustomerAccumulator {
                    customer: String::new(),
                    created_by: String::new(),
                    amount: 0.0,
                    paid_amount: 0.0,
                    remaining_amount: 0.0,
                    phones: Vec::new(),
                }
            });

        entry.amount += debt.amount;
        entry.paid_amount += debt.paid_amount;
        entry.remaining_amount += debt.remaining_amount;
        entry.customer = debt.customer.clone();
        entry.created_by = debt.created_by.clone();
        if !debt.phones.is_empty() && !entry.phones.contains(&debt.phones) {
            entry.phones.push(debt.phones.clone());
        }
    }

    let mut summary: Vec<CustomerSummary> = order
        .into_iter()
        .filter_map(|customer_id| {
            let acc = by_customer.remove(&customer_id)?;
            if acc.remaining_amount <= 0.0 {
                return None;
            }
            let note_count = note_counts.get(&customer_id).copied().unwrap_or(0);
            Some(CustomerSummary {
                customer_id,
                customer: acc.customer,
                created_by: acc.created_by,
                amount: acc.amount,
                paid_amount: acc.paid_amount,
                remaining_amount: acc.remaining_amount,
                phones: acc.phones.join(", "),
                note_count,
            })
        })
        .collect();

    // Stable sort keeps first-seen order for equal amounts.
    summary.sort_by(|a, b| {
        b.remaining_amount
            .partial_cmp(&a.remaining_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    summary
}
