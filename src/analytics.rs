//! Auto-pay subscription statistics derived from the user list

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::api::types::Account;

/// Length of the "upcoming payments" window, in days.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Aggregated payment figures for the analytics dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    /// Number of accounts considered
    pub total_users: usize,
    /// Accounts with auto-pay enabled
    pub auto_pay_on: usize,
    /// Accounts without auto-pay
    pub auto_pay_off: usize,
    /// Auto-pay accounts billed within the next 30 days
    pub upcoming_payments: usize,
    /// `auto_pay_on * monthly_price`
    pub estimated_monthly_revenue: u64,
    /// `upcoming_payments * monthly_price`
    pub upcoming_revenue: u64,
}

impl PaymentStats {
    /// Compute the stats as of `now`
    ///
    /// A payment is upcoming when auto-pay is on and the next billing date
    /// falls within `[now, now + 30 days]`, both ends inclusive.
    pub fn from_accounts(accounts: &[Account], now: DateTime<Utc>, monthly_price: u64) -> Self {
        let window_end = now + Duration::days(UPCOMING_WINDOW_DAYS);

        let total_users = accounts.len();
        let auto_pay_on = accounts.iter().filter(|a| a.auto_pay_status).count();
        let upcoming_payments = accounts
            .iter()
            .filter(|a| a.auto_pay_status)
            .filter_map(|a| a.next_billing_date)
            .filter(|due| *due >= now && *due <= window_end)
            .count();

        Self {
            total_users,
            auto_pay_on,
            auto_pay_off: total_users - auto_pay_on,
            upcoming_payments,
            estimated_monthly_revenue: auto_pay_on as u64 * monthly_price,
            upcoming_revenue: upcoming_payments as u64 * monthly_price,
        }
    }
}
