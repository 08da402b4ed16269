//! User, admin and subscriber listings plus payment analytics

use chrono::Utc;
use colored::Colorize;
use prettytable::{row, Table};

use super::{format_timestamp, or_dash, print_json, Context};
use crate::analytics::PaymentStats;
use crate::api::types::{Account, Subscriber};
use crate::error::Result;
use crate::session::{require_role, Role};

fn ensure_admin(ctx: &Context) -> Result<()> {
    require_role(ctx.session().as_ref(), Role::Admin)?;
    Ok(())
}

/// `adminctl users`
///
/// # Errors
///
/// Returns error if the session is missing or the request fails
pub async fn list_users(ctx: &Context, json: bool) -> Result<()> {
    ensure_admin(ctx)?;
    let users = ctx.client.list_users().await?;
    tracing::debug!(count = users.len(), "Fetched users");
    if json {
        return print_json(&users);
    }
    print_accounts("Registered users", &users);
    Ok(())
}

/// `adminctl admins`
///
/// # Errors
///
/// Returns error if the session is missing or the request fails
pub async fn list_admins(ctx: &Context, json: bool) -> Result<()> {
    ensure_admin(ctx)?;
    let admins = ctx.client.list_admins().await?;
    if json {
        return print_json(&admins);
    }
    print_accounts("Admin accounts", &admins);
    Ok(())
}

/// `adminctl subscribers`
///
/// # Errors
///
/// Returns error if the session is missing or the request fails
pub async fn list_subscribers(ctx: &Context, json: bool) -> Result<()> {
    ensure_admin(ctx)?;
    let subscribers = ctx.client.list_subscribers().await?;
    if json {
        return print_json(&subscribers);
    }
    if subscribers.is_empty() {
        println!("{}", "No subscribers found.".yellow());
        return Ok(());
    }
    println!("\nSubscribers ({}):\n", subscribers.len());
    subscribers_table(&subscribers).printstd();
    println!();
    Ok(())
}

/// `adminctl analytics`
///
/// # Errors
///
/// Returns error if the session is missing or the user list cannot be fetched
pub async fn show_analytics(ctx: &Context, json: bool) -> Result<()> {
    ensure_admin(ctx)?;
    let users = ctx.client.list_users().await?;
    let stats = PaymentStats::from_accounts(&users, Utc::now(), ctx.config.analytics.monthly_price);
    if json {
        return print_json(&stats);
    }

    println!("\nBusiness Analytics (Auto-Pay)\n");
    println!("Total users:               {}", stats.total_users);
    println!("Auto-pay on:               {}", stats.auto_pay_on.to_string().green());
    println!("Auto-pay off:              {}", stats.auto_pay_off.to_string().red());
    println!("Est. monthly revenue:      {}", stats.estimated_monthly_revenue);
    println!("Upcoming payments (30d):   {}", stats.upcoming_payments);
    println!("Upcoming revenue (30d):    {}", stats.upcoming_revenue);
    println!();
    Ok(())
}

fn print_accounts(title: &str, accounts: &[Account]) {
    if accounts.is_empty() {
        println!("{}", "No accounts found.".yellow());
        return;
    }
    println!("\n{} ({}):\n", title, accounts.len());
    accounts_table(accounts).printstd();
    println!();
}

/// Table of accounts, one row per account
pub fn accounts_table(accounts: &[Account]) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "Name",
        "Email",
        "RCM ID",
        "Phone",
        "Role",
        "Auto-Pay",
        "Next Billing"
    ]);
    for account in accounts {
        table.add_row(row![
            or_dash(account.full_name.as_deref()),
            or_dash(account.email.as_deref()),
            or_dash(account.rcm_id.as_deref()),
            or_dash(account.phone.as_deref()),
            account.role,
            if account.auto_pay_status { "ON" } else { "OFF" },
            format_timestamp(account.next_billing_date)
        ]);
    }
    table
}

/// Table of subscribers, one row per subscriber
pub fn subscribers_table(subscribers: &[Subscriber]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Name", "Phone", "Subscribed"]);
    for subscriber in subscribers {
        table.add_row(row![
            or_dash(subscriber.name.as_deref()),
            or_dash(subscriber.phone_number.as_deref()),
            format_timestamp(subscriber.subscribed_at)
        ]);
    }
    table
}
