//! Plain-terminal rendering of the board and related views.
//!
//! Every function returns a `String`; callers decide where it goes.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use console::style;
use suds_common::{LoyaltyAccount, Priority, Reward, Task};

use super::icons::{BASKET, BLANKET, GIFT, MOVED, PAID, STAR, WARN};
use crate::board::{ColumnView, LiveOutcome, PriceSummary};
use crate::util::{format_date, relative_time};

fn priority_label(priority: Priority) -> String {
    match priority {
        Priority::High => style("high").red().bold().to_string(),
        Priority::Medium => style("medium").yellow().to_string(),
        Priority::Low => style("low").dim().to_string(),
    }
}

fn money(amount: f64) -> String {
    format!("₱{:.2}", amount)
}

/// One task as a single line, e.g.
/// `abc123  Wash Set · Maria (204) · high · due 01/06/2024 09:30 (Tomorrow) · ₱250.00 💰`
pub fn render_task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mut line = format!("{}  {}", style(&task.id).dim(), style(&task.title).bold());

    let _ = write!(line, " · {}", task.customer.name);
    if let Some(room) = &task.customer.room_number {
        let _ = write!(line, " ({})", room);
    }
    let _ = write!(line, " · {}", priority_label(task.priority));

    let due = task.due_date.with_timezone(&Local);
    let _ = write!(
        line,
        " · due {} ({})",
        format_date(&due, true),
        relative_time(&task.due_date, &now)
    );

    if task.items > 0 {
        let _ = write!(line, " · {} item{}", task.items, if task.items == 1 { "" } else { "s" });
    }
    if let Some(weight) = task.weight {
        let _ = write!(line, " · {:.1} kg", weight);
    }
    if task.effective_blankets() > 0 {
        let _ = write!(line, " · {}{}", BLANKET, task.effective_blankets());
    }
    if let Some(service) = &task.service_type {
        let _ = write!(line, " · {}", service);
    }
    if let Some(price) = task.total_price {
        let _ = write!(line, " · {}", money(price));
    }
    if task.is_paid {
        let _ = write!(line, " {}", PAID);
    } else {
        let _ = write!(line, " {}", style("unpaid").yellow());
    }
    if let Some(staff) = &task.assigned_to {
        let _ = write!(line, " · @{}", staff.name);
    }
    line
}

/// The whole filtered board, one section per column in board order.
pub fn render_board(columns: &[ColumnView<'_>], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for column in columns {
        let _ = writeln!(
            out,
            "{}{} {}",
            BASKET,
            style(column.title).cyan().bold(),
            style(format!("({})", column.tasks.len())).dim()
        );
        if column.tasks.is_empty() {
            let _ = writeln!(out, "  {}", style("no tasks").dim());
        }
        for task in &column.tasks {
            let _ = writeln!(out, "  {}", render_task_line(task, now));
        }
        out.push('\n');
    }
    out
}

pub fn render_summary(summary: &PriceSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<18} {}  {}",
        "Total revenue",
        style(money(summary.total_revenue)).bold(),
        style(format!("from {} orders", summary.order_count)).dim()
    );
    let _ = writeln!(
        out,
        "{:<18} {}  {}",
        "Payments received",
        style(money(summary.paid_amount)).green(),
        style(format!("{} paid orders", summary.paid_orders)).dim()
    );
    let _ = writeln!(
        out,
        "{:<18} {}  {}",
        "Pending payments",
        style(money(summary.pending_amount)).yellow(),
        style(format!("{} unpaid orders", summary.unpaid_orders)).dim()
    );
    out
}

pub fn render_loyalty(account: &LoyaltyAccount, rewards: &[Reward]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}{} points · {} tier",
        STAR,
        style(account.points).bold(),
        style(account.tier).cyan()
    );
    if account.lifetime_points > 0 {
        let _ = writeln!(out, "  lifetime: {} points", account.lifetime_points);
    }
    match (account.points_to_next_tier(), account.tier.next()) {
        (Some(needed), Some(next)) if needed > 0 => {
            let _ = writeln!(out, "  {} points to {}", needed, next);
        }
        _ => {}
    }

    let available: Vec<&Reward> = rewards.iter().filter(|r| account.can_redeem(r)).collect();
    if available.is_empty() {
        let _ = writeln!(out, "  {}", style("no rewards available yet").dim());
    } else {
        let _ = writeln!(out, "  Available rewards:");
        for reward in available {
            let _ = writeln!(
                out,
                "  {}{} {} ({} points)",
                GIFT,
                style(&reward.id).dim(),
                reward.name,
                reward.points_cost
            );
        }
    }
    out
}

/// One line describing what a push did to the board.
pub fn render_outcome(outcome: &LiveOutcome) -> String {
    match outcome {
        LiveOutcome::Applied { task_id, from, to } => {
            let from = from.map(|c| c.title()).unwrap_or("(new)");
            format!("{}{} {} → {}", MOVED, style(task_id).bold(), from, style(to.title()).cyan())
        }
        LiveOutcome::UnknownStatus { task_id, status } => {
            format!("{}{} pushed to unknown column '{}', ignored", WARN, task_id, status)
        }
        LiveOutcome::Malformed { error } => format!("{}malformed push ignored: {}", WARN, error),
    }
}
