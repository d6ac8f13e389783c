//! Board commands: `suds board|move|add|edit|delete|summary`.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate, Utc};
use console::style;

use suds::board::{CommitSource, FilterCriteria, MoveState, PaymentFilter, PriorityFilter};
use suds::config::SudsConfig;
use suds::ui::icons::{CHECK, WARN};
use suds::ui::{render_board, render_summary, render_task_line};
use suds_common::{TaskDraft, TaskId};

use super::open_session;
use crate::{EditArgs, TaskArgs};

pub async fn cmd_board(
    config: &SudsConfig,
    search: Option<String>,
    priority: PriorityFilter,
    payment: PaymentFilter,
) -> Result<()> {
    let session = open_session(config).await?;
    let criteria = FilterCriteria {
        search: search.unwrap_or_default(),
        priority,
        payment,
    };
    print!("{}", render_board(&session.view(&criteria), Utc::now()));
    Ok(())
}

pub async fn cmd_move(config: &SudsConfig, task_id: &str, column: &str) -> Result<()> {
    let mut session = open_session(config).await?;
    let task_id = TaskId::from(task_id);

    match session.move_named(&task_id, column).await? {
        None => println!("{} is already in {}", task_id, column),
        Some(MoveState::Committed(CommitSource::Optimistic)) => {
            println!("{}Moved {} to {}", CHECK, style(&task_id).bold(), column);
        }
        Some(MoveState::Committed(_)) => {
            let actual = session
                .store()
                .column_of(&task_id)
                .map(|c| c.title())
                .unwrap_or("(removed)");
            println!(
                "{}Move was rejected by the server; board reloaded, {} is in {}",
                WARN,
                style(&task_id).bold(),
                actual
            );
        }
        Some(MoveState::ReloadFailed { reason }) => {
            bail!("Move of {} was rejected and the board could not be reloaded: {}", task_id, reason);
        }
        Some(state) => bail!("Move of {} did not settle: {:?}", task_id, state),
    }
    Ok(())
}

pub async fn cmd_add(config: &SudsConfig, args: &TaskArgs) -> Result<()> {
    let mut session = open_session(config).await?;
    let draft = TaskDraft {
        title: Some(args.title.clone()),
        description: args.description.clone(),
        status: Some(args.column),
        priority: Some(args.priority),
        due_date: Some(parse_due(&args.due)?),
        items: args.items,
        weight: args.weight,
        has_blankets: args.blankets.map(|n| n > 0),
        blanket_count: args.blankets,
        is_paid: Some(args.paid),
        total_price: args.price,
        service_type: args.service.clone(),
        customer_id: Some(args.customer.clone()),
        assigned_to_id: args.assign.clone(),
    };

    let task = session.create_task(&draft).await.context("Failed to create task")?;
    println!("{}Created {}", CHECK, render_task_line(&task, Utc::now()));
    Ok(())
}

pub async fn cmd_edit(config: &SudsConfig, task_id: &str, fields: &EditArgs) -> Result<()> {
    let draft = edit_draft(fields)?;
    if draft == TaskDraft::default() {
        bail!("Nothing to change; pass at least one field to edit");
    }

    let mut session = open_session(config).await?;
    let task = session
        .update_task(&TaskId::from(task_id), &draft)
        .await
        .with_context(|| format!("Failed to update task {}", task_id))?;
    println!("{}Updated {}", CHECK, render_task_line(&task, Utc::now()));
    Ok(())
}

pub async fn cmd_delete(config: &SudsConfig, task_id: &str) -> Result<()> {
    let mut session = open_session(config).await?;
    session
        .delete_task(&TaskId::from(task_id))
        .await
        .with_context(|| format!("Failed to delete task {}", task_id))?;
    println!("{}Deleted {}", CHECK, task_id);
    Ok(())
}

pub async fn cmd_summary(config: &SudsConfig) -> Result<()> {
    let session = open_session(config).await?;
    print!("{}", render_summary(&session.summary()));
    Ok(())
}

fn edit_draft(fields: &EditArgs) -> Result<TaskDraft> {
    let is_paid = match (fields.paid, fields.unpaid) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    Ok(TaskDraft {
        title: fields.title.clone(),
        description: fields.description.clone(),
        status: fields.column,
        priority: fields.priority,
        due_date: fields.due.as_deref().map(parse_due).transpose()?,
        items: fields.items,
        weight: fields.weight,
        has_blankets: fields.blankets.map(|n| n > 0),
        blanket_count: fields.blankets,
        is_paid,
        total_price: fields.price,
        service_type: fields.service.clone(),
        customer_id: None,
        assigned_to_id: fields.assign.clone(),
    })
}

/// RFC 3339 timestamp, or a bare date meaning local midnight.
fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid due date '{}': use YYYY-MM-DD or RFC 3339", raw))?;
    let Some(local) = date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
    else {
        bail!("Due date '{}' does not exist in the local timezone", raw);
    };
    Ok(local.with_timezone(&Utc))
}
