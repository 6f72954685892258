//! Task management commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use daytick_core::{NewTask, Task, TaskGateway, TaskId, TaskPatch};

use super::{gateway, runtime, server_today, CommandResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Planned date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Get task details
    Get {
        /// Task ID
        id: TaskId,
    },
    /// Update a task
    Update {
        /// Task ID
        id: TaskId,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New planned date
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Set completed status
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,
    },
    /// Reschedule a task onto another date
    Move {
        /// Task ID
        id: TaskId,
        /// New planned date (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// Flip a task between done and not done
    Toggle {
        /// Task ID
        id: TaskId,
    },
}

pub fn run(action: TaskAction) -> CommandResult {
    let gateway = gateway()?;
    let rt = runtime()?;

    match action {
        TaskAction::Create { title, date } => {
            let planned_at = match date {
                Some(date) => date,
                None => rt.block_on(server_today(&gateway))?,
            };
            let task = rt.block_on(gateway.create_task(&NewTask { title, planned_at }))?;
            println!("Task created: {}", task.id);
            print_task(&task)?;
        }
        TaskAction::Get { id } => {
            let task = rt.block_on(gateway.get_task(id))?;
            print_task(&task)?;
        }
        TaskAction::Update {
            id,
            title,
            date,
            completed,
        } => {
            let patch = TaskPatch {
                title,
                planned_at: date,
                completed,
            };
            if patch.is_empty() {
                return Err("nothing to update; pass --title, --date or --completed".into());
            }
            let task = rt.block_on(gateway.update_task(id, &patch))?;
            print_task(&task)?;
        }
        TaskAction::Delete { id } => {
            rt.block_on(gateway.delete_task(id))?;
            println!("Task deleted: {id}");
        }
        TaskAction::Move { id, date } => {
            let task = rt.block_on(gateway.update_task(id, &TaskPatch::planned_at(date)))?;
            print_task(&task)?;
        }
        TaskAction::Toggle { id } => {
            let task = rt.block_on(async {
                let current = gateway.get_task(id).await?;
                gateway
                    .update_task(id, &TaskPatch::completed(!current.completed))
                    .await
            })?;
            print_task(&task)?;
        }
    }
    Ok(())
}

fn print_task(task: &Task) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(task)?);
    Ok(())
}
