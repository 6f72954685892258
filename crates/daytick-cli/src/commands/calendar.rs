//! Month view: one-shot render and the interactive watch loop.

use chrono::{Datelike, NaiveDate};
use clap::{Args, Subcommand};
use daytick_core::{
    CalendarEvent, CalendarModel, CalendarSession, Config, HttpGateway, Task, TaskId,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use super::{runtime, CommandResult};

#[derive(Args)]
pub struct CalendarArgs {
    #[command(subcommand)]
    action: Option<CalendarAction>,
    /// Show the month containing this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,
    /// Print the month as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum CalendarAction {
    /// Keep the calendar open, reading commands from stdin
    Watch,
}

pub fn run(args: CalendarArgs) -> CommandResult {
    let config = Config::effective()?;
    let gateway = HttpGateway::from_config(&config)?;
    let rt = runtime()?;

    let result = match args.action {
        None => rt.block_on(show(gateway, args.date, args.json)),
        Some(CalendarAction::Watch) => rt.block_on(watch(gateway, &config, args.date, args.json)),
    };
    // A pending stdin read would otherwise hold the process open.
    rt.shutdown_background();
    result
}

async fn show(gateway: HttpGateway, date: Option<NaiveDate>, json: bool) -> CommandResult {
    let mut session = CalendarSession::new(gateway);
    session.start();
    session.settle().await;
    if let Some(date) = date {
        session.dispatch(CalendarEvent::Select { date });
        session.settle().await;
    }
    print_model(session.model(), json)?;
    match session.model().last_error() {
        Some(message) => Err(message.to_string().into()),
        None => Ok(()),
    }
}

async fn watch(
    gateway: HttpGateway,
    config: &Config,
    date: Option<NaiveDate>,
    json: bool,
) -> CommandResult {
    let mut session = CalendarSession::new(gateway);
    session.start();
    session.start_ticker(config.refresh_period());
    if let Some(date) = date {
        session.dispatch(CalendarEvent::Select { date });
    }
    session.settle().await;
    print_model(session.model(), json)?;

    let mut input = tokio::spawn(read_commands(session.sender()));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let interrupted = loop {
        tokio::select! {
            _ = &mut ctrl_c => break true,
            _ = &mut input => break false,
            _ = session.process_next() => {
                print_model(session.model(), json)?;
                session.clear_error();
            }
        }
    };
    session.stop_ticker();
    input.abort();

    // Input ended on `quit` or EOF: send whatever the user already asked for.
    if !interrupted {
        session.drain().await;
        print_model(session.model(), json)?;
    }
    match session.model().last_error() {
        Some(message) => Err(message.to_string().into()),
        None => Ok(()),
    }
}

/// One line typed into the watch loop.
#[derive(Debug, Clone, PartialEq)]
enum WatchCommand {
    Event(CalendarEvent),
    Quit,
}

const WATCH_HELP: &str = "commands: next | prev | today | goto DATE | move ID DATE | \
done ID | undo ID | delete ID | quit";

fn parse_command(line: &str) -> Result<Option<WatchCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let id = |word: Option<&str>| -> Result<TaskId, String> {
        word.ok_or("missing task id")?
            .parse()
            .map_err(|_| "task id must be a number".to_string())
    };
    let date = |word: Option<&str>| -> Result<NaiveDate, String> {
        let word = word.ok_or("missing date")?;
        NaiveDate::parse_from_str(word, "%Y-%m-%d").map_err(|e| format!("invalid date '{word}': {e}"))
    };

    let event = match verb {
        "next" | "n" => CalendarEvent::ShiftMonths { months: 1 },
        "prev" | "p" => CalendarEvent::ShiftMonths { months: -1 },
        "today" | "t" => CalendarEvent::GoToToday,
        "goto" | "g" => CalendarEvent::Select {
            date: date(words.next())?,
        },
        "move" | "m" => CalendarEvent::Move {
            id: id(words.next())?,
            date: date(words.next())?,
        },
        "done" => CalendarEvent::ToggleComplete {
            id: id(words.next())?,
            completed: true,
        },
        "undo" => CalendarEvent::ToggleComplete {
            id: id(words.next())?,
            completed: false,
        },
        "delete" | "rm" => CalendarEvent::Delete {
            id: id(words.next())?,
        },
        "quit" | "q" => return Ok(Some(WatchCommand::Quit)),
        _ => return Err(WATCH_HELP.to_string()),
    };
    Ok(Some(WatchCommand::Event(event)))
}

/// Forward stdin commands until `quit`, end of input or a closed session.
async fn read_commands(tx: UnboundedSender<CalendarEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(&line) {
            Ok(Some(WatchCommand::Event(event))) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Ok(Some(WatchCommand::Quit)) => break,
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
    info!("stopped reading commands");
}

// ── Rendering ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MonthView<'a> {
    title: String,
    today: NaiveDate,
    selected: NaiveDate,
    start_of_week: u32,
    rollover_time: String,
    weeks: Vec<Vec<DayView<'a>>>,
    expired: Vec<&'a Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct DayView<'a> {
    date: NaiveDate,
    in_month: bool,
    tasks: Vec<&'a Task>,
}

fn month_view(model: &CalendarModel) -> MonthView<'_> {
    let window = model.window();
    let settings = model.settings();
    MonthView {
        title: window.title(),
        today: model.today(),
        selected: model.selected(),
        start_of_week: settings.start_of_week.iso(),
        rollover_time: settings.rollover_time.to_string(),
        weeks: window
            .weeks()
            .map(|week| {
                week.iter()
                    .map(|&date| DayView {
                        date,
                        in_month: window.in_month(date),
                        tasks: model.buckets().tasks_on(date),
                    })
                    .collect()
            })
            .collect(),
        expired: model.buckets().expired(),
        error: model.last_error(),
    }
}

fn print_model(model: &CalendarModel, json: bool) -> CommandResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&month_view(model))?);
    } else {
        print!("{}", render_text(model));
    }
    Ok(())
}

/// Plain-text month grid.
///
/// Each cell shows the day number, `*` on today, brackets around the
/// selected day and `+N` when N tasks are planned on it.
fn render_text(model: &CalendarModel) -> String {
    let window = model.window();
    let mut out = format!("{:^56}\n", window.title());

    for weekday in window.weekday_labels() {
        out.push_str(&format!("{:^8}", weekday.to_string()));
    }
    out.push('\n');

    for week in window.weeks() {
        for &date in week {
            let day = if window.in_month(date) {
                format!("{:>2}", date.day())
            } else {
                " .".to_string()
            };
            let (open, close) = if date == model.selected() {
                ('[', ']')
            } else {
                (' ', ' ')
            };
            let today = if date == model.today() { '*' } else { ' ' };
            let count = model.buckets().tasks_on(date).len();
            let tasks = if count > 0 {
                format!("+{count}")
            } else {
                String::new()
            };
            out.push_str(&format!("{open}{day}{close}{today}{tasks:<3}"));
        }
        out.push('\n');
    }

    let expired = model.buckets().expired();
    if !expired.is_empty() {
        out.push_str(&format!("\nOverdue ({}):\n", expired.len()));
        for task in expired {
            out.push_str(&format!("  #{:<5} {}  {}\n", task.id, task.planned_at, task.title));
        }
    }

    let selected = model.buckets().tasks_on(model.selected());
    out.push_str(&format!("\n{}:\n", model.selected().format("%A, %B %-d")));
    if selected.is_empty() {
        out.push_str("  no tasks\n");
    }
    for task in selected {
        let mark = if task.completed { 'x' } else { ' ' };
        out.push_str(&format!("  [{mark}] #{:<5} {}\n", task.id, task.title));
    }

    if let Some(message) = model.last_error() {
        out.push_str(&format!("\n! {message}\n"));
    }
    out
}
