use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use daytick_core::calendar::TaskStatus;
use daytick_core::search::search;
use daytick_core::{
    Config, OrderColumn, OrderDirection, SearchPage, SearchRequest, TaskFilter, TaskGateway,
};

use super::{gateway, runtime, today_at, CommandResult};

#[derive(Args)]
pub struct SearchArgs {
    /// Only tasks planned after this date (exclusive)
    #[arg(long)]
    after: Option<NaiveDate>,
    /// Only tasks planned before this date (exclusive)
    #[arg(long)]
    before: Option<NaiveDate>,
    /// Filter on completion
    #[arg(long)]
    completed: Option<bool>,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: u64,
    /// Results per page; defaults to search.page_size
    #[arg(long)]
    page_size: Option<u64>,
    /// Sort column
    #[arg(long, value_enum)]
    order_col: Option<SortColumn>,
    /// Sort direction
    #[arg(long, value_enum)]
    order_dir: Option<SortDirection>,
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortColumn {
    Id,
    PlannedAt,
    CreatedAt,
}

impl From<SortColumn> for OrderColumn {
    fn from(col: SortColumn) -> Self {
        match col {
            SortColumn::Id => OrderColumn::Id,
            SortColumn::PlannedAt => OrderColumn::PlannedAt,
            SortColumn::CreatedAt => OrderColumn::CreatedAt,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for OrderDirection {
    fn from(dir: SortDirection) -> Self {
        match dir {
            SortDirection::Asc => OrderDirection::Asc,
            SortDirection::Desc => OrderDirection::Desc,
        }
    }
}

pub fn run(args: SearchArgs) -> CommandResult {
    let config = Config::effective()?;
    let page_size = args.page_size.unwrap_or(config.search.page_size);
    let filter = TaskFilter {
        after: args.after,
        before: args.before,
        completed: args.completed,
    };

    let mut request = SearchRequest::new(filter, page_size)?.with_page(args.page)?;
    request.order_col = args.order_col.map(OrderColumn::from);
    request.order_dir = args.order_dir.map(OrderDirection::from);

    let gateway = gateway()?;
    let (settings, page) = runtime()?.block_on(async {
        tokio::join!(gateway.fetch_settings(), search(&gateway, &request))
    });
    let page = page?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        let today = today_at(&settings?, Local::now().naive_local());
        print!("{}", render_page(&page, today));
    }
    Ok(())
}

fn render_page(page: &SearchPage, today: NaiveDate) -> String {
    let mut out = String::new();
    if page.out_of_range() {
        out.push_str(&format!(
            "page {} is past the last page ({})\n",
            page.page, page.pages
        ));
        return out;
    }
    for task in &page.tasks {
        let status = match TaskStatus::of(task, today) {
            TaskStatus::Done => "done",
            TaskStatus::Overdue => "overdue",
            TaskStatus::DueToday => "today",
            TaskStatus::Upcoming => "",
        };
        out.push_str(&format!(
            "{:>6}  {}  {:<8} {}\n",
            task.id, task.planned_at, status, task.title
        ));
    }
    out.push_str(&format!(
        "page {}/{} ({} tasks)\n",
        page.page,
        page.pages.max(1),
        page.total
    ));
    out
}
