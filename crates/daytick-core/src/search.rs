//! Paged task search over the list and count endpoints.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, ValidationError};
use crate::gateway::TaskGateway;
use crate::task::{OrderColumn, OrderDirection, Task, TaskFilter, TaskQuery};

/// One page request against the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub filter: TaskFilter,
    page: u64,
    page_size: u64,
    pub order_col: Option<OrderColumn>,
    pub order_dir: Option<OrderDirection>,
}

impl SearchRequest {
    pub fn new(filter: TaskFilter, page_size: u64) -> Result<Self, ValidationError> {
        if page_size == 0 {
            return Err(ValidationError::InvalidValue {
                field: "page_size".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(Self {
            filter,
            page: 1,
            page_size,
            order_col: None,
            order_dir: None,
        })
    }

    /// Select a 1-based page.
    pub fn with_page(mut self, page: u64) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidValue {
                field: "page".into(),
                message: "pages start at 1".into(),
            });
        }
        self.page = page;
        Ok(self)
    }

    /// Sort by `column`, flipping the direction on every call like a table
    /// header click.
    pub fn sort_by(mut self, column: OrderColumn) -> Self {
        let dir = match self.order_dir {
            Some(OrderDirection::Asc) => OrderDirection::Desc,
            _ => OrderDirection::Asc,
        };
        self.order_col = Some(column);
        self.order_dir = Some(dir);
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn to_query(&self) -> TaskQuery {
        TaskQuery {
            filter: self.filter.clone(),
            limit: Some(self.page_size),
            offset: Some(self.offset()),
            order_col: self.order_col,
            order_dir: self.order_dir,
        }
    }
}

/// Number of pages needed for `count` results.
pub fn page_count(count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub tasks: Vec<Task>,
    pub page: u64,
    pub pages: u64,
    pub total: u64,
}

impl SearchPage {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// The requested page lies past the last one. An empty result still
    /// has a first page.
    pub fn out_of_range(&self) -> bool {
        self.page > self.pages.max(1)
    }
}

/// Fetch the count and the page concurrently.
pub async fn search<G: TaskGateway>(
    gateway: &G,
    request: &SearchRequest,
) -> Result<SearchPage, GatewayError> {
    let query = request.to_query();
    let (total, tasks) = tokio::join!(
        gateway.count_tasks(&request.filter),
        gateway.list_tasks(&query)
    );
    let total = total?;
    Ok(SearchPage {
        tasks: tasks?,
        page: request.page,
        pages: page_count(total, request.page_size),
        total,
    })
}
