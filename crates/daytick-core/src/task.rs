//! Task records and the JSON contracts used to read and mutate them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned task identifier.
pub type TaskId = u64;

/// A task as returned by the server.
///
/// The client only ever holds transient copies; the server owns the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(with = "plan_date")]
    pub planned_at: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Incomplete and planned strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.planned_at < today
    }
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(with = "plan_date")]
    pub planned_at: NaiveDate,
}

/// Body of `PATCH /api/tasks/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "plan_date::option"
    )]
    pub planned_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn planned_at(date: NaiveDate) -> Self {
        Self {
            planned_at: Some(date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.planned_at.is_none() && self.completed.is_none()
    }

    /// Apply the patch to a local copy, mirroring what the server does.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(date) = self.planned_at {
            task.planned_at = date;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Response of `GET /api/tasks/count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCount {
    pub count: u64,
}

/// Filter shared by the list and count endpoints.
///
/// `after` and `before` are exclusive: the server keeps tasks with
/// `after < planned_at < before`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub after: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
    pub completed: Option<bool>,
}

impl TaskFilter {
    /// Incomplete tasks planned before `today`.
    pub fn expired(today: NaiveDate) -> Self {
        Self {
            after: None,
            before: Some(today),
            completed: Some(false),
        }
    }

    /// Every task strictly between the two bounds.
    pub fn between(after: NaiveDate, before: NaiveDate) -> Self {
        Self {
            after: Some(after),
            before: Some(before),
            completed: None,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(after) = self.after {
            pairs.push(("after", format_date(after)));
        }
        if let Some(before) = self.before {
            pairs.push(("before", format_date(before)));
        }
        if let Some(completed) = self.completed {
            pairs.push(("completed", completed.to_string()));
        }
        pairs
    }
}

/// Column the list endpoint may sort by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderColumn {
    #[default]
    Id,
    PlannedAt,
    CreatedAt,
}

impl OrderColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderColumn::Id => "id",
            OrderColumn::PlannedAt => "planned_at",
            OrderColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }
}

/// Full list query: filter plus paging and ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order_col: Option<OrderColumn>,
    pub order_dir: Option<OrderDirection>,
}

impl From<TaskFilter> for TaskQuery {
    fn from(filter: TaskFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

impl TaskQuery {
    /// Direction the server will actually apply; ordering by id is always
    /// descending.
    pub fn effective_order(&self) -> (OrderColumn, OrderDirection) {
        let col = self.order_col.unwrap_or_default();
        let dir = match col {
            OrderColumn::Id => OrderDirection::Desc,
            _ => self.order_dir.unwrap_or_default(),
        };
        (col, dir)
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.filter.query_pairs();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if self.order_col.is_some() || self.order_dir.is_some() {
            let (col, dir) = self.effective_order();
            pairs.push(("order_col", col.as_str().to_string()));
            pairs.push(("order_dir", dir.as_str().to_string()));
        }
        pairs
    }
}

/// ISO date without a time component.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse either `YYYY-MM-DD` or an RFC 3339 timestamp, keeping the calendar
/// date in the timestamp's own offset.
pub fn parse_plan_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

mod plan_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_plan_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid planned_at date '{raw}'")))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => s.serialize_str(&super::super::format_date(*date)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => super::super::parse_plan_date(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid planned_at date '{raw}'"))),
                None => Ok(None),
            }
        }
    }
}
