pub mod calendar;
pub mod config;
pub mod search;
pub mod settings;
pub mod task;

use chrono::{Local, NaiveDate, NaiveDateTime};
use daytick_core::calendar::TodayResolver;
use daytick_core::{Config, GatewayError, HttpGateway, LocaleSettings, TaskGateway};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Runtime for commands that talk to the server.
pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}").into())
}

/// Gateway built from the effective configuration.
pub fn gateway() -> Result<HttpGateway, Box<dyn std::error::Error>> {
    let config = Config::effective()?;
    Ok(HttpGateway::from_config(&config)?)
}

/// The user's today at `now`, honouring their rollover time.
pub fn today_at(settings: &LocaleSettings, now: NaiveDateTime) -> NaiveDate {
    TodayResolver::new(settings.rollover_time).today_at(now)
}

/// Today as the server-side locale settings define it.
pub async fn server_today(gateway: &HttpGateway) -> Result<NaiveDate, GatewayError> {
    let settings = gateway.fetch_settings().await?;
    Ok(today_at(&settings, Local::now().naive_local()))
}
