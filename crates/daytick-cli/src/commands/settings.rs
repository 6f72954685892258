use clap::Subcommand;
use daytick_core::{LocaleSettings, LocaleSettingsPatch, RolloverTime, TaskGateway, WeekStart};

use super::{gateway, runtime, CommandResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current locale settings
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Change locale settings
    Set {
        /// First day of the week: 1-7 (ISO) or a weekday name
        #[arg(long)]
        start_of_week: Option<WeekStart>,
        /// Time of day the date rolls over, HH:MM
        #[arg(long)]
        rollover_time: Option<RolloverTime>,
    },
}

pub fn run(action: SettingsAction) -> CommandResult {
    let gateway = gateway()?;
    let rt = runtime()?;

    match action {
        SettingsAction::Show { json } => {
            let settings = rt.block_on(gateway.fetch_settings())?;
            print_settings(&settings, json)?;
        }
        SettingsAction::Set {
            start_of_week,
            rollover_time,
        } => {
            let patch = LocaleSettingsPatch {
                start_of_week,
                rollover_time,
            };
            if patch.is_empty() {
                return Err("nothing to update; pass --start-of-week or --rollover-time".into());
            }
            let settings = rt.block_on(gateway.update_settings(&patch))?;
            print_settings(&settings, false)?;
        }
    }
    Ok(())
}

fn print_settings(settings: &LocaleSettings, json: bool) -> CommandResult {
    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
    } else {
        println!("start_of_week: {}", settings.start_of_week.weekday());
        println!("rollover_time: {}", settings.rollover_time);
    }
    Ok(())
}
