use clap::Subcommand;
use physfocus_core::{Config, TimerEngine, TimerMode};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the state of a freshly configured timer as JSON
    Status {
        /// Mode to load (focus, short-break, long-break)
        #[arg(long, default_value = "focus")]
        mode: TimerMode,
    },
    /// Print configured durations per mode
    Durations,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut engine = TimerEngine::new(config.timer.durations());

    match action {
        TimerAction::Status { mode } => {
            engine.switch_mode(mode);
            let json = serde_json::to_string_pretty(&engine.snapshot())?;
            println!("{json}");
        }
        TimerAction::Durations => {
            for mode in TimerMode::ALL {
                println!("{:<6} {:>3} min", mode.label(), engine.durations().minutes(mode));
            }
        }
    }
    Ok(())
}
