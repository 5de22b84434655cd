use clap::Subcommand;
use physfocus_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.focus_duration", "chat.model")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let listing = dotted_listing(&config)?;
            print!("{listing}");
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}

/// Key/value listing with dotted keys, one per line.
fn dotted_listing(config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    let json = serde_json::to_value(config)?;
    let mut out = String::new();
    if let serde_json::Value::Object(sections) = json {
        for (section, fields) in sections {
            if let serde_json::Value::Object(fields) = fields {
                for (field, value) in fields {
                    let shown = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    out.push_str(&format!("{section}.{field} = {shown}\n"));
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_uses_dotted_keys() {
        let listing = dotted_listing(&Config::default()).unwrap();
        assert!(listing.contains("timer.focus_duration = 25\n"));
        assert!(listing.contains("chat.provider = gemini\n"));
        assert!(listing.contains("chat.endpoint = \n"));
        assert!(listing.contains("alerts.sound = true\n"));
    }
}
