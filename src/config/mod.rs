mod data;

use crate::backend::nc_request::{NCAccount, NCPushDevice};
use data::ConfigOptions;
use etcetera::{app_strategy::Xdg, choose_app_strategy, AppStrategy, AppStrategyArgs};
use log::LevelFilter;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::{path::Path, path::PathBuf};
use toml_example::TomlExample;

#[derive(Debug)]
pub struct Config {
    pub data: ConfigOptions,
    strategy: Xdg,
}

fn path_to_string(path: &Path) -> String {
    path.as_os_str().to_string_lossy().into_owned()
}

fn app_strategy() -> Result<Xdg, String> {
    choose_app_strategy(AppStrategyArgs {
        top_level_domain: "org".to_string(),
        author: "emlix".to_string(),
        app_name: "ncpush-rs".to_string(),
    })
    .map_err(|why| format!("Could not find home dir: {why}"))
}

/// Write an example config to `config_path` if there is none yet.
///
/// # Errors
///
/// Always errors if the file had to be created, so the user gets to fill it in first.
pub fn check_config_exists_else_create_new<T: TomlExample>(
    config_path: &Path,
) -> Result<(), String> {
    if !config_path.exists() {
        println!(
            "Config files doesn't exist creating default now at {}.",
            path_to_string(config_path)
        );
        let parent = config_path.parent().ok_or("Config Path has no parent")?;
        if !parent.exists() {
            let Ok(()) = std::fs::create_dir_all(parent) else {
                return Err("Failed to create Config Dir. Make Sure Dir is creatable.".to_owned());
            };
        }
        T::to_toml_example(&path_to_string(config_path))
            .map_err(|why| format!("Failed to write example config: {why}"))?;
        println!("Please Update the config with sensible values!");
        return Err("Config File not Present yet!".to_owned());
    }
    Ok(())
}

/// # Errors
///
/// Fails if the file cannot be read or parsed, writing an example next to it in the latter case.
pub fn read_config_file<T: TomlExample + DeserializeOwned>(
    config_path: &Path,
) -> Result<T, String> {
    let text = std::fs::read_to_string(config_path)
        .map_err(|why| format!("Failed to read Config File: {why}"))?;
    let data = match toml::from_str(&text) {
        Ok(good_data) => good_data,
        Err(why) => {
            println!("Please Update your config {why} ");
            let mut example_config_path = config_path.as_os_str().to_owned();
            example_config_path.push("_new");
            let example_config_path = PathBuf::from(example_config_path);
            println!(
                "Writing example config to {}",
                path_to_string(&example_config_path)
            );
            T::to_toml_example(&path_to_string(&example_config_path))
                .map_err(|why| format!("Failed to write example config: {why}"))?;
            return Err("Failed to read Config File.".to_owned());
        }
    };
    Ok(data)
}

/// Read `config.toml` from `path_arg`, or from the XDG config dir if it is empty.
///
/// # Errors
///
/// A message for the user if the config is missing or broken.
pub fn init(path_arg: &str) -> Result<Config, String> {
    let strategy = app_strategy()?;
    let config_path_base = if path_arg.is_empty() {
        strategy.config_dir()
    } else {
        println!(
            "Please consider using the default config file location. {}",
            path_to_string(&strategy.config_dir())
        );
        path_arg.into()
    };
    let config_path = config_path_base.join("config.toml");

    println!("Config Path: {:?}", config_path.as_os_str());

    check_config_exists_else_create_new::<ConfigOptions>(&config_path)?;

    let data = read_config_file::<ConfigOptions>(&config_path)?;

    let mut config = Config::new(strategy);
    config.set_config_data(data);
    Ok(config)
}

impl Default for Config {
    fn default() -> Self {
        Self::new(app_strategy().expect("Could not create default strategy"))
    }
}

impl Config {
    fn new(strategy: Xdg) -> Self {
        Self {
            data: ConfigOptions::default(),
            strategy,
        }
    }
    pub fn set_config_data(&mut self, data: ConfigOptions) {
        self.data = data;
    }
    pub fn set_strategy(&mut self, strategy: Xdg) {
        self.strategy = strategy;
    }
    #[must_use]
    pub fn get_http_dump_dir(&self) -> Option<PathBuf> {
        if self.data.general.dump_failed_requests_to_file {
            Some(self.get_data_dir())
        } else {
            None
        }
    }

    #[must_use]
    pub fn get_data_dir(&self) -> PathBuf {
        self.strategy.data_dir()
    }

    /// The account section as explicit request configuration.
    #[must_use]
    pub fn get_account(&self) -> NCAccount {
        let general = &self.data.general;
        let account = if general.account.is_empty() {
            format!("{} {}", general.user, general.url)
        } else {
            general.account.clone()
        };
        NCAccount {
            server_url: general.url.clone(),
            account,
            user: general.user.clone(),
            password: general.app_pw.clone(),
            user_agent: Some(general.user_agent.clone()).filter(|agent| !agent.is_empty()),
            custom_headers: parse_custom_headers(&general.custom_headers),
        }
    }

    #[must_use]
    pub fn get_push_device(&self) -> NCPushDevice {
        let push = &self.data.push;
        NCPushDevice::new(
            &push.device_identifier,
            &push.device_public_key,
            &push.app_type,
        )
    }

    /// Warn and up to stderr, everything to `app.log` in the data dir if enabled.
    ///
    /// # Errors
    ///
    /// Fails if the log file cannot be created or a logger is already installed.
    pub fn config_logging(&self) -> Result<(), Box<dyn std::error::Error>> {
        use log4rs::{
            append::{
                console::{ConsoleAppender, Target},
                file::FileAppender,
            },
            config::{Appender, Logger, Root},
            encode::pattern::PatternEncoder,
            filter::threshold::ThresholdFilter,
        };

        // Build a stderr logger.
        let stderr = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
            .target(Target::Stderr)
            .build();

        let mut config_builder = log4rs::Config::builder()
            .appender(
                Appender::builder()
                    .filter(Box::new(ThresholdFilter::new(LevelFilter::Warn)))
                    .build("stderr", Box::new(stderr)),
            )
            .logger(Logger::builder().build("reqwest::connect", LevelFilter::Info));
        let mut root = Root::builder().appender("stderr");
        if self.data.general.log_to_file {
            let log_path = self.strategy.data_dir().join("app.log");
            // Pattern: https://docs.rs/log4rs/*/log4rs/encode/pattern/index.html
            let log_file = FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(
                    "{d(%H:%M:%S)} {l} {M}: {m}{n}",
                )))
                .append(false)
                .build(log_path)?;
            config_builder =
                config_builder.appender(Appender::builder().build("logfile", Box::new(log_file)));
            root = root.appender("logfile");
        }
        let config = config_builder.build(root.build(LevelFilter::Debug))?;

        log4rs::init_config(config)?;
        Ok(())
    }
}

/// Turn `"Name: Value"` lines into a header map, skipping lines without a colon.
fn parse_custom_headers(lines: &[String]) -> HashMap<String, String> {
    lines
        .iter()
        .filter_map(|line| {
            let parsed = line
                .split_once(':')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()));
            if parsed.is_none() {
                log::warn!("Ignoring custom header without ':' {line:?}");
            }
            parsed
        })
        .collect()
}
