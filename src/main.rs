//! Command line front end of ncpush-rs.
//!
//! ``` bash
//! ncpush-rs subscribe --device-identifier my-laptop
//! ncpush-rs -c ~/.config/ncpush-rs/ unsubscribe
//! ```

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use ncpush::{
    backend::{
        nc_push::NCPush,
        nc_request::{NCPushDevice, NCRequest},
    },
    config,
};

/// Argument struct for CLI Args. Using the [`clap`] crate.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the configuration File, if omitted will try default config paths.
    /// Default XDG based path is generally encouraged.
    #[arg(short, long, value_name = "PATH", default_value = "")]
    config_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register this device for push notifications.
    Subscribe {
        /// Overrides `push.device_identifier` from the config.
        #[arg(long)]
        device_identifier: Option<String>,
        /// Overrides `push.device_public_key` from the config.
        #[arg(long)]
        device_public_key: Option<String>,
        /// Overrides `push.app_type` from the config.
        #[arg(long)]
        app_type: Option<String>,
    },
    /// Remove the push registration of this device.
    Unsubscribe,
}

/// Reads Console [`Args`] and [`config`].
/// Creates the requester and runs the chosen command once.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = config::init(&args.config_path).map_err(|why| eyre!(why))?;
    config
        .config_logging()
        .map_err(|why| eyre!("Failed to init logging: {why}"))?;

    // check if crate has alpha suffix in version
    let pre = env!("CARGO_PKG_VERSION_PRE");
    if !pre.is_empty() {
        log::warn!("Entering ncpush-rs, please be aware this is {pre} SW!");
    }

    let requester = NCRequest::new(&config)?;
    let push = NCPush::new(requester, &config);

    match args.command {
        Command::Subscribe {
            device_identifier,
            device_public_key,
            app_type,
        } => {
            let configured = push.device().clone();
            let device = NCPushDevice {
                device_identifier: device_identifier.unwrap_or(configured.device_identifier),
                device_public_key: device_public_key.unwrap_or(configured.device_public_key),
                app_type: app_type.unwrap_or(configured.app_type),
            };
            let push = push.with_device(device);
            let reply = push.subscribe().await;
            match (reply.signature(), reply.public_key()) {
                (Some(signature), Some(public_key)) => {
                    println!("account: {}", reply.account);
                    println!("signature: {signature}");
                    println!("publicKey: {public_key}");
                    Ok(())
                }
                _ => Err(eyre!(
                    "Subscribing {} failed with {}: {}",
                    reply.account,
                    reply.error_code(),
                    reply.error_description()
                )),
            }
        }
        Command::Unsubscribe => {
            let reply = push.unsubscribe().await;
            if reply.is_success() {
                println!("account: {} unsubscribed", reply.account);
                Ok(())
            } else {
                Err(eyre!(
                    "Unsubscribing {} failed with {}: {}",
                    reply.account,
                    reply.error_code(),
                    reply.error_description()
                ))
            }
        }
    }
}
