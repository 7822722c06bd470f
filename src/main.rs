use clap::Parser;
use push_sdk::config::keys;
use push_sdk::{
    utils, BundledConfig, ConfigResolver, DeviceProfile, FileStore, PersistedState,
    create_analytics, create_registration,
};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};


/// Push SDK CLI Application
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Push server URL (e.g., https://push.example.com/ag-push)
    #[arg(short, long, env = "PUSH_SERVER_URL")]
    server: Option<String>,

    /// Variant ID
    #[arg(long, env = "PUSH_VARIANT_ID")]
    variant_id: Option<String>,

    /// Variant secret
    #[arg(long, env = "PUSH_VARIANT_SECRET")]
    variant_secret: Option<String>,

    /// Device token (hex)
    #[arg(short, long)]
    token: Option<String>,

    /// Device alias
    #[arg(short, long)]
    alias: Option<String>,

    /// Categories (repeatable)
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Operating system name
    #[arg(long)]
    operating_system: Option<String>,

    /// Operating system version
    #[arg(long)]
    os_version: Option<String>,

    /// Device type
    #[arg(long)]
    device_type: Option<String>,

    /// Bundled push configuration file (JSON)
    #[arg(short = 'f', long)]
    config: Option<String>,

    /// State file holding the last registration
    #[arg(long, default_value = "push-state.json")]
    state: String,

    /// Operation mode (register/metrics)
    #[arg(short, long, default_value = "register")]
    mode: String,

    /// Push message id (metrics mode)
    #[arg(long)]
    message_id: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    utils::initialize_logging(args.log_level.as_str());

    let store: Arc<dyn PersistedState> = Arc::new(FileStore::open(&args.state)?);

    match args.mode.as_str() {
        "register" => run_register_mode(&args, store).await,
        "metrics" => run_metrics_mode(&args, store).await,
        _ => {
            eprintln!("Invalid mode. Use 'register' or 'metrics'");
            Ok(())
        }
    }
}

async fn run_register_mode(
    args: &Args,
    store: Arc<dyn PersistedState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut resolver = ConfigResolver::new();
    if let Some(path) = &args.config {
        resolver = resolver.with_bundle(BundledConfig::from_file(path)?);
    }

    let mut registration = create_registration(None, store)?.with_config(resolver);

    // 命令行参数作为 override
    let mut overrides = HashMap::new();
    if let Some(server) = &args.server {
        overrides.insert(keys::SERVER_URL.to_string(), server.clone());
    }
    if let Some(variant_id) = &args.variant_id {
        overrides.insert(keys::VARIANT_ID.to_string(), variant_id.clone());
    }
    if let Some(variant_secret) = &args.variant_secret {
        overrides.insert(keys::VARIANT_SECRET.to_string(), variant_secret.clone());
    }
    if !overrides.is_empty() {
        registration.override_properties(overrides);
    }

    let token = match &args.token {
        Some(hex_token) => {
            Some(utils::decode_token(hex_token).ok_or("Device token must be a hex string")?)
        }
        None => None,
    };

    info!("Registering device (state: {})", args.state);

    let result = registration
        .register(Some(|mut profile: DeviceProfile| {
            if let Some(token) = token {
                profile = profile.with_device_token(token);
            }
            if let Some(alias) = &args.alias {
                profile = profile.with_alias(alias.clone());
            }
            if !args.categories.is_empty() {
                profile = profile.with_categories(args.categories.iter().cloned());
            }
            if let Some(os) = &args.operating_system {
                profile = profile.with_operating_system(os.clone());
            }
            if let Some(version) = &args.os_version {
                profile = profile.with_os_version(version.clone());
            }
            if let Some(device_type) = &args.device_type {
                profile = profile.with_device_type(device_type.clone());
            }
            profile
        }))
        .await;

    match result {
        Ok(()) => {
            info!("Device registration completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Device registration failed: {}", e);
            error!("Error code: {}", e.error_code());
            Err(format!("Device registration failed: {}", e).into())
        }
    }
}

async fn run_metrics_mode(
    args: &Args,
    store: Arc<dyn PersistedState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let message_id = args.message_id.clone()
        .ok_or("Message id is required in metrics mode")?;

    let analytics = create_analytics(store)?;

    match analytics.send_metrics(&message_id).await {
        Ok(()) => {
            info!("Metrics sent for message {}", message_id);
            Ok(())
        }
        Err(e) => {
            error!("Sending metrics failed: {}", e);
            error!("Error code: {}", e.error_code());
            Err(format!("Sending metrics failed: {}", e).into())
        }
    }
}
