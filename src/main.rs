use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use safelink_cli::api::{ApiClient, HealthApi};
use safelink_cli::cli::{self, CliArgs};
use safelink_cli::config::config::Config;
use safelink_cli::services::RequestService;
use safelink_cli::session_store::SessionStore;
use safelink_cli::state::AppState;
use safelink_cli::ui::renderer::RenderContext;
use safelink_cli::ui::tui_app::{run_tui_app, TuiApp};
use safelink_cli::utils::logging;

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to point SafeLink at your backend and set your location.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_buffer = logging::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match CliArgs::parse(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if args.help {
        cli::print_help();
        return Ok(());
    }

    if args.init_config {
        let config = Config::init_wizard()?;
        println!("\nConfiguration initialized successfully!");
        if !config.display.use_glyphs {
            println!("Note: Simple mode enabled (ASCII icons)");
        }
        return Ok(());
    }

    if args.generate_config {
        return generate_config();
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {}", e);
        Config::default()
    });

    let base_url = config.resolve_base_url(args.api.as_deref());
    info!("Using backend {}", base_url);
    let api: Arc<dyn HealthApi> = Arc::new(ApiClient::new(&base_url));
    let location = config.location_provider(args.location);
    let store = SessionStore::new()?;

    if let Some(command) = args.command {
        let result = cli::run_command(
            command,
            api.as_ref(),
            location.as_ref(),
            &store,
            config.api.hospital_radius_meters,
        )
        .await;
        if result.is_err() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let session = if config.behavior.remember_session {
        store.load_session()
    } else {
        None
    };
    if let Some(session) = &session {
        info!("Restored session for user {}", session.user_id);
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let mut requests =
        RequestService::new(api, location, tx, config.api.hospital_radius_meters);
    if config.behavior.remember_session {
        requests = requests.with_session_store(store);
    }

    let context = RenderContext {
        icons: config.display.active_icons(),
        show_key_hints: config.display.show_key_hints,
        backend: base_url,
        logs: Some(log_buffer),
    };

    let app = TuiApp::new(AppState::new(session), requests, rx, context)
        .with_auto_load_history(config.behavior.auto_load_history);
    run_tui_app(app)?;

    if let Some(path) = logging::log_file_path() {
        eprintln!("Logs written to {}", path.display());
    }
    Ok(())
}
