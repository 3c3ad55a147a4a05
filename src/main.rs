mod auth;
mod config;
mod db;
mod error;
mod http;
mod logging;
mod media;
mod upload;

use anyhow::Result;
use std::path::PathBuf;

use config::Config;
use http::AppState;
use media::MediaLibrary;
use upload::UploadStore;

fn parse_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("lankatours {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config_path
}

fn print_help() {
    println!(
        r#"lankatours - tour operator site and admin backend

USAGE:
    lankatours [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    LANKATOURS_LOG      Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/lankatours/config.toml"#
    );
}

/// Create the first admin account from the configured bootstrap credentials
/// when the admins table is empty. A no-op on every later start.
fn bootstrap_admin(db: &db::Database, config: &Config) -> Result<()> {
    if db.count_admins()? > 0 {
        return Ok(());
    }
    let (Some(email), Some(password)) =
        (&config.auth.bootstrap_email, &config.auth.bootstrap_password)
    else {
        tracing::warn!(
            "no admin accounts exist and no bootstrap credentials are configured; \
             the admin API will be unreachable"
        );
        return Ok(());
    };
    let hash = auth::hash_password(password)?;
    db.create_admin(email, "Administrator", &hash)?;
    tracing::info!("created bootstrap admin account {email}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = parse_args();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    let _ = logging::init(Some(Config::config_dir().join("logs")));

    // Load configuration
    let config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    // Initialize database
    let db = db::Database::open(&config.database.path, config.database.pool_size)?;
    db.initialize()?;
    bootstrap_admin(&db, &config)?;

    let state = AppState {
        db,
        uploads: UploadStore::new(config.uploads.dir.clone()),
        media: MediaLibrary::new(config.uploads.dir.clone()),
        session_ttl_hours: config.auth.session_ttl_hours,
        placeholder_image: config.uploads.placeholder_image.clone(),
    };
    let app = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("listening on {}", config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
