use armory::api::HttpBackend;
use armory::cli;
use armory::core::config::{self, CliOverrides, ResolvedConfig};
use armory::core::session::{GamerInfo, SessionContext};
use armory::proxy::{self, ProxyState};
use armory::tui;

use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "armory", about = "Browse and equip your Spartan's armor from the terminal")]
struct Args {
    /// Backend API base URL (overrides config and ARMORY_API_BASE_URL)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive armory screen (default)
    Tui,
    /// Run the image proxy
    Proxy {
        /// Port to listen on (overrides config and ARMORY_PROXY_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the equipped loadout
    Inventory,
    /// Equip a catalog item by id, or a custom kit by name
    Equip { target: String },
    /// Store a session record
    Login {
        gamertag: String,
        xuid: String,
        spartan_key: String,
        #[arg(long)]
        clearance: Option<String>,
    },
    /// Forget the stored session
    Logout,
}

fn init_logging(interactive: bool) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if interactive {
        // The terminal belongs to the UI; log to armory.log in the current directory
        if let Ok(log_file) = File::create("armory.log") {
            let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
        }
    } else {
        let _ = TermLogger::init(
            LevelFilter::Info,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        );
    }
}

fn open_session(resolved: &ResolvedConfig) -> Result<SessionContext, Box<dyn std::error::Error>> {
    let path = resolved
        .session_path
        .clone()
        .ok_or("could not determine a session file location; set [session] path in config")?;
    Ok(SessionContext::open(path)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let command = args.command.unwrap_or(Command::Tui);
    init_logging(matches!(command, Command::Tui));

    let file_config = config::load_config()?;
    let overrides = CliOverrides {
        api_base_url: args.api_base_url,
        proxy_port: match &command {
            Command::Proxy { port } => *port,
            _ => None,
        },
    };
    let resolved = config::resolve(&file_config, &overrides);
    log::info!(
        "Armory starting: api={} proxy={}",
        resolved.api_base_url,
        resolved.proxy_base_url
    );

    match command {
        Command::Proxy { .. } => {
            let state = ProxyState::new(&resolved.upstream_base_url, resolved.timeout)?;
            proxy::serve(resolved.proxy_port, state).await?;
        }
        Command::Tui => {
            let session = open_session(&resolved)?;
            tui::run(resolved, session)?;
        }
        Command::Inventory => {
            let mut session = open_session(&resolved)?;
            let backend = HttpBackend::new(&resolved.api_base_url, resolved.timeout)?;
            cli::show_inventory(&backend, &mut session, &mut std::io::stdout()).await?;
        }
        Command::Equip { target } => {
            let mut session = open_session(&resolved)?;
            let backend = HttpBackend::new(&resolved.api_base_url, resolved.timeout)?;
            cli::equip(&backend, &mut session, &target, &mut std::io::stdout()).await?;
        }
        Command::Login {
            gamertag,
            xuid,
            spartan_key,
            clearance,
        } => {
            let mut session = open_session(&resolved)?;
            let info = GamerInfo {
                gamertag,
                xuid,
                spartan_key,
                clearance,
                extra: Default::default(),
            };
            cli::login(&mut session, info)?;
            println!("Session stored at {}", session.path().display());
        }
        Command::Logout => {
            let mut session = open_session(&resolved)?;
            let backend = HttpBackend::new(&resolved.api_base_url, resolved.timeout)?;
            cli::logout(&backend, &mut session).await;
            println!("Logged out");
        }
    }

    Ok(())
}
