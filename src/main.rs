//! CLI entry point for quicksilver

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quicksilver::settings::{Language, LocalizedFields, LocalizedPatch, SettingsPatch};

#[derive(Parser)]
#[command(name = "quicksilver")]
#[command(version)]
#[command(about = "Site settings store and API for the Quicksilver blog and CMS", long_about = None)]
struct Cli {
    /// Set the deployment root (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new deployment
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Start the settings API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (overrides quicksilver.yml)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (overrides quicksilver.yml)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Inspect or edit site settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show {
        /// Resolve bilingual fields for one language (zh, en)
        #[arg(short, long)]
        lang: Option<Language>,
    },

    /// Update some settings, keeping the others
    Set(SetArgs),

    /// Print the path of the settings file
    Path,
}

#[derive(Args)]
struct SetArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    subtitle_zh: Option<String>,
    #[arg(long)]
    subtitle_en: Option<String>,
    #[arg(long)]
    description_zh: Option<String>,
    #[arg(long)]
    description_en: Option<String>,
    #[arg(long)]
    logo: Option<String>,
    #[arg(long)]
    favicon: Option<String>,
    #[arg(long)]
    author: Option<String>,
    /// Default site language (zh, en)
    #[arg(long)]
    language: Option<Language>,
    #[arg(long)]
    footer: Option<String>,
}

impl SetArgs {
    fn into_patch(self) -> SettingsPatch {
        SettingsPatch {
            title: self.title,
            subtitle: localized(self.subtitle_zh, self.subtitle_en),
            description: localized(self.description_zh, self.description_en),
            logo: self.logo,
            favicon: self.favicon,
            author: self.author,
            language: self.language,
            footer: self.footer,
        }
    }
}

fn localized(zh: Option<String>, en: Option<String>) -> Option<LocalizedPatch> {
    if zh.is_none() && en.is_none() {
        return None;
    }
    Some(LocalizedFields { zh, en }.into())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "quicksilver=debug,info"
    } else {
        "quicksilver=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine deployment root
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing deployment in {:?}", target_dir);
            quicksilver::commands::init::init_deployment(&target_dir)?;
            println!("Initialized Quicksilver deployment in {:?}", target_dir);
        }

        Commands::Serve { port, ip } => {
            let app = quicksilver::Quicksilver::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| app.config.server.ip.clone());
            let port = port.unwrap_or(app.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            quicksilver::server::start(&app, &ip, port).await?;
        }

        Commands::Settings { action } => {
            let app = quicksilver::Quicksilver::new(&base_dir)?;
            match action {
                SettingsAction::Show { lang } => quicksilver::commands::settings::show(&app, lang)?,
                SettingsAction::Set(args) => {
                    quicksilver::commands::settings::set(&app, args.into_patch())?
                }
                SettingsAction::Path => println!("{}", app.settings_path().display()),
            }
        }

        Commands::Version => {
            println!("quicksilver version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
