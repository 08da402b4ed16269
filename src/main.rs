//! adminctl - Admin console for the messaging and subscription backend
//!
#![doc = "adminctl - Admin console CLI"]
#![doc = "Main entry point for the adminctl application."]

use anyhow::Result;
use colored::Colorize;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use adminctl::cli::{ChatCommand, Cli, Commands, VideoCommand, DEFAULT_CONFIG_PATH};
use adminctl::commands::{self, Context};
use adminctl::config::Config;
use adminctl::error::api_error;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    if let Err(error) = run(cli).await {
        report_error(&error);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let ctx = Context::from_config(config)?;

    // Execute command
    match cli.command {
        Commands::Login { login_id, password } => {
            commands::auth::login(&ctx, &login_id, password).await
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Signup {
            email,
            password,
            full_name,
        } => commands::auth::signup(&ctx, &email, password, full_name).await,
        Commands::Users { json } => commands::directory::list_users(&ctx, json).await,
        Commands::Admins { json } => commands::directory::list_admins(&ctx, json).await,
        Commands::Subscribers { json } => commands::directory::list_subscribers(&ctx, json).await,
        Commands::Analytics { json } => commands::directory::show_analytics(&ctx, json).await,
        Commands::Chats { command } => {
            tracing::info!("Starting chat command");
            match command {
                ChatCommand::List { json } => commands::chats::list_conversations(&ctx, json).await,
                ChatCommand::History {
                    user_id,
                    pages,
                    json,
                } => commands::chats::show_history(&ctx, &user_id, pages, json).await,
                ChatCommand::Export { email, json } => {
                    commands::chats::export_chats(&ctx, email.as_deref(), json).await
                }
            }
        }
        Commands::Videos { command } => {
            tracing::info!("Starting video catalog command");
            match command {
                VideoCommand::List { video_type, json } => {
                    commands::videos::list_videos(&ctx, video_type.as_deref(), json).await
                }
                VideoCommand::Import {
                    urls,
                    file,
                    video_type,
                    category,
                } => {
                    commands::videos::import_videos(
                        &ctx,
                        &urls,
                        file.as_deref(),
                        &video_type,
                        category.as_deref(),
                    )
                    .await
                }
                VideoCommand::Edit {
                    video_type,
                    id,
                    title,
                    description,
                    category,
                } => {
                    commands::videos::edit_video(
                        &ctx,
                        &video_type,
                        &id,
                        title.as_deref(),
                        description.as_deref(),
                        category.as_deref(),
                    )
                    .await
                }
                VideoCommand::Delete { video_type, id } => {
                    commands::videos::delete_video(&ctx, &video_type, &id).await
                }
            }
        }
        Commands::Notify {
            title,
            body,
            image_url,
            target_url,
        } => commands::notify::send_notification(&ctx, &title, &body, image_url, target_url).await,
        Commands::Train {
            question,
            answer,
            audio_file,
            audio_url,
        } => {
            commands::notify::train_smart_response(&ctx, &question, &answer, audio_file, audio_url)
                .await
        }
    }
}

/// Print the error the way the console shows it in place of a screen
fn report_error(error: &anyhow::Error) {
    match api_error(error) {
        Some(api) => {
            eprintln!("{} {}", "Error:".red().bold(), api.operator_message());
            if api.requires_login() {
                eprintln!("Run `adminctl login --login-id <id>` with an admin account.");
            }
        }
        None => eprintln!("{} {:#}", "Error:".red().bold(), error),
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_level = if verbose { "adminctl=debug" } else { "adminctl=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
