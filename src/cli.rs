//! Command-line interface definition for adminctl
//!
//! One subcommand per console screen: authentication, directory listings,
//! chat history, the video catalog, push notifications and smart-response
//! training.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/adminctl.yaml";

/// adminctl - Admin console for the messaging and subscription backend
///
/// Manage users, chats, the video catalog and push notifications from the
/// terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "adminctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: Option<String>,

    /// Backend base URL (overrides config and ADMINCTL_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Login id (email or phone)
        #[arg(short = 'u', long)]
        login_id: String,

        /// Password; read from stdin when omitted
        #[arg(short, long, env = "ADMINCTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the stored session role
    Whoami,

    /// Register a new admin account
    Signup {
        /// Email address of the new admin
        #[arg(short, long)]
        email: String,

        /// Password of the new admin; read from stdin when omitted
        #[arg(short, long, env = "ADMINCTL_SIGNUP_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Display name
        #[arg(long)]
        full_name: Option<String>,
    },

    /// List registered users
    Users {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List admin accounts
    Admins {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List subscribers
    Subscribers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show auto-pay and revenue statistics
    Analytics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse chat conversations
    Chats {
        /// Chat subcommand
        #[command(subcommand)]
        command: ChatCommand,
    },

    /// Manage the video catalog
    Videos {
        /// Video subcommand
        #[command(subcommand)]
        command: VideoCommand,
    },

    /// Send a push notification to all devices
    Notify {
        /// Notification title (max 50 characters)
        #[arg(short, long)]
        title: String,

        /// Notification body (max 150 characters)
        #[arg(short, long)]
        body: String,

        /// Image shown with the notification
        #[arg(long)]
        image_url: Option<String>,

        /// Page opened when the notification is tapped
        #[arg(long)]
        target_url: Option<String>,
    },

    /// Teach the assistant a question/answer pair with audio
    Train {
        /// Question the user asks
        #[arg(short, long)]
        question: String,

        /// Answer the assistant gives
        #[arg(short, long)]
        answer: String,

        /// Local audio file to upload
        #[arg(long, conflicts_with = "audio_url", required_unless_present = "audio_url")]
        audio_file: Option<PathBuf>,

        /// URL of already hosted audio
        #[arg(long)]
        audio_url: Option<String>,
    },
}

/// Chat subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ChatCommand {
    /// List conversations
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the history of one conversation
    History {
        /// User id of the conversation
        user_id: String,

        /// Number of pages to load, newest first
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export every conversation grouped by user email
    Export {
        /// Only include conversations whose email contains this text
        #[arg(short, long)]
        email: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Video catalog subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum VideoCommand {
    /// List leaders and/or products videos
    List {
        /// Only this catalog (leaders, products)
        #[arg(short = 't', long = "type")]
        video_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import videos from a batch of URLs
    Import {
        /// URLs to import; whitespace-separated lists are split
        urls: Vec<String>,

        /// Read URLs from a file ("-" for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Target catalog (leaders, products)
        #[arg(short = 't', long = "type")]
        video_type: String,

        /// Category, required for products
        #[arg(long)]
        category: Option<String>,
    },

    /// Edit a video's title, description or category
    Edit {
        /// Catalog of the video (leaders, products)
        #[arg(short = 't', long = "type")]
        video_type: String,

        /// Video id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New category (products only)
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a video
    Delete {
        /// Catalog of the video (leaders, products)
        #[arg(short = 't', long = "type")]
        video_type: String,

        /// Video id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some(DEFAULT_CONFIG_PATH.to_string()),
            api_url: None,
            verbose: false,
            json_logs: false,
            command: Commands::Whoami,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some(DEFAULT_CONFIG_PATH.to_string()));
        assert!(cli.api_url.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::try_parse_from([
            "adminctl", "login", "--login-id", "admin@example.com", "--password", "pw",
        ])
        .unwrap();
        match cli.command {
            Commands::Login { login_id, password } => {
                assert_eq!(login_id, "admin@example.com");
                assert_eq!(password.as_deref(), Some("pw"));
            }
            _ => panic!("Expected Login command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "adminctl",
            "users",
            "--api-url",
            "http://localhost:5000",
            "--verbose",
            "--json-logs",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:5000"));
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Users { json: true }));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::try_parse_from(["adminctl", "--config", "custom.yaml", "whoami"]).unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
    }

    #[test]
    fn test_cli_parse_videos_import() {
        let cli = Cli::try_parse_from([
            "adminctl",
            "videos",
            "import",
            "--type",
            "products",
            "--category",
            "Skincare",
            "https://youtu.be/a",
            "https://youtu.be/b",
        ])
        .unwrap();
        match cli.command {
            Commands::Videos {
                command:
                    VideoCommand::Import {
                        urls,
                        file,
                        video_type,
                        category,
                    },
            } => {
                assert_eq!(urls.len(), 2);
                assert!(file.is_none());
                assert_eq!(video_type, "products");
                assert_eq!(category.as_deref(), Some("Skincare"));
            }
            _ => panic!("Expected Videos Import command"),
        }
    }

    #[test]
    fn test_cli_parse_videos_edit() {
        let cli = Cli::try_parse_from([
            "adminctl", "videos", "edit", "-t", "leaders", "abc", "--title", "New",
        ])
        .unwrap();
        match cli.command {
            Commands::Videos {
                command: VideoCommand::Edit { id, title, description, .. },
            } => {
                assert_eq!(id, "abc");
                assert_eq!(title.as_deref(), Some("New"));
                assert!(description.is_none());
            }
            _ => panic!("Expected Videos Edit command"),
        }
    }

    #[test]
    fn test_cli_parse_chat_history_pages() {
        let cli = Cli::try_parse_from(["adminctl", "chats", "history", "u1", "--pages", "3"]).unwrap();
        match cli.command {
            Commands::Chats {
                command: ChatCommand::History { user_id, pages, json },
            } => {
                assert_eq!(user_id, "u1");
                assert_eq!(pages, 3);
                assert!(!json);
            }
            _ => panic!("Expected Chats History command"),
        }
    }

    #[test]
    fn test_cli_train_requires_exactly_one_audio_source() {
        assert!(Cli::try_parse_from(["adminctl", "train", "-q", "Q", "-a", "A"]).is_err());
        assert!(Cli::try_parse_from([
            "adminctl", "train", "-q", "Q", "-a", "A", "--audio-file", "a.mp3", "--audio-url",
            "https://cdn.example.com/a.mp3",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "adminctl", "train", "-q", "Q", "-a", "A", "--audio-url", "https://cdn.example.com/a.mp3",
        ])
        .is_ok());
    }

    #[test]
    fn test_cli_parse_missing_command() {
        assert!(Cli::try_parse_from(["adminctl"]).is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        assert!(Cli::try_parse_from(["adminctl", "invalid"]).is_err());
    }
}
