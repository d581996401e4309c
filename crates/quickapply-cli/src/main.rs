use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use quickapply_cli::commands;
use quickapply_cli::commands::run::RunOverrides;
use quickapply_cli::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quickapply")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Automates quick-apply job applications in a real browser",
    long_about = "quickapply logs into the job board, searches for listings matching your title \
                  and location, and submits quick-apply applications, answering form questions \
                  from your resume. Runs stop at a daily application limit or a session time limit."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for listings and apply to them
    Run {
        /// Path to the JSON config file [default: config.json]
        #[arg(short, long, value_name = "FILE", env = "QUICKAPPLY_CONFIG")]
        config: Option<PathBuf>,

        /// Path to the Chrome executable
        #[arg(long, value_name = "PATH")]
        chrome_path: Option<PathBuf>,

        /// Persistent browser profile name (keeps the login between runs)
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,

        /// Do not submit the login form (the profile is already signed in)
        #[arg(long)]
        skip_login: bool,

        /// Directory for the debug log file
        #[arg(long, value_name = "DIR", default_value = "logs")]
        log_dir: PathBuf,
    },

    /// Validate the configuration and print it with secrets masked
    Config {
        /// Path to the JSON config file [default: config.json]
        #[arg(short, long, value_name = "FILE", env = "QUICKAPPLY_CONFIG")]
        config: Option<PathBuf>,

        /// Include the site selectors in the output
        #[arg(long)]
        show_selectors: bool,
    },

    /// Print the text extracted from a resume (.pdf, .docx or .txt)
    Resume {
        /// Path to the resume file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the job search URL for the configured title and location
    SearchUrl {
        /// Path to the JSON config file [default: config.json]
        #[arg(short, long, value_name = "FILE", env = "QUICKAPPLY_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for quickapply.

SUPPORTED SHELLS:
  bash, zsh, fish, powershell, elvish

INSTALLATION:
  bash:  quickapply completion bash >> ~/.bashrc
  zsh:   quickapply completion zsh > ~/.zfunc/_quickapply
  fish:  quickapply completion fish > ~/.config/fish/completions/quickapply.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // .env values count as environment overrides
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Commands::Run { log_dir, .. } => Some(log_dir.as_path()),
        _ => None,
    };
    let _logging = logging::init(cli.verbose, log_dir);

    match &cli.command {
        Commands::Run {
            config,
            chrome_path,
            profile,
            headless,
            skip_login,
            ..
        } => commands::run::execute(
            config.as_deref(),
            RunOverrides {
                chrome_path: chrome_path.clone(),
                profile: profile.clone(),
                headless: *headless,
                skip_login: *skip_login,
            },
        ),
        Commands::Config {
            config,
            show_selectors,
        } => commands::config::execute(config.as_deref(), *show_selectors),
        Commands::Resume { file } => commands::resume::execute(file),
        Commands::SearchUrl { config } => commands::search_url::execute(config.as_deref()),
        Commands::Completion { shell } => commands::completion::execute(*shell, &mut Cli::command()),
    }
}

