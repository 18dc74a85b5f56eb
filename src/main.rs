use anyhow::Result;
use clap::{Parser, Subcommand};

use teamsheet::cli::{
    handle_attendance_command, handle_audit_command, handle_token_command, AttendanceCommands,
    AuditCommands, TokenCommands,
};
use teamsheet::config::{Settings, TeamsheetPaths};
use teamsheet::logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "teamsheet",
    version,
    about = "Attendance confirmation links and audit log tooling",
    long_about = "Teamsheet issues and verifies signed, expiring attendance \
                  confirmation links, records confirmations at most once, and \
                  reads back the append-only audit trail."
)]
struct Cli {
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Confirmation token commands
    #[command(subcommand)]
    Token(TokenCommands),

    /// Audit log commands
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Attendance confirmation commands
    #[command(subcommand)]
    Attendance(AttendanceCommands),

    /// Write default settings to the config directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let paths = TeamsheetPaths::new()?;
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Token(cmd)) => handle_token_command(&settings, cmd)?,
        Some(Commands::Audit(cmd)) => handle_audit_command(&paths, cmd)?,
        Some(Commands::Attendance(cmd)) => handle_attendance_command(&paths, &settings, cmd)?,
        Some(Commands::Init) => {
            println!("Initializing Teamsheet at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            println!("Settings written to {}", paths.settings_file().display());
        }
        Some(Commands::Config) => {
            println!("Teamsheet Configuration");
            println!("=======================");
            println!("Base directory:     {}", paths.base_dir().display());
            println!("Settings file:      {}", paths.settings_file().display());
            println!("Audit log:          {}", paths.audit_log().display());
            println!("Confirmations file: {}", paths.confirmations_file().display());
            println!();
            println!("Settings:");
            println!("  Base URL:          {}", settings.base_url);
            println!("  Confirmation path: {}", settings.confirmation_path);
            println!("  Token validity:    {}h", settings.token_validity_hours);
            println!("  Secret env var:    {}", settings.secret_env_var);
        }
        None => {
            println!("Teamsheet - attendance confirmation and audit tooling");
            println!();
            println!("Run 'teamsheet --help' for usage information.");
        }
    }

    Ok(())
}
