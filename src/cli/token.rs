//! Token CLI commands
//!
//! Issues, verifies and links attendance confirmation tokens.

use chrono::{Duration, Utc};
use clap::Subcommand;

use crate::config::Settings;
use crate::crypto::SigningSecret;
use crate::display::format_payload;
use crate::error::{TeamsheetError, TeamsheetResult};
use crate::token::{confirmation_url, token_from_url, TokenService};

/// Token subcommands
#[derive(Subcommand)]
pub enum TokenCommands {
    /// Issue a confirmation token
    Issue {
        /// Session ID
        #[arg(long)]
        session: String,
        /// Subject (athlete) ID
        #[arg(long)]
        subject: String,
        /// Validity in hours (defaults to the configured validity)
        #[arg(long)]
        hours: Option<u32>,
    },
    /// Verify a token or confirmation link and print its payload
    Verify {
        /// Token, or a full confirmation URL
        token: String,
        /// Print a readable summary instead of JSON
        #[arg(long)]
        human: bool,
    },
    /// Build a confirmation URL
    Url {
        /// Session ID
        #[arg(long)]
        session: String,
        /// Subject (athlete) ID
        #[arg(long)]
        subject: String,
        /// Base URL of the app (defaults to the configured base URL)
        #[arg(long)]
        base_url: Option<String>,
        /// Validity in hours (defaults to the configured validity)
        #[arg(long)]
        hours: Option<u32>,
    },
}

/// Build the token service from the configured secret
pub fn token_service(settings: &Settings) -> TeamsheetResult<TokenService> {
    let secret = SigningSecret::from_env(&settings.secret_env_var)?;
    Ok(TokenService::new(secret).with_confirmation_path(settings.confirmation_path.clone()))
}

fn validity(settings: &Settings, hours: Option<u32>) -> Duration {
    hours
        .map(|h| Duration::hours(i64::from(h)))
        .unwrap_or_else(|| settings.token_validity())
}

/// Error shown for every rejected token
pub fn invalid_link() -> TeamsheetError {
    TeamsheetError::Token("link invalid or expired".to_string())
}

/// Handle a token command
pub fn handle_token_command(settings: &Settings, cmd: TokenCommands) -> TeamsheetResult<()> {
    let service = token_service(settings)?;

    match cmd {
        TokenCommands::Issue {
            session,
            subject,
            hours,
        } => {
            let token = service.issue(&session, &subject, validity(settings, hours))?;
            println!("{}", token);
        }

        TokenCommands::Verify { token, human } => {
            let token = token_from_url(&token).unwrap_or(token);
            let now = Utc::now();
            let payload = service.verify_at(&token, now).ok_or_else(invalid_link)?;

            if human {
                println!("{}", format_payload(&payload, now));
            } else {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }

        TokenCommands::Url {
            session,
            subject,
            base_url,
            hours,
        } => {
            let base_url = base_url.unwrap_or_else(|| settings.base_url.clone());
            let token = service.issue(&session, &subject, validity(settings, hours))?;
            println!(
                "{}",
                confirmation_url(&base_url, &settings.confirmation_path, &token)
            );
        }
    }

    Ok(())
}
