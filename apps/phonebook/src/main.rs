use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use client_core::{
    ContactListController, ControllerOptions, DirectoryClient, HttpDirectoryClient,
    LocalDirectory, ValidationPolicy,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{execute, parse_command, render, Flow};
use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Terminal phonebook backed by a REST contact directory")]
pub struct Args {
    /// Settings file; missing files are ignored.
    #[arg(long, default_value = "phonebook.toml")]
    pub config: PathBuf,
    #[arg(long)]
    pub server_url: Option<String>,
    #[arg(long)]
    pub base_path: Option<String>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// `local` or `remote-only`.
    #[arg(long)]
    pub validation: Option<ValidationPolicy>,
    /// Keep contacts in a local SQLite database instead of a server.
    #[arg(long)]
    pub offline: bool,
    #[arg(long)]
    pub database_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;
    let directory = open_directory(&settings).await?;
    let mut controller = ContactListController::with_options(
        directory,
        ControllerOptions {
            validation: settings.validation,
            ..ControllerOptions::default()
        },
    );

    let mut stdout = io::stdout();
    writeln!(stdout, "Phonebook")?;
    controller.load().await;
    render(&controller, &mut stdout)?;
    writeln!(stdout, "type 'help' for commands")?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(stdout, "{message}")?;
                continue;
            }
        };
        let flow = execute(&mut controller, command, &mut confirm_on_stdin, &mut stdout).await?;
        if flow == Flow::Exit {
            break;
        }
        controller.clear_expired_notification();
    }

    info!("phonebook session ended");
    Ok(())
}

async fn open_directory(settings: &Settings) -> Result<Box<dyn DirectoryClient>> {
    if settings.offline {
        info!(database_url = %settings.database_url, "using offline directory");
        return Ok(Box::new(LocalDirectory::open(&settings.database_url).await?));
    }

    let client = HttpDirectoryClient::with_timeout(
        &settings.server_url,
        &settings.base_path,
        settings.request_timeout,
    )?;
    info!(url = %client.persons_url(), "using remote directory");
    Ok(Box::new(client))
}

/// Blocks on stdin for a yes/no answer; anything but `y`/`yes` declines.
fn confirm_on_stdin(prompt: &str) -> bool {
    let mut stdout = io::stdout();
    if write!(stdout, "{prompt} [y/N] ")
        .and_then(|_| stdout.flush())
        .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
