//! Command-line front end for clamkeeper.
//!
//! Run with: clamkeeper scan ~/Downloads

use clamkeeper::bootstrap::{self, Bootstrap, InstallPolicy, INSTALL_ATTEMPTED_ENV};
use clamkeeper::core::{default_config_root, quick_scan_target};
use clamkeeper::prelude::*;
use clamkeeper::version;

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clamkeeper")]
#[command(version, about = "ClamAV front end with automatic quarantine")]
struct Cli {
    /// Configuration directory (defaults to ~/.clamav-gui)
    #[arg(long, env = "CLAMKEEPER_CONFIG_ROOT", global = true)]
    config_root: Option<PathBuf>,

    /// Scanner binary
    #[arg(long, env = "CLAMKEEPER_SCANNER", default_value = "clamscan", global = true)]
    scanner: PathBuf,

    /// Signature updater binary
    #[arg(long, env = "CLAMKEEPER_UPDATER", default_value = "freshclam", global = true)]
    updater: PathBuf,

    /// Language for this run (en, pt); the saved preference is used otherwise
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do not try to install the scanner when it is missing
    #[arg(long, global = true)]
    no_install: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a file, or a folder recursively
    Scan {
        /// File or folder to scan
        path: PathBuf,

        /// Report infected files without moving them
        #[arg(long)]
        no_quarantine: bool,
    },

    /// Scan ~/Downloads, or ~/Desktop when there is no Downloads folder
    QuickScan {
        /// Report infected files without moving them
        #[arg(long)]
        no_quarantine: bool,
    },

    /// Update the virus databases
    Update,

    /// Manage quarantined files
    #[command(subcommand)]
    Quarantine(QuarantineCommand),

    /// Show or change the saved language
    Language {
        /// Language code (en, pt)
        code: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum QuarantineCommand {
    /// List quarantined files
    List,

    /// Move a quarantined file back to where it came from
    Restore {
        /// Stored file name, as shown by `list`
        name: String,
    },

    /// Permanently delete a quarantined file
    Delete {
        /// Stored file name, as shown by `list`
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("clamkeeper: {e}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let root = match (&cli.config_root, &home) {
        (Some(root), _) => root.clone(),
        (None, Some(home)) => default_config_root(home),
        (None, None) => return Err("HOME is not set; pass --config-root".into()),
    };

    let preferences = PreferenceStore::new(&root);
    let locale = match &cli.lang {
        Some(code) => {
            Locale::from_code(code).ok_or_else(|| format!("unknown language '{code}'"))?
        }
        None => preferences.load_language().await,
    };

    show_first_run_notice(&preferences, locale).await;

    let config = EngineConfig::default()
        .with_scanner(&cli.scanner)
        .with_updater(&cli.updater);
    let store = Arc::new(FilesystemQuarantine::new(&root));

    match cli.command {
        Command::Scan {
            path,
            no_quarantine,
        } => {
            ensure_engine(&config, !cli.no_install, locale).await?;
            let request = ScanRequest::for_target(path).with_auto_quarantine(!no_quarantine);
            let supervisor = Supervisor::new(config, store).with_locale(locale);
            Ok(follow(supervisor.start_scan(request)?, locale).await)
        }
        Command::QuickScan { no_quarantine } => {
            ensure_engine(&config, !cli.no_install, locale).await?;
            let Some(target) = home.as_deref().and_then(quick_scan_target) else {
                println!("{}", Catalog::lookup(locale, "no_quick_scan_target"));
                return Ok(ExitCode::from(2));
            };
            let request = ScanRequest::folder(target).with_auto_quarantine(!no_quarantine);
            let supervisor = Supervisor::new(config, store).with_locale(locale);
            Ok(follow(supervisor.start_scan(request)?, locale).await)
        }
        Command::Update => {
            ensure_engine(&config, !cli.no_install, locale).await?;
            let supervisor = Supervisor::new(config, store).with_locale(locale);
            Ok(follow(supervisor.start_update()?, locale).await)
        }
        Command::Quarantine(command) => Ok(manage_quarantine(store.as_ref(), command, locale).await),
        Command::Language { code } => change_language(&preferences, code, locale).await,
        Command::Version => {
            println!("{}", version::about_text(locale));
            println!();
            println!("{}", version::program_update_notice(locale));
            println!("{}", version::releases_url());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn show_first_run_notice(preferences: &PreferenceStore, locale: Locale) {
    if !preferences.first_run_notice_pending().await {
        return;
    }

    println!("{}", Catalog::lookup(locale, "admin_title"));
    println!("{}", Catalog::lookup(locale, "admin_notice"));
    println!();

    if let Err(e) = preferences.mark_first_run_notice_shown().await {
        tracing::warn!(error = %e, "Failed to record first-run notice");
    }
}

async fn ensure_engine(
    config: &EngineConfig,
    allow_install: bool,
    locale: Locale,
) -> Result<(), Box<dyn Error>> {
    let policy = InstallPolicy::from_env(allow_install);
    let (events, mut rx) = EventSender::channel();
    let outcome = bootstrap::ensure_engine(config, policy, &events, locale).await;
    while let Ok(event) = rx.try_recv() {
        if let RunnerEvent::Progress(line) = event {
            println!("{line}");
        }
    }

    match outcome? {
        Bootstrap::Ready { .. } => Ok(()),
        Bootstrap::Restart => Err(restart().into()),
    }
}

/// Replaces the current process with a fresh copy of itself, marked so it
/// does not install again. Only returns on failure.
#[cfg(unix)]
fn restart() -> std::io::Error {
    use std::os::unix::process::CommandExt;

    let program = match std::env::current_exe() {
        Ok(program) => program,
        Err(e) => return e,
    };
    std::process::Command::new(program)
        .args(std::env::args_os().skip(1))
        .env(INSTALL_ATTEMPTED_ENV, "1")
        .exec()
}

#[cfg(not(unix))]
fn restart() -> std::io::Error {
    std::io::Error::other("engine installed, start clamkeeper again")
}

async fn follow(mut job: JobHandle, locale: Locale) -> ExitCode {
    let cancel = job.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            cancel.cancel();
        }
    });

    while let Some(event) = job.next_event().await {
        match event {
            RunnerEvent::Progress(line) => println!("{line}"),
            RunnerEvent::Infected(path) => {
                tracing::debug!(path = %path.display(), "Infected");
            }
            RunnerEvent::Quarantined(entry) => {
                println!("  -> {}", entry.stored_path.display());
            }
            RunnerEvent::Stats(result) => println!("{}", result.render(locale)),
            RunnerEvent::Finished(completion) => println!("{}", completion.render(locale)),
        }
    }
    ctrl_c.abort();

    if job.wait().await.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

async fn manage_quarantine(
    store: &dyn QuarantineStore,
    command: QuarantineCommand,
    locale: Locale,
) -> ExitCode {
    let outcome = match command {
        QuarantineCommand::List => store.list().await.map(|entries| {
            if entries.is_empty() {
                println!("{}", Catalog::lookup(locale, "quarantine_empty"));
                return;
            }
            println!("{}", Catalog::lookup(locale, "quarantine_title"));
            for entry in &entries {
                println!("  {}  {}", entry.record.stored_filename, entry);
            }
        }),
        QuarantineCommand::Restore { name } => store.restore(&name).await.map(|path| {
            println!(
                "{}",
                Catalog::format(locale, "restored", &[("path", display(&path))])
            );
        }),
        QuarantineCommand::Delete { name } => store.delete(&name).await.map(|()| {
            println!("{}", Catalog::format(locale, "deleted", &[("name", name)]));
        }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                Catalog::format(locale, "error_message", &[("error", e.to_string())])
            );
            ExitCode::from(2)
        }
    }
}

async fn change_language(
    preferences: &PreferenceStore,
    code: Option<String>,
    current: Locale,
) -> Result<ExitCode, Box<dyn Error>> {
    let Some(code) = code else {
        for locale in Locale::ALL {
            let marker = if locale == current { "*" } else { " " };
            println!("{marker} {}  {}", locale.code(), locale.native_name());
        }
        return Ok(ExitCode::SUCCESS);
    };

    let locale = Locale::from_code(&code).ok_or_else(|| format!("unknown language '{code}'"))?;
    preferences.save_language(locale).await?;
    println!(
        "{}",
        Catalog::format(
            locale,
            "language_changed",
            &[("language", locale.native_name().to_string())]
        )
    );
    Ok(ExitCode::SUCCESS)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
