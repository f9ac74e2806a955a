//! git-credential-crypt-store - git credential helper that keeps passwords
//! encrypted under a local passphrase
//!
//! git runs the helper as `git-credential-crypt-store [OPTIONS] <get|store|erase>`
//! and talks to it over stdin/stdout. Logs go to stderr.

mod prompt;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, warn, Level};
use tracing_subscriber::EnvFilter;

use cryptstore_core::{
    parse_credential, write_credential, CredentialRecord, CryptStore, FileBackend, PromptMode,
    Settings,
};

/// git credential helper to store passwords encrypted to enable usage of access tokens with 2FA.
#[derive(Parser, Debug)]
#[command(name = "git-credential-crypt-store")]
#[command(version)]
struct Args {
    /// Location to store the credentials (default: ~/.git-credential-crypt-store)
    #[arg(long, env = "GIT_CREDENTIAL_CRYPT_STORE_FILE")]
    file: Option<PathBuf>,

    /// How to ask for the encryption passphrase
    #[arg(long, value_enum)]
    prompt: Option<PromptArg>,

    /// Settings file to read
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Operation requested by git (get, store or erase)
    operation: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PromptArg {
    Terminal,
    Zenity,
}

impl From<PromptArg> for PromptMode {
    fn from(arg: PromptArg) -> Self {
        match arg {
            PromptArg::Terminal => PromptMode::Terminal,
            PromptArg::Zenity => PromptMode::Zenity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Get,
    Store,
    Erase,
}

impl Operation {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "get" => Some(Self::Get),
            "store" => Some(Self::Store),
            "erase" => Some(Self::Erase),
            _ => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // git may grow new operations; helpers ignore the ones they do not know
    let Some(operation) = Operation::parse(&args.operation) else {
        debug!("Ignoring unknown operation '{}'", args.operation);
        return Ok(());
    };

    let settings = load_settings(args.config.as_deref())?;
    let store_file = match args.file {
        Some(path) => path,
        None => settings.effective_store_file()?,
    };
    let prompt_mode = args.prompt.map(PromptMode::from).unwrap_or(settings.prompt);

    let credential =
        parse_credential(io::stdin().lock()).context("Failed to read credential from stdin")?;

    debug!("{:?} using {:?} ({:?} prompt)", operation, store_file, prompt_mode);
    let store = CryptStore::new(
        Arc::new(FileBackend::open(store_file)),
        prompt::build(prompt_mode),
    );

    match operation {
        Operation::Get => {
            warn_if_unscoped(&credential);
            if let Some(found) = store.lookup(&credential)? {
                write_credential(io::stdout().lock(), &found)?;
            }
        }
        Operation::Store => store.store(credential)?,
        Operation::Erase => {
            warn_if_unscoped(&credential);
            store.erase(&credential)?;
        }
    }

    Ok(())
}

/// Log to stderr; stdout belongs to git
fn init_logging(verbose: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    if verbose {
        filter = filter.add_directive(Level::DEBUG.into());
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_settings(config: Option<&std::path::Path>) -> anyhow::Result<Settings> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => match Settings::default_path() {
            Some(path) => path,
            None => return Ok(Settings::default()),
        },
    };

    Settings::load(&path).with_context(|| format!("Failed to load settings from {:?}", path))
}

/// An empty query matches every stored credential
fn warn_if_unscoped(query: &CredentialRecord) {
    if query.protocol.is_empty()
        && query.host.is_empty()
        && query.path.is_empty()
        && query.username.is_empty()
    {
        warn!(
            "Credential query has no protocol, host, path or username; \
             the first stored entry will match"
        );
    }
}
