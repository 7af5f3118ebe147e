//! aesbox CLI - AES-CBC envelope encryption
//!
//! Command-line interface for encrypting text into base64 `iv || ciphertext`
//! envelopes (optionally framed as `{"RequestData": ...}`) and decrypting
//! them again.

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process;

use aesbox::error::AesboxError;
use aesbox::file_ops;
use aesbox::key_reader::{EnvKeyReader, KeyReader, ReaderKeyReader, TerminalKeyReader};
use aesbox::payload::{Direction, Framing};
use aesbox::telemetry;

#[derive(Parser)]
#[command(name = "aesbox")]
#[command(version)]
#[command(about = "AES-CBC encryption of RequestData/ResponseData payloads.", long_about = None)]
struct Cli {
    /// Read the base64 key from stdin instead of from terminal
    #[arg(long, global = true, conflicts_with = "key_env")]
    key_stdin: bool,

    /// Read the base64 key from the named environment variable
    #[arg(long, global = true, value_name = "VAR")]
    key_env: Option<String>,

    /// Increase logging verbosity (repeatable); AESBOX_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a text file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the result to (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit the bare base64 envelope instead of {"RequestData": ...}
        #[arg(long)]
        raw: bool,
    },

    /// Decrypt a base64 envelope or a RequestData/ResponseData JSON payload
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the decrypted text to (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Describe what an input file looks like, without decrypting it
    #[command(alias = "i")]
    Inspect {
        /// Path to the file to describe
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Which operation the input is meant for
        #[arg(long, value_enum, default_value_t = DirectionArg::Decrypt)]
        direction: DirectionArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Encrypt,
    Decrypt,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Encrypt => Direction::Encrypt,
            DirectionArg::Decrypt => Direction::Decrypt,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let result = match cli.command {
        Commands::Encrypt { input, output, raw } => {
            let mut reader = get_key_reader(cli.key_stdin, cli.key_env);
            let framing = if raw { Framing::Raw } else { Framing::Json };
            file_ops::encrypt_file(&input, output.as_deref(), &mut *reader, framing)
        }
        Commands::Decrypt { input, output } => {
            let mut reader = get_key_reader(cli.key_stdin, cli.key_env);
            file_ops::decrypt_file(&input, output.as_deref(), &mut *reader)
        }
        Commands::Inspect { input, direction } => {
            file_ops::inspect_file(&input, direction.into()).map(|description| {
                println!("{}", description);
            })
        }
    };

    if let Err(e) = result {
        tracing::debug!(category = ?e.category, kind = ?e.kind, "command failed");
        report(&e);
        process::exit(1);
    }
}

fn get_key_reader(use_stdin: bool, env_var: Option<String>) -> Box<dyn KeyReader> {
    if use_stdin {
        Box::new(ReaderKeyReader::new(Box::new(std::io::stdin())))
    } else if let Some(var) = env_var {
        Box::new(EnvKeyReader::new(var))
    } else {
        Box::new(TerminalKeyReader::new())
    }
}

fn report(err: &AesboxError) {
    eprintln!("Error: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}
