use anyhow::Result;
use clap::Parser;
mod auth;
use nosepass::{Alphabet, Schema, default_config_path, derive_password, load_schema};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "nosepass")]
#[command(
    version,
    about = "Deterministic, stateless password generator written in Rust."
)]
struct Cli {
    /// Site name to derive the password for
    site: String,

    /// Path to the configuration file (default: ~/.nosepass)
    #[arg(long, value_name = "PATH", env = "NOSEPASS_CONFIG")]
    config: Option<PathBuf>,

    /// Number of characters to generate (default: 20)
    #[arg(long)]
    count: Option<usize>,

    /// Character set specification, e.g. 'a-z0-9' (default: printable ASCII)
    #[arg(long)]
    set: Option<String>,

    /// bcrypt_pbkdf rounds (default: 200)
    #[arg(long)]
    rounds: Option<u32>,

    /// Increment counter; bump it to rotate the password (default: 0)
    #[arg(long)]
    increment: Option<u64>,
}

fn resolve_schema(cli: &Cli) -> Result<Schema> {
    let mut schema = match &cli.config {
        Some(path) => load_schema(path, &cli.site)?,
        None => {
            let path = default_config_path()?;
            if path.exists() {
                load_schema(&path, &cli.site)?
            } else {
                Schema::default()
            }
        }
    };

    if let Some(count) = cli.count {
        schema.set_count(count)?;
    }
    if let Some(rounds) = cli.rounds {
        schema.set_rounds(rounds)?;
    }
    if let Some(increment) = cli.increment {
        schema.set_increment(increment);
    }
    if let Some(spec) = &cli.set {
        schema.set_charset(Alphabet::parse(spec)?);
    }

    Ok(schema)
}

fn strength_color(bits: f64) -> &'static str {
    if bits >= 128.0 {
        "\x1b[32m"
    } else if bits >= 92.0 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let schema = resolve_schema(&cli)?;

    let bits = schema.entropy_bits();
    eprintln!(
        "{}\u{25cf}\x1b[0m generating password equivalent to {bits:.0} bits",
        strength_color(bits)
    );

    let master = auth::read_password()?;
    let password = derive_password(master.as_bytes(), cli.site.as_bytes(), &schema)?;
    drop(master);

    println!("{password}");
    Ok(())
}
