use std::path::PathBuf;

use bf1::{Config, Emitter, EofPolicy, Error, PointerPolicy, Program, interpret};
use clap::Parser;
use clap::error::ErrorKind;

#[derive(Parser)]
#[command(
    name = "bf1",
    version,
    about = "Brainfuck interpreter and 8086 assembler",
    long_about = "Interprets INPUT, or translates it to 16-bit DOS assembly when OUTPUT is given."
)]
struct Cli {
    /// Program source.
    input: PathBuf,

    /// Write assembly here instead of interpreting.
    output: Option<PathBuf>,

    /// Largest accepted program, in bytes.
    #[arg(long, default_value_t = 30_000)]
    max_program_size: usize,

    /// Number of tape cells.
    #[arg(long, default_value_t = 30_000)]
    tape_size: usize,

    /// Deepest loop nesting accepted by the assembler.
    #[arg(long, default_value_t = 32)]
    max_nesting: usize,

    /// What `,` stores at end of input (sentinel, zero, unchanged).
    #[arg(long, default_value = "sentinel")]
    eof: String,

    /// What happens when the pointer leaves the tape (wrap, fault).
    #[arg(long, default_value = "wrap")]
    pointer: String,

    /// Abort interpretation after this many commands.
    #[arg(long)]
    step_limit: Option<u64>,

    /// Don't print the banner.
    #[arg(long, short)]
    quiet: bool,
}

fn parse_eof(s: &str) -> Result<EofPolicy, String> {
    match s {
        "sentinel" => Ok(EofPolicy::Sentinel),
        "zero" => Ok(EofPolicy::Zero),
        "unchanged" => Ok(EofPolicy::Unchanged),
        other => Err(format!(
            "Unknown eof policy: {other}. Available: sentinel, zero, unchanged"
        )),
    }
}

fn parse_pointer(s: &str) -> Result<PointerPolicy, String> {
    match s {
        "wrap" => Ok(PointerPolicy::Wrap),
        "fault" => Ok(PointerPolicy::Fault),
        other => Err(format!("Unknown pointer policy: {other}. Available: wrap, fault")),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
                ErrorKind::MissingRequiredArgument => 1,
                _ => 2,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if !cli.quiet {
        eprintln!(
            "bf1 v{} - Brainfuck interpreter and assembler\n",
            env!("CARGO_PKG_VERSION")
        );
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(Error::InvalidConfig(e).exit_code());
        }
    };

    if let Err(e) = run(&cli, &config) {
        eprintln!("ERROR: {e}");
        std::process::exit(e.exit_code());
    }
}

fn build_config(cli: &Cli) -> Result<Config, String> {
    Ok(Config {
        max_program_size: cli.max_program_size,
        tape_size: cli.tape_size,
        max_nesting: cli.max_nesting,
        eof: parse_eof(&cli.eof)?,
        pointer: parse_pointer(&cli.pointer)?,
        step_limit: cli.step_limit,
    })
}

fn run(cli: &Cli, config: &Config) -> Result<(), Error> {
    let source = std::fs::read(&cli.input).map_err(|source| Error::Read {
        path: cli.input.clone(),
        source,
    })?;
    let program = Program::new(source, config)?;

    match cli.output {
        Some(ref path) => {
            // Translate fully before touching the output file, so a failed
            // translation never leaves a truncated artifact behind.
            let text = Emitter::new(config)?.emit(&program)?;
            std::fs::write(path, text).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let outcome = interpret(&program, config)?;
            log::info!("executed {} commands", outcome.steps);
        }
    }
    Ok(())
}
