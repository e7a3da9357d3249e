use anyhow::{Context, Result};
use branch_factors::compute_branch_factors;
use clap::{Parser as ClapParser, Subcommand};
use ll_terms::grammar::TABLE;
use ll_terms::{TermParser, TermStore};
use std::io::{self, Read, Write};

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parses terms, one per line, and prints them in canonical form
    Parse {
        /// Input file with terms (stdin if omitted)
        #[arg(short, long)]
        terms: Option<String>,
        /// Intern all terms in one shared store
        #[arg(short, long)]
        shared: bool,
    },
    /// Prints the LL(1) parse table
    Table {},
    /// Counts branches per function in a Rust source file
    Branches {
        /// Rust source file
        #[arg(short, long)]
        source: String,
    },
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path)),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Commands::Parse {
            terms: terms_path,
            shared,
        } => {
            let text = read_input(terms_path.as_deref())?;
            let mut parser = TermParser::new();
            let mut store = TermStore::new();
            for (line_no, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                if shared {
                    let id = parser
                        .parse_into(&mut store, line)
                        .with_context(|| format!("line {}", line_no + 1))?;
                    writeln!(out, "{}", store.display(id))?;
                } else {
                    let term = parser
                        .parse(line)
                        .with_context(|| format!("line {}", line_no + 1))?;
                    writeln!(out, "{}", term)?;
                }
            }
            log::info!("Stats: {:?}", parser.stats());
            if shared {
                log::info!("Shared store: {} term(s)", store.len());
            }
        }
        Commands::Table {} => {
            TABLE.write(&mut out)?;
        }
        Commands::Branches { source } => {
            let text = read_input(Some(&source))?;
            let counts = compute_branch_factors(&text).with_context(|| format!("parsing {}", source))?;
            for (name, count) in &counts {
                writeln!(out, "{}: {}", name, count)?;
            }
            log::info!("{} function(s)", counts.len());
        }
    }

    Ok(())
}
