//! DineCluster CLI: filter restaurants and suggest similar ones
//!
//! The entrypoint loads the table and model artifacts once per session and
//! dispatches either a single command or an interactive shell.

use anyhow::Result;
use clap::Parser;
use dinecluster::cli::{execute, run_shell_lines};
use dinecluster::{render, ArtifactPaths, Args, Command, Context, Session};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "dinecluster> ";

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let paths = args.artifact_paths();
    let mut session = Session::new();

    match &args.command {
        Command::Shell => run_shell(&mut session, &paths, args.verbose),
        command => {
            let start_time = Instant::now();
            let context = session.context(&paths)?;
            if args.verbose {
                print_summary(&context, start_time);
            }

            let output = execute(&context, command, &mut rand::thread_rng())?;
            print!("{}", output);
            Ok(())
        }
    }
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else {
        args.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_summary(context: &Context, start_time: Instant) {
    print!("{}", render::summary(context));
    println!("  Load time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!();
}

/// Interactive session on a line editor; Ctrl-C and Ctrl-D end it
fn run_shell(session: &mut Session, paths: &ArtifactPaths, verbose: bool) -> Result<()> {
    let start_time = Instant::now();
    let context = session.context(paths)?;
    if verbose {
        print_summary(&context, start_time);
    }

    let mut editor = DefaultEditor::new()?;
    let lines = std::iter::from_fn(|| match editor.readline(PROMPT) {
        Ok(line) => {
            if !line.trim().is_empty() {
                if let Err(err) = editor.add_history_entry(line.as_str()) {
                    debug!(%err, "shell history not updated");
                }
            }
            Some(line)
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
        Err(err) => {
            warn!(%err, "failed to read shell input");
            None
        }
    });

    run_shell_lines(session, paths, lines, &mut io::stdout(), &mut rand::thread_rng())
}
