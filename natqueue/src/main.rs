use std::{
    fs::File,
    io::{self, BufRead, BufReader, IsTerminal, Write},
    path::PathBuf,
};

use anyhow::{bail, Context};
use clap::Parser;
use log::warn;
use natqueue::{
    cmd::{Command, Config, Outcome, Session},
    TieBreak,
};

#[derive(Parser, Debug)]
#[command(version, about = "Drive a natural-order string queue", long_about = None)]
struct Args {
    /// Read commands from this file instead of stdin
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Percentage of storage requests to refuse
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    fail_percent: u8,
    /// Seed for the failure injection
    #[arg(long)]
    seed: Option<u64>,
    /// Buffer capacity used when removing from the head
    #[arg(short, long, default_value_t = 1024)]
    length: usize,
    /// Resolve sort ties in favour of the later run
    #[arg(long)]
    prefer_right_ties: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        fail_percent: args.fail_percent,
        seed: args.seed,
        length: args.length,
        ties: if args.prefer_right_ties {
            TieBreak::PreferRight
        } else {
            TieBreak::Stable
        },
    };
    let mut session = Session::new(config);

    let (reader, interactive): (Box<dyn BufRead>, bool) = match &args.file {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Could not open {path:?}"))?;
            (Box::new(BufReader::new(file)), false)
        }
        None => (Box::new(io::stdin().lock()), io::stdin().is_terminal()),
    };

    let failures = run(&mut session, reader, interactive)?;
    if failures > 0 {
        bail!("{failures} commands failed");
    }

    Ok(())
}

fn run(
    session: &mut Session,
    mut reader: Box<dyn BufRead>,
    interactive: bool,
) -> anyhow::Result<usize> {
    let mut stdout = io::stdout().lock();
    let mut failures = 0;

    loop {
        if interactive {
            stdout.write_all(b"cmd> ")?;
            stdout.flush()?;
        }

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let outcome = Command::parse(&line).and_then(|command| match command {
            Some(command) => session.execute(command),
            None => Ok(Outcome::Continue(vec![])),
        });

        match outcome {
            Ok(Outcome::Continue(lines)) => {
                for output in lines {
                    if let Err(err) = writeln!(stdout, "{output}") {
                        if err.kind() == io::ErrorKind::BrokenPipe {
                            return Ok(failures);
                        }
                        return Err(err.into());
                    }
                }
            }
            Ok(Outcome::Quit) => break,
            Err(err) => {
                failures += 1;
                warn!("command {:?} failed", line.trim());
                io::stderr().write_all(format!("ERROR: {err:#}\n").as_bytes())?;
            }
        }
    }

    Ok(failures)
}
