use anyhow::Result;
use log::LevelFilter;

use mkjail::prompt::dialog::DialogPrompter;
use mkjail::{preflight, session, SessionConfig, SessionError, Verbosity};

fn usage() -> &'static str {
    "Usage: mkjail [-h] [-v] [-q]\n\
     \n\
     Interactively builds a FreeBSD jail root filesystem from a local\n\
     binary release repository.\n\
     \n\
     Options:\n\
       -h   print this help\n\
       -v   verbose tool output\n\
       -q   quiet tool output (default)\n\
     \n\
     Environment:\n\
       MKJAIL_REPOS   repository root to scan (default /usr/repos)\n\
       MKJAIL_DEST    seed for the destination prompt (default /usr/jail)\n\
       TMPDIR         scratch directory for prompts (default /tmp)"
}

fn main() {
    let mut verbosity = Verbosity::Quiet;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" => verbosity = Verbosity::Verbose,
            "-q" => verbosity = Verbosity::Quiet,
            "-h" => {
                eprintln!("{}", usage());
                std::process::exit(1);
            }
            other => {
                eprintln!("mkjail: unknown option '{}'\n\n{}", other, usage());
                std::process::exit(1);
            }
        }
    }

    env_logger::Builder::new()
        .filter_level(match verbosity {
            Verbosity::Verbose => LevelFilter::Debug,
            Verbosity::Quiet => LevelFilter::Warn,
        })
        .parse_default_env()
        .init();

    if let Err(err) = run(verbosity) {
        match err.downcast_ref::<SessionError>() {
            Some(SessionError::Cancelled) => eprintln!("mkjail: cancelled"),
            _ => eprintln!("mkjail: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(verbosity: Verbosity) -> Result<()> {
    let config = SessionConfig::from_env(verbosity);
    config.validate()?;
    preflight::check_host_tools().map_err(|err| SessionError::Config(err.to_string()))?;

    let mut prompter = DialogPrompter::new(&config.tmp_dir);
    session::run(&config, &mut prompter)
}
