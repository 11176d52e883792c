use aws_security_bot::{Cli, Config, logging, run};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref(), Path::new(".")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::from(2);
        }
    };
    config.merge_cli(&cli);

    logging::init(config.verbose);

    match run::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            for line in e.to_string().lines() {
                eprintln!("{} {}", "error:".red().bold(), line);
            }
            if e.is_configuration() {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}
