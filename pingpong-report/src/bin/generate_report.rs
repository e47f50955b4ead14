use std::process;
use clap::Parser;
use pingpong_report::{
    load_config,
    Args,
    ReportConfig,
};

fn main() {
    env_logger::init();
    let args = Args::parse();
    let config = match args.config {
        Some(path) => load_config(path),
        None => Ok(ReportConfig::default()),
    };

    match config.and_then(|config| pingpong_report::run(&config)) {
        Ok(output) => println!("Report generated: {}", output.display()),
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}
