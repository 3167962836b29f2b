use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// `~/.local/share/gridsyncrs/logs/app.log`
    File,
    /// stderr via env_logger, filtered by `RUST_LOG` (default `info`)
    Stderr,
}

pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("gridsyncrs")
        .join("logs"))
}

pub fn init_logger(target: LogTarget) -> Result<(), Error> {
    match target {
        LogTarget::File => {
            let log_dir = log_dir()?;
            fs::create_dir_all(&log_dir)?;

            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_dir.join("app.log"))?;

            CombinedLogger::init(vec![WriteLogger::new(
                LevelFilter::Debug,
                Config::default(),
                log_file,
            )])
            .map_err(|e| Error::new(ErrorKind::Other, e))
        }
        LogTarget::Stderr => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .try_init()
                .map_err(|e| Error::new(ErrorKind::Other, e))
        }
    }
}
