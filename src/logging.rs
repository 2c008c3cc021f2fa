use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Maps `-v` occurrences and `--debug` onto a log level. Warnings are always
/// kept.
pub fn level_for(verbose: u8, debug: bool) -> LevelFilter {
    if debug {
        return LevelFilter::Debug;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Sends log output to `path`, truncating any previous log.
pub fn init(level: LevelFilter, path: &Path) -> eyre::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    WriteLogger::init(level, Config::default(), File::create(path)?)?;
    log::info!("Logging to {}", path.display());
    Ok(())
}
