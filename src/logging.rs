use std::path::PathBuf;
use std::time::SystemTime;

use color_eyre::Result;
use color_eyre::eyre::Context;
use fern::colors::{Color, ColoredLevelConfig};

/// Set up the global logger: a colored console dispatch at `console_level`
/// and, when a path is given, a plain file dispatch at `file_level`.
pub fn setup_logging(
    console_level: log::LevelFilter,
    log_file: Option<PathBuf>,
    file_level: log::LevelFilter,
) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Magenta)
        .trace(Color::BrightBlack);

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .level(log::LevelFilter::Trace)
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::Dispatch::new()
            .level(file_level)
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    humantime::format_rfc3339_seconds(SystemTime::now()),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::log_file(&path).wrap_err("Failed to open log file")?);
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().wrap_err("Failed to install logger")?;
    Ok(())
}
