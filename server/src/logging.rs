use std::io;

use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::{Level, LevelFilter};

/// Installs the global logger. Warnings and errors go to stderr, everything
/// else to stdout.
pub fn init(level_filter: LevelFilter) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .trace(Color::Cyan)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}] \x1b[0m{}: {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level_filter)
        .level_for("mio", LevelFilter::Warn)
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > Level::Warn)
                .chain(io::stdout()),
        )
        .chain(Dispatch::new().level(LevelFilter::Warn).chain(io::stderr()))
        .apply()?;

    Ok(())
}
