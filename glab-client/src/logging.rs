//! Log output for the client.

use log::LevelFilter;

/// Installs a stderr logger with timestamps.
///
/// Chatty dependencies are capped at `warn` regardless of `level`.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("egui_glow", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
}
