use colored::Colorize;
use middleware::logger::LoggerMiddleware;

pub mod middleware {
    pub mod logger;
}

/// Routes `log` records to stdout and, when given, to `log_file`.
pub fn setup(log_file: Option<&str>) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let color = match record.level() {
                log::Level::Info => "green",
                log::Level::Warn => "yellow",
                log::Level::Error => "red",
                log::Level::Debug => "magenta",
                log::Level::Trace => "bright black",
            };
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level().to_string().color(color),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .level_for("hyper", log::LevelFilter::Off)
        .level_for("hyper_util", log::LevelFilter::Off)
        .level_for("actix_server", log::LevelFilter::Info)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

pub fn middleware(console_logging_enabled: bool) -> LoggerMiddleware {
    LoggerMiddleware::new(console_logging_enabled)
}
