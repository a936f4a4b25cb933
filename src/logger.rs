use std::fs::File;

use anyhow::Context;
use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::{
    fmt::{time::OffsetTime, writer::BoxMakeWriter},
    FmtSubscriber,
};

/// Sends every trace to a new `swiss_<date>_<time>_log.txt` file in the working directory.
///
/// Fails if the file cannot be created or if a global subscriber is already set.
pub fn init_logger() -> anyhow::Result<()> {
    let file_name = get_log_file_name()?;
    let file =
        File::create(&file_name).with_context(|| format!("could not create log file {file_name}"))?;
    let writer = BoxMakeWriter::new(file);
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        local_offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer)
        .finish();

    set_global_default(subscriber).context(
        "Could not set global default tracing subscriber. Consider disabling logs if you are already setting a subscriber.",
    )
}

fn get_log_file_name() -> anyhow::Result<String> {
    let format = format_description!("swiss_[year]-[month]-[day]_[hour]-[minute]-[second]_log.txt");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(now.format(format)?)
}
