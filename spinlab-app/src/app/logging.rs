use spinlab_core::directory::Directory;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;

use crate::tracing::*;

/// Console output is driven by `SPINLAB_LOG` (e.g. `spinlab_app=debug`) and
/// goes to stderr so it never mixes with command output.
#[inline(always)]
pub(super) fn logging() -> Option<WorkerGuard> {
    use tracing_subscriber::{filter, fmt, prelude::*};

    let (log_file, guard) = match Directory::logs_directory()
        .and_then(|dir| {
            tracing_appender::rolling::Builder::new()
                .max_log_files(10)
                .rotation(tracing_appender::rolling::Rotation::DAILY)
                .filename_prefix("spinlab")
                .filename_suffix("log")
                .build(dir)
                .ok()
        })
        .map(tracing_appender::non_blocking)
    {
        Some((log_file, guard)) => (Some(log_file), Some(guard)),
        None => (None, None),
    };

    let log_file_filter_targets = filter::Targets::new()
        .with_target("spinlab_app", LevelFilter::DEBUG)
        .with_target("spinlab_core", LevelFilter::DEBUG)
        .with_default(LevelFilter::from_level(TraceLevel::INFO));

    let console_filter_targets = std::env::var("SPINLAB_LOG")
        .unwrap_or_default()
        .parse::<filter::Targets>()
        .unwrap_or_default();

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_target(true)
        .with_thread_names(true)
        .with_filter(console_filter_targets);

    let file_layer = log_file.map(|log_file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(log_file)
            .with_filter(log_file_filter_targets)
    });

    let result = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();
    if let Err(err) = result {
        eprintln!("failed to install the log subscriber: {err}");
    }

    guard
}

pub(super) fn panic_hook() {
    std::panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        let thread = thread.name().unwrap_or("main");
        let backtrace = backtrace::Backtrace::new();

        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            *s
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "<unknown>"
        };

        match info.location() {
            Some(loc) => {
                trace!(
                    target: "spinlab_app::panic_hook",
                    TraceLevel::ERROR,
                    "thread {thread} panicked at {} | file://./{}:{}:{}\n{:?}",
                    payload,
                    loc.file(), loc.line(), loc.column(),
                    backtrace,
                );
            }
            None => {
                trace!(
                    target: "spinlab_app::panic_hook",
                    TraceLevel::ERROR,
                    "thread {thread} panicked at {}\n{:?}",
                    payload,
                    backtrace,
                );
            }
        }

        eprintln!("spinlab panicked: {payload}");
    }))
}
