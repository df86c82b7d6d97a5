// src/logger.rs
// =============================================================================
// Logger setup for the binary.
//
// The library only talks to the `log` facade; this is where an actual
// logger (env_logger, writing to stderr) gets installed. RUST_LOG is read
// first, then the --log-level flag overrides the global level, so
//   RUST_LOG=page_inspector=trace page-inspector example.com
// still works for one-off debugging.
// =============================================================================

use log::{LevelFilter, SetLoggerError};

pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    // The tokenizer reports every malformed tag; nobody wants that
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("reqwest", LevelFilter::Warn);
    builder.filter_module("hyper", LevelFilter::Warn);

    builder.try_init()
}
