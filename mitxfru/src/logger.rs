// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Line oriented logger writing to stderr
//!
//! Each line is tagged with its level and the crate that emitted it,
//! e.g. `W[FRU]: header checksum mismatch`.

use log::{Level, LevelFilter, Log, Metadata, Record};
use tui::Styled;

struct Logger;

static LOGGER: Logger = Logger;

/// Install the logger, messages above `level` are discarded
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let tag = format!("{}[{}]:", prefix(record.level()), tag(record.target()));
        let tag = match record.level() {
            Level::Error => tag.red().to_string(),
            Level::Warn => tag.yellow().to_string(),
            Level::Info => tag,
            Level::Debug | Level::Trace => tag.dim().to_string(),
        };

        eprintln!("{tag} {}", record.args());
    }

    fn flush(&self) {}
}

fn prefix(level: Level) -> char {
    match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => 'L',
        Level::Debug => 'D',
        Level::Trace => 'T',
    }
}

/// Crate name of a module path target, uppercased
fn tag(target: &str) -> String {
    target.split("::").next().unwrap_or(target).to_uppercase()
}
