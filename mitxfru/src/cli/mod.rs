// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{path::PathBuf, thread, time::Duration};

use clap::{Arg, ArgAction, Command};
use fru::{DecodeError, Document, EncodeError, MutateError, RecordType};
use log::{info, LevelFilter};
use thiserror::Error;
use tui::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    logger,
    storage::{self, Eeprom, FileEeprom},
};

use self::value::ValueKind;

mod get;
mod report;
mod set;
mod value;

/// Generate the CLI command structure
fn command() -> Command {
    Command::new("mitxfru")
        .about("Read and update the board FRU EEPROM")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .help("Print every board, product and multirecord field")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["get", "set"]),
        )
        .arg(
            Arg::new("get")
                .short('g')
                .long("get")
                .value_name("TYPE")
                .help("Print the multirecord with hex type code TYPE")
                .conflicts_with("set"),
        )
        .arg(
            Arg::new("set")
                .short('s')
                .long("set")
                .value_name("TYPE")
                .help("Store DATA in the multirecord with hex type code TYPE"),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("DATA")
                .help("Value for --set")
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only report errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity, repeat for a hex dump of the image")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("device")
                .long("device")
                .value_name("PATH")
                .help("EEPROM device or image file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Additional directory to load eeprom.yaml from")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

/// Process all CLI arguments
pub fn process() -> Result<(), Error> {
    let matches = command().get_matches();

    let quiet = matches.get_flag("quiet");
    logger::init(verbosity(quiet, matches.get_count("verbose")));

    let settings = Settings::load(
        matches.get_one::<PathBuf>("config-dir"),
        matches.get_one::<PathBuf>("device"),
    );
    info!("Started");

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    let mut eeprom = FileEeprom::new(&settings, progress);

    let image = eeprom.read_image().map_err(Error::Read)?;
    let mut document = Document::decode_with(&image, settings.decode_options())?;
    info!("Loaded FRU data from {:?}", settings.device);

    if matches.get_flag("report") {
        report::print(&document);
        return Ok(());
    }

    if let Some(code) = matches.get_one::<String>("set") {
        let data = matches.get_one::<String>("data").ok_or(Error::MissingData)?;
        let kind = record_type(code)?;

        set::handle(&mut document, kind, data)?;

        info!("Updating multirecord area");
        let updated = fru::update(&image, &document, settings.length_unit)?;

        info!("Saving data to EEPROM");
        eeprom.write_image(&updated).map_err(Error::Write)?;
        settle(&settings, quiet);

        return Ok(());
    }

    if let Some(code) = matches.get_one::<String>("get") {
        return get::handle(&document, record_type(code)?);
    }

    info!("FRU data is valid");
    Ok(())
}

fn verbosity(quiet: bool, verbose: u8) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Off,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Resolve a hex type code given on the command line to a known record type
fn record_type(code: &str) -> Result<RecordType, Error> {
    value::parse_type(code)
        .and_then(|code| RecordType::try_from(code).ok())
        .ok_or_else(|| Error::UnknownRecordType(code.to_owned()))
}

/// The EEPROM commits pages in the background after the last write
fn settle(settings: &Settings, quiet: bool) {
    if settings.settle_secs == 0 {
        return;
    }

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(settings.settle_secs).with_style(
            ProgressStyle::with_template("{msg} {bar:20.cyan/blue} {pos}/{len}s")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        )
    };
    progress.set_message("Waiting for EEPROM");

    for _ in 0..settings.settle_secs {
        thread::sleep(Duration::from_secs(1));
        progress.inc(1);
    }

    progress.finish_and_clear();
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load data from EEPROM")]
    Read(#[source] storage::Error),

    #[error("failed to decode FRU data")]
    Decode(#[from] DecodeError),

    #[error("unknown multirecord type {0:?}")]
    UnknownRecordType(String),

    #[error("multirecord {0} cannot be set from the command line")]
    ReadOnly(RecordType),

    #[error("-d is not set, see --help")]
    MissingData,

    #[error("{kind} value is malformed: {value:?}")]
    MalformedInputValue { kind: ValueKind, value: String },

    #[error("multirecord {0} is not present")]
    RecordNotFound(RecordType),

    #[error("invalid record")]
    Mutate(#[from] MutateError),

    #[error("failed to pack multirecords")]
    Encode(#[from] EncodeError),

    #[error("failed to write EEPROM")]
    Write(#[source] storage::Error),
}

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Read(_) => -1,
            Error::Decode(_) => -2,
            Error::UnknownRecordType(_) | Error::ReadOnly(_) | Error::Mutate(_) => -3,
            Error::MissingData => -4,
            Error::MalformedInputValue { kind: ValueKind::Mac, .. } => -5,
            Error::MalformedInputValue { kind: ValueKind::Number, .. } => -6,
            Error::RecordNotFound(_) => -7,
            Error::Encode(_) | Error::Write(_) => -8,
        }
    }
}

#[cfg(test)]
mod test {
    use clap::ArgMatches;

    use super::*;

    fn matches(args: &[&str]) -> Result<ArgMatches, clap::Error> {
        command().try_get_matches_from(std::iter::once("mitxfru").chain(args.iter().copied()))
    }

    #[test]
    fn verify_command() {
        command().debug_assert();
    }

    #[test]
    fn set_with_data() {
        let args = matches(&["-q", "-s", "c4", "-d", "1"]).unwrap();
        assert_eq!(args.get_one::<String>("set").map(String::as_str), Some("c4"));
        assert_eq!(args.get_one::<String>("data").map(String::as_str), Some("1"));
        assert!(args.get_flag("quiet"));
    }

    #[test]
    fn no_action_only_validates() {
        let args = matches(&[]).unwrap();
        assert!(!args.get_flag("report"));
        assert!(args.get_one::<String>("get").is_none());
        assert!(args.get_one::<String>("set").is_none());
    }

    #[test]
    fn report_conflicts_with_get() {
        assert!(matches(&["-r", "-g", "c0"]).is_err());
        assert!(matches(&["-g", "c0", "-s", "c0"]).is_err());
        assert!(matches(&["-q", "-v"]).is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity(true, 2), LevelFilter::Off);
        assert_eq!(verbosity(false, 0), LevelFilter::Info);
        assert_eq!(verbosity(false, 1), LevelFilter::Debug);
        assert_eq!(verbosity(false, 3), LevelFilter::Trace);
    }

    #[test]
    fn record_types() {
        assert_eq!(record_type("c0").unwrap(), RecordType::Mac0);
        assert_eq!(record_type("0xC6").unwrap(), RecordType::PowerState);
        assert_eq!(record_type("d0").unwrap_err().exit_code(), -3);
        assert_eq!(record_type("zz").unwrap_err().exit_code(), -3);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Error::MissingData.exit_code(), -4);
        assert_eq!(
            Error::MalformedInputValue {
                kind: ValueKind::Mac,
                value: "nope".into()
            }
            .exit_code(),
            -5
        );
        assert_eq!(Error::RecordNotFound(RecordType::TestOk).exit_code(), -7);
        assert_eq!(Error::Encode(EncodeError::TooManyRecords(9)).exit_code(), -8);
    }
}
