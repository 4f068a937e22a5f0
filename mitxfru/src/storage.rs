// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    io::{self, Read, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use fru::FRU_SIZE;
use fs_err::{self as fs, OpenOptions};
use log::{debug, trace};
use thiserror::Error;
use tui::{ProgressBar, ProgressStyle, ProgressWriter};

use crate::config::Settings;

/// Backing store of a FRU image
pub trait Eeprom {
    fn read_image(&mut self) -> Result<Vec<u8>, Error>;

    fn write_image(&mut self, image: &[u8]) -> Result<(), Error>;
}

/// EEPROM exposed as a file, such as the `at24` sysfs node or a plain image
pub struct FileEeprom {
    path: PathBuf,
    page_size: usize,
    page_delay: Duration,
    progress: ProgressBar,
}

impl FileEeprom {
    pub fn new(settings: &Settings, progress: ProgressBar) -> Self {
        Self {
            path: settings.device.clone(),
            page_size: settings.page_size.max(1),
            page_delay: settings.page_delay,
            progress,
        }
    }
}

impl Eeprom for FileEeprom {
    fn read_image(&mut self) -> Result<Vec<u8>, Error> {
        debug!("Reading {FRU_SIZE} bytes from {:?}", self.path);

        let mut file = fs::File::open(&self.path)?;
        let mut image = vec![0u8; FRU_SIZE];

        for (index, page) in image.chunks_mut(self.page_size).enumerate() {
            file.read_exact(page).map_err(|error| match error.kind() {
                io::ErrorKind::UnexpectedEof => Error::ShortImage(index * self.page_size),
                _ => Error::Io(error),
            })?;
        }

        Ok(image)
    }

    fn write_image(&mut self, image: &[u8]) -> Result<(), Error> {
        if image.len() > FRU_SIZE {
            return Err(Error::ImageTooLarge(image.len()));
        }

        debug!("Writing {} bytes to {:?} in {} byte pages", image.len(), self.path, self.page_size);

        let file = OpenOptions::new().write(true).create(true).truncate(false).open(&self.path)?;

        self.progress.set_length(image.len() as u64);
        self.progress.set_style(
            ProgressStyle::with_template("{msg} {bar:20.cyan/blue} {bytes}/{total_bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.progress.set_message("Writing EEPROM");

        let mut writer = ProgressWriter::new(file, image.len() as u64, self.progress.clone());

        for (index, page) in image.chunks(self.page_size).enumerate() {
            trace!("Page {index}");
            writer.write_all(page)?;
            writer.flush()?;
            thread::sleep(self.page_delay);
        }

        writer.writer.sync_all()?;
        self.progress.finish_and_clear();

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("image holds only {0} bytes")]
    ShortImage(usize),

    #[error("image of {0} bytes does not fit the EEPROM")]
    ImageTooLarge(usize),

    #[error("io")]
    Io(#[from] io::Error),
}
