// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::Write;

pub use self::reexport::*;
pub use self::styled::Styled;

mod styled;

/// Wraps a [`Write`] and updates the provided [`ProgressBar`] with progress
/// of total bytes written
pub struct ProgressWriter<W> {
    pub writer: W,
    pub total: u64,
    pub written: u64,
    pub progress: ProgressBar,
}

impl<W> ProgressWriter<W> {
    pub fn new(writer: W, total: u64, progress: ProgressBar) -> Self {
        Self {
            writer,
            total,
            written: 0,
            progress,
        }
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.writer.write(buf)?;

        self.written += bytes as u64;
        self.progress.set_position(
            (self.written as f64 / self.total as f64 * self.progress.length().unwrap_or_default() as f64) as u64,
        );

        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

mod reexport {
    pub use crossterm::style::Stylize;
    pub use indicatif::*;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn progress_tracks_bytes() {
        let progress = ProgressBar::hidden();
        progress.set_length(128);

        let mut writer = ProgressWriter::new(vec![], 64, progress.clone());
        writer.write_all(&[0u8; 32]).unwrap();

        assert_eq!(writer.written, 32);
        assert_eq!(progress.position(), 64);
        assert_eq!(writer.writer.len(), 32);
    }
}
