use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Appends every raw status line with a timestamp, `<rfc3339>,<line>`.
pub struct StatusLog<W> {
    out: W,
}

impl StatusLog<File> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(StatusLog::new(file))
    }
}

impl<W: Write> StatusLog<W> {
    pub fn new(out: W) -> Self {
        StatusLog { out }
    }

    pub fn record(&mut self, line: &str) -> io::Result<()> {
        let now = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(self.out, "{},{}", now, line)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
