//! Read or append sessions over a tab-delimited record file.
//!
//! A [`Session`] owns exactly one stream for its whole life: a buffered
//! reader or an append-mode buffered writer. It moves from open to closed
//! once, either through [`Session::close`] or when it is dropped, and never
//! reopens or changes direction.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::direction::Direction;
use crate::error::{PreconditionReason, StoreError};
use crate::record::{self, LineParse, Record};

enum Stream {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

pub struct Session {
    path: PathBuf,
    direction: Direction,
    config: StoreConfig,
    stream: Option<Stream>,
    lines_read: usize,
}

impl Session {
    pub fn open(path: impl AsRef<Path>, direction: Direction) -> Result<Self, StoreError> {
        Self::open_with_config(path, direction, &StoreConfig::default())
    }

    /// Opens `path` for sequential reading, or for appending (created when
    /// absent). A missing file in read direction is reported as
    /// [`StoreError::NotFound`].
    pub fn open_with_config(
        path: impl AsRef<Path>,
        direction: Direction,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let stream = match direction {
            Direction::Read => {
                let file = File::open(&path).map_err(|source| {
                    if source.kind() == io::ErrorKind::NotFound {
                        StoreError::NotFound { path: path.clone() }
                    } else {
                        StoreError::io("opening record file", &path, source)
                    }
                })?;
                Stream::Reader(BufReader::new(file))
            }
            Direction::Write => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| {
                        StoreError::io("opening record file for append", &path, source)
                    })?;
                Stream::Writer(BufWriter::new(file))
            }
        };

        debug!(path = %path.display(), %direction, "opened record session");
        Ok(Self {
            path,
            direction,
            config: config.clone(),
            stream: Some(stream),
            lines_read: 0,
        })
    }

    /// Opens with a legacy numeric mode (`1` read, `2` write).
    ///
    /// Unknown modes give `Ok(None)` instead of an error so callers that only
    /// check for success keep working. Failures to open the file are still
    /// errors.
    pub fn open_legacy(
        path: impl AsRef<Path>,
        mode_bits: u32,
    ) -> Result<Option<Self>, StoreError> {
        Self::open_legacy_with_config(path, mode_bits, &StoreConfig::default())
    }

    pub fn open_legacy_with_config(
        path: impl AsRef<Path>,
        mode_bits: u32,
        config: &StoreConfig,
    ) -> Result<Option<Self>, StoreError> {
        let Some(direction) = Direction::from_bits(mode_bits) else {
            warn!(
                path = %path.as_ref().display(),
                mode_bits,
                "ignoring open request with unknown mode"
            );
            return Ok(None);
        };

        Self::open_with_config(path, direction, config).map(Some)
    }

    /// Appends one line holding `fields` joined by tabs.
    ///
    /// Lenient sessions write however many fields are given even though
    /// [`Session::read`] only returns the first two. Strict sessions require
    /// exactly two fields without embedded tabs or line breaks.
    pub fn write<I, S>(&mut self, fields: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let writer = writer_for(&mut self.stream, &self.path, "write")?;
        let fields = fields.into_iter().collect::<Vec<_>>();
        if self.config.strict_columns {
            record::check_strict(&self.path, &fields)?;
        }

        let line = record::format_line(&fields);
        writeln!(writer, "{line}")
            .map_err(|source| StoreError::io("writing record", &self.path, source))
    }

    pub fn write_record(&mut self, record: &Record) -> Result<(), StoreError> {
        self.write([record.first(), record.second()])
    }

    /// Reads the next line.
    ///
    /// End of file and blank lines both give `Ok(None)`; a blank line is
    /// still consumed, so a later call continues with the line after it.
    /// A line that is not valid UTF-8 fails with [`StoreError::IoLine`] and
    /// is consumed as well.
    pub fn read(&mut self) -> Result<Option<Record>, StoreError> {
        let reader = reader_for(&mut self.stream, &self.path, "read")?;
        let mut buf = Vec::new();
        let bytes = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| StoreError::io_line(&self.path, self.lines_read + 1, source))?;
        if bytes == 0 {
            return Ok(None);
        }
        self.lines_read += 1;

        let line = String::from_utf8(buf).map_err(|source| {
            StoreError::io_line(
                &self.path,
                self.lines_read,
                io::Error::new(io::ErrorKind::InvalidData, source),
            )
        })?;

        match record::parse_line(&line) {
            LineParse::Blank => Ok(None),
            LineParse::Record(record) => Ok(Some(record)),
            LineParse::Malformed => {
                debug!(
                    path = %self.path.display(),
                    line = self.lines_read,
                    "record line has a single column"
                );
                Err(StoreError::MalformedRecord {
                    path: self.path.clone(),
                    line: self.lines_read,
                    content: record::strip_line_ending(&line).to_string(),
                })
            }
        }
    }

    /// Iterates records until the first end-of-input signal or error.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            session: self,
            done: false,
        }
    }

    pub fn flush(&mut self) -> Result<(), StoreError> {
        match &mut self.stream {
            Some(Stream::Writer(writer)) => writer
                .flush()
                .map_err(|source| StoreError::io("flushing record file", &self.path, source)),
            Some(Stream::Reader(_)) => Ok(()),
            None => Err(precondition(
                "flush",
                &self.path,
                PreconditionReason::Closed,
            )),
        }
    }

    /// Flushes pending writes and releases the stream.
    ///
    /// The stream is released even when flushing fails. Calling `close` on a
    /// closed session is a no-op.
    pub fn close(&mut self) -> Result<(), StoreError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };

        if let Stream::Writer(mut writer) = stream {
            writer
                .flush()
                .map_err(|source| StoreError::io("flushing record file", &self.path, source))?;
            if self.config.sync_on_close {
                writer
                    .get_ref()
                    .sync_all()
                    .map_err(|source| StoreError::io("syncing record file", &self.path, source))?;
            }
        }

        debug!(
            path = %self.path.display(),
            direction = %self.direction,
            "closed record session"
        );
        Ok(())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines consumed so far, blank lines included.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(%error, "failed to release record session");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("direction", &self.direction)
            .field("open", &self.is_open())
            .field("lines_read", &self.lines_read)
            .finish()
    }
}

pub struct Records<'a> {
    session: &'a mut Session,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<Record, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.session.read() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

/// Opens a session, hands it to `f`, and closes it on every exit path.
///
/// An error from `f` wins over an error from closing.
pub fn with_session<T, E, F>(path: impl AsRef<Path>, direction: Direction, f: F) -> Result<T, E>
where
    F: FnOnce(&mut Session) -> Result<T, E>,
    E: From<StoreError>,
{
    with_session_config(path, direction, &StoreConfig::default(), f)
}

pub fn with_session_config<T, E, F>(
    path: impl AsRef<Path>,
    direction: Direction,
    config: &StoreConfig,
    f: F,
) -> Result<T, E>
where
    F: FnOnce(&mut Session) -> Result<T, E>,
    E: From<StoreError>,
{
    let mut session = Session::open_with_config(path, direction, config)?;
    let outcome = f(&mut session);
    let closed = session.close();
    let value = outcome?;
    closed?;
    Ok(value)
}

pub fn append_records(path: impl AsRef<Path>, records: &[Record]) -> Result<(), StoreError> {
    with_session(path, Direction::Write, |session| {
        records
            .iter()
            .try_for_each(|record| session.write_record(record))
    })
}

/// Reads records up to the first blank line or end of file.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<Record>, StoreError> {
    with_session(path, Direction::Read, |session| session.records().collect())
}

fn writer_for<'a>(
    stream: &'a mut Option<Stream>,
    path: &Path,
    operation: &'static str,
) -> Result<&'a mut BufWriter<File>, StoreError> {
    match stream {
        Some(Stream::Writer(writer)) => Ok(writer),
        Some(Stream::Reader(_)) => Err(precondition(
            operation,
            path,
            PreconditionReason::WrongDirection(Direction::Read),
        )),
        None => Err(precondition(operation, path, PreconditionReason::Closed)),
    }
}

fn reader_for<'a>(
    stream: &'a mut Option<Stream>,
    path: &Path,
    operation: &'static str,
) -> Result<&'a mut BufReader<File>, StoreError> {
    match stream {
        Some(Stream::Reader(reader)) => Ok(reader),
        Some(Stream::Writer(_)) => Err(precondition(
            operation,
            path,
            PreconditionReason::WrongDirection(Direction::Write),
        )),
        None => Err(precondition(operation, path, PreconditionReason::Closed)),
    }
}

fn precondition(operation: &'static str, path: &Path, reason: PreconditionReason) -> StoreError {
    StoreError::PreconditionViolation {
        operation,
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::direction::Direction;
    use crate::error::{PreconditionReason, StoreError};

    #[test]
    fn writer_buffers_until_close() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("buffered.tsv");

        let mut session = Session::open(&path, Direction::Write).expect("open for write");
        session.write(["a", "b"]).expect("write should succeed");
        session.close().expect("close should succeed");

        let contents = std::fs::read_to_string(&path).expect("file should be readable");
        assert_eq!(contents, "a\tb\n");
    }

    #[test]
    fn flush_after_close_is_a_precondition_violation() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("closed.tsv");

        let mut session = Session::open(&path, Direction::Write).expect("open for write");
        session.close().expect("close should succeed");

        let error = session.flush().expect_err("flush on closed session must fail");
        assert!(matches!(
            error,
            StoreError::PreconditionViolation {
                operation: "flush",
                reason: PreconditionReason::Closed,
                ..
            }
        ));
    }

    #[test]
    fn read_counts_consumed_lines() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("counted.tsv");
        std::fs::write(&path, "a\tb\n\nc\td\n").expect("fixture should be written");

        let mut session = Session::open(&path, Direction::Read).expect("open for read");
        assert!(session.read().expect("first read").is_some());
        assert!(session.read().expect("blank read").is_none());
        assert_eq!(session.lines_read(), 2);
        assert!(session.read().expect("third read").is_some());
        assert!(session.read().expect("eof read").is_none());
        assert_eq!(session.lines_read(), 3);
    }
}
