//! Opens report files with a declared text encoding.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use tracing::debug;

use crate::core::errors::{ClrdepsError, Result};
use crate::report::cursor::XmlStream;

/// Decoded byte stream handed to the XML reader.
pub type DecodedInput<R> = BufReader<DecodeReaderBytes<R, Vec<u8>>>;

/// Opens reports and hands a scoped [`XmlStream`] to a consumer.
///
/// The underlying file is owned by the stream and closed when the consumer
/// returns, whether it succeeded or failed.
#[derive(Debug, Clone, Copy)]
pub struct ReportReader {
    encoding: &'static Encoding,
}

impl ReportReader {
    /// Creates a reader for the given WHATWG encoding label (e.g. `UTF-8`, `windows-1252`).
    pub fn new(encoding_label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(encoding_label.trim().as_bytes()).ok_or_else(|| {
            ClrdepsError::config_field(
                format!("Unknown encoding label: {encoding_label}"),
                "dependency.encoding",
            )
        })?;
        Ok(Self { encoding })
    }

    /// Name of the encoding in use.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Opens `path` and runs `consume` over its element stream.
    pub fn read<T, F>(&self, path: &Path, consume: F) -> Result<T>
    where
        F: FnOnce(&mut XmlStream<DecodedInput<File>>) -> Result<T>,
    {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ClrdepsError::report_not_found(path),
            _ => ClrdepsError::io(format!("Failed to open report {}", path.display()), err),
        })?;
        debug!(
            "Reading dependency report {} as {}",
            path.display(),
            self.encoding.name()
        );

        let mut stream = self.stream(file, path.display().to_string());
        consume(&mut stream)
    }

    /// Wraps any byte source in a decoding [`XmlStream`].
    pub fn stream<R: Read>(&self, input: R, source: impl Into<String>) -> XmlStream<DecodedInput<R>> {
        let decoded = DecodeReaderBytesBuilder::new()
            .encoding(Some(self.encoding))
            .build(input);
        XmlStream::new(BufReader::new(decoded), source)
    }
}

impl Default for ReportReader {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}
