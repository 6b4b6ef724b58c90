//! Destinations for response bytes as they arrive.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Receives the response body chunk by chunk.
pub trait ResponseSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;
}

/// Accumulates the whole body in memory, with no size cap.
impl ResponseSink for Vec<u8> {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

/// Streams the body into a file, truncating it on creation.
#[derive(Debug)]
pub struct FileSink {
    out: BufWriter<File>,
}

impl FileSink {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            out: BufWriter::new(File::create(path)?),
        })
    }

    /// Flush buffered bytes and close the file.
    pub fn finish(mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl ResponseSink for FileSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.out.write_all(chunk)
    }
}
