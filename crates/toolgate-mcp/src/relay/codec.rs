//! Newline framing for connector stdout with a per-line size cap.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// One framed stdout line.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum StdoutLine {
    Line(String),
    /// A line over the size cap, already discarded.
    Oversized,
    /// A line that was not valid UTF-8, already discarded.
    Garbled,
}

/// [`LinesCodec`] that reports oversized and non-UTF-8 lines as frames
/// instead of errors, so one bad line does not end the stream.
#[derive(Debug)]
pub(super) struct StdoutCodec {
    lines: LinesCodec,
}

impl StdoutCodec {
    pub(super) fn new(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
        }
    }

    fn map(result: Result<Option<String>, LinesCodecError>) -> io::Result<Option<StdoutLine>> {
        match result {
            Ok(line) => Ok(line.map(StdoutLine::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(StdoutLine::Oversized)),
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(Some(StdoutLine::Garbled))
            }
            Err(LinesCodecError::Io(e)) => Err(e),
        }
    }
}

impl Decoder for StdoutCodec {
    type Item = StdoutLine;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Self::map(self.lines.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Self::map(self.lines.decode_eof(src))
    }
}
