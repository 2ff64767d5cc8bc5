//! Length-prefixed framing.
//!
//! Every message on the wire is a 4 byte ASCII decimal header, right aligned
//! and padded with spaces, followed by exactly that many body bytes:
//!
//! ```text
//! [" 42"][42 body bytes]
//! ```
//!
//! Reading is strictly two-phase (header, then body), which lets one socket
//! carry any number of messages without scanning for a delimiter.

use derive_more::{Display, Error};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{instrument, trace};

/// Width of the decimal length header.
pub const HEADER_LEN: usize = 4;

/// Largest body a frame may carry.
pub const MAX_BODY_LEN: usize = 768;

/// Header or size violation. Always fatal to the connection that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum FrameError {
    /// Header is not optional leading spaces followed by decimal digits.
    #[display("invalid frame header \"{}\"", header.escape_ascii())]
    InvalidHeader {
        /// Raw header bytes as received.
        header: [u8; HEADER_LEN],
    },
    /// Declared or supplied body is over [`MAX_BODY_LEN`].
    #[display("frame body of {len} bytes exceeds the 768 byte limit")]
    BodyTooLarge {
        /// Offending body length.
        len: usize,
    },
}

/// Failure while moving frames over a stream.
#[derive(Debug, Display, Error)]
pub enum WireError {
    /// The peer sent a bad header.
    #[display("{_0}")]
    Frame(FrameError),
    /// The stream failed or hit end of file.
    #[display("connection lost: {_0}")]
    ConnectionLost(std::io::Error),
}

impl From<FrameError> for WireError {
    fn from(err: FrameError) -> Self {
        Self::Frame(err)
    }
}

impl From<std::io::Error> for WireError {
    fn from(err: std::io::Error) -> Self {
        Self::ConnectionLost(err)
    }
}

/// A complete encoded frame, header included, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Header plus body bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Body bytes only.
    pub fn body(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Total length on the wire.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == HEADER_LEN
    }
}

/// Wraps `body` in a frame. Oversized bodies are rejected, never truncated.
pub fn encode(body: &[u8]) -> Result<Frame, FrameError> {
    let header = encode_header(body.len())?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(body);
    Ok(Frame { bytes })
}

/// Renders `len` as a right-aligned, space-padded decimal header.
pub fn encode_header(len: usize) -> Result<[u8; HEADER_LEN], FrameError> {
    if len > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLarge { len });
    }
    let text = format!("{len:>width$}", width = HEADER_LEN);
    let mut header = [b' '; HEADER_LEN];
    header.copy_from_slice(text.as_bytes());
    Ok(header)
}

/// Parses a header into the body length it announces.
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<usize, FrameError> {
    let start = header
        .iter()
        .position(|b| *b != b' ')
        .unwrap_or(HEADER_LEN);
    let digits = &header[start..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::InvalidHeader { header: *header });
    }

    let len = digits
        .iter()
        .fold(0usize, |acc, digit| acc * 10 + usize::from(digit - b'0'));
    if len > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLarge { len });
    }
    Ok(len)
}

/// Reads exactly one frame and returns its body.
#[instrument(level = "trace", skip(reader))]
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;
    let len = decode_header(&header)?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    trace!(len, "Read frame");
    Ok(body)
}

/// Writes one encoded frame and flushes.
#[instrument(level = "trace", skip(writer, frame), fields(len = frame.len()))]
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
