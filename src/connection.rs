// ABOUTME: Provides stream connection management for SMPP v3.4 protocol communication
// ABOUTME: Implements whole-PDU framed I/O with buffering over any async byte stream

use crate::client::error::{ConfigError, SmppResult};
use crate::codec::{CodecError, Encodable, Frame, RawPdu};
use bytes::{Buf, BytesMut};
use std::io::{self, Cursor};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::trace;

/// SMPP v3.4 framed transport.
///
/// Reads and writes whole PDUs over a byte stream. A PDU is taken off the
/// read buffer in full (`command_length` octets) before its body is looked
/// at, so a body that later fails to decode never desynchronises the
/// stream.
///
/// ## Session States (Section 2.1)
///
/// ```text
/// CLOSED → OPEN → BOUND_TX/BOUND_RX/BOUND_TRX → CLOSED
/// ```
///
/// `Connection` does not track these; the session layer in
/// [`crate::client::Session`] owns the state machine and decides which PDUs
/// may be sent.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    // The stream is decorated with a `BufWriter`, which provides write
    // level buffering. Every write is followed by a flush.
    stream: BufWriter<S>,

    // The buffer for reading frames.
    buffer: BytesMut,
}

impl Connection<TcpStream> {
    /// Dial the SMSC over TCP.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;
        Ok(Connection::new(socket))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new `Connection`, backed by `stream`. Read and write buffers
    /// are initialized.
    pub fn new(stream: S) -> Connection<S> {
        Connection {
            stream: BufWriter::new(stream),
            // Most PDUs are well under 4KB; message_payload can push a
            // single PDU past this, in which case the buffer grows.
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Read a single whole PDU from the underlying stream, body undecoded.
    ///
    /// Waits until `command_length` octets are buffered. Anything left in
    /// the read buffer is kept for the next call.
    ///
    /// Returns `None` if the peer closed the stream cleanly between PDUs.
    /// A close in the middle of a PDU is an `UnexpectedEof` transport error.
    pub async fn read_pdu(&mut self) -> SmppResult<Option<RawPdu>> {
        loop {
            // Attempt to parse a PDU from the buffered data.
            if let Some(pdu) = self.parse_pdu()? {
                return Ok(Some(pdu));
            }

            // On success, the number of bytes is returned. `0` indicates "end
            // of stream".
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection reset by peer",
                )
                .into());
            }
        }
    }

    /// Read and decode a single frame.
    pub async fn read_frame(&mut self) -> SmppResult<Option<Frame>> {
        match self.read_pdu().await? {
            Some(pdu) => Ok(Some(pdu.decode()?)),
            None => Ok(None),
        }
    }

    /// Tries to split one complete PDU off the buffer. `Ok(None)` means more
    /// data is needed; a command_length outside the framing limits is an
    /// error.
    fn parse_pdu(&mut self) -> SmppResult<Option<RawPdu>> {
        let mut buf = Cursor::new(&self.buffer[..]);

        match Frame::parse_raw(&mut buf) {
            Ok(pdu) => {
                // The length of the PDU is the cursor position after parsing.
                let len = buf.position() as usize;
                trace!(
                    "read {len} octets: {:?} seq={}",
                    pdu.header.command_id, pdu.header.sequence_number
                );

                // Discard the parsed data from the read buffer.
                self.buffer.advance(len);
                Ok(Some(pdu))
            }
            Err(CodecError::Incomplete) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Encode and write a single PDU, then flush.
    ///
    /// Encoding happens into a scratch buffer first, so an encode failure
    /// writes nothing and is reported as a configuration error.
    pub async fn write_frame<E>(&mut self, pdu: &E) -> SmppResult<()>
    where
        E: Encodable + ?Sized,
    {
        let mut buf = BytesMut::with_capacity(pdu.encoded_size());
        pdu.encode(&mut buf).map_err(ConfigError::Encoding)?;

        trace!(
            "write {} octets: {:?} seq={}",
            buf.len(),
            pdu.command_id(),
            pdu.sequence_number()
        );

        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Flush pending writes and shut down the write half of the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}
