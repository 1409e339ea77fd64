//! Wire framing for the session: one packet per length-prefixed JSON
//! frame. The byte layout is owned by this seam, not by the protocol.
//! Peers that agree on a different framing only need to swap this
//! module out.

use cep_core::{ClientError, Packet};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Hard cap on a single frame. A length prefix above this is treated
/// as a framing fault, not a packet.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Transport-level failures. `Io` and `FrameTooLarge` poison the
/// connection; `Decode` consumes exactly one frame and leaves the
/// stream aligned on the next length prefix.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed packet: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
}

impl TransportError {
    /// True when the connection cannot be read past this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

/// Establish the TCP connection to the server endpoint. No retry: an
/// unreachable endpoint surfaces immediately.
pub async fn connect(host: &str, port: u16) -> Result<TcpStream, ClientError> {
    TcpStream::connect((host, port))
        .await
        .map_err(|e| ClientError::Connection(format!("{host}:{port}: {e}")))
}

/// Write one packet as a length-prefixed JSON frame.
pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(packet)?;
    if payload.len() > MAX_FRAME_SIZE {
        return Err(TransportError::FrameTooLarge {
            len: payload.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one whole packet. Blocks until a full frame is available or
/// the connection closes.
pub async fn read_packet<R>(reader: &mut R) -> Result<Packet, TransportError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await? as usize;
    if len > MAX_FRAME_SIZE {
        return Err(TransportError::FrameTooLarge {
            len,
            max: MAX_FRAME_SIZE,
        });
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(serde_json::from_slice(&payload)?)
}
