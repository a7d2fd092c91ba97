//! Writes frames: a big endian length prefix, the serialized head of the message
//! and, for tensor messages, the raw `f32` values straight from the caller's slice.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{LEN_TYPE_SIZE, LenType, Serialize};

/// The sending end handle of the communication.
///
/// Keeps a scratch buffer for message heads, so steady state sends don't allocate.
pub struct OnoSender<W: AsyncWrite + Unpin> {
    tx: W,
    head: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> OnoSender<W> {
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            head: Vec::new(),
        }
    }

    /// Encodes `msg` and writes it as a single frame.
    ///
    /// # Arguments
    /// * `msg` - The message to send, its tensor values are written without copying.
    ///
    /// # Returns
    /// An `io::Error` if `msg` can't be encoded or the writer fails.
    pub async fn send<'a, T: Serialize<'a>>(&mut self, msg: &'a T) -> io::Result<()> {
        let values = self.encode(msg)?;

        self.tx.write_all(&self.head).await?;
        if let Some(values) = values {
            self.tx.write_all(values).await?;
        }

        self.tx.flush().await
    }

    /// Fills the head buffer with the length prefix and the serialized head of `msg`.
    ///
    /// # Returns
    /// The borrowed tail that completes the frame, if any.
    fn encode<'a, T: Serialize<'a>>(&mut self, msg: &'a T) -> io::Result<Option<&'a [u8]>> {
        self.head.clear();
        self.head.extend_from_slice(&[0; LEN_TYPE_SIZE]);

        let tail = msg.serialize(&mut self.head)?;
        let body_len = self.head.len() - LEN_TYPE_SIZE + tail.map_or(0, <[u8]>::len);

        self.head[..LEN_TYPE_SIZE].copy_from_slice(&(body_len as LenType).to_be_bytes());
        Ok(tail)
    }
}
