//! Framed transport between the aggregator and its workers.
//!
//! Every frame is a `u64` big endian body length followed by the body of a [`msg::Msg`].
//! Tensor bodies carry a padded json header so their `f32` values can be read in place
//! from an `Align4` receive buffer.

mod align;
mod deserialize;
pub mod msg;
mod receiver;
mod sender;
mod serialize;
pub mod specs;

use tokio::io::{AsyncRead, AsyncWrite};

pub use align::Align4;
pub use deserialize::Deserialize;
pub use receiver::OnoReceiver;
pub use sender::OnoSender;
pub use serialize::Serialize;

/// The frame length prefix.
type LenType = u64;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();

/// Wraps the two halves of a connection into a framed receiver and sender.
///
/// # Arguments
/// * `rx` - The reading half, frames are decoded from it.
/// * `tx` - The writing half, frames are encoded into it.
pub fn channel<R, W>(rx: R, tx: W) -> (OnoReceiver<R>, OnoSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (OnoReceiver::new(rx), OnoSender::new(tx))
}
