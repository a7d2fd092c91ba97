use std::io;

/// Writes a value into an outgoing frame.
pub trait Serialize<'a> {
    /// Should write the owned part of the message into `buf`.
    ///
    /// # Arguments
    /// * `buf` - The frame buffer to extend.
    ///
    /// # Returns
    /// An optional borrowed tail to be written right after `buf` without copying,
    /// or an `io::Error` if the value can't be encoded.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> io::Result<Option<&'a [u8]>>;
}
