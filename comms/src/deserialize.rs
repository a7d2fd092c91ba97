use std::io;

/// Reads a value back from a received frame, possibly borrowing from it.
pub trait Deserialize<'a>: Sized {
    /// Should decode `buf` into a new instance.
    ///
    /// # Arguments
    /// * `buf` - The frame body, without the length prefix.
    fn deserialize(buf: &'a [u8]) -> io::Result<Self>;
}
