use std::{borrow::Cow, io};

use serde::de::DeserializeOwned;

use crate::{Deserialize, Serialize, specs::aggregator::AggregatorSpec};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();

const ERR: Header = 0;
const CONTROL: Header = 1;
const UPDATE: Header = 2;
const PARAMS: Header = 3;

/// Addressing and shape of an update, the values travel next to it.
///
/// `dimensions == [-1]` marks a whole update, in which case `index` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateHeader {
    pub shape: Vec<usize>,
    pub dimensions: Vec<i32>,
    pub index: i64,
}

impl UpdateHeader {
    /// Creates the header of a whole update of the given shape.
    pub fn whole(shape: Vec<usize>) -> Self {
        Self {
            shape,
            dimensions: vec![-1],
            index: 0,
        }
    }
}

/// The payload data for the `Data` variant of the `Msg` enum.
#[derive(Debug)]
pub enum Payload<'a> {
    Update {
        header: UpdateHeader,
        values: &'a [f32],
    },
    Params {
        shape: Vec<usize>,
        values: &'a [f32],
    },
}

/// The command for the `Control` variant of the `Msg` enum.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CreateAggregator(AggregatorSpec),
    Disconnect,
}

/// The application layer message for the entire system.
#[derive(Debug)]
pub enum Msg<'a> {
    Control(Command),
    Data(Payload<'a>),
    Err(Cow<'a, str>),
}

impl Msg<'_> {
    fn buf_is_too_small<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("The given buffer is too small {size}, must at least be {HEADER_SIZE} bytes"),
        ))
    }

    fn invalid_kind<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind header {kind}"),
        ))
    }

    /// Writes a json header for a tensor followed by space padding, so the values
    /// that come after it start at a 4 byte boundary of the frame body.
    fn write_tensor_header<H: serde::Serialize>(buf: &mut Vec<u8>, header: &H) -> io::Result<()> {
        let len_at = buf.len();
        buf.extend_from_slice(&[0; HEADER_SIZE]);
        serde_json::to_writer(&mut *buf, header)?;

        let padded = (buf.len() - len_at - HEADER_SIZE).next_multiple_of(HEADER_SIZE);
        buf.resize(len_at + HEADER_SIZE + padded, b' ');
        buf[len_at..len_at + HEADER_SIZE].copy_from_slice(&(padded as Header).to_be_bytes());
        Ok(())
    }

    /// Splits a tensor frame into its json header and its values.
    fn read_tensor<'a, H: DeserializeOwned>(buf: &'a [u8]) -> io::Result<(H, &'a [f32])> {
        let Some((len, rest)) = buf.split_first_chunk::<HEADER_SIZE>() else {
            return Self::buf_is_too_small(buf.len());
        };

        let len = Header::from_be_bytes(*len) as usize;
        if rest.len() < len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Tensor header of {len} bytes overflows the frame"),
            ));
        }

        let (header, values) = rest.split_at(len);
        let header = serde_json::from_slice(header)?;
        let values = bytemuck::try_cast_slice(values).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid tensor values: {e:?}"),
            )
        })?;

        Ok((header, values))
    }
}

impl<'a> Serialize<'a> for Msg<'a> {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> io::Result<Option<&'a [u8]>> {
        match self {
            Msg::Err(e) => {
                buf.extend_from_slice(&ERR.to_be_bytes());
                Ok(Some(e.as_bytes()))
            }
            Msg::Control(cmd) => {
                buf.extend_from_slice(&CONTROL.to_be_bytes());
                serde_json::to_writer(buf, cmd)?;
                Ok(None)
            }
            Msg::Data(Payload::Update { header, values }) => {
                buf.extend_from_slice(&UPDATE.to_be_bytes());
                Self::write_tensor_header(buf, header)?;
                Ok(Some(bytemuck::cast_slice(values)))
            }
            Msg::Data(Payload::Params { shape, values }) => {
                buf.extend_from_slice(&PARAMS.to_be_bytes());
                Self::write_tensor_header(buf, shape)?;
                Ok(Some(bytemuck::cast_slice(values)))
            }
        }
    }
}

impl<'a> Deserialize<'a> for Msg<'a> {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self> {
        let Some((kind, rest)) = buf.split_first_chunk::<HEADER_SIZE>() else {
            return Self::buf_is_too_small(buf.len());
        };

        match Header::from_be_bytes(*kind) {
            ERR => {
                let string = std::str::from_utf8(rest)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

                Ok(Self::Err(Cow::Borrowed(string)))
            }
            CONTROL => {
                let cmd = serde_json::from_slice(rest)?;
                Ok(Self::Control(cmd))
            }
            UPDATE => {
                let (header, values) = Self::read_tensor(rest)?;
                Ok(Self::Data(Payload::Update { header, values }))
            }
            PARAMS => {
                let (shape, values) = Self::read_tensor(rest)?;
                Ok(Self::Data(Payload::Params { shape, values }))
            }
            kind => Self::invalid_kind(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(msg: &Msg) -> Vec<u8> {
        let mut buf = Vec::new();
        let tail = msg.serialize(&mut buf).unwrap();
        buf.extend_from_slice(tail.unwrap_or_default());
        buf
    }

    #[test]
    fn tensor_values_start_aligned() {
        for dims in [vec![-1], vec![0], vec![0, 2], vec![10, 11, 12]] {
            let header = UpdateHeader {
                shape: vec![2, 2],
                dimensions: dims,
                index: 3,
            };

            let msg = Msg::Data(Payload::Update {
                header,
                values: &[1., 2., 3., 4.],
            });

            let buf = encode(&msg);
            let len = u32::from_be_bytes(buf[4..8].try_into().unwrap()) as usize;
            assert_eq!((HEADER_SIZE * 2 + len) % HEADER_SIZE, 0);
        }
    }

    #[test]
    fn update_header_is_recovered() {
        let header = UpdateHeader {
            shape: vec![1, 3],
            dimensions: vec![0],
            index: 1,
        };

        let msg = Msg::Data(Payload::Update {
            header: header.clone(),
            values: &[2., 2., 2.],
        });

        let bytes = encode(&msg);
        let mut aligned = vec![0u32; bytes.len().div_ceil(4)];
        let view: &mut [u8] = bytemuck::cast_slice_mut(&mut aligned);
        view[..bytes.len()].copy_from_slice(&bytes);

        match Msg::deserialize(&view[..bytes.len()]).unwrap() {
            Msg::Data(Payload::Update { header: got, values }) => {
                assert_eq!(got, header);
                assert_eq!(values, [2., 2., 2.]);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let buf = 9u32.to_be_bytes();
        assert!(Msg::deserialize(&buf).is_err());
    }

    #[test]
    fn short_frame_is_rejected() {
        assert!(Msg::deserialize(&[0, 1]).is_err());
    }

    #[test]
    fn oversized_tensor_header_is_rejected() {
        let mut buf = PARAMS.to_be_bytes().to_vec();
        buf.extend_from_slice(&64u32.to_be_bytes());
        buf.extend_from_slice(b"[3]");
        assert!(Msg::deserialize(&buf).is_err());
    }
}
