//! Record codec
//!
//! Encodes and decodes a single log entry.

use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SegkvError};

/// Length prefix size: KeyLen (4) + ValLen (4) = 8 bytes
pub const RECORD_HEADER_SIZE: u64 = 8;

/// Value length indicating a tombstone (deleted key)
pub const TOMBSTONE_MARKER: i32 = -1;

/// A single segment entry: a key and either a value or a tombstone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: Bytes,
    value: Option<Bytes>,
}

impl Record {
    /// A normal write
    pub fn put(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// A delete marker
    pub fn tombstone(key: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn key(&self) -> &Bytes {
        &self.key
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Bytes> {
        self.value
    }

    pub fn is_value_present(&self) -> bool {
        self.value.is_some()
    }

    /// Encoded length: 8 + key length + value length (0 for tombstones)
    pub fn size(&self) -> u64 {
        RECORD_HEADER_SIZE
            + self.key.len() as u64
            + self.value.as_ref().map_or(0, |v| v.len() as u64)
    }

    /// Encode into `[KeyLen][ValLen][Key][Value]`
    pub fn encode(&self) -> Result<Bytes> {
        let key_len = length_field(self.key.len(), "key")?;
        let val_len = match &self.value {
            Some(v) => length_field(v.len(), "value")?,
            None => TOMBSTONE_MARKER,
        };

        let mut buf = BytesMut::with_capacity(self.size() as usize);
        buf.put_i32(key_len);
        buf.put_i32(val_len);
        buf.put_slice(&self.key);
        if let Some(v) = &self.value {
            buf.put_slice(v);
        }

        Ok(buf.freeze())
    }

    /// Write the encoded record, returning the number of bytes written
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64> {
        let bytes = self.encode()?;
        writer.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }

    /// Decode the next record from a stream positioned at a record boundary
    ///
    /// Returns:
    /// - `Ok(Some(record))`: one complete record
    /// - `Ok(None)`: clean end of stream
    /// - `Err(Corruption)`: the stream ends inside a record or lengths are invalid
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut header = [0u8; RECORD_HEADER_SIZE as usize];
        let filled = read_fully(reader, &mut header)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < header.len() {
            return Err(SegkvError::Corruption(format!(
                "truncated record header: {} of {} bytes",
                filled,
                header.len()
            )));
        }

        let mut fields = &header[..];
        let key_len = fields.get_i32();
        let val_len = fields.get_i32();

        if key_len < 0 {
            return Err(SegkvError::Corruption(format!(
                "negative key length {}",
                key_len
            )));
        }
        if val_len < TOMBSTONE_MARKER {
            return Err(SegkvError::Corruption(format!(
                "invalid value length {}",
                val_len
            )));
        }

        let key = read_field(reader, key_len as u64, "key")?;
        let value = if val_len == TOMBSTONE_MARKER {
            None
        } else {
            Some(read_field(reader, val_len as u64, "value")?)
        };

        Ok(Some(Self { key, value }))
    }
}

fn length_field(len: usize, what: &str) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        SegkvError::InvalidArgument(format!("{} of {} bytes is too large to encode", what, len))
    })
}

/// Fill `buf` as far as the stream allows; returns how many bytes were read
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Read exactly `len` bytes, growing the buffer only as data arrives
fn read_field<R: Read>(reader: &mut R, len: u64, what: &str) -> Result<Bytes> {
    let mut data = Vec::new();
    reader.take(len).read_to_end(&mut data)?;
    if (data.len() as u64) < len {
        return Err(SegkvError::Corruption(format!(
            "truncated record {}: {} of {} bytes",
            what,
            data.len(),
            len
        )));
    }
    Ok(Bytes::from(data))
}
