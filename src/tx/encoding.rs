//! Little-endian byte cursor used by the transaction codec.

const MAX_COMPACT_SIZE: u64 = 0x0200_0000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("non-canonical compact size")]
    NonCanonicalVarInt,
    #[error("compact size exceeds maximum")]
    SizeTooLarge,
    #[error("unsupported serialization type: {0}")]
    UnsupportedSerializeType(u16),
    #[error("witness count {witnesses} does not match input count {inputs}")]
    WitnessCountMismatch { inputs: usize, witnesses: usize },
    #[error("trailing bytes after transaction: {0}")]
    TrailingBytes(usize),
}

#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16_le(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_varint(&mut self, value: u64) {
        if value < 0xfd {
            self.write_u8(value as u8);
        } else if value <= 0xffff {
            self.write_u8(0xfd);
            self.write_u16_le(value as u16);
        } else if value <= 0xffff_ffff {
            self.write_u8(0xfe);
            self.write_u32_le(value as u32);
        } else {
            self.write_u8(0xff);
            self.write_u64_le(value);
        }
    }

    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.write_bytes(bytes);
    }
}

pub struct Decoder<'a> {
    input: &'a [u8],
    cursor: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.input.len().saturating_sub(self.cursor)
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], StructureError> {
        if self.remaining() < len {
            return Err(StructureError::UnexpectedEof);
        }
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.input[start..start + len])
    }

    pub fn read_u8(&mut self) -> Result<u8, StructureError> {
        Ok(self.read_slice(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, StructureError> {
        Ok(u16::from_le_bytes(self.read_fixed::<2>()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, StructureError> {
        Ok(u32::from_le_bytes(self.read_fixed::<4>()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, StructureError> {
        Ok(u64::from_le_bytes(self.read_fixed::<8>()?))
    }

    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], StructureError> {
        let bytes = self.read_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_varint(&mut self) -> Result<u64, StructureError> {
        let prefix = self.read_u8()? as u64;
        let value = match prefix {
            0xfd => {
                let value = self.read_u16_le()? as u64;
                if value < 0xfd {
                    return Err(StructureError::NonCanonicalVarInt);
                }
                value
            }
            0xfe => {
                let value = self.read_u32_le()? as u64;
                if value < 0x1_0000 {
                    return Err(StructureError::NonCanonicalVarInt);
                }
                value
            }
            0xff => {
                let value = self.read_u64_le()?;
                if value < 0x1_0000_0000 {
                    return Err(StructureError::NonCanonicalVarInt);
                }
                value
            }
            value => value,
        };

        if value > MAX_COMPACT_SIZE {
            return Err(StructureError::SizeTooLarge);
        }
        Ok(value)
    }

    /// Reads a compact-size count, rejecting counts that could not possibly
    /// fit in what is left of the input.
    pub fn read_count(&mut self, min_item_size: usize) -> Result<usize, StructureError> {
        let count = usize::try_from(self.read_varint()?).map_err(|_| StructureError::SizeTooLarge)?;
        if count.saturating_mul(min_item_size) > self.remaining() {
            return Err(StructureError::UnexpectedEof);
        }
        Ok(count)
    }

    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, StructureError> {
        let len = self.read_count(1)?;
        Ok(self.read_slice(len)?.to_vec())
    }
}
