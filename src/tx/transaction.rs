use std::fmt;
use std::str::FromStr;

use super::encoding::{Decoder, Encoder, StructureError};

/// Size of a serialized outpoint plus sequence, the smallest possible input.
const MIN_TX_IN_SIZE: usize = 32 + 4 + 4;
/// Coin id, amount and an empty script length.
const MIN_TX_OUT_SIZE: usize = 2 + 8 + 1;

/// 32-byte transaction hash kept in wire order. Displayed byte-reversed in
/// hex, the same way transaction ids are written everywhere else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hash(pub [u8; 32]);

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(reversed))
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub previous_out: OutPoint,
    pub sequence: u32,
    /// Empty when the transaction was serialized without witness data.
    pub sign_script: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub coin_id: u16,
    pub amount: u64,
    pub pk_script: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum SerializeType {
    Full = 0,
    NoWitness = 1,
}

impl TryFrom<u16> for SerializeType {
    type Error = StructureError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SerializeType::Full),
            1 => Ok(SerializeType::NoWitness),
            other => Err(StructureError::UnsupportedSerializeType(other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u16,
    pub serialize_type: SerializeType,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub expire: u32,
    pub timestamp: u32,
}

impl Transaction {
    pub fn serialize(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();
        let version = u32::from(self.version) | (u32::from(self.serialize_type as u16) << 16);
        encoder.write_u32_le(version);

        encoder.write_varint(self.inputs.len() as u64);
        for input in &self.inputs {
            encoder.write_bytes(&input.previous_out.hash.0);
            encoder.write_u32_le(input.previous_out.index);
            encoder.write_u32_le(input.sequence);
        }

        encoder.write_varint(self.outputs.len() as u64);
        for output in &self.outputs {
            encoder.write_u16_le(output.coin_id);
            encoder.write_u64_le(output.amount);
            encoder.write_var_bytes(&output.pk_script);
        }

        encoder.write_u32_le(self.lock_time);
        encoder.write_u32_le(self.expire);
        encoder.write_u32_le(self.timestamp);

        if self.serialize_type == SerializeType::Full {
            encoder.write_varint(self.inputs.len() as u64);
            for input in &self.inputs {
                encoder.write_var_bytes(&input.sign_script);
            }
        }

        encoder.into_inner()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, StructureError> {
        let mut decoder = Decoder::new(bytes);

        let version = decoder.read_u32_le()?;
        let serialize_type = SerializeType::try_from((version >> 16) as u16)?;

        let input_count = decoder.read_count(MIN_TX_IN_SIZE)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let hash = Hash(decoder.read_fixed::<32>()?);
            let index = decoder.read_u32_le()?;
            let sequence = decoder.read_u32_le()?;
            inputs.push(TxIn {
                previous_out: OutPoint { hash, index },
                sequence,
                sign_script: Vec::new(),
            });
        }

        let output_count = decoder.read_count(MIN_TX_OUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOut {
                coin_id: decoder.read_u16_le()?,
                amount: decoder.read_u64_le()?,
                pk_script: decoder.read_var_bytes()?,
            });
        }

        let lock_time = decoder.read_u32_le()?;
        let expire = decoder.read_u32_le()?;
        let timestamp = decoder.read_u32_le()?;

        if serialize_type == SerializeType::Full {
            let witnesses = decoder.read_count(1)?;
            if witnesses != inputs.len() {
                return Err(StructureError::WitnessCountMismatch {
                    inputs: inputs.len(),
                    witnesses,
                });
            }
            for input in inputs.iter_mut() {
                input.sign_script = decoder.read_var_bytes()?;
            }
        }

        if decoder.remaining() != 0 {
            return Err(StructureError::TrailingBytes(decoder.remaining()));
        }

        Ok(Self {
            version: version as u16,
            serialize_type,
            inputs,
            outputs,
            lock_time,
            expire,
            timestamp,
        })
    }
}
