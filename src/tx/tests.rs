use super::*;

const T1: &str = "fa069bd82eda6b98e9ea40a575de1dc4c053d94a9901a956e13d30f6ab81413e";

fn sample_tx(serialize_type: SerializeType) -> Transaction {
    Transaction {
        version: 1,
        serialize_type,
        inputs: vec![
            TxIn {
                previous_out: OutPoint {
                    hash: T1.parse().unwrap(),
                    index: 0,
                },
                sequence: u32::MAX,
                sign_script: if serialize_type == SerializeType::Full {
                    vec![0x47, 0x30, 0x44]
                } else {
                    Vec::new()
                },
            },
            TxIn {
                previous_out: OutPoint {
                    hash: Hash([7u8; 32]),
                    index: 3,
                },
                sequence: 0,
                sign_script: Vec::new(),
            },
        ],
        outputs: vec![TxOut {
            coin_id: 0,
            amount: 100_000_000,
            pk_script: hex::decode("76a9142a1dfad6bb26da7c0138b85440aa44a76cffade388ac").unwrap(),
        }],
        lock_time: 0,
        expire: 0,
        timestamp: 1_600_000_000,
    }
}

#[test]
fn decodes_what_was_encoded() {
    for serialize_type in [SerializeType::Full, SerializeType::NoWitness] {
        let tx = sample_tx(serialize_type);

        let decoded = decode(&encode(&tx)).unwrap();

        assert_eq!(decoded, tx);
        assert_eq!(decoded.inputs[0].previous_out.hash.to_string(), T1);
        assert_eq!(decoded.inputs[1].previous_out.index, 3);
        assert_eq!(decoded.outputs[0].amount, 100_000_000);
    }
}

#[test]
fn decodes_hand_built_bytes() {
    let mut raw = Vec::new();
    raw.extend_from_slice(&[0x01, 0x00, 0x01, 0x00]); // version 1, no witness
    raw.push(0x01);
    raw.extend_from_slice(&[0xab; 32]);
    raw.extend_from_slice(&2u32.to_le_bytes());
    raw.extend_from_slice(&u32::MAX.to_le_bytes());
    raw.push(0x01);
    raw.extend_from_slice(&0u16.to_le_bytes());
    raw.extend_from_slice(&5000u64.to_le_bytes());
    raw.extend_from_slice(&[0x02, 0x51, 0x52]);
    raw.extend_from_slice(&[0u8; 12]);

    let tx = decode(&hex::encode(&raw)).unwrap();

    assert_eq!(tx.version, 1);
    assert_eq!(tx.serialize_type, SerializeType::NoWitness);
    assert_eq!(tx.inputs.len(), 1);
    assert_eq!(tx.inputs[0].previous_out.hash.to_string(), "ab".repeat(32));
    assert_eq!(tx.inputs[0].previous_out.index, 2);
    assert_eq!(tx.outputs[0].amount, 5000);
    assert_eq!(tx.outputs[0].pk_script, vec![0x51, 0x52]);
}

#[test]
fn odd_length_is_malformed_encoding() {
    let err = decode("abc").unwrap_err();

    assert_eq!(
        err,
        DecodeError::MalformedEncoding(EncodingError::OddLength(3))
    );
}

#[test]
fn non_hex_is_malformed_encoding() {
    let err = decode("zz00").unwrap_err();

    assert_eq!(
        err,
        DecodeError::MalformedEncoding(EncodingError::Hex(
            hex::FromHexError::InvalidHexCharacter { c: 'z', index: 0 }
        ))
    );
}

#[test]
fn truncated_is_malformed_structure() {
    let raw = encode(&sample_tx(SerializeType::Full));

    let err = decode(&raw[..raw.len() - 10]).unwrap_err();

    assert!(matches!(err, DecodeError::MalformedStructure(_)));
}

#[test]
fn empty_input_is_malformed_structure() {
    assert_eq!(
        decode("").unwrap_err(),
        DecodeError::MalformedStructure(StructureError::UnexpectedEof)
    );
}

#[test]
fn unknown_serialize_type_is_rejected() {
    let mut bytes = sample_tx(SerializeType::NoWitness).serialize();
    bytes[2] = 0x02;

    assert_eq!(
        decode(&hex::encode(bytes)).unwrap_err(),
        DecodeError::MalformedStructure(StructureError::UnsupportedSerializeType(2))
    );
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut raw = encode(&sample_tx(SerializeType::NoWitness));
    raw.push_str("00");

    assert_eq!(
        decode(&raw).unwrap_err(),
        DecodeError::MalformedStructure(StructureError::TrailingBytes(1))
    );
}

#[test]
fn witness_count_must_match_inputs() {
    let mut bytes = sample_tx(SerializeType::NoWitness).serialize();
    bytes[2] = 0x00;
    bytes.push(0x01);
    bytes.push(0x00);

    assert_eq!(
        decode(&hex::encode(bytes)).unwrap_err(),
        DecodeError::MalformedStructure(StructureError::WitnessCountMismatch {
            inputs: 2,
            witnesses: 1,
        })
    );
}
