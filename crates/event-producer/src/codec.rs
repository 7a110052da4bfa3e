//! Avro datum encoding in the Confluent wire format.
//!
//! Every payload is laid out as:
//!
//! ```text
//! +-------+----------------------+------------------+
//! | 0x00  | schema id (u32, BE)  | avro datum bytes |
//! +-------+----------------------+------------------+
//! ```

use crate::schema::SchemaId;
use apache_avro::types::Value;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};
use serde::Serialize;
use std::io::Cursor;

const MAGIC_BYTE: u8 = 0;
const HEADER_LEN: usize = 5;

/// Encode `value` against `schema`, prefixed with the wire-format header.
///
/// Fails if `value` does not conform to `schema`.
pub fn encode<T: Serialize>(schema: &Schema, id: SchemaId, value: &T) -> Result<Vec<u8>, String> {
    let avro_value = apache_avro::to_value(value).map_err(|e| e.to_string())?;
    let resolved = avro_value.resolve(schema).map_err(|e| e.to_string())?;
    let datum = to_avro_datum(schema, resolved).map_err(|e| e.to_string())?;

    let mut buf = Vec::with_capacity(HEADER_LEN + datum.len());
    buf.push(MAGIC_BYTE);
    buf.extend_from_slice(&id.0.to_be_bytes());
    buf.extend_from_slice(&datum);
    Ok(buf)
}

/// Decode a wire-format payload written with `schema`.
pub fn decode(schema: &Schema, data: &[u8]) -> Result<(SchemaId, Value), String> {
    if data.len() < HEADER_LEN {
        return Err(format!(
            "payload too short for wire format: {} bytes",
            data.len()
        ));
    }
    if data[0] != MAGIC_BYTE {
        return Err(format!(
            "invalid magic byte: expected {MAGIC_BYTE}, got {}",
            data[0]
        ));
    }

    let id = SchemaId(u32::from_be_bytes([data[1], data[2], data[3], data[4]]));
    let mut cursor = Cursor::new(&data[HEADER_LEN..]);
    let value = from_avro_datum(schema, &mut cursor, None).map_err(|e| e.to_string())?;
    Ok((id, value))
}
