//! Argument codec: the recursive, self-describing TLV-with-checksum unit.
//!
//! Wire layout of one encoded argument:
//!
//! ```text
//! +--------+---------+------+------------+---------------+----------+---------+
//! | tag    | name    | 0xFF | size width | size          | content  | crc32   |
//! | 1 byte | n bytes | 1 B  | 1 byte     | 1/2/4/8 bytes | size B   | 4 bytes |
//! +--------+---------+------+------------+---------------+----------+---------+
//! ```
//!
//! The size field is big-endian and signed, written in the smallest of the
//! four widths that holds the content length. Container content is a
//! concatenation of fully formed argument encodings, each carrying its own
//! CRC-32 trailer. The trailing CRC-32 (IEEE) covers every preceding byte of
//! the argument.

use crate::error::ProtocolError;
use crate::value::{Argument, Complex32, Complex64, TypeTag, Value};
use crate::{MAX_DEPTH, NAME_TERMINATOR};
use bytes::{BufMut, BytesMut};

/// Encodes one named value into a standalone argument encoding.
pub fn encode_argument(value: &Value, name: &str) -> Result<BytesMut, ProtocolError> {
    let mut buf = BytesMut::new();
    encode_argument_into(&mut buf, value, name, 0)?;
    Ok(buf)
}

/// Appends the encoding of `(value, name)` to `buf`.
///
/// The CRC trailer covers only this argument's bytes, so arguments can be
/// concatenated into container content or a message payload as-is.
pub(crate) fn encode_argument_into(
    buf: &mut BytesMut,
    value: &Value,
    name: &str,
    depth: usize,
) -> Result<(), ProtocolError> {
    if depth > MAX_DEPTH {
        return Err(ProtocolError::NestingTooDeep(MAX_DEPTH));
    }
    let start = buf.len();
    buf.put_u8(value.tag() as u8);
    buf.put_slice(name.as_bytes());
    buf.put_u8(NAME_TERMINATOR);

    let content = encode_content(value, depth)?;
    put_size(buf, content.len());
    buf.put_slice(&content);

    let crc = crc32fast::hash(&buf[start..]);
    buf.put_u32(crc);
    Ok(())
}

fn encode_content(value: &Value, depth: usize) -> Result<BytesMut, ProtocolError> {
    let mut content = BytesMut::new();
    match value {
        Value::Bool(v) => content.put_u8(u8::from(*v)),
        Value::U8(v) => content.put_u8(*v),
        Value::U16(v) => content.put_u16(*v),
        Value::U32(v) => content.put_u32(*v),
        Value::U64(v) => content.put_u64(*v),
        Value::I8(v) => content.put_i8(*v),
        Value::I16(v) => content.put_i16(*v),
        Value::I32(v) => content.put_i32(*v),
        Value::I64(v) => content.put_i64(*v),
        Value::F32(v) => content.put_f32(*v),
        Value::F64(v) => content.put_f64(*v),
        Value::C64(c) => {
            content.put_f32(c.re);
            content.put_f32(c.im);
        }
        Value::C128(c) => {
            content.put_f64(c.re);
            content.put_f64(c.im);
        }
        Value::Str(s) => content.put_slice(s.as_bytes()),
        Value::Record(fields) => {
            for (field_name, field_value) in fields {
                encode_argument_into(&mut content, field_value, field_name, depth + 1)?;
            }
        }
        Value::Seq(items) => {
            for item in items {
                encode_argument_into(&mut content, item, "", depth + 1)?;
            }
        }
        Value::Map(pairs) => {
            // Pairs go out in ascending order of the stringified key, so the
            // encoding does not depend on insertion order.
            let keys: Vec<String> = pairs.iter().map(|(key, _)| key.to_string()).collect();
            let mut order: Vec<usize> = (0..pairs.len()).collect();
            order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
            for i in order {
                let (key, val) = &pairs[i];
                encode_argument_into(&mut content, key, "", depth + 1)?;
                encode_argument_into(&mut content, val, "", depth + 1)?;
            }
        }
    }
    Ok(content)
}

/// Writes the size-width descriptor and the signed big-endian size field.
fn put_size(buf: &mut BytesMut, len: usize) {
    let len = len as i64;
    if len <= i8::MAX as i64 {
        buf.put_u8(1);
        buf.put_i8(len as i8);
    } else if len <= i16::MAX as i64 {
        buf.put_u8(2);
        buf.put_i16(len as i16);
    } else if len <= i32::MAX as i64 {
        buf.put_u8(4);
        buf.put_i32(len as i32);
    } else {
        buf.put_u8(8);
        buf.put_i64(len);
    }
}

/// Reads a signed big-endian size field of `width` bytes.
fn read_size(width: u8, bytes: &[u8]) -> Result<usize, ProtocolError> {
    let size = match width {
        1 => bytes[0] as i8 as i64,
        2 => i16::from_be_bytes([bytes[0], bytes[1]]) as i64,
        4 => i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
        8 => i64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]),
        other => return Err(ProtocolError::InvalidSizeWidth(other)),
    };
    if size < 0 {
        return Err(ProtocolError::NegativeSize(size));
    }
    Ok(size as usize)
}

/// Decodes one standalone argument encoding.
///
/// The trailing CRC is verified before anything else is parsed. Container
/// content is split with [`split_argument_list`] and decoded recursively.
pub fn decode_argument(data: &[u8]) -> Result<Argument, ProtocolError> {
    decode_argument_at(data, 0)
}

fn decode_argument_at(data: &[u8], depth: usize) -> Result<Argument, ProtocolError> {
    if depth > MAX_DEPTH {
        return Err(ProtocolError::NestingTooDeep(MAX_DEPTH));
    }
    if data.len() < 4 {
        return Err(ProtocolError::Truncated("argument checksum"));
    }
    let (body, trailer) = data.split_at(data.len() - 4);
    let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let actual = crc32fast::hash(body);
    if actual != expected {
        return Err(ProtocolError::ChecksumMismatch { expected, actual });
    }

    let Some((&tag_byte, rest)) = body.split_first() else {
        return Err(ProtocolError::Truncated("type tag"));
    };
    let tag = TypeTag::try_from(tag_byte)?;

    let term = rest
        .iter()
        .position(|&b| b == NAME_TERMINATOR)
        .ok_or(ProtocolError::Truncated("name terminator"))?;
    let name = std::str::from_utf8(&rest[..term])
        .map_err(|_| ProtocolError::InvalidUtf8("argument name"))?
        .to_string();
    let rest = &rest[term + 1..];

    let Some((&width, rest)) = rest.split_first() else {
        return Err(ProtocolError::Truncated("size width"));
    };
    if rest.len() < width as usize {
        return Err(ProtocolError::Truncated("size field"));
    }
    let (size_bytes, content) = rest.split_at(width as usize);
    let size = read_size(width, size_bytes)?;

    if content.len() < size {
        return Err(ProtocolError::Truncated("argument content"));
    }
    if content.len() > size {
        return Err(ProtocolError::TrailingBytes(content.len() - size));
    }

    let value = decode_content(tag, content, depth)?;
    Ok(Argument { name, value, tag })
}

fn decode_content(tag: TypeTag, content: &[u8], depth: usize) -> Result<Value, ProtocolError> {
    match tag {
        TypeTag::Bool => {
            check_width(content, 1)?;
            Ok(Value::Bool(content[0] != 0))
        }
        TypeTag::U8 => {
            check_width(content, 1)?;
            Ok(Value::U8(content[0]))
        }
        TypeTag::U16 => {
            check_width(content, 2)?;
            Ok(Value::U16(u16::from_be_bytes([content[0], content[1]])))
        }
        TypeTag::U32 => {
            check_width(content, 4)?;
            Ok(Value::U32(u32::from_be_bytes([
                content[0], content[1], content[2], content[3],
            ])))
        }
        TypeTag::U64 => {
            check_width(content, 8)?;
            Ok(Value::U64(u64::from_be_bytes([
                content[0], content[1], content[2], content[3], content[4], content[5], content[6],
                content[7],
            ])))
        }
        TypeTag::I8 => {
            check_width(content, 1)?;
            Ok(Value::I8(content[0] as i8))
        }
        TypeTag::I16 => {
            check_width(content, 2)?;
            Ok(Value::I16(i16::from_be_bytes([content[0], content[1]])))
        }
        TypeTag::I32 => {
            check_width(content, 4)?;
            Ok(Value::I32(i32::from_be_bytes([
                content[0], content[1], content[2], content[3],
            ])))
        }
        TypeTag::I64 => {
            check_width(content, 8)?;
            Ok(Value::I64(i64::from_be_bytes([
                content[0], content[1], content[2], content[3], content[4], content[5], content[6],
                content[7],
            ])))
        }
        TypeTag::F32 => {
            check_width(content, 4)?;
            Ok(Value::F32(f32::from_be_bytes([
                content[0], content[1], content[2], content[3],
            ])))
        }
        TypeTag::F64 => {
            check_width(content, 8)?;
            Ok(Value::F64(f64::from_be_bytes([
                content[0], content[1], content[2], content[3], content[4], content[5], content[6],
                content[7],
            ])))
        }
        TypeTag::C64 => {
            check_width(content, 8)?;
            Ok(Value::C64(Complex32::new(
                f32::from_be_bytes([content[0], content[1], content[2], content[3]]),
                f32::from_be_bytes([content[4], content[5], content[6], content[7]]),
            )))
        }
        TypeTag::C128 => {
            check_width(content, 16)?;
            Ok(Value::C128(Complex64::new(
                f64::from_be_bytes([
                    content[0], content[1], content[2], content[3], content[4], content[5],
                    content[6], content[7],
                ]),
                f64::from_be_bytes([
                    content[8], content[9], content[10], content[11], content[12], content[13],
                    content[14], content[15],
                ]),
            )))
        }
        TypeTag::Str => Ok(Value::Str(
            std::str::from_utf8(content)
                .map_err(|_| ProtocolError::InvalidUtf8("string content"))?
                .to_string(),
        )),
        TypeTag::Record => {
            let mut fields = Vec::new();
            for piece in split_argument_list(content)? {
                let arg = decode_argument_at(piece, depth + 1)?;
                fields.push((arg.name, arg.value));
            }
            Ok(Value::Record(fields))
        }
        TypeTag::Seq => {
            let mut items = Vec::new();
            for piece in split_argument_list(content)? {
                items.push(decode_argument_at(piece, depth + 1)?.value);
            }
            Ok(Value::Seq(items))
        }
        TypeTag::StrMap => {
            // String-keyed variant: each inner argument carries its key as
            // the name field.
            let mut pairs = Vec::new();
            for piece in split_argument_list(content)? {
                let arg = decode_argument_at(piece, depth + 1)?;
                pairs.push((Value::Str(arg.name), arg.value));
            }
            Ok(Value::Map(pairs))
        }
        TypeTag::Map => {
            let pieces = split_argument_list(content)?;
            if pieces.len() % 2 != 0 {
                return Err(ProtocolError::OddMapEntryCount(pieces.len()));
            }
            let mut pairs = Vec::with_capacity(pieces.len() / 2);
            for pair in pieces.chunks_exact(2) {
                let key = decode_argument_at(pair[0], depth + 1)?.value;
                let val = decode_argument_at(pair[1], depth + 1)?.value;
                pairs.push((key, val));
            }
            Ok(Value::Map(pairs))
        }
    }
}

fn check_width(content: &[u8], want: usize) -> Result<(), ProtocolError> {
    if content.len() < want {
        return Err(ProtocolError::Truncated("fixed-width content"));
    }
    if content.len() > want {
        return Err(ProtocolError::TrailingBytes(content.len() - want));
    }
    Ok(())
}

/// Splits a concatenation of encoded arguments into per-argument slices.
///
/// Walks the structure only. CRC trailers are carried through unverified and
/// checked when each slice is decoded with [`decode_argument`].
pub fn split_argument_list(data: &[u8]) -> Result<Vec<&[u8]>, ProtocolError> {
    let mut result = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        // Tag + name + terminator.
        let term = rest
            .iter()
            .position(|&b| b == NAME_TERMINATOR)
            .ok_or(ProtocolError::Truncated("name terminator"))?;
        let mut len = term + 1;

        let width = *rest
            .get(len)
            .ok_or(ProtocolError::Truncated("size width"))?;
        len += 1;

        let size_bytes = rest
            .get(len..len + width as usize)
            .ok_or(ProtocolError::Truncated("size field"))?;
        let size = read_size(width, size_bytes)?;
        len += width as usize;

        let total = len
            .checked_add(size)
            .and_then(|n| n.checked_add(4))
            .ok_or(ProtocolError::Truncated("argument content"))?;
        if rest.len() < total {
            return Err(ProtocolError::Truncated("argument content"));
        }
        let (piece, tail) = rest.split_at(total);
        result.push(piece);
        rest = tail;
    }
    Ok(result)
}
