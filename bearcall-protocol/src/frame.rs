//! Message envelope: framing for one function call.
//!
//! Envelope layout:
//!
//! ```text
//! +-----------+---------+------------+-------------+----------+-------------+
//! | signature | version | subversion | compression | reserved | call name   |
//! | 8 bytes   | 1 byte  | 1 byte     | 1 byte      | 5 bytes  | n + 1 bytes |
//! +-----------+---------+------------+-------------+----------+-------------+
//! | argument payload (optionally gzipped)                     | crc32       |
//! | concatenated argument encodings, sorted by argument name  | 4 bytes     |
//! +-----------------------------------------------------------+-------------+
//! ```
//!
//! The outer CRC-32 covers every preceding byte of the message. Reserved
//! bytes are written as zero and ignored on read.

use crate::codec::{decode_argument, encode_argument_into, split_argument_list};
use crate::error::{ProtocolError, SubversionMismatch};
use crate::options::Options;
use crate::value::{Argument, Value};
use crate::NAME_TERMINATOR;
use bytes::{BufMut, Bytes, BytesMut};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Read, Write};

/// Magic bytes identifying a BCP message.
pub const SIGNATURE: [u8; 8] = [0x69, 0xDE, 0xDE, 0x69, 0xF0, 0x9F, 0x90, 0xBB];

/// Size of the fixed header before the call name (8 + 1 + 1 + 1 + 5).
pub const HEADER_SIZE: usize = 16;

/// Returns the 8-byte magic, for callers that sniff inputs.
pub fn signature() -> [u8; 8] {
    SIGNATURE
}

/// A decoded function call.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    /// Call name from the envelope.
    pub name: String,
    /// Decoded arguments, keyed by argument name.
    pub args: HashMap<String, Argument>,
    /// Set when the message's subversion differs from the expected one.
    /// The decoded call is still complete.
    pub subversion_warning: Option<SubversionMismatch>,
}

/// Encodes one function call into a standalone message.
///
/// Arguments are serialized in ascending byte order of their names, so the
/// output is a deterministic function of the logical input.
pub fn encode_call(
    name: &str,
    opts: &Options,
    args: &HashMap<String, Value>,
) -> Result<Bytes, ProtocolError> {
    let mut buf = BytesMut::new();
    buf.put_slice(&SIGNATURE);
    buf.put_u8(opts.version());
    buf.put_u8(opts.subversion());
    buf.put_u8(u8::from(opts.compression()));
    buf.put_slice(&[0u8; 5]);
    buf.put_slice(name.as_bytes());
    buf.put_u8(NAME_TERMINATOR);

    let mut keys: Vec<&String> = args.keys().collect();
    keys.sort();
    let mut payload = BytesMut::new();
    for key in keys {
        encode_argument_into(&mut payload, &args[key], key, 0)?;
    }

    if opts.compression() {
        buf.put_slice(&compress(&payload)?);
    } else {
        buf.put_slice(&payload);
    }

    let crc = crc32fast::hash(&buf);
    buf.put_u32(crc);
    Ok(buf.freeze())
}

/// Decodes one function call message.
///
/// Signature, version and checksum failures are fatal. A subversion
/// disagreement is reported through [`FunctionCall::subversion_warning`]
/// while the call still decodes completely.
pub fn decode_call(data: &[u8], opts: &Options) -> Result<FunctionCall, ProtocolError> {
    if data.len() < SIGNATURE.len() {
        return Err(ProtocolError::Truncated("signature"));
    }
    let (sig, rest) = data.split_at(SIGNATURE.len());
    if sig != SIGNATURE {
        let mut got = [0u8; 8];
        got.copy_from_slice(sig);
        return Err(ProtocolError::InvalidSignature(got));
    }

    if rest.len() < HEADER_SIZE - SIGNATURE.len() {
        return Err(ProtocolError::Truncated("header"));
    }
    let version = rest[0];
    let subversion = rest[1];
    let compressed = rest[2] == 1;
    // rest[3..8] is the reserved pad, ignored on read.
    let rest = &rest[8..];

    if version != opts.version() {
        return Err(ProtocolError::VersionMismatch {
            expected: opts.version(),
            actual: version,
        });
    }
    let subversion_warning = (subversion != opts.subversion()).then_some(SubversionMismatch {
        expected: opts.subversion(),
        actual: subversion,
    });

    let term = rest
        .iter()
        .position(|&b| b == NAME_TERMINATOR)
        .ok_or(ProtocolError::Truncated("call name"))?;
    let name = std::str::from_utf8(&rest[..term])
        .map_err(|_| ProtocolError::InvalidUtf8("call name"))?
        .to_string();
    let rest = &rest[term + 1..];

    if rest.len() < 4 {
        return Err(ProtocolError::Truncated("message checksum"));
    }
    let (payload, trailer) = rest.split_at(rest.len() - 4);
    let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let actual = crc32fast::hash(&data[..data.len() - 4]);
    if actual != expected {
        return Err(ProtocolError::ChecksumMismatch { expected, actual });
    }

    let payload: Cow<'_, [u8]> = if compressed {
        Cow::Owned(decompress(payload)?)
    } else {
        Cow::Borrowed(payload)
    };

    let mut args = HashMap::new();
    for piece in split_argument_list(&payload)? {
        let arg = decode_argument(piece)?;
        args.insert(arg.name.clone(), arg);
    }

    Ok(FunctionCall {
        name,
        args,
        subversion_warning,
    })
}

fn compress(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

fn decompress(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut decoder = GzDecoder::new(payload);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
