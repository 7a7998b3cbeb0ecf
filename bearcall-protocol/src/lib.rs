//! # bearcall-protocol
//!
//! Wire codec for BCP (Bearcall Call Protocol): a self-describing binary
//! format carrying one named function call together with its named,
//! heterogeneous arguments.
//!
//! This crate provides:
//! - A [`Value`] tree covering primitives, complex numbers, strings,
//!   records, sequences and maps
//! - Recursive argument encoding: type tag, name, signed variable-width
//!   length field, content, CRC-32 trailer
//! - Message framing with magic signature, version fields, optional gzip
//!   compression and an outer CRC-32
//!
//! The codec is purely functional: every operation takes a buffer or value
//! tree and returns an owned result, so it is safe to call from multiple
//! threads on disjoint inputs.

pub mod codec;
pub mod error;
pub mod frame;
pub mod options;
pub mod value;

pub use codec::{decode_argument, encode_argument, split_argument_list};
pub use error::{ProtocolError, SubversionMismatch};
pub use frame::{decode_call, encode_call, signature, FunctionCall, HEADER_SIZE, SIGNATURE};
pub use options::Options;
pub use value::{Argument, Complex32, Complex64, TypeTag, Value};

/// Default major wire version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Default minor wire version.
pub const PROTOCOL_SUBVERSION: u8 = 0;

/// Maximum value nesting accepted by the encoder and decoder.
pub const MAX_DEPTH: usize = 256;

/// Byte terminating every name field on the wire. Names are UTF-8 and can
/// therefore never contain it.
pub const NAME_TERMINATOR: u8 = 0xFF;
