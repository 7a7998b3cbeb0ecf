//! Codec configuration.

use crate::{PROTOCOL_SUBVERSION, PROTOCOL_VERSION};

/// Immutable configuration for [`encode_call`](crate::encode_call) and
/// [`decode_call`](crate::decode_call).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    version: u8,
    subversion: u8,
    compression: bool,
}

impl Options {
    /// Options with the default wire version and compression off.
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            subversion: PROTOCOL_SUBVERSION,
            compression: false,
        }
    }

    /// Sets the major wire version. A decode mismatch is fatal.
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Sets the minor wire version. A decode mismatch is reported as a
    /// warning while decoding still completes.
    pub fn with_subversion(mut self, subversion: u8) -> Self {
        self.subversion = subversion;
        self
    }

    /// Gzips the argument payload on encode and gunzips it on decode.
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn subversion(&self) -> u8 {
        self.subversion
    }

    pub fn compression(&self) -> bool {
        self.compression
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
