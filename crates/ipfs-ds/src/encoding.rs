//! Multibase encoding registry and codec lookup
//!
//! The registry names every base the `multibase` crate implements, using the
//! names the node software prints. Encoding and decoding themselves are
//! delegated to `multibase`.

use multibase::Base;

use crate::error::CliError;

/// One registered text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingEntry {
    /// Unicode scalar of the one-character multibase prefix
    pub code: u32,
    /// Short name, e.g. `base32`
    pub name: &'static str,
}

const REGISTRY: &[(Base, &str)] = &[
    (Base::Identity, "identity"),
    (Base::Base2, "base2"),
    (Base::Base8, "base8"),
    (Base::Base10, "base10"),
    (Base::Base16Lower, "base16"),
    (Base::Base16Upper, "base16upper"),
    (Base::Base32Lower, "base32"),
    (Base::Base32Upper, "base32upper"),
    (Base::Base32PadLower, "base32pad"),
    (Base::Base32PadUpper, "base32padupper"),
    (Base::Base32HexLower, "base32hex"),
    (Base::Base32HexUpper, "base32hexupper"),
    (Base::Base32HexPadLower, "base32hexpad"),
    (Base::Base32HexPadUpper, "base32hexpadupper"),
    (Base::Base32Z, "base32z"),
    (Base::Base36Lower, "base36"),
    (Base::Base36Upper, "base36upper"),
    (Base::Base58Btc, "base58btc"),
    (Base::Base58Flickr, "base58flickr"),
    (Base::Base64, "base64"),
    (Base::Base64Pad, "base64pad"),
    (Base::Base64Url, "base64url"),
    (Base::Base64UrlPad, "base64urlpad"),
];

/// Every registered encoding, in registry order
pub fn known_encodings() -> Vec<EncodingEntry> {
    REGISTRY
        .iter()
        .map(|(base, name)| EncodingEntry {
            code: base.code() as u32,
            name: *name,
        })
        .collect()
}

/// Look up a base by registry name, or by its single-character prefix
pub fn encoding_by_name(name: &str) -> Result<Base, CliError> {
    if let Some((base, _)) = REGISTRY.iter().find(|(_, n)| *n == name) {
        return Ok(*base);
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(code), None) => Base::from_code(code).map_err(|_| CliError::UnknownEncoding {
            name: name.to_string(),
        }),
        _ => Err(CliError::UnknownEncoding {
            name: name.to_string(),
        }),
    }
}

/// Multibase-encode bytes, prefix included
///
/// The identity base is written as a NUL prefix followed by the raw bytes,
/// so it works for values that are not UTF-8.
pub fn encode(base: Base, data: &[u8]) -> Vec<u8> {
    match base {
        Base::Identity => {
            let mut out = Vec::with_capacity(data.len() + 1);
            out.push(0);
            out.extend_from_slice(data);
            out
        }
        other => multibase::encode(other, data).into_bytes(),
    }
}

/// Decode multibase text; `what` names the argument for error reports
pub fn decode(text: &str, what: &'static str) -> Result<Vec<u8>, CliError> {
    multibase::decode(text)
        .map(|(_, bytes)| bytes)
        .map_err(|source| CliError::Decode { what, source })
}
