use ipfs_ds_store::StoreError;
use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced by the `ipfs-ds` commands
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    /// Repository or datastore failure, passed through unchanged
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    /// Encoding name (or prefix) not in the registry
    #[error("unknown multibase encoding: {name}")]
    #[diagnostic(
        code(ipfs_ds::unknown_encoding),
        help("Run `ipfs-ds bases` to list the supported encodings")
    )]
    UnknownEncoding {
        /// The requested name
        name: String,
    },

    /// Multibase decoding of a key or value failed
    #[error("failed to decode multibase-encoded {what}")]
    #[diagnostic(
        code(ipfs_ds::decode),
        help("Encoded input starts with its base prefix, e.g. 'b' for base32 or 'z' for base58btc")
    )]
    Decode {
        /// Which argument failed ("key" or "value")
        what: &'static str,
        #[source]
        source: multibase::Error,
    },

    /// A decoded key is not UTF-8, so it cannot name a datastore path
    #[error("decoded key is not valid UTF-8")]
    #[diagnostic(
        code(ipfs_ds::non_utf8_key),
        help("Datastore keys are path strings such as /local/filesroot; encode the key's UTF-8 text")
    )]
    NonUtf8Key {
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Writing to stdout failed
    #[error("failed to write output")]
    #[diagnostic(code(ipfs_ds::output))]
    Output(#[from] std::io::Error),
}
