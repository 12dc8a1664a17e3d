//! `get`, `put` and `bases` command implementations

use std::io::Write;

use ipfs_ds_store::{Datastore, Key, Repository, StoreError};

use crate::bases::{DisplayFlags, write_bases};
use crate::cli::{BasesArgs, GetArgs, PutArgs};
use crate::encoding::{self, known_encodings};
use crate::error::CliError;

/// Datastore key from a command-line argument, decoding it first if asked
pub fn datastore_key(raw: &str, encoded: bool) -> Result<Key, CliError> {
    if !encoded {
        return Ok(Key::new(raw));
    }
    let bytes = encoding::decode(raw, "key")?;
    let key = String::from_utf8(bytes).map_err(|source| CliError::NonUtf8Key { source })?;
    Ok(Key::new(key))
}

/// Fetch a value and write it to `out`, followed by a newline
///
/// Without `--base` the raw bytes are written; otherwise the multibase text.
pub async fn get<W: Write>(args: &GetArgs, out: &mut W) -> Result<(), CliError> {
    let base = args
        .base
        .as_deref()
        .map(encoding::encoding_by_name)
        .transpose()?;
    let key = datastore_key(&args.key, args.key_encoded)?;

    let repo = Repository::open_resolved(args.repo.repo.as_deref()).await?;
    tracing::debug!(repo = %repo.path().display(), key = %key, "get");
    let value = repo.datastore().get(&key).await;
    repo.close().await?;

    let value = value?.ok_or_else(|| StoreError::not_found("datastore key", &key))?;
    match base {
        Some(base) => out.write_all(&encoding::encode(base, &value))?,
        None => out.write_all(&value)?,
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Store a value, decoding key and value first if asked
pub async fn put(args: &PutArgs) -> Result<(), CliError> {
    let key = datastore_key(&args.key, args.key_encoded)?;
    let value = if args.value_encoded {
        encoding::decode(&args.value, "value")?
    } else {
        args.value.as_bytes().to_vec()
    };

    let repo = Repository::open_resolved(args.repo.repo.as_deref()).await?;
    tracing::debug!(repo = %repo.path().display(), key = %key, len = value.len(), "put");
    let stored = repo.datastore().put(&key, &value).await;
    repo.close().await?;
    Ok(stored?)
}

/// List the known encodings
pub fn bases<W: Write>(args: &BasesArgs, out: &mut W) -> Result<(), CliError> {
    let flags = DisplayFlags {
        prefix: args.prefix,
        numeric: args.numeric,
    };
    write_bases(out, known_encodings(), flags)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RepoArgs;
    use ipfs_ds_store::StoreErrorKind;
    use tempfile::TempDir;

    fn repo_args(dir: &TempDir) -> RepoArgs {
        RepoArgs {
            repo: Some(dir.path().to_path_buf()),
        }
    }

    fn get_args(dir: &TempDir, key: &str) -> GetArgs {
        GetArgs {
            key: key.into(),
            repo: repo_args(dir),
            ..Default::default()
        }
    }

    fn put_args(dir: &TempDir, key: &str, value: &str) -> PutArgs {
        PutArgs {
            key: key.into(),
            value: value.into(),
            repo: repo_args(dir),
            ..Default::default()
        }
    }

    #[test]
    fn plain_and_encoded_keys() {
        assert_eq!(datastore_key("mykey", false).unwrap(), Key::new("/mykey"));
        // "b" + base32("/mykey")
        assert_eq!(datastore_key("bf5wxs23fpe", true).unwrap(), Key::new("/mykey"));
        assert!(matches!(
            datastore_key("bf5wxs23fpe", false),
            Ok(k) if k == Key::new("/bf5wxs23fpe")
        ));
        assert!(matches!(
            datastore_key("f80ff", true),
            Err(CliError::NonUtf8Key { .. })
        ));
        assert!(matches!(
            datastore_key("!nope", true),
            Err(CliError::Decode { what: "key", .. })
        ));
    }

    #[test]
    fn non_utf8_key_explains_keys_are_paths() {
        let err = datastore_key("f80ff", true).unwrap_err();
        let help = miette::Diagnostic::help(&err)
            .map(|h| h.to_string())
            .unwrap_or_default();
        assert!(help.contains("path strings"), "help: {}", help);
    }

    #[tokio::test]
    async fn put_then_get_round_trip() {
        let dir = TempDir::new().unwrap();
        put(&put_args(&dir, "mykey", "myvalue")).await.unwrap();

        let mut out = Vec::new();
        get(&get_args(&dir, "mykey"), &mut out).await.unwrap();
        assert_eq!(out, b"myvalue\n");
    }

    #[tokio::test]
    async fn encoded_value_and_output_base() {
        let dir = TempDir::new().unwrap();
        let args = PutArgs {
            value_encoded: true,
            ..put_args(&dir, "bf5wxs23fpe", "f68656c6c6f")
        };
        let args = PutArgs {
            key_encoded: true,
            ..args
        };
        put(&args).await.unwrap();

        let mut out = Vec::new();
        get(&get_args(&dir, "/mykey"), &mut out).await.unwrap();
        assert_eq!(out, b"hello\n");

        let mut out = Vec::new();
        let args = GetArgs {
            base: Some("base16".into()),
            ..get_args(&dir, "mykey")
        };
        get(&args, &mut out).await.unwrap();
        assert_eq!(out, b"f68656c6c6f\n");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let err = get(&get_args(&dir, "nonexistent-key"), &mut out)
            .await
            .unwrap_err();

        let CliError::Store(store) = &err else {
            panic!("expected store error, got {:?}", err);
        };
        assert_eq!(store.kind(), &StoreErrorKind::NotFound);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn unknown_base_fails_before_opening_repo() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent");
        let args = GetArgs {
            key: "mykey".into(),
            base: Some("base99".into()),
            repo: RepoArgs {
                repo: Some(absent.clone()),
            },
            key_encoded: false,
        };
        let err = get(&args, &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, CliError::UnknownEncoding { .. }));
        assert!(!absent.exists());
    }

    #[tokio::test]
    async fn bad_encoded_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let args = PutArgs {
            value_encoded: true,
            ..put_args(&dir, "mykey", "b!!!")
        };
        let err = put(&args).await.unwrap_err();
        assert!(matches!(err, CliError::Decode { what: "value", .. }));
    }

    #[test]
    fn bases_listing() {
        let mut out = Vec::new();
        bases(
            &BasesArgs {
                prefix: true,
                numeric: false,
            },
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), known_encodings().len());
        assert_eq!(lines[0], "   identity");
        assert_eq!(lines[4], "b  base32");
        assert_eq!(lines[5], "B  base32upper");
    }
}
