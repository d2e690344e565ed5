//! Base64 image payloads as stored on plants and plant types.
//!
//! Images travel either as bare base64 or as `data:image/<kind>;base64,...`
//! URIs; both are stored verbatim once validated.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image is not valid base64")]
    InvalidBase64,

    #[error("Image data URI must look like data:image/<type>;base64,<data>")]
    UnsupportedDataUri,

    #[error("Image is {size} bytes, over the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("Could not read image {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Checks that `encoded` decodes to at most `max_bytes` bytes.
pub fn validate(encoded: &str, max_bytes: usize) -> Result<(), ImageError> {
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',').ok_or(ImageError::UnsupportedDataUri)?;
            if !header.starts_with("image/") || !header.ends_with(";base64") {
                return Err(ImageError::UnsupportedDataUri);
            }
            data
        }
        None => encoded,
    };

    // Cheap upper bound before decoding anything large.
    let estimated = payload.len() / 4 * 3;
    if estimated > max_bytes + 2 {
        return Err(ImageError::TooLarge {
            size: estimated,
            max: max_bytes,
        });
    }

    let decoded = STANDARD
        .decode(payload)
        .map_err(|_| ImageError::InvalidBase64)?;
    if decoded.len() > max_bytes {
        return Err(ImageError::TooLarge {
            size: decoded.len(),
            max: max_bytes,
        });
    }
    Ok(())
}

pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Reads a PNG from disk as a data URI. A missing file is `Ok(None)`.
pub fn load_png_data_uri(path: &Path) -> Result<Option<String>, ImageError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(png_data_uri(&bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ImageError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_base64_and_data_uris() {
        assert!(validate("aGVsbG8=", 16).is_ok());
        assert!(validate("data:image/png;base64,aGVsbG8=", 16).is_ok());
        assert!(validate("data:image/jpeg;base64,aGVsbG8=", 16).is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(validate("not base64!!", 64), Err(ImageError::InvalidBase64)));
        assert!(matches!(
            validate("data:text/plain;base64,aGVsbG8=", 64),
            Err(ImageError::UnsupportedDataUri)
        ));
        assert!(matches!(
            validate("data:image/png,aGVsbG8=", 64),
            Err(ImageError::UnsupportedDataUri)
        ));
        assert!(matches!(
            validate("data:image/png;base64", 64),
            Err(ImageError::UnsupportedDataUri)
        ));
    }

    #[test]
    fn enforces_size_limit() {
        // "hello" is 5 bytes
        assert!(validate("aGVsbG8=", 5).is_ok());
        assert!(matches!(
            validate("aGVsbG8=", 4),
            Err(ImageError::TooLarge { size: 5, max: 4 })
        ));

        let big = STANDARD.encode(vec![0u8; 4096]);
        assert!(matches!(validate(&big, 1024), Err(ImageError::TooLarge { .. })));
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("herb.png");
        std::fs::write(&path, b"hello").unwrap();

        let uri = load_png_data_uri(&path).unwrap().unwrap();
        assert_eq!(uri, "data:image/png;base64,aGVsbG8=");
        assert!(load_png_data_uri(&dir.path().join("missing.png")).unwrap().is_none());
    }
}
