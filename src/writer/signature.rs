//! The `[SIGNATURE]` section: an md5 hash of everything written before it.
//!
//! The newline in front of `[SIGNATURE]` belongs to the signature, so the hash
//! covers the file up to that newline, excluding it.

use crate::error::SignatureError;

const HEADER: &str = "\n[SIGNATURE]\n";

pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

pub fn section(hash: &str) -> String {
    [
        HEADER,
        "# This is the hash of the Pulseq file, calculated right before the [SIGNATURE] section was added\n",
        "# It can be reproduced/verified with md5sum if the file trimmed to the position right above [SIGNATURE]\n",
        "# The new line character preceding [SIGNATURE] BELONGS to the signature (and needs to be stripped away for recalculating/verification)\n",
        "Type md5\n",
        "Hash ",
        hash,
        "\n",
    ]
    .concat()
}

/// Check the stored hash of a complete `.seq` file against its content.
pub fn verify_signature(contents: &str) -> Result<(), SignatureError> {
    let start = contents.rfind(HEADER).ok_or(SignatureError::Missing)?;
    let signed = &contents[..start];
    let section = &contents[start + HEADER.len()..];

    let mut hash = None;
    for line in section.lines().map(str::trim) {
        if let Some(kind) = line.strip_prefix("Type ") {
            if kind.trim() != "md5" {
                return Err(SignatureError::UnsupportedType(kind.trim().to_owned()));
            }
        } else if let Some(stored) = line.strip_prefix("Hash ") {
            hash = Some(stored.trim());
        }
    }

    let stored = hash.ok_or(SignatureError::MissingHash)?;
    let computed = digest(signed.as_bytes());
    if stored.eq_ignore_ascii_case(&computed) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch {
            stored: stored.to_owned(),
            computed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "[VERSION]\nmajor 1\nminor 4\nrevision 1\n\n";

    #[test]
    fn known_digest() {
        assert_eq!(digest(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn newline_before_header_is_not_hashed() {
        let hash = digest(BODY.as_bytes());
        let file = format!("{BODY}{}", section(&hash));
        assert!(file.contains("\n\n\n[SIGNATURE]\n"));
        assert_eq!(verify_signature(&file), Ok(()));

        // hashing up to and including the newline gives a different result
        let with_newline = &file[..=file.find("[SIGNATURE]").unwrap() - 1];
        assert_ne!(digest(with_newline.as_bytes()), hash);
    }

    #[test]
    fn header_text_inside_the_body_is_skipped() {
        let body = format!("{BODY}[DEFINITIONS]\nName x{HEADER}\n");
        let hash = digest(body.as_bytes());
        let file = format!("{body}{}", section(&hash));
        assert_eq!(file.matches(HEADER).count(), 2);
        assert_eq!(verify_signature(&file), Ok(()));
    }

    #[test]
    fn tampering_is_detected() {
        let file = format!("{BODY}{}", section(&digest(BODY.as_bytes())));
        let tampered = file.replacen("minor 4", "minor 5", 1);
        assert!(matches!(
            verify_signature(&tampered),
            Err(SignatureError::Mismatch { .. })
        ));
        assert_eq!(verify_signature(BODY), Err(SignatureError::Missing));
        let sha = file.replace("Type md5", "Type sha1");
        assert_eq!(
            verify_signature(&sha),
            Err(SignatureError::UnsupportedType("sha1".to_owned()))
        );
    }
}
