//! Line-oriented manifest text.
//!
//! ```text
//! # free-form header lines
//! # filename,MD5,SHA1
//! relative/path,<32 hex>,<40 hex>
//! ```
//!
//! Paths containing `,` or `"`, or starting with `#`, are written CSV-quoted.
//! The decoder splits on the last two commas, so unquoted paths containing
//! commas from older manifests still load.

use crate::digest::{DigestSet, MD5_LEN, SHA1_LEN};
use crate::error::ParseError;
use crate::manifest::Manifest;
use crate::path::FilePath;
use globset::GlobMatcher;
use std::io::{self, Write};

pub const COMMENT_MARKER: char = '#';
pub const COLUMNS_LINE: &str = "# filename,MD5,SHA1";

/// Write `header` as comment lines, the column legend, then one line per
/// record.
pub fn encode<W: Write>(manifest: &Manifest, header: &[String], mut w: W) -> io::Result<()> {
    for line in header {
        writeln!(w, "{COMMENT_MARKER} {line}")?;
    }
    writeln!(w, "{COLUMNS_LINE}")?;
    for (path, digests) in manifest {
        writeln!(w, "{},{},{}", quote_path(path), digests.md5_hex(), digests.sha1_hex())?;
    }
    w.flush()
}

pub fn encode_to_string(manifest: &Manifest, header: &[String]) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = encode(manifest, header, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse manifest text. Comment and blank lines are skipped, and so are
/// records whose file name matches `skip_names` (manifest files listing
/// themselves). Duplicate paths are rejected.
pub fn decode(text: &str, skip_names: Option<&GlobMatcher>) -> Result<Manifest, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut builder = Manifest::builder();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        let (path, digests) = decode_record(line, line_no)?;
        if skip_names.is_some_and(|m| m.is_match(path.file_name())) {
            tracing::debug!(line = line_no, %path, "skipping manifest self-reference");
            continue;
        }
        builder
            .insert(path, digests)
            .map_err(|path| ParseError::DuplicatePath { line: line_no, path })?;
    }
    Ok(builder.build())
}

/// Like [`decode`] but starting from raw bytes.
pub fn decode_bytes(bytes: &[u8], skip_names: Option<&GlobMatcher>) -> Result<Manifest, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError::NotUtf8)?;
    decode(text, skip_names)
}

fn decode_record(line: &str, line_no: usize) -> Result<(FilePath, DigestSet), ParseError> {
    let fields: Vec<&str> = line.rsplitn(3, ',').collect();
    if fields.len() != 3 {
        return Err(ParseError::FieldCount { line: line_no, found: fields.len() });
    }
    // rsplitn yields right to left.
    let (raw_path, md5_hex, sha1_hex) = (fields[2], fields[1].trim(), fields[0].trim());
    if raw_path.is_empty() {
        return Err(ParseError::EmptyField { line: line_no, field: "path" });
    }
    if md5_hex.is_empty() {
        return Err(ParseError::EmptyField { line: line_no, field: "MD5" });
    }
    if sha1_hex.is_empty() {
        return Err(ParseError::EmptyField { line: line_no, field: "SHA1" });
    }
    let unquoted = unquote_path(raw_path, line_no)?;
    let path = FilePath::parse(&unquoted)
        .map_err(|source| ParseError::BadPath { line: line_no, source })?;

    let mut md5 = [0u8; MD5_LEN];
    hex::decode_to_slice(md5_hex, &mut md5).map_err(|_| ParseError::BadDigest {
        line: line_no,
        field: "MD5",
        width: MD5_LEN * 2,
        value: md5_hex.to_string(),
    })?;
    let mut sha1 = [0u8; SHA1_LEN];
    hex::decode_to_slice(sha1_hex, &mut sha1).map_err(|_| ParseError::BadDigest {
        line: line_no,
        field: "SHA1",
        width: SHA1_LEN * 2,
        value: sha1_hex.to_string(),
    })?;
    Ok((path, DigestSet { md5, sha1 }))
}

fn quote_path(path: &FilePath) -> String {
    let s = path.as_str();
    if s.contains([',', '"']) || s.starts_with(COMMENT_MARKER) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn unquote_path(raw: &str, line_no: usize) -> Result<String, ParseError> {
    let Some(inner) = raw.strip_prefix('"') else {
        return Ok(raw.to_string());
    };
    let Some(inner) = inner.strip_suffix('"') else {
        return Err(ParseError::BadQuoting { line: line_no });
    };
    Ok(inner.replace("\"\"", "\""))
}
