use bitfit_core::digest::DigestSet;
use bitfit_core::error::ParseError;
use bitfit_core::manifest::Manifest;
use bitfit_core::manifest_codec::{decode, encode_to_string};
use bitfit_core::path::FilePath;
use bitfit_core::RunConfig;
use proptest::prelude::*;

const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

fn manifest(items: &[(&str, &[u8])]) -> Manifest {
    let mut b = Manifest::builder();
    for (p, content) in items {
        b.insert(FilePath::parse(p).unwrap(), DigestSet::of(content)).unwrap();
    }
    b.build()
}

#[test]
fn encodes_header_legend_and_records_in_path_order() {
    let m = manifest(&[("b.txt", b""), ("a/z.txt", b""), ("a.txt", b"")]);
    let text = encode_to_string(&m, &["bitfit 1.0.0 output".to_string(), "bitfit /data".to_string()]);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "# bitfit 1.0.0 output");
    assert_eq!(lines[1], "# bitfit /data");
    assert_eq!(lines[2], "# filename,MD5,SHA1");
    // Directory contents come before a sibling whose name extends the
    // directory's name, as a sorted depth-first walk visits them.
    assert_eq!(lines[3], format!("a/z.txt,{EMPTY_MD5},{EMPTY_SHA1}"));
    assert_eq!(lines[4], format!("a.txt,{EMPTY_MD5},{EMPTY_SHA1}"));
    assert_eq!(lines[5], format!("b.txt,{EMPTY_MD5},{EMPTY_SHA1}"));
    assert_eq!(lines.len(), 6);
}

#[test]
fn decodes_crlf_comments_and_trailing_blank_lines() {
    let text = format!(
        "# bitfit 1.0.0 output generated on now by me\r\n# filename,MD5,SHA1\r\n\
         dir\\file.txt,{EMPTY_MD5},{EMPTY_SHA1}\r\nother,{},{}\r\n\r\n\n",
        EMPTY_MD5.to_uppercase(),
        EMPTY_SHA1
    );
    let m = decode(&text, None).unwrap();
    assert_eq!(m.len(), 2);
    let p = FilePath::parse("dir/file.txt").unwrap();
    assert_eq!(m.get(&p), Some(&DigestSet::of(b"")));
    assert!(m.contains(&FilePath::parse("other").unwrap()));
}

#[test]
fn two_field_line_is_rejected() {
    let text = format!("# header\nok,{EMPTY_MD5},{EMPTY_SHA1}\nbroken,{EMPTY_MD5}\n");
    match decode(&text, None) {
        Err(ParseError::FieldCount { line, found }) => {
            assert_eq!(line, 3);
            assert_eq!(found, 2);
        }
        other => panic!("expected FieldCount, got {other:?}"),
    }
}

#[test]
fn bad_hex_and_wrong_width_are_rejected() {
    let short = format!("f,{},{EMPTY_SHA1}\n", &EMPTY_MD5[..30]);
    assert!(matches!(decode(&short, None), Err(ParseError::BadDigest { field: "MD5", .. })));
    let nonhex = format!("f,{EMPTY_MD5},{}zz\n", &EMPTY_SHA1[..38]);
    assert!(matches!(decode(&nonhex, None), Err(ParseError::BadDigest { field: "SHA1", .. })));
    let empty = format!("f,,{EMPTY_SHA1}\n");
    assert!(matches!(decode(&empty, None), Err(ParseError::EmptyField { field: "MD5", .. })));
}

#[test]
fn duplicate_paths_are_rejected() {
    let text = format!("a/b,{EMPTY_MD5},{EMPTY_SHA1}\na\\b,{EMPTY_MD5},{EMPTY_SHA1}\n");
    match decode(&text, None) {
        Err(ParseError::DuplicatePath { line, path }) => {
            assert_eq!(line, 2);
            assert_eq!(path.as_str(), "a/b");
        }
        other => panic!("expected DuplicatePath, got {other:?}"),
    }
}

#[test]
fn unsafe_paths_are_rejected() {
    for bad in ["/etc/passwd", "../outside", "a//b"] {
        let text = format!("{bad},{EMPTY_MD5},{EMPTY_SHA1}\n");
        assert!(
            matches!(decode(&text, None), Err(ParseError::BadPath { line: 1, .. })),
            "{bad} accepted"
        );
    }
}

#[test]
fn manifest_self_references_are_skipped() {
    let cfg = RunConfig::default();
    let matcher = cfg.manifest_matcher().unwrap();
    let text = format!(
        "VERSION-1.0.txt,{EMPTY_MD5},{EMPTY_SHA1}\nreal.txt,{EMPTY_MD5},{EMPTY_SHA1}\n"
    );
    let m = decode(&text, Some(&matcher)).unwrap();
    assert_eq!(m.len(), 1);
    assert!(m.contains(&FilePath::parse("real.txt").unwrap()));
}

#[test]
fn awkward_names_are_quoted_and_read_back() {
    let m = manifest(&[("a,b.txt", b"1"), ("say \"hi\"", b"2"), ("#notes", b"3")]);
    let text = encode_to_string(&m, &[]);
    assert!(text.contains("\"a,b.txt\","));
    assert!(text.contains("\"say \"\"hi\"\"\","));
    assert!(text.contains("\"#notes\","));
    assert_eq!(decode(&text, None).unwrap(), m);
}

#[test]
fn unquoted_comma_path_from_older_manifest_loads() {
    let text = format!("a,b.txt,{EMPTY_MD5},{EMPTY_SHA1}\n");
    let m = decode(&text, None).unwrap();
    assert!(m.contains(&FilePath::parse("a,b.txt").unwrap()));
}

fn path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[A-Za-z0-9_ ,.#\"-]{1,8}", 1..4).prop_filter_map(
        "no dot components",
        |parts| {
            if parts.iter().any(|p| p == "." || p == "..") {
                None
            } else {
                Some(parts.join("/"))
            }
        },
    )
}

proptest! {
    #[test]
    fn decode_inverts_encode(
        entries in proptest::collection::btree_map(
            path_strategy(),
            proptest::collection::vec(any::<u8>(), 0..32),
            0..12,
        )
    ) {
        let mut b = Manifest::builder();
        for (p, content) in &entries {
            // Distinct strings can normalize to the same path.
            let _ = b.insert(FilePath::parse(p).unwrap(), DigestSet::of(content));
        }
        let m = b.build();
        let text = encode_to_string(&m, &["header".to_string()]);
        prop_assert_eq!(decode(&text, None).unwrap(), m);
    }
}
