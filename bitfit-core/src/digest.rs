use crate::config::{HashMode, MAX_CHUNK};
use md5::{Digest, Md5};
use serde::Serialize;
use sha1::Sha1;
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

pub const MD5_LEN: usize = 16;
pub const SHA1_LEN: usize = 20;

/// MD5 and SHA-1 of one byte stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigestSet {
    pub md5: [u8; MD5_LEN],
    pub sha1: [u8; SHA1_LEN],
}

impl DigestSet {
    pub fn of(bytes: &[u8]) -> Self {
        let mut acc = Accumulator::new();
        acc.update(bytes);
        acc.finalize()
    }

    pub fn md5_hex(&self) -> String {
        hex::encode(self.md5)
    }

    pub fn sha1_hex(&self) -> String {
        hex::encode(self.sha1)
    }
}

impl fmt::Debug for DigestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestSet({}, {})", self.md5_hex(), self.sha1_hex())
    }
}

impl Serialize for DigestSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = serializer.serialize_struct("DigestSet", 2)?;
        st.serialize_field("md5", &self.md5_hex())?;
        st.serialize_field("sha1", &self.sha1_hex())?;
        st.end()
    }
}

/// Both hash states, fed from the same reads.
#[derive(Clone, Default)]
pub struct Accumulator {
    md5: Md5,
    sha1: Sha1,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.md5.update(bytes);
        self.sha1.update(bytes);
    }

    pub fn finalize(self) -> DigestSet {
        let mut md5 = [0u8; MD5_LEN];
        md5.copy_from_slice(&self.md5.finalize());
        let mut sha1 = [0u8; SHA1_LEN];
        sha1.copy_from_slice(&self.sha1.finalize());
        DigestSet { md5, sha1 }
    }
}

/// Computes a [`DigestSet`] per file. In chunked mode the block buffer is
/// reused across files.
pub struct Digester {
    mode: HashMode,
    buf: Vec<u8>,
}

impl Digester {
    pub fn new(mode: HashMode) -> Self {
        let buf = match mode {
            HashMode::WholeFile => Vec::new(),
            HashMode::Chunked(n) => vec![0u8; n.get().min(MAX_CHUNK)],
        };
        Self { mode, buf }
    }

    pub fn mode(&self) -> HashMode {
        self.mode
    }

    pub fn digest_file(&mut self, path: &Path) -> std::io::Result<DigestSet> {
        let f = File::open(path)?;
        self.digest_reader(f)
    }

    /// Hash everything `reader` yields. Any read error aborts without a
    /// result.
    pub fn digest_reader<R: Read>(&mut self, mut reader: R) -> std::io::Result<DigestSet> {
        let mut acc = Accumulator::new();
        match self.mode {
            HashMode::WholeFile => {
                let mut whole = Vec::new();
                reader.read_to_end(&mut whole)?;
                acc.update(&whole);
            }
            HashMode::Chunked(_) => loop {
                let n = match reader.read(&mut self.buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                acc.update(&self.buf[..n]);
            },
        }
        Ok(acc.finalize())
    }
}
