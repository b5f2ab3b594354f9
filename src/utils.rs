use anyhow::{anyhow, Context, Result};
use blake2::digest::VariableOutput;
use blake2::VarBlake2b;
use std::fs::File;
use std::io::{copy, BufReader, Error, Read};
use std::path::Path;

const FINGERPRINT_LEN: usize = 10;
const COMPARE_CHUNK: usize = 64 * 1024;

pub fn compute_hash(read: &mut impl Read) -> Result<String> {
    let mut hasher =
        VarBlake2b::new(FINGERPRINT_LEN).map_err(|_| anyhow!("invalid fingerprint length"))?;
    copy(read, &mut hasher)?;
    let hash = hex::encode(hasher.vec_result());
    Ok(hash)
}

pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    compute_hash(&mut BufReader::new(&mut file))
        .with_context(|| format!("hashing {}", path.display()))
}

/// Byte-for-byte comparison of two files.
pub fn same_content(a: &Path, b: &Path) -> Result<bool> {
    let mut a_file = File::open(a).with_context(|| format!("opening {}", a.display()))?;
    let mut b_file = File::open(b).with_context(|| format!("opening {}", b.display()))?;
    let equal = same_stream(&mut a_file, &mut b_file)
        .with_context(|| format!("comparing {} with {}", a.display(), b.display()))?;
    Ok(equal)
}

pub fn same_stream(a: &mut impl Read, b: &mut impl Read) -> Result<bool, Error> {
    let mut a_buf = vec![0u8; COMPARE_CHUNK];
    let mut b_buf = vec![0u8; COMPARE_CHUNK];
    loop {
        let a_len = read_full(a, &mut a_buf)?;
        let b_len = read_full(b, &mut b_buf)?;
        if a_len != b_len || a_buf[..a_len] != b_buf[..b_len] {
            return Ok(false);
        }
        if a_len < COMPARE_CHUNK {
            return Ok(true);
        }
    }
}

// Fills `buf` unless EOF comes first; short reads from the OS are retried.
fn read_full(read: &mut impl Read, buf: &mut [u8]) -> Result<usize, Error> {
    let mut filled = 0;
    while filled < buf.len() {
        match read.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub fn to_mb(bytes: u64) -> u64 {
    bytes / 1_000_000
}
