use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha1::{Digest, Sha1};

const CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// Content hash of a ROM file, as sent to the server's hash lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHash {
    /// Lowercase hex
    pub sha1: String,
    pub data_size: u64,
}

/// Stream `reader` through SHA-1 in fixed-size chunks.
pub fn compute_sha1(reader: &mut dyn Read) -> io::Result<FileHash> {
    let mut sha = Sha1::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut data_size = 0u64;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sha.update(&buf[..n]);
        data_size += n as u64;
    }

    Ok(FileHash {
        sha1: format!("{:x}", sha.finalize()),
        data_size,
    })
}

/// SHA-1 of a file on disk.
pub fn sha1_file(path: &Path) -> io::Result<FileHash> {
    let mut file = File::open(path)?;
    compute_sha1(&mut file)
}
