use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Gzip a byte buffer.
pub fn compress_bytes(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Gunzip a byte buffer.
pub fn decompress_bytes(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Write bytes to `path`, gzip-compressed.
pub fn save_compressed(path: impl AsRef<Path>, data: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(std::io::BufWriter::new(file), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()?;
    Ok(())
}

/// Read a gzip-compressed file back into plain bytes.
pub fn load_compressed(path: impl AsRef<Path>) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(std::io::BufReader::new(file));
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
