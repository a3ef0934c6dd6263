use anyhow::Result;
use std::path::Path;

/// Raw code bytes cut out of a file; `origin` is where they started in it.
#[derive(Debug, Clone)]
pub struct Image {
    pub origin: usize,
    pub bytes: Vec<u8>,
}

pub fn load_raw_bin(path: &Path, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    Ok(Image { origin: skip, bytes: payload.to_vec() })
}
