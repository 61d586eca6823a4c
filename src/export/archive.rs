//! Project Archive
//!
//! Packs a snapshot into a gzip-compressed ustar archive, one regular file
//! per entry, and reads such archives back.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use super::ExportError;
use crate::vfs::SnapshotEntry;

const BLOCK_SIZE: usize = 512;
const FILE_MODE: u64 = 0o644;

/// Default download name for an exported project.
pub const DEFAULT_ARCHIVE_NAME: &str = "DXCode_Project.tar.gz";

/// Write a string into a fixed-size field; the rest stays zeroed.
fn write_string(header: &mut [u8], offset: usize, len: usize, s: &str) {
    let bytes = s.as_bytes();
    let copy_len = bytes.len().min(len);
    header[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
}

/// Write a null-terminated octal value into a fixed-size field.
fn write_octal(header: &mut [u8], offset: usize, len: usize, value: u64) {
    let s = format!("{:0>width$o}", value, width = len - 1);
    let bytes = s.as_bytes();
    let start = bytes.len().saturating_sub(len - 1);
    let slice = &bytes[start..];
    header[offset..offset + slice.len()].copy_from_slice(slice);
    header[offset + slice.len()] = 0;
}

/// Sum of all header bytes, with the checksum field counted as spaces.
fn checksum(header: &[u8; BLOCK_SIZE]) -> u32 {
    header
        .iter()
        .enumerate()
        .map(|(i, &b)| if (148..156).contains(&i) { 0x20 } else { b as u32 })
        .sum()
}

fn file_header(name: &str, size: u64, mtime: u64) -> Result<[u8; BLOCK_SIZE], ExportError> {
    if name.len() > 100 {
        return Err(ExportError::NameTooLong { name: name.to_string() });
    }
    let mut header = [0u8; BLOCK_SIZE];
    write_string(&mut header, 0, 100, name);
    write_octal(&mut header, 100, 8, FILE_MODE);
    write_octal(&mut header, 108, 8, 0);
    write_octal(&mut header, 116, 8, 0);
    write_octal(&mut header, 124, 12, size);
    write_octal(&mut header, 136, 12, mtime);
    header[148..156].copy_from_slice(b"        ");
    header[156] = b'0';
    header[257..263].copy_from_slice(b"ustar\0");
    header[263..265].copy_from_slice(b"00");
    write_string(&mut header, 265, 32, "dxcode");
    write_string(&mut header, 297, 32, "dxcode");
    write_octal(&mut header, 329, 8, 0);
    write_octal(&mut header, 337, 8, 0);

    let sum = format!("{:06o}\0 ", checksum(&header));
    header[148..156].copy_from_slice(&sum.as_bytes()[..8]);
    Ok(header)
}

/// Build an uncompressed tar stream from a snapshot.
fn tar_bytes(snapshot: &[SnapshotEntry], mtime: u64) -> Result<Vec<u8>, ExportError> {
    let mut tar = Vec::new();
    for entry in snapshot {
        let content = entry.content.as_bytes();
        tar.extend_from_slice(&file_header(&entry.name, content.len() as u64, mtime)?);
        tar.extend_from_slice(content);
        let remainder = content.len() % BLOCK_SIZE;
        if remainder != 0 {
            tar.resize(tar.len() + BLOCK_SIZE - remainder, 0);
        }
    }
    tar.resize(tar.len() + BLOCK_SIZE * 2, 0);
    Ok(tar)
}

/// Pack a snapshot into a `.tar.gz`. An empty project is refused.
pub fn build_archive(snapshot: &[SnapshotEntry]) -> Result<Vec<u8>, ExportError> {
    if snapshot.is_empty() {
        return Err(ExportError::EmptyProject);
    }
    let mtime = chrono::Utc::now().timestamp().max(0) as u64;
    let tar = tar_bytes(snapshot, mtime)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar)?;
    Ok(encoder.finish()?)
}

fn read_field(header: &[u8], offset: usize, len: usize) -> String {
    let slice = &header[offset..offset + len];
    let end = slice.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&slice[..end]).to_string()
}

fn read_octal(header: &[u8], offset: usize, len: usize) -> u64 {
    u64::from_str_radix(read_field(header, offset, len).trim(), 8).unwrap_or(0)
}

/// Unpack the regular files of a `.tar.gz` into snapshot entries.
pub fn read_archive(data: &[u8]) -> Result<Vec<SnapshotEntry>, ExportError> {
    let mut tar = Vec::new();
    GzDecoder::new(data).read_to_end(&mut tar)?;

    let mut entries = Vec::new();
    let mut offset = 0;
    while offset + BLOCK_SIZE <= tar.len() {
        let block = &tar[offset..offset + BLOCK_SIZE];
        if block.iter().all(|&b| b == 0) {
            break;
        }
        let header: [u8; BLOCK_SIZE] = block
            .try_into()
            .map_err(|_| ExportError::InvalidArchive("short header".to_string()))?;
        if read_octal(&header, 148, 8) as u32 != checksum(&header) {
            return Err(ExportError::InvalidArchive("bad header checksum".to_string()));
        }

        let name = read_field(&header, 0, 100);
        let size = read_octal(&header, 124, 12) as usize;
        let type_flag = header[156];
        offset += BLOCK_SIZE;

        let end = offset + size;
        if end > tar.len() {
            return Err(ExportError::InvalidArchive("unexpected end of archive".to_string()));
        }
        if type_flag == b'0' || type_flag == 0 {
            let content = String::from_utf8(tar[offset..end].to_vec())
                .map_err(|_| ExportError::InvalidArchive(format!("{} is not UTF-8 text", name)))?;
            entries.push(SnapshotEntry { name, content });
        }
        offset += size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    }
    Ok(entries)
}
