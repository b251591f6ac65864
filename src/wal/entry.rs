//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Frame header: LSN (8) + CRC (4) + data length (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The state mutation to replay
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// State mutations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Write a state key (row, schema registration or sequence counter)
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Remove a state key
    Delete { key: Vec<u8> },
}

impl Operation {
    /// The state key this operation touches
    pub fn key(&self) -> &[u8] {
        match self {
            Operation::Put { key, .. } | Operation::Delete { key } => key,
        }
    }
}

/// Serialized body of an entry (everything except the LSN, which lives in the header)
#[derive(Serialize, Deserialize)]
struct EntryBody {
    operation: Operation,
    timestamp: u64,
}

impl WalEntry {
    /// Create a new entry stamped with the current wall-clock time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Serialize into a framed record: `[lsn][crc][len][data]`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = self.body_bytes()?;
        let crc = checksum(self.lsn, &data);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);
        Ok(bytes)
    }

    /// Deserialize a framed record, verifying its checksum
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::parse(bytes)?;

        let end = HEADER_SIZE + header.data_len;
        if bytes.len() < end {
            return Err(LedgerError::WalCorruption(format!(
                "entry lsn={} truncated: expected {} data bytes, got {}",
                header.lsn,
                header.data_len,
                bytes.len() - HEADER_SIZE
            )));
        }

        Self::from_parts(&header, &bytes[HEADER_SIZE..end])
    }

    /// Total size of the framed record
    pub fn serialized_size(&self) -> Result<usize> {
        Ok(HEADER_SIZE + bincode::serialized_size(&self.body())? as usize)
    }

    /// CRC32 over the LSN and the serialized body
    pub fn compute_crc(&self) -> Result<u32> {
        Ok(checksum(self.lsn, &self.body_bytes()?))
    }

    pub(crate) fn from_parts(header: &FrameHeader, data: &[u8]) -> Result<Self> {
        let actual = checksum(header.lsn, data);
        if actual != header.crc {
            return Err(LedgerError::WalCorruption(format!(
                "CRC mismatch at lsn={}: stored {:#010x}, computed {:#010x}",
                header.lsn, header.crc, actual
            )));
        }

        let body: EntryBody = bincode::deserialize(data)
            .map_err(|e| LedgerError::WalCorruption(format!("undecodable entry body: {}", e)))?;

        Ok(Self {
            lsn: header.lsn,
            operation: body.operation,
            timestamp: body.timestamp,
        })
    }

    fn body(&self) -> EntryBody {
        EntryBody {
            operation: self.operation.clone(),
            timestamp: self.timestamp,
        }
    }

    fn body_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.body())?)
    }
}

/// Decoded fixed-size frame header
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameHeader {
    pub lsn: u64,
    pub crc: u32,
    pub data_len: usize,
}

impl FrameHeader {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(LedgerError::WalCorruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&bytes[0..8]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[8..12]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&bytes[12..16]);

        Ok(Self {
            lsn: u64::from_le_bytes(lsn),
            crc: u32::from_le_bytes(crc),
            data_len: u32::from_le_bytes(len) as usize,
        })
    }
}

fn checksum(lsn: u64, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&lsn.to_le_bytes());
    hasher.update(data);
    hasher.finalize()
}
