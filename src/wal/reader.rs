//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::Result;
use super::entry::FrameHeader;
use super::{WalEntry, HEADER_SIZE};

/// Result of reading one frame
pub(crate) enum Frame {
    /// A complete, checksum-valid entry
    Entry(WalEntry),
    /// Clean end of file on a frame boundary
    End,
    /// The file ends inside a frame (torn write)
    Partial,
}

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Byte offset of the next frame
    position: u64,
    /// File length at open time
    len: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            len,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at end of file and when the tail holds a partially
    /// written frame. A checksum mismatch is an error.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        match self.next_frame()? {
            Frame::Entry(entry) => Ok(Some(entry)),
            Frame::End | Frame::Partial => Ok(None),
        }
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Byte offset just past the last frame returned
    pub fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn next_frame(&mut self) -> Result<Frame> {
        let mut header = [0u8; HEADER_SIZE];
        let filled = read_full(&mut self.reader, &mut header)?;
        if filled == 0 {
            return Ok(Frame::End);
        }
        if filled < HEADER_SIZE {
            return Ok(Frame::Partial);
        }

        let parsed = FrameHeader::parse(&header)?;
        // A length running past EOF is a torn tail, not a reason to allocate it
        let frame_end = self.position + (HEADER_SIZE + parsed.data_len) as u64;
        if frame_end > self.len {
            return Ok(Frame::Partial);
        }

        let mut data = vec![0u8; parsed.data_len];
        if read_full(&mut self.reader, &mut data)? < parsed.data_len {
            return Ok(Frame::Partial);
        }

        let entry = WalEntry::from_parts(&parsed, &data)?;
        self.position += (HEADER_SIZE + parsed.data_len) as u64;
        Ok(Frame::Entry(entry))
    }
}

/// Iterator over WAL entries
///
/// Yields an error once and then stops if a corrupt frame is hit.
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the stream allows; returns bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
