use std::io::{self, Read, Write};

/// A RIFF chunk that can serialize its own payload.
pub trait RiffChunk {
    fn chunk_id(&self) -> &[u8; 4];
    fn chunk_data(&self) -> Vec<u8>;

    /// Writes id, size, payload and the pad byte required after odd payloads.
    fn write_all<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let data = self.chunk_data();
        let size = u32::try_from(data.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "chunk exceeds 4 GiB"))?;

        writer.write_all(self.chunk_id())?;
        writer.write_all(&size.to_le_bytes())?;
        writer.write_all(&data)?;
        if size & 1 == 1 {
            writer.write_all(&[0])?;
        }

        Ok(())
    }
}

/// Tag and declared size of a chunk, as read from the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    /// Reads the next chunk header.
    ///
    /// Returns `Ok(None)` when the stream ends before a complete tag; a tag
    /// without a size field is an error.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Option<Self>> {
        let mut id = [0u8; 4];
        match reader.read_exact(&mut id) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }

        let mut size_bytes = [0u8; 4];
        reader.read_exact(&mut size_bytes)?;

        Ok(Some(Self {
            id,
            size: u32::from_le_bytes(size_bytes),
        }))
    }

    /// Payload size including the pad byte that follows odd sizes.
    pub fn padded_size(&self) -> u64 {
        self.size as u64 + (self.size & 1) as u64
    }

    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}
