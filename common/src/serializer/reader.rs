use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReaderError {
    #[error("not enough bytes to read")]
    InvalidSize,
    #[error("invalid value")]
    InvalidValue,
    #[error("invalid hex")]
    InvalidHex,
    #[error("invalid utf8 string")]
    InvalidString,
}

// Cursor over a byte slice. Reads never copy more than requested and fail
// with InvalidSize once the slice is exhausted.
pub struct Reader<'a> {
    bytes: &'a [u8],
    total: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, total: 0 }
    }

    fn next_bytes(&mut self, count: usize) -> Result<&'a [u8], ReaderError> {
        if count > self.size() {
            return Err(ReaderError::InvalidSize);
        }

        let bytes = &self.bytes[self.total..self.total + count];
        self.total += count;
        Ok(bytes)
    }

    pub fn read_bool(&mut self) -> Result<bool, ReaderError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ReaderError::InvalidValue),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        let bytes = self.next_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let bytes = self.next_bytes(2)?;
        Ok(u16::from_le_bytes(
            bytes.try_into().map_err(|_| ReaderError::InvalidSize)?,
        ))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let bytes = self.next_bytes(4)?;
        Ok(u32::from_le_bytes(
            bytes.try_into().map_err(|_| ReaderError::InvalidSize)?,
        ))
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        let bytes = self.next_bytes(8)?;
        Ok(u64::from_le_bytes(
            bytes.try_into().map_err(|_| ReaderError::InvalidSize)?,
        ))
    }

    pub fn read_u128(&mut self) -> Result<u128, ReaderError> {
        let bytes = self.next_bytes(16)?;
        Ok(u128::from_le_bytes(
            bytes.try_into().map_err(|_| ReaderError::InvalidSize)?,
        ))
    }

    pub fn read_bytes<T: TryFrom<Vec<u8>>>(&mut self, count: usize) -> Result<T, ReaderError> {
        let bytes = self.next_bytes(count)?.to_vec();
        T::try_from(bytes).map_err(|_| ReaderError::InvalidSize)
    }

    pub fn read_bytes_ref(&mut self, count: usize) -> Result<&'a [u8], ReaderError> {
        self.next_bytes(count)
    }

    pub fn read_bytes_32(&mut self) -> Result<[u8; 32], ReaderError> {
        self.read_bytes(32)
    }

    pub fn read_bytes_64(&mut self) -> Result<[u8; 64], ReaderError> {
        let bytes = self.next_bytes(64)?;
        let mut out = [0u8; 64];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_string_with_size(&mut self, size: usize) -> Result<String, ReaderError> {
        let bytes = self.next_bytes(size)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ReaderError::InvalidString)
    }

    pub fn read_string(&mut self) -> Result<String, ReaderError> {
        let size = self.read_u16()?;
        self.read_string_with_size(size as usize)
    }

    // Remaining unread bytes.
    pub fn size(&self) -> usize {
        self.bytes.len() - self.total
    }

    pub fn total_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn total_read(&self) -> usize {
        self.total
    }
}
