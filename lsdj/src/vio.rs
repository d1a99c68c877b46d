//! Bounds-checked in-memory I/O
//!
//! Everything in this crate reads and writes through the standard [`Read`], [`Write`] and
//! [`Seek`] traits, so a [`std::fs::File`] works out of the box. For in-memory buffers,
//! [`std::io::Cursor`] happily seeks past the end of its buffer. [`MemoryStream`] doesn't:
//! any seek that would leave the buffer is rejected, and the cursor stays where it was.

use std::io::{self, BufRead, Cursor, Read, Seek, SeekFrom, Write};

/// A [`Cursor`]-like stream over a byte buffer that refuses to seek out of bounds
///
/// Reads and writes are clamped to the end of the buffer (returning fewer bytes than
/// requested), and seeking outside of `[0, len]` fails with [`io::ErrorKind::InvalidInput`].
#[derive(Debug, Clone)]
pub struct MemoryStream<T> {
    cursor: Cursor<T>,
}

impl<T> MemoryStream<T>
where
    T: AsRef<[u8]>,
{
    /// Wrap a buffer, starting at position 0
    pub fn new(inner: T) -> Self {
        Self {
            cursor: Cursor::new(inner),
        }
    }

    /// The total number of bytes in the underlying buffer
    pub fn len(&self) -> u64 {
        self.cursor.get_ref().as_ref().len() as u64
    }

    /// Is the underlying buffer empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current position of the stream
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// The bytes between the current position and the end of the buffer
    pub fn remaining_slice(&self) -> &[u8] {
        let bytes = self.cursor.get_ref().as_ref();
        let position = (self.cursor.position() as usize).min(bytes.len());
        &bytes[position..]
    }

    /// Access the underlying buffer
    pub fn get_ref(&self) -> &T {
        self.cursor.get_ref()
    }

    /// Unwrap the stream, returning the underlying buffer
    pub fn into_inner(self) -> T {
        self.cursor.into_inner()
    }
}

impl<T> Read for MemoryStream<T>
where
    T: AsRef<[u8]>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl<T> BufRead for MemoryStream<T>
where
    T: AsRef<[u8]>,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.cursor.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.cursor.consume(amt)
    }
}

impl Write for MemoryStream<&mut [u8]> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for MemoryStream<Vec<u8>> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Writing to a Vec would grow it, which is exactly what this stream promises not to do
        let available = (self.len() - self.position()) as usize;
        let len = buf.len().min(available);
        self.cursor.write(&buf[..len])
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T> Seek for MemoryStream<T>
where
    T: AsRef<[u8]>,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.len() as i128;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(offset) => self.cursor.position() as i128 + offset as i128,
            SeekFrom::End(offset) => len + offset as i128,
        };

        if !(0..=len).contains(&target) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek would leave the bounds of the memory stream",
            ));
        }

        self.cursor.set_position(target as u64);
        Ok(target as u64)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.cursor.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_bounds() {
        let mut stream = MemoryStream::new([0_u8; 8]);

        assert_eq!(stream.seek(SeekFrom::Start(8)).unwrap(), 8);
        assert_eq!(stream.seek(SeekFrom::End(-3)).unwrap(), 5);
        assert_eq!(stream.seek(SeekFrom::Current(-5)).unwrap(), 0);

        assert!(stream.seek(SeekFrom::Start(9)).is_err());
        assert!(stream.seek(SeekFrom::Current(-1)).is_err());
        assert!(stream.seek(SeekFrom::End(1)).is_err());

        // A failed seek leaves the cursor alone
        assert_eq!(stream.stream_position().unwrap(), 0);
    }

    #[test]
    fn clamped_read() {
        let mut stream = MemoryStream::new([1_u8, 2, 3]);
        stream.seek(SeekFrom::Start(1)).unwrap();

        let mut dest = [0; 4];
        assert_eq!(stream.read(&mut dest).unwrap(), 2);
        assert_eq!(dest, [2, 3, 0, 0]);

        assert!(stream.read_exact(&mut dest).is_err());
    }

    #[test]
    fn clamped_write() {
        let mut bytes = [0_u8; 3];
        let mut stream = MemoryStream::new(bytes.as_mut_slice());

        assert_eq!(stream.write(&[7, 8, 9, 10]).unwrap(), 3);
        assert!(stream.write_all(&[11]).is_err());
        assert_eq!(bytes, [7, 8, 9]);

        let mut stream = MemoryStream::new(vec![0_u8; 2]);
        assert_eq!(stream.write(&[1, 2, 3]).unwrap(), 2);
        assert_eq!(stream.into_inner(), vec![1, 2]);
    }
}
