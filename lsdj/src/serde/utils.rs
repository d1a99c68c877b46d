use std::{
    io::{Read, Result, Write},
    slice,
};

pub const RLE_BYTE: u8 = 0xC0;
pub const CMD_BYTE: u8 = 0xE0;
pub const DEFAULT_WAVE_BYTE: u8 = 0xF0;
pub const DEFAULT_INSTRUMENT_BYTE: u8 = 0xF1;
pub const EOF_BYTE: u8 = 0xFF;

/// The default instrument bytes as the compression algorithm knows them
///
/// This isn't the same as any of the factory instruments in
/// [`instrument`](crate::song::instrument), but it's what LSDJ expands `E0 F1` to.
pub const DEFAULT_INSTRUMENT: [u8; 16] = [
    0xA8, 0, 0, 0xFF, 0, 0, 3, 0, 0, 0xD0, 0, 0, 0, 0xF3, 0, 0,
];

pub fn read_byte<R>(mut reader: R) -> Result<u8>
where
    R: Read,
{
    let mut byte = 0;
    reader.read_exact(slice::from_mut(&mut byte))?;
    Ok(byte)
}

pub fn write_repeated_byte<W>(value: u8, count: usize, writer: W) -> Result<()>
where
    W: Write,
{
    write_repeated_bytes(slice::from_ref(&value), count, writer)
}

pub fn write_repeated_bytes<W>(bytes: &[u8], count: usize, mut writer: W) -> Result<()>
where
    W: Write,
{
    for _ in 0..count {
        writer.write_all(bytes)?
    }

    Ok(())
}
