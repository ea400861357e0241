//! 14 字节的 BMP 文件头 (BITMAPFILEHEADER)。

use crate::constants::{
    BMP_MAGIC, FILE_HEADER_SIZE, FILE_SIZE_OFFSET, MIN_FILE_LEN, PIXEL_DATA_OFFSET_OFFSET,
};
use crate::error::{Result, StegoError};

use super::read_u32_le;

/// 已校验的文件头。
///
/// 只有在魔数为 `BM`、声明的文件大小等于实际长度、且像素数据偏移量落在文件内时才能构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    file_size: u32,
    pixel_data_offset: u32,
}

impl FileHeader {
    /// 从完整的文件字节中解析并校验文件头。
    ///
    /// # Errors
    ///
    /// 以下情况返回 [`StegoError::InvalidFormat`]：
    /// * 输入短于 15 字节。
    /// * 前两个字节不是 `BM`。
    /// * 声明的文件大小与输入长度不一致。
    /// * `pixelDataOffset + 14` 超出输入长度。
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_FILE_LEN {
            return Err(StegoError::invalid(format!(
                "file is too short for a bitmap header: {} bytes",
                bytes.len()
            )));
        }

        if bytes[..BMP_MAGIC.len()] != BMP_MAGIC {
            return Err(StegoError::invalid(format!(
                "bad magic bytes {:#04x} {:#04x}, expected \"BM\"",
                bytes[0], bytes[1]
            )));
        }

        let file_size = read_u32_le(bytes, FILE_SIZE_OFFSET)?;
        if u64::from(file_size) != bytes.len() as u64 {
            return Err(StegoError::invalid(format!(
                "declared file size {file_size} does not match actual length {}",
                bytes.len()
            )));
        }

        let pixel_data_offset = read_u32_le(bytes, PIXEL_DATA_OFFSET_OFFSET)?;
        if u64::from(pixel_data_offset) + FILE_HEADER_SIZE as u64 > bytes.len() as u64 {
            return Err(StegoError::invalid(format!(
                "pixel data offset {pixel_data_offset} lies outside the file"
            )));
        }

        Ok(Self {
            file_size,
            pixel_data_offset,
        })
    }

    pub fn magic(&self) -> [u8; 2] {
        BMP_MAGIC
    }

    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    /// 像素数据相对文件起始处的绝对偏移量。
    pub fn pixel_data_offset(&self) -> usize {
        self.pixel_data_offset as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(len: usize, declared: u32, offset: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        bytes[..2].copy_from_slice(b"BM");
        bytes[2..6].copy_from_slice(&declared.to_le_bytes());
        bytes[10..14].copy_from_slice(&offset.to_le_bytes());
        bytes
    }

    #[test]
    fn parses_size_and_offset() {
        let bytes = header_bytes(68, 68, 54);
        let header = FileHeader::parse(&bytes).unwrap();
        assert_eq!(header.file_size(), 68);
        assert_eq!(header.pixel_data_offset(), 54);
        assert_eq!(&header.magic(), b"BM");
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = header_bytes(64, 64, 54);
        bytes[0] = b'P';
        assert!(matches!(
            FileHeader::parse(&bytes),
            Err(StegoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_size_mismatch() {
        let bytes = header_bytes(64, 65, 54);
        assert!(matches!(
            FileHeader::parse(&bytes),
            Err(StegoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_offset_past_end() {
        // 51 + 14 > 64
        let bytes = header_bytes(64, 64, 51);
        assert!(FileHeader::parse(&bytes).is_err());
        let bytes = header_bytes(64, 64, 50);
        assert!(FileHeader::parse(&bytes).is_ok());
    }

    #[test]
    fn rejects_short_input() {
        let bytes = header_bytes(14, 14, 0);
        assert!(FileHeader::parse(&bytes).is_err());
    }
}
