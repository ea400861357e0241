//! # BMP 结构解析模块
//!
//! 把原始字节解析为 [`BitmapImage`]：文件头、DIB 头、可选的通道掩码以及调色板。
//! 解析要么完整成功，要么返回错误，不存在部分构造的图像。

mod color_table;
mod dib_header;
mod file_header;

use std::io::Cursor;
use std::ops::Range;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, warn};

pub use color_table::{ChannelBitmask, ColorTable, ColorTableEntry};
pub use dib_header::{Compression, CoreHeader, DibHeader, InfoHeader, PixelFormat};
pub use file_header::FileHeader;

use crate::constants::{COLOR_TABLE_ENTRY_SIZE, FILE_HEADER_SIZE};
use crate::error::{Result, StegoError};
use crate::steganography::{self, Scheme};

fn cursor_at(bytes: &[u8], offset: usize) -> Cursor<&[u8]> {
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(offset as u64);
    cursor
}

fn truncated(offset: usize) -> StegoError {
    StegoError::invalid(format!("file truncated while reading field at offset {offset}"))
}

pub(crate) fn read_u16_le(bytes: &[u8], offset: usize) -> Result<u16> {
    cursor_at(bytes, offset)
        .read_u16::<LittleEndian>()
        .map_err(|_| truncated(offset))
}

pub(crate) fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    cursor_at(bytes, offset)
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated(offset))
}

/// 完整解析后的 BMP 文件，持有原始字节的一份拷贝，构造后只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapImage {
    bytes: Vec<u8>,
    file_header: FileHeader,
    dib_header: DibHeader,
    bitmask: Option<ChannelBitmask>,
    color_table: ColorTable,
}

impl BitmapImage {
    /// 解析一个完整的 BMP 文件。
    ///
    /// # Errors
    ///
    /// 任何结构问题都会以 [`StegoError::InvalidFormat`] 立即返回。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file_header = FileHeader::parse(bytes)?;
        let dib_header = DibHeader::parse(bytes)?;

        let mut offset = FILE_HEADER_SIZE + dib_header.header_size() as usize;

        let bitmask = match dib_header.compression() {
            Some(compression) => {
                let (mask, consumed) = ChannelBitmask::parse(
                    bytes,
                    compression,
                    offset,
                    file_header.pixel_data_offset(),
                )?;
                offset += consumed;
                mask
            }
            None => None,
        };

        let color_table = if dib_header.pixel_format().has_color_table() {
            ColorTable::parse(bytes, offset, dib_header.color_count())?
        } else {
            ColorTable::empty(offset)
        };

        let headers_end = offset + color_table.len() * COLOR_TABLE_ENTRY_SIZE;
        if file_header.pixel_data_offset() < headers_end {
            warn!(
                pixel_data_offset = file_header.pixel_data_offset(),
                headers_end,
                "pixel data overlaps the headers"
            );
        }

        debug!(
            header_size = dib_header.header_size(),
            width = dib_header.width(),
            height = dib_header.height(),
            format = %dib_header.pixel_format(),
            compression = ?dib_header.compression(),
            palette_entries = color_table.len(),
            pixel_data_offset = file_header.pixel_data_offset(),
            "parsed bitmap"
        );

        Ok(Self {
            bytes: bytes.to_vec(),
            file_header,
            dib_header,
            bitmask,
            color_table,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn dib_header(&self) -> &DibHeader {
        &self.dib_header
    }

    pub fn bitmask(&self) -> Option<&ChannelBitmask> {
        self.bitmask.as_ref()
    }

    pub fn color_table(&self) -> &ColorTable {
        &self.color_table
    }

    /// 调色板在文件中的起始偏移 (DIB 头及掩码块之后)。
    pub fn palette_offset(&self) -> usize {
        self.color_table.offset()
    }

    pub fn width(&self) -> u32 {
        self.dib_header.width()
    }

    pub fn height(&self) -> u32 {
        self.dib_header.height()
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.dib_header.pixel_format()
    }

    /// CORE 头没有压缩字段，按未压缩处理。
    pub fn compression(&self) -> Compression {
        self.dib_header
            .compression()
            .unwrap_or(Compression::Uncompressed)
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// 每行扫描线的字节数，向上对齐到 4 字节。
    pub fn row_stride(&self) -> u64 {
        (u64::from(self.pixel_format().bits()) * u64::from(self.width()) + 31) / 32 * 4
    }

    /// 头部声明的像素数组大小。负的 INFO 高度按无符号数解释，结果在 `u64::MAX` 处饱和。
    pub fn pixel_array_size(&self) -> u64 {
        self.row_stride().saturating_mul(u64::from(self.height()))
    }

    /// 实际存在于文件中的像素数组字节范围。
    pub(crate) fn pixel_data_range(&self) -> Range<usize> {
        let start = self.file_header.pixel_data_offset();
        let present = (self.bytes.len() - start) as u64;
        let len = self.pixel_array_size().min(present) as usize;
        start..start + len
    }

    /// 调色板条目占用的字节范围。
    pub(crate) fn color_table_range(&self) -> Range<usize> {
        let start = self.color_table.offset();
        start..start + self.color_table.len() * COLOR_TABLE_ENTRY_SIZE
    }

    pub fn scheme(&self) -> Result<Scheme> {
        Scheme::select(self.pixel_format(), self.compression())
    }

    /// 可以隐藏的最大字节数。小于等于 0 表示该图像无法携带数据。
    pub fn capacity(&self) -> i64 {
        match self.scheme() {
            Ok(scheme) => scheme.capacity(self.available_slots(scheme)),
            Err(_) => 0,
        }
    }

    /// 方案在本图像中可用的槽位数 (包括长度前缀占用的槽位)。
    pub(crate) fn available_slots(&self, scheme: Scheme) -> usize {
        let region = self.region(scheme);
        scheme.slot_count(region.len(), self.pixel_count())
    }

    pub(crate) fn region(&self, scheme: Scheme) -> Range<usize> {
        match scheme {
            Scheme::Palette => self.color_table_range(),
            _ => self.pixel_data_range(),
        }
    }

    /// 把 `payload` 写入原始字节的一份拷贝并返回新的文件内容。
    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        steganography::encode(self, payload)
    }

    /// 提取隐藏的数据；没有隐藏数据时返回空向量。
    pub fn decode(&self) -> Result<Vec<u8>> {
        steganography::decode(self)
    }
}
