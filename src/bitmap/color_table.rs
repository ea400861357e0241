//! 调色板与 16 位位域图像的通道掩码。

use tracing::warn;

use crate::constants::{
    ALPHA_BITFIELDS_MASK_ROOM, ALPHA_BITFIELDS_MASK_SIZE, BITFIELDS_MASK_ROOM, BITFIELDS_MASK_SIZE,
    COLOR_TABLE_ENTRY_SIZE,
};
use crate::error::{Result, StegoError};

use super::Compression;
use super::read_u32_le;

/// 调色板中的一个条目，磁盘顺序为 B, G, R, A。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorTableEntry {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub alpha: u8,
}

impl From<[u8; 4]> for ColorTableEntry {
    fn from([blue, green, red, alpha]: [u8; 4]) -> Self {
        Self {
            blue,
            green,
            red,
            alpha,
        }
    }
}

/// 按顺序排列的调色板，同时记录它在文件中的起始偏移。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorTable {
    offset: usize,
    entries: Vec<ColorTableEntry>,
}

impl ColorTable {
    /// 从 `offset` 开始读取 `count` 个 4 字节条目，游标每次前进一个条目。
    ///
    /// # Errors
    ///
    /// 调色板超出文件末尾时返回 [`StegoError::InvalidFormat`]。
    pub fn parse(bytes: &[u8], offset: usize, count: usize) -> Result<Self> {
        let end = count
            .checked_mul(COLOR_TABLE_ENTRY_SIZE)
            .and_then(|len| len.checked_add(offset))
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                StegoError::invalid(format!(
                    "color table of {count} entries at offset {offset} extends past end of file"
                ))
            })?;

        let entries = bytes[offset..end]
            .chunks_exact(COLOR_TABLE_ENTRY_SIZE)
            .map(|quad| ColorTableEntry::from([quad[0], quad[1], quad[2], quad[3]]))
            .collect();

        Ok(Self { offset, entries })
    }

    /// 没有调色板的格式使用空表，偏移量仍指向 DIB 头之后。
    pub fn empty(offset: usize) -> Self {
        Self {
            offset,
            entries: Vec::new(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn entries(&self) -> &[ColorTableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// BI_BITFIELDS / BI_ALPHABITFIELDS 图像在 DIB 头之后携带的通道掩码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBitmask {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: Option<u32>,
}

impl ChannelBitmask {
    /// 当压缩方式需要掩码、且像素数据偏移在 DIB 头之后留出了足够空间时读取掩码块。
    /// BI_BITFIELDS 要求至少 16 字节，BI_ALPHABITFIELDS 要求至少 20 字节。
    ///
    /// 返回掩码以及掩码块占用的字节数 (12 或 16，未读取时为 0)。
    pub fn parse(
        bytes: &[u8],
        compression: Compression,
        offset: usize,
        pixel_data_offset: usize,
    ) -> Result<(Option<Self>, usize)> {
        let (block_size, room) = match compression {
            Compression::Bitfields => (BITFIELDS_MASK_SIZE, BITFIELDS_MASK_ROOM),
            Compression::AlphaBitfields => (ALPHA_BITFIELDS_MASK_SIZE, ALPHA_BITFIELDS_MASK_ROOM),
            _ => return Ok((None, 0)),
        };

        if pixel_data_offset < offset + room {
            warn!(
                %compression,
                pixel_data_offset, "no room for channel bitmask after DIB header"
            );
            return Ok((None, 0));
        }

        let alpha = match compression {
            Compression::AlphaBitfields => Some(read_u32_le(bytes, offset + 12)?),
            _ => None,
        };
        let mask = Self {
            red: read_u32_le(bytes, offset)?,
            green: read_u32_le(bytes, offset + 4)?,
            blue: read_u32_le(bytes, offset + 8)?,
            alpha,
        };

        Ok((Some(mask), block_size))
    }
}
