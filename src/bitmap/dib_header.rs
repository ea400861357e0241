//! 设备无关位图 (DIB) 头：CORE 与 INFO 两种形态。

use std::fmt;

use crate::constants::{
    CORE_HEADER_SIZE, DIB_HEADER_SIZE_OFFSET, INFO_HEADER_SIZES, core_header, info_header,
};
use crate::error::{Result, StegoError};

use super::{read_u16_le, read_u32_le};

/// 每像素位数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Monochrome,
    Indexed4,
    Indexed8,
    HighColor,
    TrueColor,
    DeepColor,
}

impl PixelFormat {
    pub fn from_bits(bits: u16) -> Result<Self> {
        match bits {
            1 => Ok(Self::Monochrome),
            4 => Ok(Self::Indexed4),
            8 => Ok(Self::Indexed8),
            16 => Ok(Self::HighColor),
            24 => Ok(Self::TrueColor),
            32 => Ok(Self::DeepColor),
            other => Err(StegoError::invalid(format!(
                "unsupported bits per pixel: {other}"
            ))),
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            Self::Monochrome => 1,
            Self::Indexed4 => 4,
            Self::Indexed8 => 8,
            Self::HighColor => 16,
            Self::TrueColor => 24,
            Self::DeepColor => 32,
        }
    }

    /// 8 位及以下的格式通过调色板索引颜色。
    pub fn has_color_table(self) -> bool {
        self.bits() <= 8
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpp", self.bits())
    }
}

/// INFO 头中的压缩方式字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    Uncompressed,
    Rle8,
    Rle4,
    Bitfields,
    AlphaBitfields,
}

impl Compression {
    pub fn from_u32(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Uncompressed),
            1 => Ok(Self::Rle8),
            2 => Ok(Self::Rle4),
            3 => Ok(Self::Bitfields),
            6 => Ok(Self::AlphaBitfields),
            other => Err(StegoError::invalid(format!(
                "unsupported compression code: {other}"
            ))),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Uncompressed => 0,
            Self::Rle8 => 1,
            Self::Rle4 => 2,
            Self::Bitfields => 3,
            Self::AlphaBitfields => 6,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uncompressed => "BI_RGB",
            Self::Rle8 => "BI_RLE8",
            Self::Rle4 => "BI_RLE4",
            Self::Bitfields => "BI_BITFIELDS",
            Self::AlphaBitfields => "BI_ALPHABITFIELDS",
        };
        f.write_str(name)
    }
}

/// 12 字节的 BITMAPCOREHEADER (OS/2 1.x)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreHeader {
    pub width: u16,
    pub height: u16,
    pub planes: u16,
    pub pixel_format: PixelFormat,
}

/// BITMAPINFOHEADER 及其 V2/V3/V5 扩展。只读取前 40 字节中的公共字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: u32,
    /// 按无符号数读取，负高度 (自上而下的行序) 不做特殊处理。
    pub height: u32,
    pub planes: u16,
    pub pixel_format: PixelFormat,
    pub compression: Compression,
    pub bitmap_data_size: u32,
    pub horizontal_density: u32,
    pub vertical_density: u32,
    /// 为 0 时表示调色板有 2^bpp 个条目。
    pub colors_used: u32,
    pub important_colors: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DibHeader {
    Core(CoreHeader),
    Info(InfoHeader),
}

impl DibHeader {
    /// 读取偏移 14 处声明的头大小并按其选择具体形态。
    ///
    /// # Errors
    ///
    /// 头大小不受支持、字段越界、像素格式或压缩方式未知，
    /// 或 CORE 头声明 16/32 位深度时，返回 [`StegoError::InvalidFormat`]。
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let declared = read_u32_le(bytes, DIB_HEADER_SIZE_OFFSET)?;

        if declared == CORE_HEADER_SIZE {
            Self::parse_core(bytes).map(DibHeader::Core)
        } else if INFO_HEADER_SIZES.contains(&declared) {
            Self::parse_info(bytes, declared).map(DibHeader::Info)
        } else {
            Err(StegoError::invalid(format!(
                "unsupported DIB header size: {declared}"
            )))
        }
    }

    fn parse_core(bytes: &[u8]) -> Result<CoreHeader> {
        let pixel_format =
            PixelFormat::from_bits(read_u16_le(bytes, core_header::BITS_PER_PIXEL)?)?;
        if matches!(pixel_format, PixelFormat::HighColor | PixelFormat::DeepColor) {
            return Err(StegoError::invalid(format!(
                "core header cannot describe a {pixel_format} image"
            )));
        }

        Ok(CoreHeader {
            width: read_u16_le(bytes, core_header::WIDTH)?,
            height: read_u16_le(bytes, core_header::HEIGHT)?,
            planes: read_u16_le(bytes, core_header::PLANES)?,
            pixel_format,
        })
    }

    fn parse_info(bytes: &[u8], header_size: u32) -> Result<InfoHeader> {
        Ok(InfoHeader {
            header_size,
            width: read_u32_le(bytes, info_header::WIDTH)?,
            height: read_u32_le(bytes, info_header::HEIGHT)?,
            planes: read_u16_le(bytes, info_header::PLANES)?,
            pixel_format: PixelFormat::from_bits(read_u16_le(bytes, info_header::BITS_PER_PIXEL)?)?,
            compression: Compression::from_u32(read_u32_le(bytes, info_header::COMPRESSION)?)?,
            bitmap_data_size: read_u32_le(bytes, info_header::BITMAP_DATA_SIZE)?,
            horizontal_density: read_u32_le(bytes, info_header::HORIZONTAL_DENSITY)?,
            vertical_density: read_u32_le(bytes, info_header::VERTICAL_DENSITY)?,
            colors_used: read_u32_le(bytes, info_header::COLORS_USED)?,
            important_colors: read_u32_le(bytes, info_header::IMPORTANT_COLORS)?,
        })
    }

    pub fn header_size(&self) -> u32 {
        match self {
            DibHeader::Core(_) => CORE_HEADER_SIZE,
            DibHeader::Info(info) => info.header_size,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            DibHeader::Core(core) => u32::from(core.width),
            DibHeader::Info(info) => info.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            DibHeader::Core(core) => u32::from(core.height),
            DibHeader::Info(info) => info.height,
        }
    }

    pub fn planes(&self) -> u16 {
        match self {
            DibHeader::Core(core) => core.planes,
            DibHeader::Info(info) => info.planes,
        }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            DibHeader::Core(core) => core.pixel_format,
            DibHeader::Info(info) => info.pixel_format,
        }
    }

    /// CORE 头没有压缩字段。
    pub fn compression(&self) -> Option<Compression> {
        match self {
            DibHeader::Core(_) => None,
            DibHeader::Info(info) => Some(info.compression),
        }
    }

    /// 调色板条目数；没有调色板的格式为 0。
    pub fn color_count(&self) -> usize {
        let format = self.pixel_format();
        if !format.has_color_table() {
            return 0;
        }
        match self {
            DibHeader::Info(info) if info.colors_used != 0 => info.colors_used as usize,
            _ => 1usize << format.bits(),
        }
    }
}
