//! # 隐写编解码模块
//!
//! 每种像素格式/压缩方式组合对应一种 [`Scheme`]。方案把数据流中的每个字节映射到一个"槽位"：
//! 调色板中的一个条目，或者若干个连续像素。编码与解码使用同一套槽位读写函数，保证逐位对称。

mod decoder;
mod encoder;

use std::fmt;

pub use decoder::decode;
pub use encoder::encode;

use crate::bitmap::{Compression, PixelFormat};
use crate::constants::{
    COLOR_TABLE_ALPHA_INDEX, COLOR_TABLE_ENTRY_SIZE, LENGTH_PREFIX_SIZE, PALETTE_LENGTH_PREFIX_SIZE,
};
use crate::error::{Result, StegoError};

/// 隐写方案。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// 1/4/8 位：每个调色板条目的 alpha 字节存放一个字节。
    Palette,
    /// 16 位 X1R5G5B5：8 个像素的低字节最低位组成一个字节。
    HighColor555,
    /// 16 位位域 X4R4G4B4：2 个像素的高字节高半字节组成一个字节。
    HighColor444,
    /// 24 位：4 个像素首字节的最低 2 位组成一个字节。
    TrueColor,
    /// 32 位：每个像素的首字节直接存放一个字节。
    DeepColor,
}

#[derive(Debug, Clone, Copy)]
enum CompressionRule {
    Any,
    OneOf(&'static [Compression]),
}

impl CompressionRule {
    fn accepts(self, compression: Compression) -> bool {
        match self {
            CompressionRule::Any => true,
            CompressionRule::OneOf(allowed) => allowed.contains(&compression),
        }
    }
}

/// 新增格式只需要在这里添加一行。
const SCHEMES: &[(PixelFormat, CompressionRule, Scheme)] = &[
    (PixelFormat::Monochrome, CompressionRule::Any, Scheme::Palette),
    (PixelFormat::Indexed4, CompressionRule::Any, Scheme::Palette),
    (PixelFormat::Indexed8, CompressionRule::Any, Scheme::Palette),
    (
        PixelFormat::HighColor,
        CompressionRule::OneOf(&[Compression::Uncompressed]),
        Scheme::HighColor555,
    ),
    (
        PixelFormat::HighColor,
        CompressionRule::OneOf(&[Compression::Bitfields, Compression::AlphaBitfields]),
        Scheme::HighColor444,
    ),
    (PixelFormat::TrueColor, CompressionRule::Any, Scheme::TrueColor),
    (PixelFormat::DeepColor, CompressionRule::Any, Scheme::DeepColor),
];

impl Scheme {
    /// 按 `(像素格式, 压缩方式)` 查表选择方案。
    ///
    /// # Errors
    ///
    /// 表中没有匹配项时返回 [`StegoError::UnsupportedFormat`]。
    pub fn select(format: PixelFormat, compression: Compression) -> Result<Self> {
        SCHEMES
            .iter()
            .find(|(f, rule, _)| *f == format && rule.accepts(compression))
            .map(|&(_, _, scheme)| scheme)
            .ok_or(StegoError::UnsupportedFormat {
                bits_per_pixel: format,
                compression,
            })
    }

    /// 长度前缀占用的槽位数。
    pub fn prefix_len(self) -> usize {
        match self {
            Scheme::Palette => PALETTE_LENGTH_PREFIX_SIZE,
            _ => LENGTH_PREFIX_SIZE,
        }
    }

    /// 一个槽位在区域中跨越的字节数。
    fn slot_stride(self) -> usize {
        match self {
            Scheme::Palette => COLOR_TABLE_ENTRY_SIZE,
            Scheme::HighColor555 => 16,
            Scheme::HighColor444 => 4,
            Scheme::TrueColor => 12,
            Scheme::DeepColor => 4,
        }
    }

    fn pixels_per_slot(self) -> u64 {
        match self {
            Scheme::Palette => 0,
            Scheme::HighColor555 => 8,
            Scheme::HighColor444 => 2,
            Scheme::TrueColor => 4,
            Scheme::DeepColor => 1,
        }
    }

    /// 给定区域长度 (字节) 与像素数时可用的槽位数。
    ///
    /// 像素方案按 `ceil(像素数 / 每槽像素数)` 计算，但不会超过区域中实际存在的完整槽位。
    pub(crate) fn slot_count(self, region_len: usize, pixel_count: u64) -> usize {
        let present = region_len / self.slot_stride();
        match self {
            Scheme::Palette => present,
            _ => {
                let by_pixels = pixel_count.div_ceil(self.pixels_per_slot());
                usize::try_from(by_pixels).map_or(present, |slots| slots.min(present))
            }
        }
    }

    /// 由槽位数推出的最大载荷字节数。调色板方案受 1 字节长度前缀限制，最多 255。
    pub(crate) fn capacity(self, slots: usize) -> i64 {
        let slots = match self {
            Scheme::Palette => slots.min(usize::from(u8::MAX) + 1),
            _ => slots,
        };
        slots as i64 - self.prefix_len() as i64
    }

    /// 读取第 `slot` 个槽位中的字节。调用方保证槽位完整落在 `region` 内。
    pub(crate) fn read_slot(self, region: &[u8], slot: usize) -> u8 {
        let base = slot * self.slot_stride();
        match self {
            Scheme::Palette => region[base + COLOR_TABLE_ALPHA_INDEX],
            Scheme::HighColor555 => (0..8).fold(0u8, |value, bit| {
                value | ((region[base + 2 * bit] & 1) << bit)
            }),
            Scheme::HighColor444 => (region[base + 1] & 0xF0) | (region[base + 3] >> 4),
            Scheme::TrueColor => (0..4).fold(0u8, |value, pixel| {
                value | ((region[base + 3 * pixel] & 0x3) << (2 * pixel))
            }),
            Scheme::DeepColor => region[base],
        }
    }

    /// 把 `value` 写入第 `slot` 个槽位，只改动方案占用的位。
    pub(crate) fn write_slot(self, region: &mut [u8], slot: usize, value: u8) {
        let base = slot * self.slot_stride();
        match self {
            Scheme::Palette => region[base + COLOR_TABLE_ALPHA_INDEX] = value,
            Scheme::HighColor555 => {
                for bit in 0..8 {
                    let byte = &mut region[base + 2 * bit];
                    *byte = (*byte & 0xFE) | ((value >> bit) & 1);
                }
            }
            Scheme::HighColor444 => {
                region[base + 1] = (region[base + 1] & 0x0F) | (value & 0xF0);
                region[base + 3] = (region[base + 3] & 0x0F) | (value << 4);
            }
            Scheme::TrueColor => {
                for pixel in 0..4 {
                    let byte = &mut region[base + 3 * pixel];
                    *byte = (*byte & 0xFC) | ((value >> (2 * pixel)) & 0x3);
                }
            }
            Scheme::DeepColor => region[base] = value,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scheme::Palette => "palette alpha bytes",
            Scheme::HighColor555 => "X1R5G5B5 low bit",
            Scheme::HighColor444 => "X4R4G4B4 high nibble",
            Scheme::TrueColor => "24-bit two low bits",
            Scheme::DeepColor => "32-bit first byte",
        };
        f.write_str(name)
    }
}
