//! BMP 二进制布局常量以及隐写长度前缀的尺寸。
//!
//! 所有偏移量均为相对文件起始处的绝对字节位置，多字节字段为小端序。

/// 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const FILE_HEADER_SIZE: usize = 14;

/// 文件头魔数 `BM`。
pub const BMP_MAGIC: [u8; 2] = [0x42, 0x4D];

/// 可被解析的最小输入长度：文件头之后至少还要有一个字节。
pub const MIN_FILE_LEN: usize = FILE_HEADER_SIZE + 1;

pub const FILE_SIZE_OFFSET: usize = 2;
pub const PIXEL_DATA_OFFSET_OFFSET: usize = 10;

/// DIB 头声明自身大小的字段位置。
pub const DIB_HEADER_SIZE_OFFSET: usize = 14;

/// BITMAPCOREHEADER 的大小。
pub const CORE_HEADER_SIZE: u32 = 12;

/// 受支持的 BITMAPINFOHEADER 族大小 (INFO, V2, V3, V5)。
pub const INFO_HEADER_SIZES: [u32; 4] = [40, 52, 56, 124];

pub mod core_header {
    pub const WIDTH: usize = 18;
    pub const HEIGHT: usize = 20;
    pub const PLANES: usize = 22;
    pub const BITS_PER_PIXEL: usize = 24;
}

pub mod info_header {
    pub const WIDTH: usize = 18;
    pub const HEIGHT: usize = 22;
    pub const PLANES: usize = 26;
    pub const BITS_PER_PIXEL: usize = 28;
    pub const COMPRESSION: usize = 30;
    pub const BITMAP_DATA_SIZE: usize = 34;
    pub const HORIZONTAL_DENSITY: usize = 38;
    pub const VERTICAL_DENSITY: usize = 42;
    pub const COLORS_USED: usize = 46;
    pub const IMPORTANT_COLORS: usize = 50;
}

/// 调色板中每个条目的字节数 (B, G, R, A)。
pub const COLOR_TABLE_ENTRY_SIZE: usize = 4;

/// 调色板条目中 alpha 字节的位置，调色板方案只改写这个字节。
pub const COLOR_TABLE_ALPHA_INDEX: usize = 3;

/// BI_BITFIELDS 的 R/G/B 掩码块大小。
pub const BITFIELDS_MASK_SIZE: usize = 12;

/// BI_ALPHABITFIELDS 的 R/G/B/A 掩码块大小。
pub const ALPHA_BITFIELDS_MASK_SIZE: usize = 16;

/// 读取 BI_BITFIELDS 掩码前，像素数据偏移在 DIB 头之后至少要留出的字节数。
pub const BITFIELDS_MASK_ROOM: usize = 16;

/// 读取 BI_ALPHABITFIELDS 掩码前要求的最小空间。
pub const ALPHA_BITFIELDS_MASK_ROOM: usize = 20;

/// 像素数据方案使用的大端序长度前缀字节数。
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// 调色板方案使用的长度前缀字节数。
pub const PALETTE_LENGTH_PREFIX_SIZE: usize = 1;
