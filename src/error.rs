//! 错误类型定义

use thiserror::Error;

use crate::bitmap::{Compression, PixelFormat};

/// 解析 BMP 或读写隐藏数据时可能出现的错误。
#[derive(Error, Debug)]
pub enum StegoError {
    /// 输入不是一个结构合法的、受支持的 BMP 文件。
    #[error("invalid BMP format: {0}")]
    InvalidFormat(String),

    /// 结构合法，但没有任何隐写方案能处理该像素格式与压缩方式的组合。
    #[error("unsupported bitmap format: {bits_per_pixel} with {compression}")]
    UnsupportedFormat {
        bits_per_pixel: PixelFormat,
        compression: Compression,
    },

    /// 长度前缀与数据超出了方案可写入的区域。
    #[error("payload does not fit: need {needed} slots, {available} available")]
    PayloadTooLarge { needed: usize, available: usize },
}

impl StegoError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        StegoError::InvalidFormat(message.into())
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;
