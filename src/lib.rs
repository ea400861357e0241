//! # bmp_stego 库
//!
//! 解析 BMP 容器格式，并在调色板或像素数据的低位中隐藏/恢复任意字节载荷。
//! 编码结果与原文件等长，原始字节永远不会被原地修改。

// 声明库包含的所有模块。

pub mod bitmap;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod steganography;

pub use bitmap::BitmapImage;
pub use error::{Result, StegoError};
pub use steganography::Scheme;
