//! 测试共用的 BMP 构造器：生成带随机调色板与随机像素的合成位图。

#![allow(dead_code)]

use rand::RngCore;

/// 描述要生成的位图。
#[derive(Debug, Clone)]
pub struct BmpBuilder {
    width: u32,
    height: u32,
    bits: u16,
    compression: u32,
    header_size: u32,
    colors_used: u32,
    masks: Vec<u32>,
    fill: Option<u8>,
}

impl BmpBuilder {
    /// 40 字节 INFO 头的未压缩位图。
    pub fn new(width: u32, height: u32, bits: u16) -> Self {
        Self {
            width,
            height,
            bits,
            compression: 0,
            header_size: 40,
            colors_used: 0,
            masks: Vec::new(),
            fill: None,
        }
    }

    /// 12 字节 CORE 头的位图。
    pub fn core(width: u16, height: u16, bits: u16) -> Self {
        Self {
            header_size: 12,
            ..Self::new(u32::from(width), u32::from(height), bits)
        }
    }

    pub fn compression(mut self, compression: u32) -> Self {
        self.compression = compression;
        self
    }

    pub fn header_size(mut self, size: u32) -> Self {
        self.header_size = size;
        self
    }

    pub fn colors_used(mut self, colors: u32) -> Self {
        self.colors_used = colors;
        self
    }

    /// 紧跟在 DIB 头之后的通道掩码块，其后留 4 字节空隙，使掩码满足读取所需的空间。
    pub fn masks(mut self, masks: &[u32]) -> Self {
        self.masks = masks.to_vec();
        self
    }

    /// 用固定值而不是随机数据填充调色板与像素。
    pub fn fill(mut self, value: u8) -> Self {
        self.fill = Some(value);
        self
    }

    fn palette_entries(&self) -> usize {
        match (self.bits <= 8, self.colors_used) {
            (false, _) => 0,
            (true, 0) => 1 << self.bits,
            (true, n) => n as usize,
        }
    }

    pub fn row_stride(&self) -> usize {
        (self.bits as usize * self.width as usize).div_ceil(32) * 4
    }

    fn mask_block_len(&self) -> usize {
        if self.masks.is_empty() {
            0
        } else {
            self.masks.len() * 4 + 4
        }
    }

    pub fn pixel_data_offset(&self) -> usize {
        14 + self.header_size as usize + self.mask_block_len() + self.palette_entries() * 4
    }

    /// 像素数组过小时在文件末尾补齐，保证 `offset + 14 <= 文件长度`。
    pub fn build(&self) -> Vec<u8> {
        let offset = self.pixel_data_offset();
        let len = (offset + self.row_stride() * self.height as usize).max(offset + 14);

        let mut bytes = vec![0u8; len];
        match self.fill {
            Some(value) => bytes.fill(value),
            None => rand::rng().fill_bytes(&mut bytes),
        }

        let header_end = 14 + self.header_size as usize;
        bytes[..header_end].fill(0);
        bytes[..2].copy_from_slice(b"BM");
        bytes[2..6].copy_from_slice(&(len as u32).to_le_bytes());
        bytes[10..14].copy_from_slice(&(offset as u32).to_le_bytes());
        bytes[14..18].copy_from_slice(&self.header_size.to_le_bytes());

        if self.header_size == 12 {
            bytes[18..20].copy_from_slice(&(self.width as u16).to_le_bytes());
            bytes[20..22].copy_from_slice(&(self.height as u16).to_le_bytes());
            bytes[22..24].copy_from_slice(&1u16.to_le_bytes());
            bytes[24..26].copy_from_slice(&self.bits.to_le_bytes());
        } else {
            bytes[18..22].copy_from_slice(&self.width.to_le_bytes());
            bytes[22..26].copy_from_slice(&self.height.to_le_bytes());
            bytes[26..28].copy_from_slice(&1u16.to_le_bytes());
            bytes[28..30].copy_from_slice(&self.bits.to_le_bytes());
            bytes[30..34].copy_from_slice(&self.compression.to_le_bytes());
            bytes[46..50].copy_from_slice(&self.colors_used.to_le_bytes());
        }

        for (i, mask) in self.masks.iter().enumerate() {
            let at = header_end + i * 4;
            bytes[at..at + 4].copy_from_slice(&mask.to_le_bytes());
        }

        bytes
    }
}
