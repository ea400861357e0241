use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

use crate::bitmap::BitmapImage;
use crate::constants::FILE_HEADER_SIZE;
use crate::error::Result;

use super::Scheme;

/// 从图像中提取隐藏的数据。
///
/// 先读取长度前缀：调色板方案为第一个条目的 alpha 字节，其余方案为 4 个槽位组成的大端序有符号整数。
/// 长度不合理时视为"没有隐藏数据"并返回空向量，因为普通图像的像素也会被读成一个随机的长度。
///
/// # Errors
///
/// 像素格式与压缩方式没有对应方案时返回 [`crate::StegoError::UnsupportedFormat`]。
pub fn decode(image: &BitmapImage) -> Result<Vec<u8>> {
    let scheme = image.scheme()?;
    let region = &image.bytes()[image.region(scheme)];
    let slots = image.available_slots(scheme);
    let prefix_len = scheme.prefix_len();

    if slots < prefix_len {
        debug!(%scheme, slots, "image too small to carry a length prefix");
        return Ok(Vec::new());
    }

    let prefix: Vec<u8> = (0..prefix_len)
        .map(|slot| scheme.read_slot(region, slot))
        .collect();

    let len = match scheme {
        Scheme::Palette => usize::from(prefix[0]),
        _ => {
            let declared = BigEndian::read_i32(&prefix);
            let limit = i64::from(image.file_header().file_size()) - FILE_HEADER_SIZE as i64;
            if declared <= 0 || i64::from(declared) > limit {
                debug!(%scheme, declared, "no plausible length prefix");
                return Ok(Vec::new());
            }
            declared as usize
        }
    };

    if prefix_len + len > slots {
        warn!(
            %scheme,
            len,
            available = slots - prefix_len,
            "length prefix points past the end of the carrier region"
        );
        return Ok(Vec::new());
    }

    debug!(%scheme, len, "decoding payload");
    Ok((prefix_len..prefix_len + len)
        .map(|slot| scheme.read_slot(region, slot))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8 位 16 色 4x4 图像：像素偏移 14 + 40 + 64 = 118，文件长 134。
    fn palette_image(alphas: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; 134];
        bytes[..2].copy_from_slice(b"BM");
        bytes[2..6].copy_from_slice(&134u32.to_le_bytes());
        bytes[10..14].copy_from_slice(&118u32.to_le_bytes());
        bytes[14..18].copy_from_slice(&40u32.to_le_bytes());
        bytes[18..22].copy_from_slice(&4u32.to_le_bytes());
        bytes[22..26].copy_from_slice(&4u32.to_le_bytes());
        bytes[26..28].copy_from_slice(&1u16.to_le_bytes());
        bytes[28..30].copy_from_slice(&8u16.to_le_bytes());
        bytes[46..50].copy_from_slice(&16u32.to_le_bytes());
        for (entry, &alpha) in alphas.iter().enumerate() {
            bytes[54 + entry * 4 + 3] = alpha;
        }
        bytes
    }

    #[test]
    fn decodes_palette_alpha_bytes() {
        let bytes = palette_image(&[3, b'h', b'i', b'!', 0, 0]);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert_eq!(decode(&image).unwrap(), b"hi!");
    }

    #[test]
    fn zero_palette_length_is_empty() {
        let bytes = palette_image(&[0, b'h']);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert!(decode(&image).unwrap().is_empty());
    }

    #[test]
    fn palette_length_past_table_is_empty() {
        let bytes = palette_image(&[16, b'x']);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert!(decode(&image).unwrap().is_empty());
    }

    fn deep_color_image(first_bytes: &[u8]) -> Vec<u8> {
        let len = 54 + 8 * 8 * 4;
        let mut bytes = vec![0x55u8; len];
        bytes[..54].fill(0);
        bytes[..2].copy_from_slice(b"BM");
        bytes[2..6].copy_from_slice(&(len as u32).to_le_bytes());
        bytes[10..14].copy_from_slice(&54u32.to_le_bytes());
        bytes[14..18].copy_from_slice(&40u32.to_le_bytes());
        bytes[18..22].copy_from_slice(&8u32.to_le_bytes());
        bytes[22..26].copy_from_slice(&8u32.to_le_bytes());
        bytes[26..28].copy_from_slice(&1u16.to_le_bytes());
        bytes[28..30].copy_from_slice(&32u16.to_le_bytes());
        for (pixel, &b) in first_bytes.iter().enumerate() {
            bytes[54 + pixel * 4] = b;
        }
        bytes
    }

    #[test]
    fn deep_color_reads_first_byte_of_each_pixel() {
        let bytes = deep_color_image(&[0, 0, 0, 2, b'o', b'k']);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert_eq!(decode(&image).unwrap(), b"ok");
    }

    #[test]
    fn implausible_prefix_is_no_payload() {
        // 负数
        let bytes = deep_color_image(&[0x80, 0, 0, 1]);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert!(decode(&image).unwrap().is_empty());

        // 0x55555555 远大于文件长度
        let bytes = deep_color_image(&[]);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert!(decode(&image).unwrap().is_empty());

        // 小于文件长度但超出可用槽位
        let bytes = deep_color_image(&[0, 0, 0, 200]);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert!(decode(&image).unwrap().is_empty());
    }
}
