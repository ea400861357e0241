use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

use crate::bitmap::BitmapImage;
use crate::constants::LENGTH_PREFIX_SIZE;
use crate::error::{Result, StegoError};

use super::Scheme;

/// 为载荷加上长度前缀：调色板方案 1 字节，其余方案 4 字节大端序。
fn length_prefixed(scheme: Scheme, payload: &[u8]) -> Result<Vec<u8>> {
    let too_large = |limit: usize| StegoError::PayloadTooLarge {
        needed: payload.len() + scheme.prefix_len(),
        available: limit,
    };

    let mut stream = Vec::with_capacity(payload.len() + scheme.prefix_len());
    match scheme {
        Scheme::Palette => {
            let len = u8::try_from(payload.len()).map_err(|_| too_large(usize::from(u8::MAX)))?;
            stream.push(len);
        }
        _ => {
            let len = i32::try_from(payload.len()).map_err(|_| too_large(i32::MAX as usize))?;
            let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
            BigEndian::write_i32(&mut prefix, len);
            stream.extend_from_slice(&prefix);
        }
    }
    stream.extend_from_slice(payload);
    Ok(stream)
}

/// 把 `payload` 隐藏进图像，返回一份与原文件等长的新字节缓冲区。
///
/// 原始图像不会被修改。编码器不会替调用方截断载荷：调用方应先用
/// [`BitmapImage::capacity`] 检查长度。
///
/// # Errors
///
/// * 没有对应方案时返回 [`StegoError::UnsupportedFormat`]。
/// * 长度前缀加载荷超出可用槽位时返回 [`StegoError::PayloadTooLarge`]。
pub fn encode(image: &BitmapImage, payload: &[u8]) -> Result<Vec<u8>> {
    let scheme = image.scheme()?;
    let stream = length_prefixed(scheme, payload)?;

    let available = image.available_slots(scheme);
    if stream.len() > available {
        return Err(StegoError::PayloadTooLarge {
            needed: stream.len(),
            available,
        });
    }

    debug!(%scheme, len = payload.len(), available, "encoding payload");

    let mut output = image.bytes().to_vec();
    let region = &mut output[image.region(scheme)];
    stream
        .iter()
        .enumerate()
        .for_each(|(slot, &byte)| scheme.write_slot(region, slot, byte));

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn true_color_image(width: u32, height: u32, fill: u8) -> Vec<u8> {
        let stride = ((24 * width as usize + 31) / 32) * 4;
        let len = 54 + stride * height as usize;
        let mut bytes = vec![fill; len];
        bytes[..54].fill(0);
        bytes[..2].copy_from_slice(b"BM");
        bytes[2..6].copy_from_slice(&(len as u32).to_le_bytes());
        bytes[10..14].copy_from_slice(&54u32.to_le_bytes());
        bytes[14..18].copy_from_slice(&40u32.to_le_bytes());
        bytes[18..22].copy_from_slice(&width.to_le_bytes());
        bytes[22..26].copy_from_slice(&height.to_le_bytes());
        bytes[26..28].copy_from_slice(&1u16.to_le_bytes());
        bytes[28..30].copy_from_slice(&24u16.to_le_bytes());
        bytes
    }

    #[test]
    fn true_color_length_prefix_layout() {
        let bytes = true_color_image(8, 8, 0xFF);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        let encoded = encode(&image, b"AB").unwrap();
        assert_eq!(encoded.len(), bytes.len());

        // 长度 2 的大端序为 00 00 00 02，只有第 4 个槽位的第 1 个像素 (像素 12) 低 2 位为 10
        for pixel in 0..16 {
            let offset = 54 + pixel * 3;
            let expected_low = if pixel == 12 { 0b10 } else { 0b00 };
            assert_eq!(encoded[offset] & 0x3, expected_low, "pixel {pixel}");
            assert_eq!(encoded[offset] & 0xFC, 0xFC);
            assert_eq!(encoded[offset + 1], 0xFF);
            assert_eq!(encoded[offset + 2], 0xFF);
        }

        assert_eq!(image.bytes(), &bytes[..], "source must stay untouched");
        let carrier = BitmapImage::from_bytes(&encoded).unwrap();
        assert_eq!(carrier.decode().unwrap(), b"AB");
    }

    #[test]
    fn headers_are_never_touched() {
        let bytes = true_color_image(8, 8, 0x00);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        let encoded = encode(&image, &[0xFF; 12]).unwrap();
        assert_eq!(encoded[..54], bytes[..54]);
    }

    #[test]
    fn rejects_stream_larger_than_carrier() {
        let bytes = true_color_image(8, 8, 0);
        let image = BitmapImage::from_bytes(&bytes).unwrap();
        assert_eq!(image.capacity(), 12);
        assert!(encode(&image, &[1; 12]).is_ok());
        assert!(matches!(
            encode(&image, &[1; 13]),
            Err(StegoError::PayloadTooLarge {
                needed: 17,
                available: 16
            })
        ));
    }

    #[test]
    fn palette_prefix_is_single_byte() {
        let stream = length_prefixed(Scheme::Palette, b"abc").unwrap();
        assert_eq!(stream, [3, b'a', b'b', b'c']);
        assert!(length_prefixed(Scheme::Palette, &[0; 256]).is_err());

        let stream = length_prefixed(Scheme::DeepColor, b"abc").unwrap();
        assert_eq!(stream, [0, 0, 0, 3, b'a', b'b', b'c']);
    }
}
