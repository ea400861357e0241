//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `info` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法、执行容量检查以及向用户报告结果。

use crate::bitmap::{BitmapImage, DibHeader};
use crate::cli::{HideArgs, InfoArgs, RecoverArgs};
use crate::constants::BMP_MAGIC;
use anyhow::{Context, Result};
use colored::Colorize;
use image::ImageFormat;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 在输入文件旁生成默认输出路径：`<prefix><stem>.<extension>`。
fn default_output_path(input: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    input.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 输出文件已存在且未指定 `--force` 时拒绝写入。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 读取载体图像。非 BMP 的无损图像 (PNG, TIFF, WebP, QOI) 会在内存中转换为 24 位 BMP。
fn load_cover(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    if bytes.starts_with(&BMP_MAGIC) {
        return Ok(bytes);
    }

    debug!(path = %path.display(), "cover is not a BMP, converting to 24-bit");
    let decoded = image::load_from_memory(&bytes).with_context(|| {
        format!(
            "Unable to decode image file: {} \nIt is neither a BMP nor a supported lossless image.",
            path.to_string_lossy().red().bold()
        )
    })?;

    let mut converted = Vec::new();
    image::DynamicImage::ImageRgb8(decoded.to_rgb8())
        .write_to(&mut Cursor::new(&mut converted), ImageFormat::Bmp)
        .with_context(|| "Failed to convert the cover image to BMP.")?;
    Ok(converted)
}

fn parse_bitmap(bytes: &[u8], path: &Path) -> Result<BitmapImage> {
    BitmapImage::from_bytes(bytes).with_context(|| {
        format!(
            "Unable to parse bitmap: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本文件、检查隐写容量是否足够、调用编码器隐藏文本，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径及选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解析输入的图像，或无法读取文本文件。
/// * 图像容量不足且未指定 `--truncate`。
/// * 目标文件已存在且未指定 `--force`。
/// * 编码器执行失败或无法写入目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_output_path(&args.image, "doctored_", "bmp"));
    ensure_writable(&dest, args.force)?;

    let cover = load_cover(&args.image)?;
    let bitmap = parse_bitmap(&cover, &args.image)?;

    let mut text = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    let capacity = usize::try_from(bitmap.capacity()).unwrap_or(0);
    if args.truncate && text.len() > capacity {
        warn!(dropped = text.len() - capacity, "truncating payload to capacity");
        println!(
            "The text exceeds the capacity by {} bytes and was truncated.",
            (text.len() - capacity).to_string().yellow().bold()
        );
        text.truncate(capacity);
    }

    anyhow::ensure!(
        text.len() <= capacity,
        "Not enough space in the image to hide the text. \nRequired: {}, Available: {}",
        text.len().to_string().red().bold(),
        capacity.to_string().green().bold()
    );

    let encoded = bitmap.encode(&text).with_context(|| {
        format!(
            "Failed to hide the text in {}. \nThe image format may not be supported.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&dest, encoded).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用解码器获取隐藏的字节，
/// 最后将恢复的内容写入目标文本文件。图像中没有隐藏数据时不会写入任何文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径及选项的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解析输入的图像文件。
/// * 图像格式没有对应的隐写方案。
/// * 目标文件已存在且未指定 `--force`，或无法写入目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let bitmap = parse_bitmap(&picture, &args.image)?;

    let text = bitmap.decode().with_context(|| {
        format!(
            "Failed to recover the hidden text from '{}'. \nThe image format may not be supported.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    if text.is_empty() {
        println!(
            "No hidden text was found in: {}",
            args.image.to_string_lossy().yellow().bold()
        );
        return Ok(());
    }

    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| default_output_path(&args.image, "recovered_", "txt"));
    ensure_writable(&dest, args.force)?;

    fs::write(&dest, text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Info' 命令：打印头部结构、隐写方案和容量。
///
/// # Errors
///
/// 无法读取或解析输入的图像文件时返回错误。
pub fn handle_info(args: InfoArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let bitmap = parse_bitmap(&picture, &args.image)?;

    let header = bitmap.dib_header();
    let variant = match header {
        DibHeader::Core(_) => "BITMAPCOREHEADER",
        DibHeader::Info(_) => "BITMAPINFOHEADER",
    };

    println!("{}", args.image.to_string_lossy().bold());
    println!("  file size:          {}", bitmap.file_header().file_size());
    println!("  pixel data offset:  {}", bitmap.file_header().pixel_data_offset());
    println!("  DIB header:         {variant} ({} bytes)", header.header_size());
    println!("  dimensions:         {} x {}", bitmap.width(), bitmap.height());
    println!("  planes:             {}", header.planes());
    println!("  bit depth:          {}", bitmap.pixel_format());
    match header.compression() {
        Some(compression) => println!(
            "  compression:        {compression} ({})",
            compression.code()
        ),
        None => println!("  compression:        none (core header)"),
    }
    if let DibHeader::Info(info) = header {
        println!(
            "  pixel density:      {} x {} px/m",
            info.horizontal_density, info.vertical_density
        );
        println!("  important colors:   {}", info.important_colors);
    }
    println!(
        "  color table:        {} entries at offset {}",
        bitmap.color_table().len(),
        bitmap.palette_offset()
    );
    if let Some(mask) = bitmap.bitmask() {
        println!(
            "  channel bitmask:    R {:#010x} G {:#010x} B {:#010x}{}",
            mask.red,
            mask.green,
            mask.blue,
            mask.alpha
                .map(|a| format!(" A {a:#010x}"))
                .unwrap_or_default()
        );
    }
    println!("  row stride:         {}", bitmap.row_stride());
    println!("  pixel array size:   {}", bitmap.pixel_array_size());

    match bitmap.scheme() {
        Ok(scheme) => {
            println!("  scheme:             {scheme}");
            let capacity = bitmap.capacity();
            let shown = if capacity > 0 {
                capacity.to_string().green().bold()
            } else {
                capacity.to_string().red().bold()
            };
            println!("  capacity:           {shown} bytes");
        }
        Err(e) => println!("  scheme:             {}", e.to_string().red()),
    }

    Ok(())
}
