//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

/// 一款把文本隐藏进 BMP 图像调色板或像素低位的命令行工具，文件大小保持不变。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款把文本隐藏进 BMP 图像调色板或像素低位的命令行工具。支持 1/4/8/16/24/32 位 BMP，文件大小保持不变。"
)]
pub struct Cli {
    /// 输出调试日志 (RUST_LOG 优先)。
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 info (查看结构与容量)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在 BMP 图像中隐藏文本文件内容。非 BMP 的无损图像会先转换为 24 位 BMP。
    Hide(HideArgs),

    /// 从经过隐写的 BMP 图像中恢复隐藏的文本。
    Recover(RecoverArgs),

    /// 显示 BMP 的头部结构、隐写方案以及可隐藏的字节数。
    Info(InfoArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本内容的文件路径。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 结果图像的输出路径，默认为输入图像旁的 `doctored_<name>.bmp`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 输出文件已存在时覆盖它。
    #[arg(short, long)]
    pub force: bool,

    /// 文本超出容量时截断而不是报错。
    #[arg(long)]
    pub truncate: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文本数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文本的保存路径，默认为图像旁的 `recovered_<name>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 输出文件已存在时覆盖它。
    #[arg(short, long)]
    pub force: bool,
}

/// 'info' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// 要检查的 BMP 图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
