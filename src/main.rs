use clap::Parser;
use tracing_subscriber::EnvFilter;

use bmp_stego::{
    cli::{Cli, Commands},
    handler::{handle_hide, handle_info, handle_recover},
};

/// 初始化日志：设置了 RUST_LOG 时以其为准，否则默认 warn，`--verbose` 时为 debug。
/// 日志写到 stderr，避免与命令输出混在一起。
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`hide`、`recover` 或 `info`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Info(args) => handle_info(args),
    }
}
