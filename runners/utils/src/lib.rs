//! 可执行程序依赖的通用组件.

use log::LevelFilter;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 初始化日志. 默认 `Info` 级别, 可由环境变量 `RUST_LOG` 覆盖.
///
/// 重复初始化会被忽略.
pub fn init_logger() {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init();
}
