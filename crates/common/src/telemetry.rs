use log::LevelFilter;

/// 初始化 env_logger。设置了 `RUST_LOG` 时以其为准，否则按 `-v` 次数选择级别。
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // 重复初始化（如测试中）时忽略错误
    let _ = builder.try_init();
}
