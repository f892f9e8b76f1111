//! 日志系统初始化模块

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, fmt};

/// 帧循环日志使用的时间格式：`HH:MM:SS.微秒`
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_secs = now.as_secs();
        let micros = now.subsec_micros();
        let h = (total_secs / 3600) % 24;
        let m = (total_secs / 60) % 60;
        let s = total_secs % 60;

        write!(w, "{h:02}:{m:02}:{s:02}.{micros:06}")
    }
}

/// 初始化全局日志系统，默认级别为 `info`
///
/// 使用 `tracing-subscriber`，支持环境变量 `RUST_LOG` 控制日志级别
///
/// ```bash
/// RUST_LOG=debug cargo run          # 输出每一拍的调试信息
/// RUST_LOG=beat_show=warn cargo run # 仅输出警告（如 FPS 下降）
/// ```
pub fn init_logging() {
    init_logging_with_default("info");
}

/// 以指定的默认级别初始化日志系统
///
/// 若全局订阅者已被设置（例如测试中重复调用），静默忽略。
pub fn init_logging_with_default(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(true)
        .with_timer(ClockTime)
        .compact()
        .try_init();
}
