//! tracing 订阅器初始化
//!
//! 日志输出到 stderr，stdout 留给命令输出。

use anyhow::Result;
use std::io;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use super::ObservabilityConfig;

/// 初始化 tracing（日志）
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// 构建环境过滤器，`RUST_LOG` 优先于配置
fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        let config = ObservabilityConfig::default().with_log_level("not a level [[[");
        // 不应 panic
        let _ = env_filter(&config);
    }

    #[test]
    fn test_second_init_fails() {
        let config = ObservabilityConfig::default();
        let first = init(&config);
        let second = init(&config);
        // 全局订阅器只能安装一次
        assert!(first.is_err() || second.is_err());
    }
}
