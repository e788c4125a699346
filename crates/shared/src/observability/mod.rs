//! 日志初始化模块
//!
//! 所有二进制通过单一入口点配置日志输出，库代码只使用 `tracing` 宏。

pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// 服务名称，用于标识日志来源
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// 日志级别（如 "info", "debug"），`RUST_LOG` 优先
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 是否启用 JSON 格式日志
    #[serde(default)]
    pub json_logs: bool,
}

fn default_service_name() -> String {
    "unknown-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// 注入服务名
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    /// 覆盖日志级别
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }
}

/// 统一初始化日志
///
/// # Example
///
/// ```ignore
/// use ruleblock_shared::observability::{init, ObservabilityConfig};
///
/// fn main() -> anyhow::Result<()> {
///     let config = ObservabilityConfig::default().with_service_name("rule-engine");
///     init(&config)?;
///     Ok(())
/// }
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;

    info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(())
}
