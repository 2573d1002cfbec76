//! 错误处理模块
//!
//! 定义了整个脚手架使用的统一错误类型。
//!
//! # 设计原则
//!
//! - 为每种错误类型提供清晰的上下文信息
//! - 初始化序列中的每一步失败都有独立的变体，便于模式匹配
//! - 可恢复与不可恢复的错误在类型上区分（如 `DeviceRemoved`）

use std::fmt;

/// 统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, FirstLightError>;

/// FirstLight 的错误类型
#[derive(Debug)]
pub enum FirstLightError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// IO 错误
    Io(std::io::Error),

    /// 日志系统错误
    Log(String),

    /// 初始化错误
    Initialization(String),

    /// 运行时错误
    Runtime(String),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
///
/// 变体对应设备初始化序列的各个阶段，外加运行时的呈现错误。
/// 驱动不认识最高 feature level 的情况在回退循环内部恢复，不会出现在这里。
#[derive(Debug)]
pub enum GraphicsError {
    /// 所有驱动类型都无法创建设备
    DeviceCreation(String),

    /// 无法从设备取得 DXGI 工厂（设备 → DXGI 设备 → 适配器 → 工厂）
    FactoryAcquisition(String),

    /// 交换链创建失败
    SwapChainCreation(String),

    /// 渲染目标视图创建失败
    RenderTargetView(String),

    /// 设备已移除或已重置，资源束不可恢复
    DeviceRemoved(String),

    /// 呈现失败（非设备移除）
    Present(String),
}

impl fmt::Display for FirstLightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirstLightError::Config(e) => write!(f, "Configuration error: {}", e),
            FirstLightError::Graphics(e) => write!(f, "Graphics error: {}", e),
            FirstLightError::Io(e) => write!(f, "IO error: {}", e),
            FirstLightError::Log(msg) => write!(f, "Log error: {}", msg),
            FirstLightError::Initialization(msg) => write!(f, "Initialization error: {}", msg),
            FirstLightError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::FactoryAcquisition(msg) => {
                write!(f, "DXGI factory acquisition failed: {}", msg)
            }
            GraphicsError::SwapChainCreation(msg) => {
                write!(f, "Swap chain creation failed: {}", msg)
            }
            GraphicsError::RenderTargetView(msg) => {
                write!(f, "Render target view creation failed: {}", msg)
            }
            GraphicsError::DeviceRemoved(msg) => write!(f, "Device removed: {}", msg),
            GraphicsError::Present(msg) => write!(f, "Present failed: {}", msg),
        }
    }
}

impl std::error::Error for FirstLightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FirstLightError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for FirstLightError {
    fn from(err: std::io::Error) -> Self {
        FirstLightError::Io(err)
    }
}

impl From<ConfigError> for FirstLightError {
    fn from(err: ConfigError) -> Self {
        FirstLightError::Config(err)
    }
}

impl From<GraphicsError> for FirstLightError {
    fn from(err: GraphicsError) -> Self {
        FirstLightError::Graphics(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphics_error_display() {
        let err = GraphicsError::DeviceCreation("no adapters".to_string());
        assert_eq!(err.to_string(), "Device creation failed: no adapters");

        let err = FirstLightError::from(GraphicsError::DeviceRemoved("hung".to_string()));
        assert_eq!(err.to_string(), "Graphics error: Device removed: hung");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: FirstLightError = ConfigError::InvalidValue {
            field: "window.width".to_string(),
            reason: "must be greater than 0".to_string(),
        }
        .into();
        assert!(matches!(err, FirstLightError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for 'window.width': must be greater than 0"
        );
    }
}
