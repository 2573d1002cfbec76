//! 渲染器通用组件模块
//!
//! 存放与具体图形 API 无关的渲染器组件。
//! API 相关的实现在 `gfx` 模块中，按 API 分类组织。
//!
//! - `fallback`：设备创建的驱动类型 / feature level 回退策略

pub mod fallback;

pub use fallback::{AttemptError, DriverKind, Negotiated, DRIVER_ORDER};
