//! Direct3D 11 图形 API 实现模块
//!
//! 本模块包含了所有 Direct3D 11 相关的代码：
//! - Context: 设备、交换链、渲染目标视图等基础设施的初始化与释放
//! - Renderer: clear-present 渲染循环

pub mod context;
pub mod renderer;

// 重新导出常用类型
pub use context::D3d11Context;
pub use renderer::Renderer;
