//! FirstLight - 最小化的 Direct3D 11 启动脚手架
//!
//! 创建一个原生窗口，协商一个 D3D11 设备和交换链，然后每帧清屏并呈现。
//! 没有渲染管线、场景和输入处理——只有设备启动序列和一个平凡的
//! clear-present 循环。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `renderer`: 与 API 无关的渲染器组件（设备创建回退策略）
//! - `gfx`: 图形后端模块（Direct3D 11，仅 Windows）
//!
//! # 初始化流程
//!
//! ```text
//! ┌─────────────┐
//! │   main.rs   │  配置 / 日志 / 事件循环
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  fallback   │  驱动类型 × feature level 协商
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    d3d11    │  设备 → DXGI 工厂 → 交换链 → 视图 / 视口
//! └─────────────┘
//! ```

pub mod core;
pub mod gfx;
pub mod renderer;
