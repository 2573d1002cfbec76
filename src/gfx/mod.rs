//! 图形后端模块
//!
//! 本模块封装图形 API 的底层实现。目前只有一个后端：
//! - Direct3D 11：仅 Windows 平台

#[cfg(target_os = "windows")]
pub mod d3d11;

#[cfg(target_os = "windows")]
pub use d3d11::D3d11Context;
