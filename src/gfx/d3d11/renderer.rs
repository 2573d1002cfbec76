//! Direct3D 11 渲染循环
//!
//! 每帧的工作只有两步：把渲染目标清成固定颜色，然后立即呈现
//! （sync interval = 0，不等垂直同步）。
//!
//! 呈现失败会被区分对待：交换链丢失 / 设备移除是不可恢复的
//! [`GraphicsError::DeviceRemoved`]，调用方应当终止；其余失败作为
//! [`GraphicsError::Present`] 上报。窗口尺寸变化时重建渲染目标视图和视口。

use tracing::{debug, trace};
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R8G8B8A8_UNORM;
use windows::Win32::Graphics::Dxgi::{
    DXGI_ERROR_DEVICE_REMOVED, DXGI_ERROR_DEVICE_RESET, DXGI_PRESENT, DXGI_SWAP_CHAIN_FLAG,
};
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::core::error::{FirstLightError, GraphicsError, Result};
use crate::core::Config;

use super::context::D3d11Context;

/// 固定的清屏颜色（midnight blue）
pub const CLEAR_COLOR: [f32; 4] = [0.098_039_23, 0.098_039_23, 0.439_215_72, 1.0];

/// Direct3D 11 渲染器
///
/// 持有资源束并驱动 clear-present 循环。
pub struct Renderer {
    gfx: D3d11Context,
}

impl Renderer {
    /// 创建窗口、初始化设备并构建渲染器
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        Ok(Self {
            gfx: D3d11Context::new(event_loop, config)?,
        })
    }

    pub fn window(&self) -> &Window {
        &self.gfx.window
    }

    /// 渲染一帧：清屏并立即呈现
    pub fn draw(&mut self) -> Result<()> {
        let rtv = self
            .gfx
            .rtv
            .as_ref()
            .ok_or_else(|| FirstLightError::Runtime("No render target view bound".to_string()))?;

        unsafe {
            self.gfx.context.ClearRenderTargetView(rtv, &CLEAR_COLOR);
        }

        let hr = unsafe { self.gfx.swap_chain.Present(0, DXGI_PRESENT(0)) };
        if hr == DXGI_ERROR_DEVICE_REMOVED || hr == DXGI_ERROR_DEVICE_RESET {
            // 设备移除后资源束整体失效，带上驱动报告的原因上报
            let reason = unsafe { self.gfx.device.GetDeviceRemovedReason() }
                .err()
                .map(|e| e.message())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(GraphicsError::DeviceRemoved(reason).into());
        }
        hr.ok().map_err(|e| GraphicsError::Present(e.message()))?;

        trace!("Presented");
        Ok(())
    }

    /// 窗口尺寸变化：重建后备缓冲、渲染目标视图和视口
    pub fn resize(&mut self) -> Result<()> {
        let size = self.gfx.window.inner_size();

        // 最小化时客户区为 0，跳过
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if size.width == self.gfx.width && size.height == self.gfx.height {
            return Ok(());
        }

        unsafe {
            // ResizeBuffers 要求后备缓冲没有存活引用：先解绑再释放旧视图
            self.gfx.context.OMSetRenderTargets(None, None);
            self.gfx.rtv = None;

            self.gfx
                .swap_chain
                .ResizeBuffers(
                    1,
                    size.width,
                    size.height,
                    DXGI_FORMAT_R8G8B8A8_UNORM,
                    DXGI_SWAP_CHAIN_FLAG(0),
                )
                .map_err(|e| GraphicsError::SwapChainCreation(e.message()))?;
        }

        self.gfx.recreate_render_target(size.width, size.height)?;

        #[cfg(debug_assertions)]
        debug!(width = size.width, height = size.height, "Resize completed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_color_is_midnight_blue() {
        assert!((CLEAR_COLOR[0] - 0.098).abs() < 1e-3);
        assert!((CLEAR_COLOR[1] - 0.098).abs() < 1e-3);
        assert!((CLEAR_COLOR[2] - 0.439).abs() < 1e-3);
        assert_eq!(CLEAR_COLOR[3], 1.0);
    }
}
