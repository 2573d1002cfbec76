//! Direct3D 11 设备与交换链初始化
//!
//! 本模块完成从窗口句柄到可渲染资源束的整个启动序列：
//!
//! 1. 创建窗口并取得 HWND 和客户区尺寸
//! 2. 通过 `renderer::fallback` 协商设备（驱动类型 × feature level 双重回退）
//! 3. 从设备取得 DXGI 工厂（设备 → DXGI 设备 → 适配器 → 工厂）
//! 4. 创建交换链：优先 DXGI 1.2 的 per-window 路径，回退到传统路径
//! 5. 从后备缓冲创建渲染目标视图，绑定视图和视口
//!
//! 每个可失败的步骤都会以对应的 [`GraphicsError`] 变体短路返回；
//! 已经创建的资源由 COM 包装在 drop 时自动释放，不会泄漏。

use std::sync::Arc;

use tracing::{debug, info, warn};
use windows::core::Interface;
use windows::Win32::Foundation::{E_FAIL, E_INVALIDARG, HWND};
use windows::Win32::Graphics::Direct3D::{
    D3D_DRIVER_TYPE, D3D_DRIVER_TYPE_HARDWARE, D3D_DRIVER_TYPE_REFERENCE, D3D_DRIVER_TYPE_WARP,
    D3D_FEATURE_LEVEL, D3D_FEATURE_LEVEL_10_0, D3D_FEATURE_LEVEL_10_1, D3D_FEATURE_LEVEL_11_0,
    D3D_FEATURE_LEVEL_11_1,
};
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, ID3D11Device1, ID3D11DeviceContext, ID3D11DeviceContext1,
    ID3D11RenderTargetView, ID3D11Texture2D, D3D11_CREATE_DEVICE_DEBUG, D3D11_CREATE_DEVICE_FLAG,
    D3D11_SDK_VERSION, D3D11_VIEWPORT,
};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_MODE_DESC, DXGI_RATIONAL, DXGI_SAMPLE_DESC,
};
use windows::Win32::Graphics::Dxgi::{
    IDXGIDevice, IDXGIFactory1, IDXGIFactory2, IDXGISwapChain, IDXGISwapChain1,
    DXGI_MWA_NO_ALT_ENTER, DXGI_SWAP_CHAIN_DESC, DXGI_SWAP_CHAIN_DESC1,
    DXGI_USAGE_RENDER_TARGET_OUTPUT,
};
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::window::{Window, WindowBuilder};

use crate::core::error::{FirstLightError, GraphicsError, Result};
use crate::core::Config;
use crate::renderer::fallback::{self, AttemptError, DriverKind, DRIVER_ORDER};

/// feature level 偏好列表，从新到旧
pub const FEATURE_LEVELS: [D3D_FEATURE_LEVEL; 4] = [
    D3D_FEATURE_LEVEL_11_1,
    D3D_FEATURE_LEVEL_11_0,
    D3D_FEATURE_LEVEL_10_1,
    D3D_FEATURE_LEVEL_10_0,
];

/// Direct3D 11 资源束
///
/// 持有设备初始化序列创建的全部资源。11.1 接口变体（`*1` 字段）
/// 是可选的升级，只在平台支持时填充，不走并行代码路径。
///
/// 字段按依赖顺序声明：视图 → 交换链 → 上下文 → 设备。
/// drop 按声明顺序释放字段，因此释放顺序天然满足依赖约束。
pub struct D3d11Context {
    /// 当前后备缓冲上的渲染目标视图；resize 期间暂时为空
    pub rtv: Option<ID3D11RenderTargetView>,
    /// 交换链（统一使用的传统接口）
    pub swap_chain: IDXGISwapChain,
    /// DXGI 1.2 交换链接口（per-window 路径创建时填充）
    pub swap_chain1: Option<IDXGISwapChain1>,
    /// 立即上下文
    pub context: ID3D11DeviceContext,
    /// 11.1 立即上下文（升级成功时填充）
    pub context1: Option<ID3D11DeviceContext1>,
    /// D3D11 设备
    pub device: ID3D11Device,
    /// 11.1 设备接口（升级成功时填充）
    pub device1: Option<ID3D11Device1>,
    /// 最终选中的驱动类型
    pub driver: DriverKind,
    /// 设备实际支持的 feature level
    pub feature_level: D3D_FEATURE_LEVEL,
    /// 窗口引用
    pub window: Arc<Window>,
    /// 后备缓冲宽度
    pub width: u32,
    /// 后备缓冲高度
    pub height: u32,
}

/// 单次 `D3D11CreateDevice` 尝试的结果
struct CreatedDevice {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    feature_level: D3D_FEATURE_LEVEL,
}

fn driver_type_of(kind: DriverKind) -> D3D_DRIVER_TYPE {
    match kind {
        DriverKind::Hardware => D3D_DRIVER_TYPE_HARDWARE,
        DriverKind::Warp => D3D_DRIVER_TYPE_WARP,
        DriverKind::Reference => D3D_DRIVER_TYPE_REFERENCE,
    }
}

/// 视口配置：原点 (0,0)，覆盖整个客户区，深度范围 [0,1]
pub fn viewport(width: u32, height: u32) -> D3D11_VIEWPORT {
    D3D11_VIEWPORT {
        TopLeftX: 0.0,
        TopLeftY: 0.0,
        Width: width as f32,
        Height: height as f32,
        MinDepth: 0.0,
        MaxDepth: 1.0,
    }
}

/// 对单个驱动类型尝试创建设备
///
/// E_INVALIDARG 映射为 [`AttemptError::UnknownTopLevel`]：
/// DirectX 11.0 平台不认识 `D3D_FEATURE_LEVEL_11_1`，会整体拒绝参数，
/// 回退循环会去掉最高项对同一驱动类型重试。
fn create_device(
    driver_type: D3D_DRIVER_TYPE,
    flags: D3D11_CREATE_DEVICE_FLAG,
    levels: &[D3D_FEATURE_LEVEL],
) -> std::result::Result<CreatedDevice, AttemptError<windows::core::Error>> {
    let mut device = None;
    let mut context = None;
    let mut feature_level = D3D_FEATURE_LEVEL::default();

    let created = unsafe {
        D3D11CreateDevice(
            None,
            driver_type,
            None,
            flags,
            Some(levels),
            D3D11_SDK_VERSION,
            Some(&mut device),
            Some(&mut feature_level),
            Some(&mut context),
        )
    };

    match created {
        Ok(()) => match (device, context) {
            (Some(device), Some(context)) => Ok(CreatedDevice {
                device,
                context,
                feature_level,
            }),
            _ => Err(AttemptError::Failed(windows::core::Error::from_hresult(
                E_FAIL,
            ))),
        },
        Err(e) if e.code() == E_INVALIDARG => Err(AttemptError::UnknownTopLevel(e)),
        Err(e) => Err(AttemptError::Failed(e)),
    }
}

impl D3d11Context {
    /// 创建窗口并完成整个设备初始化序列
    ///
    /// # 参数
    ///
    /// * `event_loop` - winit 事件循环引用，用于创建窗口
    /// * `config` - 配置，决定窗口参数和是否允许软件驱动回退
    ///
    /// # 返回值
    ///
    /// 完整的资源束；任何一步失败都返回对应的错误，已创建的资源自动释放
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        // 1. 创建窗口
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&config.window.title)
                .with_inner_size(LogicalSize::new(
                    config.window.width,
                    config.window.height,
                ))
                .with_resizable(config.window.resizable)
                .build(event_loop)
                .map_err(|e| {
                    FirstLightError::Initialization(format!("Failed to create window: {}", e))
                })?,
        );

        // 客户区的像素尺寸，作为交换链和视口的初始尺寸
        let size = window.inner_size();
        let (width, height) = (size.width, size.height);

        // 2. 取得 HWND（通过 raw_window_handle）
        let window_handle = window.window_handle().map_err(|e| {
            FirstLightError::Initialization(format!("Failed to get window handle: {}", e))
        })?;
        let hwnd = match window_handle.as_raw() {
            RawWindowHandle::Win32(handle) => {
                HWND(handle.hwnd.get() as *mut std::ffi::c_void)
            }
            _ => {
                return Err(FirstLightError::Initialization(
                    "Expected Win32 window handle on Windows platform".to_string(),
                ))
            }
        };

        // 3. 协商设备
        let mut flags = D3D11_CREATE_DEVICE_FLAG(0);
        if cfg!(debug_assertions) {
            flags |= D3D11_CREATE_DEVICE_DEBUG;
        }

        let drivers: &[DriverKind] = if config.graphics.software_fallback {
            &DRIVER_ORDER
        } else {
            &DRIVER_ORDER[..1]
        };

        let negotiated = fallback::negotiate(drivers, &FEATURE_LEVELS, |driver, levels| {
            create_device(driver_type_of(driver), flags, levels)
        })
        .map_err(|e| GraphicsError::DeviceCreation(e.message()))?;

        let driver = negotiated.driver;
        let CreatedDevice {
            device,
            context,
            feature_level,
        } = negotiated.value;

        info!(?driver, ?feature_level, "D3D11 device created");

        // 4. 从设备取得 DXGI 工厂（设备创建时没有指定适配器）
        let dxgi_factory: IDXGIFactory1 = unsafe {
            let dxgi_device: IDXGIDevice = device
                .cast()
                .map_err(|e| GraphicsError::FactoryAcquisition(e.message()))?;
            let adapter = dxgi_device
                .GetAdapter()
                .map_err(|e| GraphicsError::FactoryAcquisition(e.message()))?;
            adapter
                .GetParent()
                .map_err(|e| GraphicsError::FactoryAcquisition(e.message()))?
        };

        // 5. 创建交换链
        let (swap_chain, swap_chain1, device1, context1) =
            match dxgi_factory.cast::<IDXGIFactory2>() {
                Ok(factory2) => {
                    // DXGI 1.2+：per-window 路径。
                    // 顺带把设备 / 上下文升级到 11.1 接口，失败不致命。
                    let device1: Option<ID3D11Device1> = device.cast().ok();
                    let context1: Option<ID3D11DeviceContext1> = if device1.is_some() {
                        context.cast().ok()
                    } else {
                        None
                    };

                    let desc = DXGI_SWAP_CHAIN_DESC1 {
                        Width: width,
                        Height: height,
                        Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                        SampleDesc: DXGI_SAMPLE_DESC {
                            Count: 1,
                            Quality: 0,
                        },
                        BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                        BufferCount: 1,
                        ..Default::default()
                    };

                    let swap_chain1: IDXGISwapChain1 = unsafe {
                        factory2.CreateSwapChainForHwnd(&device, hwnd, &desc, None, None)
                    }
                    .map_err(|e| GraphicsError::SwapChainCreation(e.message()))?;

                    // 下游统一通过传统接口使用交换链
                    let swap_chain: IDXGISwapChain = swap_chain1
                        .cast()
                        .map_err(|e| GraphicsError::SwapChainCreation(e.message()))?;

                    #[cfg(debug_assertions)]
                    debug!(width, height, "Swap chain created (per-window path)");

                    (swap_chain, Some(swap_chain1), device1, context1)
                }
                Err(_) => {
                    // DXGI 1.1：传统单调用路径
                    let desc = DXGI_SWAP_CHAIN_DESC {
                        BufferDesc: DXGI_MODE_DESC {
                            Width: width,
                            Height: height,
                            RefreshRate: DXGI_RATIONAL {
                                Numerator: 60,
                                Denominator: 1,
                            },
                            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                            ..Default::default()
                        },
                        SampleDesc: DXGI_SAMPLE_DESC {
                            Count: 1,
                            Quality: 0,
                        },
                        BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                        BufferCount: 1,
                        OutputWindow: hwnd,
                        Windowed: true.into(),
                        ..Default::default()
                    };

                    let mut swap_chain = None;
                    unsafe { dxgi_factory.CreateSwapChain(&device, &desc, &mut swap_chain) }
                        .ok()
                        .map_err(|e| GraphicsError::SwapChainCreation(e.message()))?;
                    let swap_chain = swap_chain.ok_or_else(|| {
                        GraphicsError::SwapChainCreation(
                            "CreateSwapChain returned no swap chain".to_string(),
                        )
                    })?;

                    #[cfg(debug_assertions)]
                    debug!(width, height, "Swap chain created (legacy path)");

                    (swap_chain, None, None, None)
                }
            };

        // 关闭 DXGI 自带的 Alt+Enter 全屏切换（策略选择，失败不致命）
        if let Err(e) = unsafe { dxgi_factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER) } {
            warn!("Failed to disable Alt+Enter handling: {}", e);
        }

        let mut ctx = Self {
            rtv: None,
            swap_chain,
            swap_chain1,
            context,
            context1,
            device,
            device1,
            driver,
            feature_level,
            window,
            width,
            height,
        };

        // 6. 渲染目标视图 + 视口
        ctx.recreate_render_target(width, height)?;

        info!("D3D11 initialization complete");

        Ok(ctx)
    }

    /// 从交换链的 0 号后备缓冲重建渲染目标视图，绑定视图和视口
    ///
    /// 初始化和窗口尺寸变化时都会调用。调用 `ResizeBuffers` 前必须先把
    /// `rtv` 置空释放旧视图，否则后备缓冲仍被引用。
    pub fn recreate_render_target(&mut self, width: u32, height: u32) -> Result<()> {
        let rtv = unsafe {
            // 后备缓冲句柄离开作用域立即释放，视图持有自己的引用
            let back_buffer: ID3D11Texture2D = self
                .swap_chain
                .GetBuffer(0)
                .map_err(|e| GraphicsError::RenderTargetView(e.message()))?;

            let mut rtv = None;
            self.device
                .CreateRenderTargetView(&back_buffer, None, Some(&mut rtv))
                .map_err(|e| GraphicsError::RenderTargetView(e.message()))?;
            rtv.ok_or_else(|| {
                GraphicsError::RenderTargetView(
                    "CreateRenderTargetView returned no view".to_string(),
                )
            })?
        };

        unsafe {
            // 绑定为唯一的颜色目标，这个脚手架没有深度 / 模板目标
            self.context
                .OMSetRenderTargets(Some(&[Some(rtv.clone())]), None);
            self.context.RSSetViewports(Some(&[viewport(width, height)]));
        }

        self.rtv = Some(rtv);
        self.width = width;
        self.height = height;
        Ok(())
    }
}

impl Drop for D3d11Context {
    fn drop(&mut self) {
        // 先清掉管线上绑定的状态，让视图不再被管线引用；
        // 之后字段按声明顺序释放：视图 → 交换链 → 上下文 → 设备
        unsafe { self.context.ClearState() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_covers_client_area() {
        let vp = viewport(1280, 720);
        assert_eq!(vp.TopLeftX, 0.0);
        assert_eq!(vp.TopLeftY, 0.0);
        assert_eq!(vp.Width, 1280.0);
        assert_eq!(vp.Height, 720.0);
        assert_eq!(vp.MinDepth, 0.0);
        assert_eq!(vp.MaxDepth, 1.0);
    }

    #[test]
    fn test_feature_levels_newest_first() {
        assert_eq!(FEATURE_LEVELS[0], D3D_FEATURE_LEVEL_11_1);
        assert!(FEATURE_LEVELS.windows(2).all(|w| w[0].0 > w[1].0));
    }
}
