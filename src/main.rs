//! FirstLight - 最小化的 Direct3D 11 启动脚手架
//!
//! 应用程序入口：加载配置、初始化日志、创建渲染器并启动事件循环。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件（config.toml，不存在时用默认值）
//! cargo run
//!
//! # 命令行覆盖
//! cargo run -- --width 1920 --height 1080 --hardware-only
//! ```
//!
//! # 事件处理
//!
//! - `WindowEvent::CloseRequested`：用户关闭窗口，退出程序
//! - `WindowEvent::Resized`：窗口大小改变，重建渲染目标视图和视口
//! - `WindowEvent::RedrawRequested`：渲染一帧（清屏 + 呈现）
//! - `AboutToWait`：空闲时立刻请求下一帧

use first_light::core::{log, Config};
use tracing::{error, info};

fn main() {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");

    // 2. 应用命令行参数
    config.apply_args(std::env::args());

    // 3. 验证配置
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // 4. 初始化日志系统（使用配置中的设置）
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);

    info!("FirstLight starting...");
    info!(version = env!("CARGO_PKG_VERSION"), "Application initialized");
    info!(
        width = config.window.width,
        height = config.window.height,
        software_fallback = config.graphics.software_fallback,
        "Graphics configuration"
    );

    run(config);
}

#[cfg(target_os = "windows")]
fn run(config: Config) {
    use first_light::gfx::d3d11::Renderer;
    use tracing::debug;
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::EventLoop;

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };

    let mut renderer = match Renderer::new(&event_loop, &config) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to initialize renderer: {}", e);
            eprintln!("Failed to initialize renderer: {}", e);
            std::process::exit(1);
        }
    };

    info!("Renderer initialized successfully");
    info!("Entering main loop...");

    let result = event_loop.run(move |event, elwt| match event {
        // 窗口关闭事件
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => {
            info!("Close requested, shutting down...");
            elwt.exit();
        }
        // 窗口大小调整事件
        Event::WindowEvent {
            event: WindowEvent::Resized(new_size),
            ..
        } => {
            debug!(
                width = new_size.width,
                height = new_size.height,
                "Window resized"
            );
            if let Err(e) = renderer.resize() {
                error!("Resize failed: {}", e);
                eprintln!("Resize failed: {}", e);
                elwt.exit();
            }
        }
        // 渲染一帧
        Event::WindowEvent {
            event: WindowEvent::RedrawRequested,
            ..
        } => {
            if let Err(e) = renderer.draw() {
                error!("Draw failed: {}", e);
                eprintln!("Draw failed: {}", e);
                elwt.exit();
            }
        }
        // 空闲时立刻请求下一帧
        Event::AboutToWait => renderer.window().request_redraw(),
        // 忽略其他事件
        _ => (),
    });

    if let Err(e) = result {
        error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "windows"))]
fn run(_config: Config) {
    error!("The Direct3D 11 backend requires Windows");
    eprintln!("The Direct3D 11 backend requires Windows");
    std::process::exit(1);
}
