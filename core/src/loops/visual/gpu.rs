//! GPU 初始化
//!
//! 创建 wgpu 实例、设备与队列，并选择表面格式

use std::sync::Arc;

use anyhow::{Context, Result};
use futures_lite::future;
use tracing::info;

/// GPU 初始化结果
pub struct GpuContext {
    /// wgpu 表面
    pub surface: wgpu::Surface<'static>,
    /// GPU 设备
    pub device: wgpu::Device,
    /// 命令队列
    pub queue: wgpu::Queue,
    /// 表面配置
    pub config: wgpu::SurfaceConfiguration,
}

/// 从表面能力中挑选格式：优先 sRGB，否则取第一个
#[must_use]
pub fn pick_format(formats: &[wgpu::TextureFormat]) -> wgpu::TextureFormat {
    formats
        .iter()
        .copied()
        .find(wgpu::TextureFormat::is_srgb)
        .or_else(|| formats.first().copied())
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
}

/// 初始化 GPU 上下文
///
/// # Errors
///
/// - 表面创建失败
/// - 适配器请求失败
/// - 设备创建失败
pub fn init_gpu<W>(window: Arc<W>, size: (u32, u32)) -> Result<GpuContext>
where
    W: wgpu::WindowHandle + 'static,
{
    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(window)
        .context("创建渲染表面失败")?;

    let adapter = future::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        force_fallback_adapter: false,
        compatible_surface: Some(&surface),
    }))
    .context("请求图形适配器失败")?;
    let adapter_info = adapter.get_info();
    info!(
        name = %adapter_info.name,
        backend = ?adapter_info.backend,
        "图形适配器已就绪"
    );

    let (device, queue) = future::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        experimental_features: wgpu::ExperimentalFeatures::disabled(),
        memory_hints: wgpu::MemoryHints::default(),
        trace: wgpu::Trace::Off,
        label: Some("beat-show-device"),
    }))
    .context("创建图形设备失败")?;

    let caps = surface.get_capabilities(&adapter);
    let format = pick_format(&caps.formats);
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Opaque);
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.0.max(1),
        height: size.1.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    info!(?format, width = config.width, height = config.height, "表面配置完成");

    Ok(GpuContext {
        surface,
        device,
        queue,
        config,
    })
}
