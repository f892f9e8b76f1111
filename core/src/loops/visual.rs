//! 视觉循环：事件线程上的渲染
//!
//! - 帧循环在 CPU 上绘制完整画面，通过通道发送到事件线程
//! - 渲染器把最新一帧上传为纹理，按宽高比缩放后绘制为一个四边形

pub mod gpu;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::Instance;

#[repr(C)]
#[derive(Clone, Copy, Zeroable, Pod)]
/// 屏幕统一参数
struct ScreenUniform {
    /// 屏幕尺寸（宽, 高）
    size: [f32; 2],
}

/// 已上传的画面纹理
struct FrameTexture {
    /// 纹理
    texture: wgpu::Texture,
    /// 纹理绑定组
    bind_group: wgpu::BindGroup,
    /// 纹理尺寸
    size: (u32, u32),
}

/// 按宽高比把画面缩放到窗口内（居中、留黑边）
#[must_use]
pub fn fit_instance(frame: (u32, u32), window: (u32, u32)) -> Instance {
    let (fw, fh) = (frame.0.max(1) as f32, frame.1.max(1) as f32);
    let (ww, wh) = (window.0 as f32, window.1 as f32);
    let scale = (ww / fw).min(wh / fh);
    Instance::new([0.0, 0.0], [fw * scale, fh * scale], [1.0, 1.0, 1.0, 1.0])
}

/// 缩放后不足一个像素（如窗口最小化）时不绘制
fn visible(instance: &Instance) -> bool {
    instance.size().iter().all(|&d| d >= 1.0)
}

/// 画面纹理渲染器
pub struct Renderer {
    /// 渲染表面
    surface: wgpu::Surface<'static>,
    /// 图形设备
    device: wgpu::Device,
    /// 命令队列
    queue: wgpu::Queue,
    /// 渲染表面配置
    config: wgpu::SurfaceConfiguration,
    /// 渲染管线
    pipeline: wgpu::RenderPipeline,
    /// 绑定组布局
    bind_group_layout: wgpu::BindGroupLayout,
    /// 纹理采样器
    sampler: wgpu::Sampler,
    /// 屏幕统一缓冲
    screen_buffer: wgpu::Buffer,
    /// 四边形顶点缓冲
    quad_vb: wgpu::Buffer,
    /// 索引缓冲
    idx_buf: wgpu::Buffer,
    /// 实例缓冲
    instance_buf: wgpu::Buffer,
    /// 当前画面纹理
    frame: Option<FrameTexture>,
    /// 三角形索引数量
    index_count: u32,
}

impl Renderer {
    /// 创建渲染器并初始化管线与缓冲
    ///
    /// # Errors
    ///
    /// 当前实现不会失败，保留 `Result` 以便将来扩展资源加载
    pub fn new(ctx: gpu::GpuContext) -> Result<Self> {
        let gpu::GpuContext {
            surface,
            device,
            queue,
            config,
        } = ctx;
        let format = config.format;
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("frame-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../frame.wgsl").into()),
        });
        let screen_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("screen-uniform"),
            size: std::mem::size_of::<ScreenUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("frame-pl"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("frame-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Instance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 0,
                                shader_location: 1,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 8,
                                shader_location: 2,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x4,
                                offset: 16,
                                shader_location: 3,
                            },
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        let quad_vertices: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad-vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];
        let idx_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad-ib"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance-buf"),
            size: std::mem::size_of::<Instance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..wgpu::SamplerDescriptor::default()
        });
        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            sampler,
            screen_buffer,
            quad_vb,
            idx_buf,
            instance_buf,
            frame: None,
            index_count: 6,
        })
    }

    /// 处理窗口尺寸变化
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// 尺寸变化时重建画面纹理及其绑定组
    fn ensure_texture(&mut self, size: (u32, u32)) {
        if self.frame.as_ref().is_none_or(|f| f.size != size) {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("frame-texture"),
                size: wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("frame-bg"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.screen_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.frame = Some(FrameTexture {
                texture,
                bind_group,
                size,
            });
        }
    }

    /// 上传一帧画面（RGBA8，sRGB）
    pub fn upload_frame(&mut self, image: &RgbaImage) {
        let size = image.dimensions();
        if size.0 == 0 || size.1 == 0 {
            return;
        }
        self.ensure_texture(size);
        let Some(frame) = &self.frame else {
            return;
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.0),
                rows_per_image: Some(size.1),
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// 绘制最近上传的画面
    ///
    /// # Errors
    ///
    /// 无法获取表面纹理（如窗口最小化或表面失效）
    pub fn draw(&self) -> Result<()> {
        let window = (self.config.width, self.config.height);
        let uni = ScreenUniform {
            size: [window.0 as f32, window.1 as f32],
        };
        self.queue
            .write_buffer(&self.screen_buffer, 0, bytemuck::bytes_of(&uni));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            let fitted = self
                .frame
                .as_ref()
                .map(|tex| (tex, fit_instance(tex.size, window)));
            if let Some((tex, instance)) = fitted
                && visible(&instance)
            {
                self.queue
                    .write_buffer(&self.instance_buf, 0, bytemuck::bytes_of(&instance));
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &tex.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, self.instance_buf.slice(..));
                rpass.set_index_buffer(self.idx_buf.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_instance_letterboxes() {
        let wide = fit_instance((800, 600), (1600, 900));
        assert_eq!(wide.size(), [1200.0, 900.0]);
        let tall = fit_instance((800, 600), (400, 1000));
        assert_eq!(tall.size(), [400.0, 300.0]);
    }

    #[test]
    fn test_minimized_window_is_not_drawn() {
        assert!(visible(&fit_instance((800, 600), (1600, 900))));
        assert!(!visible(&fit_instance((800, 600), (0, 0))));
        assert!(!visible(&fit_instance((800, 600), (1000, 0))));
    }
}
