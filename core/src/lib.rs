//! Beat Show：按节拍驱动的场景序列与效果播放库

pub mod config;
pub mod effects;
pub mod entry;
pub mod error;
pub mod filesystem;
pub mod logging;
pub mod loops;
pub mod media;
pub mod render;
pub mod resources;
pub mod show;
pub mod showcase;
pub mod timing;

use bytemuck::{Pod, Zeroable};

pub use error::ShowError;

#[repr(C)]
#[derive(Clone, Copy, Debug, Zeroable, Pod)]
/// 单个矩形实例（位置、大小、颜色）
pub struct Instance {
    /// 中心坐标（x, y），以窗口中心为原点的像素坐标
    pos: [f32; 2],
    /// 尺寸（宽, 高），像素
    size: [f32; 2],
    /// 颜色（RGBA），与纹理采样结果相乘
    color: [f32; 4],
}

impl Instance {
    /// 创建实例
    #[must_use]
    pub const fn new(pos: [f32; 2], size: [f32; 2], color: [f32; 4]) -> Self {
        Self { pos, size, color }
    }

    /// 尺寸
    #[must_use]
    pub const fn size(&self) -> [f32; 2] {
        self.size
    }
}
