//! 节拍放大的图片

use std::sync::Arc;

use image::RgbaImage;

use crate::effects::simulate_heavy_load;
use crate::render::Surface;
use crate::show::{BeatEvent, Effect, EffectBase};

/// 缩放回弹帧数
const ZOOM_FRAMES: u32 = 3;

/// 图片：每拍放大到 `zoom_scale`，随后在 3 帧内回到 `scale`
#[derive(Clone, Debug)]
pub struct ZoomSprite {
    /// 位置与优先级
    base: EffectBase,
    /// 原始图片
    image: Arc<RgbaImage>,
    /// 常态缩放
    scale: f32,
    /// 节拍时缩放
    zoom_scale: f32,
    /// 当前缩放
    current_scale: f32,
    /// 剩余回弹帧
    zoom_frame: u32,
    /// 高负载模拟
    heavy_load: bool,
}

impl ZoomSprite {
    /// 创建
    #[must_use]
    pub fn new(base: EffectBase, image: Arc<RgbaImage>, scale: f32, zoom_scale: f32) -> Self {
        Self {
            base,
            image,
            scale,
            zoom_scale,
            current_scale: scale,
            zoom_frame: 0,
            heavy_load: false,
        }
    }

    /// 当前缩放
    #[must_use]
    pub const fn current_scale(&self) -> f32 {
        self.current_scale
    }
}

impl Effect for ZoomSprite {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn update(&mut self) {
        simulate_heavy_load(self.heavy_load);
        if self.zoom_frame > 0 {
            let progress = 1.0 - self.zoom_frame as f32 / ZOOM_FRAMES as f32;
            self.current_scale = self.zoom_scale + (self.scale - self.zoom_scale) * progress;
            self.zoom_frame -= 1;
        } else {
            self.current_scale = self.scale;
        }
    }

    fn on_beat(&mut self, _event: BeatEvent) {
        self.zoom_frame = ZOOM_FRAMES;
        self.current_scale = self.zoom_scale;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(&self.image, self.base.position, self.current_scale);
    }

    fn set_heavy_load(&mut self, enabled: bool) {
        self.heavy_load = enabled;
    }
}
