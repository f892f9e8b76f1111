//! 按小节内位置换图

use std::sync::Arc;

use image::RgbaImage;

use crate::effects::simulate_heavy_load;
use crate::render::Surface;
use crate::show::{BeatEvent, Effect, EffectBase};

/// 节拍图片显示帧数
const BEAT_FRAMES: u32 = 10;

/// 平时显示默认图片；每拍显示该拍在小节内位置对应的图片 10 帧
#[derive(Clone, Debug)]
pub struct MeasureImage {
    /// 位置与优先级
    base: EffectBase,
    /// 默认图片
    default_image: Arc<RgbaImage>,
    /// 小节内各拍的图片，缺失时使用默认图片
    beat_images: Vec<Option<Arc<RgbaImage>>>,
    /// 当前显示的拍位置；`None` 为默认图片
    showing: Option<usize>,
    /// 剩余显示帧
    beat_frame: u32,
    /// 高负载模拟
    heavy_load: bool,
}

impl MeasureImage {
    /// 创建
    #[must_use]
    pub fn new(
        base: EffectBase,
        default_image: Arc<RgbaImage>,
        beat_images: Vec<Option<Arc<RgbaImage>>>,
    ) -> Self {
        Self {
            base,
            default_image,
            beat_images,
            showing: None,
            beat_frame: 0,
            heavy_load: false,
        }
    }

    /// 替换某一拍的图片
    pub fn set_beat_image(&mut self, index: usize, image: Arc<RgbaImage>) {
        if self.beat_images.len() <= index {
            self.beat_images.resize(index + 1, None);
        }
        if let Some(slot) = self.beat_images.get_mut(index) {
            *slot = Some(image);
        }
    }

    /// 当前显示的图片
    #[must_use]
    pub fn current_image(&self) -> &Arc<RgbaImage> {
        self.showing
            .and_then(|i| self.beat_images.get(i))
            .and_then(Option::as_ref)
            .unwrap_or(&self.default_image)
    }
}

impl Effect for MeasureImage {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn update(&mut self) {
        simulate_heavy_load(self.heavy_load);
        if self.beat_frame > 0 {
            self.beat_frame -= 1;
            if self.beat_frame == 0 {
                self.showing = None;
            }
        }
    }

    fn on_beat(&mut self, event: BeatEvent) {
        self.showing = Some(event.beat_in_measure as usize);
        self.beat_frame = BEAT_FRAMES;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(self.current_image(), self.base.position, 1.0);
    }

    fn set_heavy_load(&mut self, enabled: bool) {
        self.heavy_load = enabled;
    }
}
