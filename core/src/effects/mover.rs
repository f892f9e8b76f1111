//! 匀速移动并逐拍换帧的图片

use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::ShowError;
use crate::effects::simulate_heavy_load;
use crate::render::Surface;
use crate::show::{BeatEvent, Effect, EffectBase};

/// 到达画面边缘时的处理方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeMode {
    /// 完全移出画面后从对侧重新进入
    #[default]
    Wrap,
    /// 碰到边缘后反弹
    Bounce,
}

/// 多帧移动图片
///
/// 每个新的绝对拍号切换到下一帧（同一拍号重复投递不会重复切换），
/// 每帧按固定速度移动。
#[derive(Clone, Debug)]
pub struct Mover {
    /// 位置与优先级
    base: EffectBase,
    /// 帧图片（已按需缩放）
    frames: Vec<Arc<RgbaImage>>,
    /// 当前帧下标
    index: usize,
    /// 速度（像素/帧）
    velocity: (f32, f32),
    /// 画面尺寸
    screen: (u32, u32),
    /// 边缘处理
    edge: EdgeMode,
    /// 上一次换帧的拍号
    last_beat: Option<u64>,
    /// 高负载模拟
    heavy_load: bool,
}

impl Mover {
    /// 创建
    ///
    /// # Errors
    ///
    /// `frames` 为空时返回 `ShowError::EmptyFrames`
    pub fn new(
        base: EffectBase,
        frames: Vec<Arc<RgbaImage>>,
        velocity: (f32, f32),
        screen: (u32, u32),
        edge: EdgeMode,
    ) -> Result<Self, ShowError> {
        if frames.is_empty() {
            return Err(ShowError::EmptyFrames { effect: "Mover" });
        }
        debug!(
            frames = frames.len(),
            vx = velocity.0,
            vy = velocity.1,
            "创建移动效果"
        );
        Ok(Self {
            base,
            frames,
            index: 0,
            velocity,
            screen,
            edge,
            last_beat: None,
            heavy_load: false,
        })
    }

    /// 设置速度
    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.velocity = (vx, vy);
    }

    /// 当前速度
    #[must_use]
    pub const fn velocity(&self) -> (f32, f32) {
        self.velocity
    }

    /// 设置位置
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.base.position = (x, y);
    }

    /// 追加一帧
    pub fn push_frame(&mut self, frame: Arc<RgbaImage>) {
        self.frames.push(frame);
    }

    /// 帧数
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// 当前帧下标
    #[must_use]
    pub const fn frame_index(&self) -> usize {
        self.index
    }

    /// 当前帧半宽、半高（整数像素）
    fn half_extent(&self) -> (f32, f32) {
        let (w, h) = self
            .frames
            .get(self.index)
            .map_or((0, 0), |frame| frame.dimensions());
        ((w / 2) as f32, (h / 2) as f32)
    }

    /// 完全移出画面后从对侧进入
    fn wrap(&mut self) {
        let (hw, hh) = self.half_extent();
        let (sw, sh) = (self.screen.0 as f32, self.screen.1 as f32);
        let (x, y) = &mut self.base.position;
        if *x > sw + hw {
            *x = -hw;
        } else if *x < -hw {
            *x = sw + hw;
        }
        if *y > sh + hh {
            *y = -hh;
        } else if *y < -hh {
            *y = sh + hh;
        }
    }

    /// 碰到边缘反弹
    fn bounce(&mut self) {
        let (hw, hh) = self.half_extent();
        let (sw, sh) = (self.screen.0 as f32, self.screen.1 as f32);
        let (x, y) = &mut self.base.position;
        let (vx, vy) = &mut self.velocity;
        if *x <= hw {
            *x = hw;
            *vx = vx.abs();
        } else if *x >= sw - hw {
            *x = sw - hw;
            *vx = -vx.abs();
        }
        if *y <= hh {
            *y = hh;
            *vy = vy.abs();
        } else if *y >= sh - hh {
            *y = sh - hh;
            *vy = -vy.abs();
        }
    }
}

impl Effect for Mover {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn update(&mut self) {
        simulate_heavy_load(self.heavy_load);
        self.base.position.0 += self.velocity.0;
        self.base.position.1 += self.velocity.1;
        match self.edge {
            EdgeMode::Wrap => self.wrap(),
            EdgeMode::Bounce => self.bounce(),
        }
    }

    fn on_beat(&mut self, event: BeatEvent) {
        if self.last_beat == Some(event.beat) {
            return;
        }
        self.last_beat = Some(event.beat);
        self.index = (self.index + 1) % self.frames.len();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if let Some(frame) = self.frames.get(self.index) {
            surface.blit(frame, self.base.position, 1.0);
        }
    }

    fn set_heavy_load(&mut self, enabled: bool) {
        self.heavy_load = enabled;
    }
}
