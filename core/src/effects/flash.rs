//! 节拍闪色的圆

use crate::render::{Rgba, Surface};
use crate::show::{BeatEvent, Effect, EffectBase};

/// 闪色衰减帧数
const FLASH_FRAMES: u32 = 5;

/// 实心圆：每拍变为闪色，随后在 5 帧内线性回到基色
#[derive(Clone, Debug)]
pub struct FlashCircle {
    /// 位置与优先级
    base: EffectBase,
    /// 半径
    radius: f32,
    /// 基色
    color: Rgba,
    /// 闪色
    flash_color: Rgba,
    /// 当前颜色
    current: Rgba,
    /// 剩余衰减帧
    flash_frame: u32,
}

impl FlashCircle {
    /// 创建
    #[must_use]
    pub const fn new(base: EffectBase, radius: f32, color: Rgba, flash_color: Rgba) -> Self {
        Self {
            base,
            radius,
            color,
            flash_color,
            current: color,
            flash_frame: 0,
        }
    }

    /// 当前颜色
    #[must_use]
    pub const fn current_color(&self) -> Rgba {
        self.current
    }
}

/// 线性插值：`t = 0` 为 `from`，`t = 1` 为 `to`
fn blend(from: Rgba, to: Rgba, t: f32) -> Rgba {
    let mut out = [0; 4];
    for ((o, a), b) in out.iter_mut().zip(from).zip(to) {
        let (a, b) = (f32::from(a), f32::from(b));
        *o = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
    }
    out
}

impl Effect for FlashCircle {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn update(&mut self) {
        if self.flash_frame > 0 {
            let progress = 1.0 - self.flash_frame as f32 / FLASH_FRAMES as f32;
            self.current = blend(self.flash_color, self.color, progress);
            self.flash_frame -= 1;
        } else {
            self.current = self.color;
        }
    }

    fn on_beat(&mut self, _event: BeatEvent) {
        self.flash_frame = FLASH_FRAMES;
        self.current = self.flash_color;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_circle(self.base.position, self.radius, self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = [255, 255, 255, 255];
    const BLACK: Rgba = [0, 0, 0, 255];

    #[test]
    fn test_flash_decays_back_to_base() {
        let mut flash = FlashCircle::new(EffectBase::new(0.0, 0.0, 0), 10.0, BLACK, WHITE);
        flash.on_beat(BeatEvent {
            beat: 0,
            beat_in_measure: 0,
        });
        assert_eq!(flash.current_color(), WHITE);

        let mut reds = Vec::new();
        for _ in 0..6 {
            flash.update();
            reds.push(flash.current_color()[0]);
        }
        assert_eq!(reds, vec![255, 204, 153, 102, 51, 0]);
        assert!(reds.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_blend_mixes_each_channel() {
        let from = [0, 100, 200, 255];
        let to = [255, 0, 200, 0];
        assert_eq!(blend(from, to, 0.0), from);
        assert_eq!(blend(from, to, 1.0), to);
        assert_eq!(blend(from, to, 0.5), [128, 50, 200, 128]);
    }

    #[test]
    fn test_idle_flash_keeps_base_color() {
        let mut flash = FlashCircle::new(EffectBase::new(5.0, 5.0, 3), 10.0, BLACK, WHITE);
        flash.update();
        assert_eq!(flash.current_color(), BLACK);
        assert_eq!(flash.priority(), 3);
        assert_eq!(flash.position(), (5.0, 5.0));
    }
}
