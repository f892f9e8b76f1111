//! 叠加层：背景、倒数画面、场景信息与 FPS

use crate::render::surface::{Rgba, Surface};
use crate::render::text::{draw_text, draw_text_centered};
use crate::timing::countdown::CountdownTick;

/// 背景色（深蓝）
pub const BACKGROUND: Rgba = [0, 0, 50, 255];
/// 倒数闪烁持续帧数
const FLASH_FRAMES: u32 = 10;
/// 倒数提示文字
const READY_TEXT: &str = "GET READY! MUSIC STARTS AFTER COUNTDOWN";
/// 场景信息颜色
const HUD_COLOR: Rgba = [255, 255, 255, 255];
/// FPS 文字颜色
const FPS_COLOR: Rgba = [255, 255, 0, 255];

/// 场景信息
#[derive(Clone, Debug, PartialEq)]
pub struct HudInfo<'a> {
    /// 场景序号（从 1 开始）
    pub number: usize,
    /// 场景总数
    pub total: usize,
    /// 场景名
    pub name: &'a str,
    /// 剩余拍数；不适用时为 `None`
    pub remaining: Option<u64>,
}

/// 叠加层动画状态
#[derive(Clone, Debug)]
pub struct Overlay {
    /// 画面宽度
    width: u32,
    /// 画面高度
    height: u32,
    /// 倒数闪烁剩余帧
    flash_frame: u32,
    /// 提示文字闪烁计数
    fade_frame: u32,
}

impl Overlay {
    /// 创建叠加层
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flash_frame: 0,
            fade_frame: 0,
        }
    }

    /// 根据本帧倒数结果推进动画
    pub fn observe_countdown(&mut self, tick: CountdownTick) {
        let CountdownTick::Counting { pulse, .. } = tick else {
            return;
        };
        if pulse {
            self.flash_frame = FLASH_FRAMES;
        }
        self.flash_frame = self.flash_frame.saturating_sub(1);
        self.fade_frame = self.fade_frame.wrapping_add(1);
    }

    /// 当前闪烁强度，范围 [1.0, 1.5]
    #[must_use]
    pub fn flash_intensity(&self) -> f32 {
        1.0 + (self.flash_frame as f32 / FLASH_FRAMES as f32) * 0.5
    }

    /// 提示文字亮度
    #[must_use]
    pub fn info_alpha(&self) -> u8 {
        (200.0 + 55.0 * (self.fade_frame as f32 * 0.1).sin()) as u8
    }

    /// 清屏为背景色
    pub fn draw_background(&self, surface: &mut dyn Surface) {
        surface.clear(BACKGROUND);
    }

    /// 倒数画面；剩余为 0 时不绘制
    pub fn draw_countdown(&self, surface: &mut dyn Surface, remaining: u64) {
        if remaining == 0 {
            return;
        }
        let center = (self.width as f32 / 2.0, self.height as f32 / 2.0);
        let k = self.flash_intensity();

        let ring = (100.0 * k) as u8;
        surface.stroke_circle(center, 120.0 * k, 3, [ring, ring, ring, 255]);

        let c = (255.0 * k).min(255.0) as u8;
        let px = (24.0 * k) as u32;
        draw_text_centered(surface, &remaining.to_string(), center, px, [c, c, c, 255]);

        let a = self.info_alpha();
        draw_text_centered(
            surface,
            READY_TEXT,
            (center.0, center.1 + 150.0),
            2,
            [a, a, a, 255],
        );
    }

    /// 场景信息
    pub fn draw_hud(&self, surface: &mut dyn Surface, info: &HudInfo<'_>) {
        let title = format!("SCENE {}/{} - {}", info.number, info.total, info.name);
        draw_text(surface, &title, (10, 50), 2, HUD_COLOR);
        if let Some(remaining) = info.remaining {
            let line = format!("REMAINING: {remaining} BEATS");
            draw_text(surface, &line, (10, 66), 2, HUD_COLOR);
        }
    }

    /// FPS 显示
    pub fn draw_fps(&self, surface: &mut dyn Surface, fps: f32) {
        draw_text(surface, &format!("FPS: {fps:.1}"), (10, 10), 3, FPS_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::{DrawCall, RecordingSurface};

    #[test]
    fn test_pulse_starts_flash_and_decays() {
        let mut overlay = Overlay::new(800, 600);
        overlay.observe_countdown(CountdownTick::Counting {
            remaining: 4,
            pulse: true,
        });
        assert!((overlay.flash_intensity() - 1.45).abs() < 1e-6);
        for _ in 0..20 {
            overlay.observe_countdown(CountdownTick::Counting {
                remaining: 4,
                pulse: false,
            });
        }
        assert!((overlay.flash_intensity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_countdown_draws_ring_first() {
        let overlay = Overlay::new(800, 600);
        let mut surface = RecordingSurface::new(800, 600);
        overlay.draw_countdown(&mut surface, 3);
        assert_eq!(
            surface.calls.first(),
            Some(&DrawCall::StrokeCircle {
                center: (400.0, 300.0),
                radius: 120.0,
                color: [100, 100, 100, 255]
            })
        );

        let mut empty = RecordingSurface::new(800, 600);
        overlay.draw_countdown(&mut empty, 0);
        assert!(empty.calls.is_empty());
    }

    #[test]
    fn test_hud_omits_remaining_when_not_applicable() {
        let overlay = Overlay::new(800, 600);
        let mut with = RecordingSurface::new(800, 600);
        overlay.draw_hud(
            &mut with,
            &HudInfo {
                number: 1,
                total: 2,
                name: "A",
                remaining: Some(3),
            },
        );
        let mut without = RecordingSurface::new(800, 600);
        overlay.draw_hud(
            &mut without,
            &HudInfo {
                number: 1,
                total: 2,
                name: "A",
                remaining: None,
            },
        );
        assert!(with.calls.len() > without.calls.len());
    }
}
