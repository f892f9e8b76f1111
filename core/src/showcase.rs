//! 演示节目
//!
//! 用资源中的星星图片搭建默认的场景序列。坐标以 800×600 为基准，
//! 按实际画面尺寸等比换算。

use std::f32::consts::TAU;

use tracing::info;

use crate::ShowError;
use crate::effects::{EdgeMode, FlashCircle, MeasureImage, Mover, ZoomSprite};
use crate::media::ImageStore;
use crate::render::Rgba;
use crate::show::{EffectBase, Scene};

/// 坐标基准宽度
const BASE_WIDTH: f32 = 800.0;
/// 坐标基准高度
const BASE_HEIGHT: f32 = 600.0;

/// 闪光圆的配色
const PALETTE: [Rgba; 5] = [
    [255, 100, 100, 255],
    [100, 255, 100, 255],
    [100, 100, 255, 255],
    [255, 255, 100, 255],
    [255, 100, 255, 255],
];

/// 白色
const WHITE: Rgba = [255, 255, 255, 255];

/// 基准坐标到画面坐标
#[derive(Clone, Copy, Debug)]
struct Layout {
    /// 横向比例
    sx: f32,
    /// 纵向比例
    sy: f32,
}

impl Layout {
    const fn new(screen: (u32, u32)) -> Self {
        Self {
            sx: screen.0 as f32 / BASE_WIDTH,
            sy: screen.1 as f32 / BASE_HEIGHT,
        }
    }

    const fn base(self, x: f32, y: f32, priority: i32) -> EffectBase {
        EffectBase::new(x * self.sx, y * self.sy, priority)
    }
}

/// 搭建完整的演示节目
///
/// # Errors
///
/// 必需图片（`star_1`）无法加载或解码
pub fn build_show(store: &mut ImageStore, screen: (u32, u32)) -> Result<Vec<Scene>, ShowError> {
    let layout = Layout::new(screen);
    let scenes = vec![
        star_zoom_scene(store, layout)?,
        colorful_flash_scene(layout),
        mixed_scene(store, layout)?,
        colorful_flash_scene(layout),
        marching_scene(store, layout, screen)?,
    ];
    info!(scenes = scenes.len(), "演示节目已搭建");
    Ok(scenes)
}

/// 中央一颗大星，四角四颗小星
fn star_zoom_scene(store: &mut ImageStore, layout: Layout) -> Result<Scene, ShowError> {
    let mut scene = Scene::timed("Star Zoom Scene", 8);
    let star = store.load("star_1")?;
    scene.add(ZoomSprite::new(layout.base(400.0, 300.0, 1), star, 1.0, 1.5));
    let corner_key = store.first_available(&["star_2", "star_1"]).unwrap_or("star_1");
    let corner = store.load(corner_key)?;
    for (x, y) in [(200.0, 150.0), (600.0, 150.0), (200.0, 450.0), (600.0, 450.0)] {
        scene.add(ZoomSprite::new(layout.base(x, y, 0), corner.clone(), 0.8, 1.3));
    }
    Ok(scene)
}

/// 六个彩色闪光圆，上方中间的圆优先级为 2
fn colorful_flash_scene(layout: Layout) -> Scene {
    let mut scene = Scene::timed("Colorful Flash Scene", 8);
    let positions = [
        (150.0, 200.0),
        (400.0, 150.0),
        (650.0, 200.0),
        (200.0, 350.0),
        (600.0, 350.0),
        (400.0, 450.0),
    ];
    let colors = PALETTE.into_iter().cycle();
    for (i, ((x, y), color)) in positions.into_iter().zip(colors).enumerate() {
        let priority = if i == 1 { 2 } else { i as i32 };
        scene.add(FlashCircle::new(layout.base(x, y, priority), 40.0, color, WHITE));
    }
    scene
}

/// 中央大闪光圆，外圈八颗小星
fn mixed_scene(store: &mut ImageStore, layout: Layout) -> Result<Scene, ShowError> {
    let mut scene = Scene::timed("Mixed Effects Scene", 16);
    scene.add(FlashCircle::new(
        layout.base(400.0, 300.0, 0),
        80.0,
        [50, 50, 200, 255],
        [255, 255, 0, 255],
    ));
    let star = store.load("star_1")?;
    for step in 0..8 {
        let angle = step as f32 * TAU / 8.0;
        let x = (400.0 + 150.0 * angle.cos()).trunc();
        let y = (300.0 + 150.0 * angle.sin()).trunc();
        scene.add(ZoomSprite::new(layout.base(x, y, 1), star.clone(), 0.4, 0.8));
    }
    Ok(scene)
}

/// 手动场景：横穿画面的星星队列与按小节换图的中央星
fn marching_scene(
    store: &mut ImageStore,
    layout: Layout,
    screen: (u32, u32),
) -> Result<Scene, ShowError> {
    let mut scene = Scene::manual("Marching Stars");
    let keys = ["star_1", "star_2", "star_3", "star_4"];
    let mut frames = Vec::new();
    for key in keys {
        if store.contains(key) {
            frames.push(store.scaled(key, 0.5)?);
        }
    }
    if frames.is_empty() {
        frames.push(store.scaled("star_1", 0.5)?);
    }
    scene.add(Mover::new(
        layout.base(0.0, 500.0, 0),
        frames.clone(),
        (3.0, 0.0),
        screen,
        EdgeMode::Wrap,
    )?);
    scene.add(Mover::new(
        layout.base(400.0, 100.0, 0),
        frames,
        (2.0, 1.5),
        screen,
        EdgeMode::Bounce,
    )?);

    let default_image = store.load("star_1")?;
    let mut beat_images = Vec::with_capacity(keys.len());
    for key in keys {
        beat_images.push(if store.contains(key) {
            Some(store.load(key)?)
        } else {
            None
        });
    }
    scene.add(MeasureImage::new(
        layout.base(400.0, 300.0, 1),
        default_image,
        beat_images,
    ));
    Ok(scene)
}
