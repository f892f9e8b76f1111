//! 内置效果
//!
//! - `flash`：节拍闪色的圆
//! - `zoom`：节拍放大的图片
//! - `mover`：匀速移动并逐拍换帧的图片
//! - `measure_image`：按小节内位置换图

pub mod flash;
pub mod measure_image;
pub mod mover;
pub mod zoom;

use std::{thread, time::Duration};

pub use flash::FlashCircle;
pub use measure_image::MeasureImage;
pub use mover::{EdgeMode, Mover};
pub use zoom::ZoomSprite;

/// 高负载模拟时每帧额外耗时
const HEAVY_LOAD_DELAY: Duration = Duration::from_millis(10);

/// 高负载模拟：开启时阻塞当前线程 10ms
fn simulate_heavy_load(enabled: bool) {
    if enabled {
        thread::sleep(HEAVY_LOAD_DELAY);
    }
}
