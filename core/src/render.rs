//! 软件渲染
//!
//! - `surface`：绘制接口与基于 `image` 的画布实现
//! - `text`：3×5 点阵字体
//! - `overlay`：倒数、场景信息与 FPS 显示

pub mod overlay;
pub mod surface;
pub mod text;

pub use overlay::{HudInfo, Overlay};
pub use surface::{Canvas, DrawCall, RecordingSurface, Rgba, Surface};
