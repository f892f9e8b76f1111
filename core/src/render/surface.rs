//! 绘制接口

use image::{Rgba as Pixel, RgbaImage, imageops};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut},
    rect::Rect,
};

use crate::media::image::scale_image;

/// RGBA 颜色
pub type Rgba = [u8; 4];

/// 效果与叠加层使用的绘制接口（坐标单位为像素）
pub trait Surface {
    /// 画面尺寸（宽, 高）
    fn size(&self) -> (u32, u32);

    /// 以纯色填充整个画面
    fn clear(&mut self, color: Rgba);

    /// 实心圆
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba);

    /// 空心圆环
    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, thickness: u32, color: Rgba);

    /// 实心矩形（左上角坐标）
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba);

    /// 以中心坐标和缩放比例绘制图片（按透明度混合）
    fn blit(&mut self, image: &RgbaImage, center: (f32, f32), scale: f32);
}

/// 基于 `RgbaImage` 的画布
#[derive(Clone, Debug)]
pub struct Canvas {
    /// 像素缓冲
    image: RgbaImage,
}

impl Canvas {
    /// 创建指定尺寸的透明画布
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    /// 当前像素缓冲
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// 取出像素缓冲
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self, color: Rgba) {
        for p in self.image.pixels_mut() {
            *p = Pixel(color);
        }
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        if radius < 1.0 {
            return;
        }
        draw_filled_circle_mut(
            &mut self.image,
            (center.0 as i32, center.1 as i32),
            radius as i32,
            Pixel(color),
        );
    }

    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, thickness: u32, color: Rgba) {
        let c = (center.0 as i32, center.1 as i32);
        let r = radius as i32;
        for i in 0..thickness as i32 {
            if r - i < 1 {
                break;
            }
            draw_hollow_circle_mut(&mut self.image, c, r - i, Pixel(color));
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        if width == 0 || height == 0 {
            return;
        }
        draw_filled_rect_mut(
            &mut self.image,
            Rect::at(x, y).of_size(width, height),
            Pixel(color),
        );
    }

    fn blit(&mut self, image: &RgbaImage, center: (f32, f32), scale: f32) {
        let place = |img: &RgbaImage| {
            let x = center.0 as i64 - i64::from(img.width() / 2);
            let y = center.1 as i64 - i64::from(img.height() / 2);
            (x, y)
        };
        if (scale - 1.0).abs() < f32::EPSILON {
            let (x, y) = place(image);
            imageops::overlay(&mut self.image, image, x, y);
        } else {
            let scaled = scale_image(image, scale);
            let (x, y) = place(&scaled);
            imageops::overlay(&mut self.image, &scaled, x, y);
        }
    }
}

/// 一次被记录的绘制调用
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// 清屏
    Clear(Rgba),
    /// 实心圆
    FillCircle {
        /// 圆心
        center: (f32, f32),
        /// 半径
        radius: f32,
        /// 颜色
        color: Rgba,
    },
    /// 圆环
    StrokeCircle {
        /// 圆心
        center: (f32, f32),
        /// 半径
        radius: f32,
        /// 颜色
        color: Rgba,
    },
    /// 矩形
    FillRect {
        /// 左上角 x
        x: i32,
        /// 左上角 y
        y: i32,
        /// 颜色
        color: Rgba,
    },
    /// 图片
    Blit {
        /// 图片尺寸
        size: (u32, u32),
        /// 中心坐标
        center: (f32, f32),
        /// 缩放比例
        scale: f32,
    },
}

/// 只记录调用顺序、不产生像素的画面
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    /// 画面尺寸
    size: (u32, u32),
    /// 按顺序记录的调用
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// 创建指定尺寸的记录画面
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            calls: Vec::new(),
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self, color: Rgba) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        self.calls.push(DrawCall::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: (f32, f32), radius: f32, _thickness: u32, color: Rgba) {
        self.calls.push(DrawCall::StrokeCircle {
            center,
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, x: i32, y: i32, _width: u32, _height: u32, color: Rgba) {
        self.calls.push(DrawCall::FillRect { x, y, color });
    }

    fn blit(&mut self, image: &RgbaImage, center: (f32, f32), scale: f32) {
        self.calls.push(DrawCall::Blit {
            size: image.dimensions(),
            center,
            scale,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_draws_pixels() {
        let mut canvas = Canvas::new(40, 40);
        canvas.clear([0, 0, 50, 255]);
        canvas.fill_circle((20.0, 20.0), 5.0, [255, 0, 0, 255]);
        canvas.fill_rect(0, 0, 2, 2, [0, 255, 0, 255]);
        assert_eq!(canvas.image().get_pixel(20, 20).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(1, 1).0, [0, 255, 0, 255]);
        assert_eq!(canvas.image().get_pixel(39, 0).0, [0, 0, 50, 255]);
    }

    #[test]
    fn test_blit_centers_and_clips() {
        let mut canvas = Canvas::new(10, 10);
        let sprite = RgbaImage::from_pixel(4, 4, Pixel([9, 9, 9, 255]));
        canvas.blit(&sprite, (5.0, 5.0), 1.0);
        assert_eq!(canvas.image().get_pixel(3, 3).0, [9, 9, 9, 255]);
        assert_eq!(canvas.image().get_pixel(7, 7).0, [0, 0, 0, 0]);
        canvas.blit(&sprite, (0.0, 0.0), 2.0);
        assert_eq!(canvas.image().get_pixel(0, 0).0, [9, 9, 9, 255]);
    }

    #[test]
    fn test_zero_sized_rect_is_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(0, 0, 0, 3, [1, 1, 1, 255]);
        assert_eq!(canvas.image().get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
