//! 程序入口模块

use std::sync::mpsc;

use image::RgbaImage;
use tracing::warn;

use crate::loops::{VisualMsg, visual};

/// 视觉应用：接收帧循环产出的画面并交给渲染器
pub struct VisualApp {
    /// 绑定到窗口表面的渲染器
    window_renderer: visual::Renderer,
    /// 视觉消息接收端
    visual_rx: mpsc::Receiver<VisualMsg>,
    /// 尚未上传的最新画面
    pending: Option<RgbaImage>,
}

impl VisualApp {
    /// 创建视觉应用
    #[must_use]
    pub const fn new(
        window_renderer: visual::Renderer,
        visual_rx: mpsc::Receiver<VisualMsg>,
    ) -> Self {
        Self {
            window_renderer,
            visual_rx,
            pending: None,
        }
    }

    /// 处理窗口大小变化
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window_renderer.resize(width, height);
    }

    /// 执行一次渲染：只保留最新一帧，上传后绘制
    pub fn redraw(&mut self) {
        while let Ok(msg) = self.visual_rx.try_recv() {
            match msg {
                VisualMsg::Frame(image) => self.pending = Some(image),
            }
        }
        if let Some(image) = self.pending.take() {
            self.window_renderer.upload_frame(&image);
        }
        if let Err(e) = self.window_renderer.draw() {
            warn!(error = %e, "绘制失败");
        }
    }
}
