//! winit 窗口与事件循环入口

#![cfg(not(target_arch = "wasm32"))]
use std::{
    collections::HashMap,
    sync::{Arc, mpsc},
};

use anyhow::Result;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use beat_show::entry::VisualApp;
use beat_show::loops::{ControlMsg, KeyState, RawInputMsg, RawKeyCode, VisualMsg, visual};

use crate::WindowOptions;

/// 视觉应用状态
struct App {
    /// 窗口实例
    window: Arc<Window>,
    /// 视觉渲染应用
    app: VisualApp,
}

/// 视觉事件处理器
struct Handler {
    /// 窗口参数
    options: WindowOptions,
    /// 可选的视觉应用状态
    app: Option<App>,
    /// 视觉消息接收端
    visual_rx: Option<mpsc::Receiver<VisualMsg>>,
    /// 控制消息发送端
    control_tx: mpsc::SyncSender<ControlMsg>,
    /// 输入消息发送端
    input_tx: mpsc::SyncSender<RawInputMsg>,
    /// 需要转发的按键及其配置字符串
    key_map: HashMap<KeyCode, String>,
}

impl Handler {
    /// 创建视觉事件处理器并建立键位映射
    fn new(
        options: WindowOptions,
        visual_rx: mpsc::Receiver<VisualMsg>,
        control_tx: mpsc::SyncSender<ControlMsg>,
        input_tx: mpsc::SyncSender<RawInputMsg>,
        key_codes: Vec<(KeyCode, String)>,
    ) -> Self {
        Self {
            options,
            app: None,
            visual_rx: Some(visual_rx),
            control_tx,
            input_tx,
            key_map: key_codes.into_iter().collect(),
        }
    }

    /// 创建窗口与渲染器
    fn create_app(&mut self, event_loop: &ActiveEventLoop) -> Result<Option<App>> {
        let (width, height) = self.options.size;
        let attrs = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(LogicalSize::new(f64::from(width), f64::from(height)));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        let ctx = visual::gpu::init_gpu(window.clone(), (size.width, size.height))?;
        let renderer = visual::Renderer::new(ctx)?;
        let Some(rx) = self.visual_rx.take() else {
            return Ok(None);
        };
        Ok(Some(App {
            window,
            app: VisualApp::new(renderer, rx),
        }))
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match self.create_app(event_loop) {
            Ok(Some(app)) => {
                self.app = Some(app);
                let _ = self.control_tx.try_send(ControlMsg::Start);
                info!("窗口已就绪");
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "初始化窗口失败");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(app) = self.app.as_mut() {
                    app.app.resize(size.width, size.height);
                    app.window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let code = match event.physical_key {
                    PhysicalKey::Code(code) => self.key_map.get(&code).cloned(),
                    PhysicalKey::Unidentified(_) => None,
                };
                if let Some(code) = code {
                    let state = match event.state {
                        ElementState::Pressed => KeyState::Pressed,
                        ElementState::Released => KeyState::Released,
                    };
                    let _ = self.input_tx.try_send(RawInputMsg::Key {
                        code: RawKeyCode(code),
                        state,
                    });
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(app) = self.app.as_mut() {
                    app.app.redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = self.app.as_mut() {
            app.window.request_redraw();
        }
    }
}

/// 运行 winit 事件循环并驱动渲染与输入转发（内部实现）
pub fn run_internal(
    options: WindowOptions,
    visual_rx: mpsc::Receiver<VisualMsg>,
    control_tx: mpsc::SyncSender<ControlMsg>,
    input_tx: mpsc::SyncSender<RawInputMsg>,
    key_codes: Vec<(KeyCode, String)>,
) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut handler = Handler::new(options, visual_rx, control_tx, input_tx, key_codes);
    event_loop.run_app(&mut handler)?;
    Ok(())
}
