//! # Beat Show - winit 平台实现
//!
//! 提供 winit 窗口系统与事件循环的桌面平台实现

#![cfg(not(target_arch = "wasm32"))]

mod app;

use std::sync::mpsc;

use anyhow::Result;
use tracing::warn;
use winit::keyboard::KeyCode;

use beat_show::loops::{ControlMsg, RawInputMsg, VisualMsg};

/// 将配置文件中的按键代码字符串转换为 `winit::KeyCode`
///
/// 借助 `KeyCode` 的 serde 表示（如 `"Space"`、`"KeyH"`）。
fn parse_key_code(s: &str) -> Option<KeyCode> {
    serde_json::from_value::<KeyCode>(serde_json::Value::String(s.to_string())).ok()
}

/// 窗口参数
#[derive(Clone, Debug)]
pub struct WindowOptions {
    /// 窗口标题
    pub title: String,
    /// 初始逻辑尺寸
    pub size: (u32, u32),
}

/// 运行 winit 事件循环并驱动渲染与输入转发
///
/// `key_codes` 为配置中出现的按键代码字符串，只有这些按键会被转发。
///
/// # Errors
///
/// winit 事件循环创建或运行失败（无效的按键代码只会警告）
pub fn run<'a>(
    options: WindowOptions,
    visual_rx: mpsc::Receiver<VisualMsg>,
    control_tx: mpsc::SyncSender<ControlMsg>,
    input_tx: mpsc::SyncSender<RawInputMsg>,
    key_codes: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut forwarded = Vec::new();
    for code_str in key_codes {
        match parse_key_code(code_str) {
            Some(code) => forwarded.push((code, code_str.to_string())),
            None => warn!(code = code_str, "无效的按键代码"),
        }
    }
    app::run_internal(options, visual_rx, control_tx, input_tx, forwarded)
}
