//! 事件循环模块入口
//!
//! 提供三个子模块：
//! - `key_map`：按键映射模块
//! - `main_loop`：节拍推进与帧驱动循环
//! - `visual`：事件线程上的渲染

pub mod key_map;
pub mod main_loop;
pub mod visual;

use image::RgbaImage;

/// 控制主循环启动的消息
pub enum ControlMsg {
    /// 触发主循环开始
    Start,
}

/// 原始按键代码（平台无关表示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyCode(pub String);

/// 原始按键状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// 按键按下
    Pressed,
    /// 按键释放
    Released,
}

/// 原始输入消息（从 winit 传递到 core）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInputMsg {
    /// 键盘输入事件
    Key {
        /// 按键代码
        code: RawKeyCode,
        /// 按键状态
        state: KeyState,
    },
}

/// 播放控制命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 倒数后开始
    StartCountdown,
    /// 跳过倒数立即开始
    StartImmediately,
    /// 停止音乐
    Stop,
    /// 切换高负载模拟
    ToggleHeavyLoad,
}

/// 视觉循环消息
pub enum VisualMsg {
    /// 一帧完整画面
    Frame(RgbaImage),
}
