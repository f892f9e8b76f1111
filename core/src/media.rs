//! 媒体模块
//!
//! - `music`：基于 `rodio` 的背景音乐播放
//! - `image`：图片解码与缓存

pub mod image;
pub mod music;

use std::sync::{Arc, Mutex};

use anyhow::Result;

pub use self::image::ImageStore;
pub use self::music::MusicPlayer;

/// 节拍时钟轮询的媒体播放源
///
/// 帧循环每帧只读取一次，不接收来自媒体的推送事件。
pub trait MediaSource {
    /// 是否正在播放
    fn is_playing(&self) -> bool;

    /// 当前播放位置（毫秒）；位置未知时返回 `None`
    fn position_ms(&self) -> Option<u64>;

    /// 从头开始播放
    ///
    /// # Errors
    ///
    /// 媒体无法打开或解码时返回错误
    fn play(&mut self) -> Result<()>;

    /// 停止播放
    fn stop(&mut self);
}

/// 无音频设备时的占位播放源：从不播放，节拍完全由实时时钟驱动
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentMedia;

impl MediaSource for SilentMedia {
    fn is_playing(&self) -> bool {
        false
    }

    fn position_ms(&self) -> Option<u64> {
        None
    }

    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}

/// 脚本化播放源的共享状态
#[derive(Clone, Copy, Debug, Default)]
struct ScriptState {
    /// 是否在播放
    playing: bool,
    /// 报告的播放位置
    position: Option<u64>,
    /// `play` 被调用的次数
    plays: u32,
}

/// 由外部脚本设定状态的播放源（可克隆共享），用于测试与离线回放
///
/// `play` 只标记为播放中并累计次数，不会改写已设定的位置。
#[derive(Clone, Debug, Default)]
pub struct ScriptedMedia {
    /// 共享状态
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedMedia {
    /// 播放中且位置已知
    #[must_use]
    pub fn playing_at(position_ms: u64) -> Self {
        let media = Self::default();
        media.set_playing(true);
        media.set_position(Some(position_ms));
        media
    }

    /// 播放中但位置未知
    #[must_use]
    pub fn playing_unknown() -> Self {
        let media = Self::default();
        media.set_playing(true);
        media
    }

    /// 设定播放状态
    pub fn set_playing(&self, playing: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.playing = playing;
        }
    }

    /// 设定报告的播放位置
    pub fn set_position(&self, position_ms: Option<u64>) {
        if let Ok(mut state) = self.state.lock() {
            state.position = position_ms;
        }
    }

    /// `play` 被调用的次数
    #[must_use]
    pub fn play_count(&self) -> u32 {
        self.state.lock().map(|s| s.plays).unwrap_or(0)
    }
}

impl MediaSource for ScriptedMedia {
    fn is_playing(&self) -> bool {
        self.state.lock().map(|s| s.playing).unwrap_or(false)
    }

    fn position_ms(&self) -> Option<u64> {
        self.state.lock().ok()?.position
    }

    fn play(&mut self) -> Result<()> {
        if let Ok(mut state) = self.state.lock() {
            state.playing = true;
            state.plays += 1;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.playing = false;
        }
    }
}
