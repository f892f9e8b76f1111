//! 背景音乐播放
//!
//! - 打开默认音频输出流
//! - 一次性读入整首音乐，每次 `play` 新建一个 `Sink` 从头播放
//! - 播放位置取自 `Sink::get_pos`

use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use async_fs as afs;
use futures_lite::future;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{info, warn};

use crate::media::MediaSource;

/// 基于 `rodio` 的音乐播放器
pub struct MusicPlayer {
    /// 音频输出流（需在播放期间保持存活）
    stream: OutputStream,
    /// 当前播放槽
    sink: Option<Sink>,
    /// 音乐文件原始字节
    bytes: Arc<[u8]>,
    /// 音乐文件路径（仅用于日志）
    path: PathBuf,
}

impl MusicPlayer {
    /// 打开默认输出设备并读入音乐文件
    ///
    /// # Errors
    ///
    /// - 无可用的音频输出设备
    /// - 音乐文件无法读取
    pub fn open(path: &Path) -> Result<Self> {
        let stream = OutputStreamBuilder::open_default_stream()?;
        let bytes = future::block_on(afs::read(path))?;
        info!(path = %path.display(), bytes = bytes.len(), "已加载音乐");
        Ok(Self {
            stream,
            sink: None,
            bytes: Arc::from(bytes),
            path: path.to_path_buf(),
        })
    }

    /// 解码为可播放的音源
    fn decoder(&self) -> Result<Decoder<Cursor<Vec<u8>>>> {
        Ok(Decoder::new(Cursor::new(self.bytes.to_vec()))?)
    }
}

impl MediaSource for MusicPlayer {
    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.empty() && !sink.is_paused())
    }

    fn position_ms(&self) -> Option<u64> {
        let sink = self.sink.as_ref()?;
        if sink.empty() {
            return None;
        }
        u64::try_from(sink.get_pos().as_millis()).ok()
    }

    fn play(&mut self) -> Result<()> {
        self.stop();
        let source = self.decoder()?;
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        self.sink = Some(sink);
        info!(path = %self.path.display(), "音乐开始播放");
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            info!("音乐已停止");
        }
    }
}

/// 尝试打开音乐；失败时记录警告并返回 `None`
#[must_use]
pub fn open_or_warn(path: &Path) -> Option<MusicPlayer> {
    match MusicPlayer::open(path) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "无法打开音乐，改用实时时钟");
            None
        }
    }
}
