//! 节拍时钟
//!
//! 优先使用媒体播放位置换算拍号；媒体未就绪或位置未知时，回退到实时时钟。
//! 同一次读取只会使用其中一条路径。

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use gametime::{TimeSpan, TimeStamp};

use crate::media::MediaSource;
use crate::timing::Tempo;

/// 毫秒级单调时间来源
pub trait TimeSource {
    /// 当前时间（毫秒），单调不减
    fn now_ms(&self) -> u64;
}

/// 基于 `gametime` 的系统单调时钟，以创建时刻为零点
#[derive(Clone, Copy, Debug)]
pub struct SystemTimeSource {
    /// 零点时间戳
    origin: TimeStamp,
}

impl SystemTimeSource {
    /// 以当前时刻为零点创建时钟
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: TimeStamp::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        let elapsed = TimeStamp::now()
            .checked_elapsed_since(self.origin)
            .unwrap_or(TimeSpan::ZERO);
        let nanos = elapsed.as_nanos().max(0);
        u64::try_from(nanos).unwrap_or(u64::MAX) / 1_000_000
    }
}

/// 手动推进的时钟（可克隆共享），用于测试与离线回放
#[derive(Clone, Debug, Default)]
pub struct ManualTimeSource {
    /// 当前毫秒数
    now: Arc<AtomicU64>,
}

impl ManualTimeSource {
    /// 创建从 0 毫秒开始的时钟
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置当前时间
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::Release);
    }

    /// 前进指定毫秒
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::AcqRel);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

/// 本次拍号取自哪条时间路径
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeatSource {
    /// 媒体播放位置
    Media,
    /// 实时时钟回退
    WallClock,
}

/// 一次拍号读取结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatReading {
    /// 自参考零点起的拍号
    pub beat: u64,
    /// 所用时间路径
    pub source: BeatSource,
}

/// 节拍时钟状态
#[derive(Debug)]
pub struct BeatClock<T: TimeSource> {
    /// 时间来源
    time: T,
    /// 会话节奏
    tempo: Tempo,
    /// 实时时钟参考零点
    reference_start_ms: Option<u64>,
    /// 媒体是否已开始播放
    media_ready: bool,
    /// 媒体开始播放的时刻
    media_start_ms: Option<u64>,
}

impl<T: TimeSource> BeatClock<T> {
    /// 创建尚未启动的时钟
    #[must_use]
    pub fn new(time: T, tempo: &Tempo) -> Self {
        Self {
            time,
            tempo: *tempo,
            reference_start_ms: None,
            media_ready: false,
            media_start_ms: None,
        }
    }

    /// 时间来源的当前时刻
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.time.now_ms()
    }

    /// 媒体是否处于就绪状态
    #[must_use]
    pub const fn media_ready(&self) -> bool {
        self.media_ready
    }

    /// 实时时钟参考零点
    #[must_use]
    pub const fn reference_start_ms(&self) -> Option<u64> {
        self.reference_start_ms
    }

    /// 媒体开始播放的时刻
    #[must_use]
    pub const fn media_start_ms(&self) -> Option<u64> {
        self.media_start_ms
    }

    /// 仅以实时时钟重新设定零点，之前读到的拍号全部失效
    pub fn arm_wall_clock(&mut self) {
        self.reference_start_ms = Some(self.time.now_ms());
        self.media_ready = false;
        self.media_start_ms = None;
    }

    /// 媒体开始播放：同时设定媒体与实时时钟零点
    pub fn arm_with_media(&mut self) {
        let now = self.time.now_ms();
        self.reference_start_ms = Some(now);
        self.media_ready = true;
        self.media_start_ms = Some(now);
    }

    /// 媒体停止：标记未就绪，保留实时时钟零点
    pub fn release_media(&mut self) {
        self.media_ready = false;
    }

    /// 回到从未启动的状态
    pub fn reset(&mut self) {
        self.reference_start_ms = None;
        self.media_ready = false;
        self.media_start_ms = None;
    }

    /// 经过时间（毫秒）对应的拍号
    #[must_use]
    pub fn beat_at(&self, elapsed_ms: u64) -> u64 {
        self.tempo.beat_at(elapsed_ms)
    }

    /// 读取当前拍号并标明时间路径；时钟从未启动时返回 `None`
    #[must_use]
    pub fn read<M: MediaSource + ?Sized>(&self, media: &M) -> Option<BeatReading> {
        if self.media_ready
            && media.is_playing()
            && let Some(position) = media.position_ms()
        {
            return Some(BeatReading {
                beat: self.beat_at(position),
                source: BeatSource::Media,
            });
        }
        let start = self.reference_start_ms?;
        let elapsed = self.time.now_ms().saturating_sub(start);
        Some(BeatReading {
            beat: self.beat_at(elapsed),
            source: BeatSource::WallClock,
        })
    }

    /// 当前拍号；时钟从未启动时返回 `None`
    #[must_use]
    pub fn current_beat<M: MediaSource + ?Sized>(&self, media: &M) -> Option<u64> {
        self.read(media).map(|r| r.beat)
    }
}
