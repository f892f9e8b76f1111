//! 播放前倒数
//!
//! 倒数拍与主序列的拍号相互独立：倒数以自己的起点计拍，
//! 完成后由调用方重新设定主时钟零点。

use tracing::info;

use crate::timing::{Tempo, beats_elapsed};

/// 倒数阶段，只会按 `Idle → Counting → Complete` 推进
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownPhase {
    /// 尚未开始
    Idle,
    /// 倒数中
    Counting,
    /// 本轮已完成
    Complete,
}

/// 单次 `tick` 的结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownTick {
    /// 不在倒数中，无事发生
    Inactive,
    /// 倒数中；`pulse` 仅在剩余拍数变化时为真
    Counting {
        /// 剩余拍数
        remaining: u64,
        /// 是否应触发闪烁
        pulse: bool,
    },
    /// 本轮倒数刚刚完成（每轮仅出现一次）
    Completed,
}

/// 倒数状态机
#[derive(Clone, Debug)]
pub struct Countdown {
    /// 总拍数
    total_beats: u64,
    /// 剩余拍数
    remaining: u64,
    /// 当前阶段
    phase: CountdownPhase,
    /// 倒数起点（毫秒）
    epoch_ms: Option<u64>,
    /// 倒数使用的 BPM
    bpm: f64,
    /// 上一次触发闪烁时的剩余拍数
    last_pulsed: Option<u64>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    /// 创建空闲的倒数
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_beats: 0,
            remaining: 0,
            phase: CountdownPhase::Idle,
            epoch_ms: None,
            bpm: 120.0,
            last_pulsed: None,
        }
    }

    /// 开始新一轮倒数（倒数中再次调用会重新开始）
    pub fn start(&mut self, total_beats: u64, tempo: &Tempo, now_ms: u64) {
        self.total_beats = total_beats;
        self.remaining = total_beats;
        self.phase = CountdownPhase::Counting;
        self.epoch_ms = Some(now_ms);
        self.bpm = tempo.bpm();
        self.last_pulsed = None;
        info!(beats = total_beats, "倒数开始");
    }

    /// 放弃本轮倒数（如直接开始播放）
    pub fn cancel(&mut self) {
        if self.phase == CountdownPhase::Counting {
            self.phase = CountdownPhase::Complete;
        }
    }

    /// 当前阶段
    #[must_use]
    pub const fn phase(&self) -> CountdownPhase {
        self.phase
    }

    /// 是否正在倒数
    #[must_use]
    pub fn is_counting(&self) -> bool {
        self.phase == CountdownPhase::Counting
    }

    /// 剩余拍数
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// 总拍数
    #[must_use]
    pub const fn total_beats(&self) -> u64 {
        self.total_beats
    }

    /// 自倒数起点起经过的拍数
    #[must_use]
    pub fn elapsed_beats(&self, now_ms: u64) -> Option<u64> {
        let epoch = self.epoch_ms?;
        let elapsed = now_ms.saturating_sub(epoch);
        Some(beats_elapsed(elapsed, self.bpm))
    }

    /// 按当前时刻推进
    pub fn update(&mut self, now_ms: u64) -> CountdownTick {
        match self.elapsed_beats(now_ms) {
            Some(elapsed) => self.tick(elapsed),
            None => CountdownTick::Inactive,
        }
    }

    /// 以经过的拍数推进倒数
    pub fn tick(&mut self, elapsed_beats: u64) -> CountdownTick {
        if self.phase != CountdownPhase::Counting {
            return CountdownTick::Inactive;
        }
        if elapsed_beats >= self.total_beats {
            self.remaining = 0;
            self.phase = CountdownPhase::Complete;
            info!("倒数完成");
            return CountdownTick::Completed;
        }
        self.remaining = self.total_beats - elapsed_beats;
        let pulse = self.last_pulsed != Some(self.remaining);
        if pulse {
            self.last_pulsed = Some(self.remaining);
            info!(remaining = self.remaining, "倒数");
        }
        CountdownTick::Counting {
            remaining: self.remaining,
            pulse,
        }
    }
}
