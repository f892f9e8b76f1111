//! 固定帧率节奏控制

use std::{
    thread,
    time::{Duration, Instant},
};

/// 以固定的下一帧时刻维持目标帧率；落后时重新以当前时刻为基准
#[derive(Debug)]
pub struct FramePacer {
    /// 目标帧间隔
    period: Duration,
    /// 下一帧的计划时刻
    next_tick: Instant,
}

impl FramePacer {
    /// 以目标帧率创建（0 视为 1）
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self {
            period: Self::period_for(fps),
            next_tick: Instant::now(),
        }
    }

    /// 帧率对应的帧间隔
    #[must_use]
    pub fn period_for(fps: u32) -> Duration {
        Duration::from_secs(1) / fps.max(1)
    }

    /// 目标帧间隔
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// 计算距下一帧还需等待的时间，并推进计划时刻
    ///
    /// 返回 `None` 表示已落后，计划时刻已重新对齐到 `now`。
    pub fn schedule(&mut self, now: Instant) -> Option<Duration> {
        let Some(t) = self.next_tick.checked_add(self.period) else {
            self.next_tick = now;
            return None;
        };
        self.next_tick = t;
        if let Some(wait) = self.next_tick.checked_duration_since(now) {
            Some(wait)
        } else {
            self.next_tick = now;
            None
        }
    }

    /// 休眠到下一帧
    pub fn wait(&mut self) {
        if let Some(wait) = self.schedule(Instant::now()) {
            thread::sleep(wait);
        }
    }
}
