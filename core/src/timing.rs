//! 节拍计时模块
//!
//! - `clock`：由播放位置或实时时钟换算当前拍号
//! - `countdown`：开始播放前的单次倒数
//! - `fps`：滚动平均帧率监视
//! - `pacer`：固定帧率节奏控制

pub mod clock;
pub mod countdown;
pub mod fps;
pub mod pacer;

use crate::ShowError;

/// 每分钟毫秒数
const MS_PER_MINUTE: f64 = 60_000.0;

/// 会话节奏：BPM 与每小节拍数，会话期间不可变
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tempo {
    /// 每分钟拍数
    bpm: f64,
    /// 每小节拍数
    beats_per_measure: u32,
}

impl Tempo {
    /// 创建并校验节奏参数
    ///
    /// # Errors
    ///
    /// - `bpm` 不是正的有限数
    /// - `beats_per_measure` 为 0
    pub fn new(bpm: f64, beats_per_measure: u32) -> Result<Self, ShowError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(ShowError::InvalidTempo { bpm });
        }
        if beats_per_measure == 0 {
            return Err(ShowError::InvalidMeasure);
        }
        Ok(Self {
            bpm,
            beats_per_measure,
        })
    }

    /// 每分钟拍数
    #[must_use]
    pub const fn bpm(&self) -> f64 {
        self.bpm
    }

    /// 每小节拍数
    #[must_use]
    pub const fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    /// 单拍时长（毫秒），恒大于 0
    #[must_use]
    pub fn beat_interval_ms(&self) -> f64 {
        MS_PER_MINUTE / self.bpm
    }

    /// 给定帧率下每拍的整帧数
    #[must_use]
    pub fn frames_per_beat(&self, fps: u32) -> u32 {
        (f64::from(fps) * self.beat_interval_ms() / 1000.0) as u32
    }

    /// 经过时间（毫秒）对应的拍号：`floor(elapsed * bpm / 60000)`
    ///
    /// 先乘后除，整数 BPM 在拍边界上没有舍入误差。
    #[must_use]
    pub fn beat_at(&self, elapsed_ms: u64) -> u64 {
        beats_elapsed(elapsed_ms, self.bpm)
    }

    /// 拍号在小节内的位置
    #[must_use]
    pub fn beat_in_measure(&self, beat: u64) -> u32 {
        (beat % u64::from(self.beats_per_measure)) as u32
    }
}

/// 给定 BPM 下经过的整拍数
pub(crate) fn beats_elapsed(elapsed_ms: u64, bpm: f64) -> u64 {
    (elapsed_ms as f64 * bpm / MS_PER_MINUTE).floor() as u64
}
