//! 帧率监视：仅用于显示与日志，不影响控制流

use std::collections::VecDeque;

/// 保留的样本数（目标帧率下约 1~2 秒）
const MAX_SAMPLES: usize = 60;

/// 滚动平均帧率
#[derive(Clone, Debug)]
pub struct FpsMonitor {
    /// 目标帧率
    target: f32,
    /// 瞬时帧率样本
    samples: VecDeque<f32>,
    /// 上一帧时刻（毫秒）
    last_frame_ms: Option<u64>,
    /// 当前平均值
    average: f32,
}

impl FpsMonitor {
    /// 以目标帧率作为初始平均值
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self {
            target: target_fps as f32,
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            last_frame_ms: None,
            average: target_fps as f32,
        }
    }

    /// 记录一帧
    pub fn record_frame(&mut self, now_ms: u64) {
        if let Some(last) = self.last_frame_ms {
            let frame_time = now_ms.saturating_sub(last);
            if frame_time > 0 {
                if self.samples.len() == MAX_SAMPLES {
                    self.samples.pop_front();
                }
                self.samples.push_back(1000.0 / frame_time as f32);
                self.average = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
            }
        }
        self.last_frame_ms = Some(now_ms);
    }

    /// 滚动平均帧率
    #[must_use]
    pub const fn average(&self) -> f32 {
        self.average
    }

    /// 目标帧率
    #[must_use]
    pub const fn target(&self) -> f32 {
        self.target
    }

    /// 平均帧率是否低于目标的给定比例
    #[must_use]
    pub fn below(&self, ratio: f32) -> bool {
        self.average < self.target * ratio
    }
}
