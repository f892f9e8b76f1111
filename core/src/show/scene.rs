//! 场景：带拍数预算的效果集合

use crate::render::Surface;
use crate::show::effect::{BeatEvent, Effect, EffectRegistry};

/// 一个定时场景
///
/// `duration_beats` 为 `None` 表示手动场景（不会自动切换）；
/// `start_beat` 由序列器在场景首次观察到拍号时设置。
#[derive(Debug)]
pub struct Scene {
    /// 场景名（仅用于显示与日志）
    name: String,
    /// 拍数预算
    duration_beats: Option<u64>,
    /// 开始拍号
    start_beat: Option<u64>,
    /// 独占的效果集合
    effects: EffectRegistry,
}

impl Scene {
    /// 创建场景
    #[must_use]
    pub fn new(name: impl Into<String>, duration_beats: Option<u64>) -> Self {
        Self {
            name: name.into(),
            duration_beats,
            start_beat: None,
            effects: EffectRegistry::new(),
        }
    }

    /// 持续固定拍数后自动切换的场景
    #[must_use]
    pub fn timed(name: impl Into<String>, beats: u64) -> Self {
        Self::new(name, Some(beats))
    }

    /// 不会自动切换的手动场景
    #[must_use]
    pub fn manual(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// 追加效果
    pub fn add(&mut self, effect: impl Effect + 'static) -> &mut Self {
        self.effects.push(Box::new(effect));
        self
    }

    /// 以构建器方式追加效果
    #[must_use]
    pub fn with(mut self, effect: impl Effect + 'static) -> Self {
        self.add(effect);
        self
    }

    /// 场景名
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 拍数预算
    #[must_use]
    pub const fn duration_beats(&self) -> Option<u64> {
        self.duration_beats
    }

    /// 开始拍号
    #[must_use]
    pub const fn start_beat(&self) -> Option<u64> {
        self.start_beat
    }

    /// 设置开始拍号（仅序列器调用）
    pub(crate) fn set_start_beat(&mut self, beat: Option<u64>) {
        self.start_beat = beat;
    }

    /// 效果集合
    #[must_use]
    pub const fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    /// 效果集合（可变）
    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    /// 剩余拍数；手动场景或尚未开始时不适用，返回 `None`
    #[must_use]
    pub fn remaining_beats(&self, current_beat: u64) -> Option<u64> {
        let duration = self.duration_beats?;
        let start = self.start_beat?;
        Some(duration.saturating_sub(current_beat.saturating_sub(start)))
    }

    /// 广播逐帧更新
    pub fn update(&mut self) {
        self.effects.update_all();
    }

    /// 广播节拍；重复拍号被忽略
    pub fn on_beat(&mut self, event: BeatEvent) -> bool {
        self.effects.dispatch_beat(event)
    }

    /// 按优先级绘制
    pub fn draw(&self, surface: &mut dyn Surface) {
        self.effects.draw_all(surface);
    }
}
