//! 效果接口与效果集合
//!
//! 同一集合上有两种互不相关的顺序：
//! - 事件投递（`update` / `on_beat`）按注册顺序
//! - 绘制按 `priority` 升序稳定排序，数值小的先画（位于底层）

use crate::render::Surface;

/// 一次节拍事件
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatEvent {
    /// 自会话开始的绝对拍号
    pub beat: u64,
    /// 小节内位置：`beat % beats_per_measure`
    pub beat_in_measure: u32,
}

/// 各类效果共有的位置与绘制优先级
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectBase {
    /// 中心坐标（像素）
    pub position: (f32, f32),
    /// 绘制优先级，只影响绘制顺序
    pub priority: i32,
}

impl EffectBase {
    /// 创建位置与优先级
    #[must_use]
    pub const fn new(x: f32, y: f32, priority: i32) -> Self {
        Self {
            position: (x, y),
            priority,
        }
    }
}

/// 节拍驱动的可绘制效果
pub trait Effect: Send {
    /// 位置与优先级
    fn base(&self) -> &EffectBase;

    /// 每帧调用一次，只修改自身状态
    fn update(&mut self);

    /// 每个新的绝对拍号最多调用一次
    fn on_beat(&mut self, event: BeatEvent);

    /// 按当前状态绘制，不修改逻辑状态
    fn draw(&self, surface: &mut dyn Surface);

    /// 切换高负载模拟（默认忽略）
    fn set_heavy_load(&mut self, _enabled: bool) {}

    /// 绘制优先级
    fn priority(&self) -> i32 {
        self.base().priority
    }

    /// 中心坐标
    fn position(&self) -> (f32, f32) {
        self.base().position
    }
}

/// 场景独占的效果集合
#[derive(Default)]
pub struct EffectRegistry {
    /// 按注册顺序排列的效果
    effects: Vec<Box<dyn Effect>>,
    /// 最近一次投递的绝对拍号
    last_delivered: Option<u64>,
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("len", &self.effects.len())
            .field("last_delivered", &self.last_delivered)
            .finish()
    }
}

impl EffectRegistry {
    /// 创建空集合
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册效果（追加到投递顺序末尾）
    pub fn push(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    /// 效果数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// 按注册顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(AsRef::as_ref)
    }

    /// 清除投递记录（重新开始播放时）
    pub fn reset_delivery(&mut self) {
        self.last_delivered = None;
    }

    /// 按注册顺序对全部效果调用 `update`
    pub fn update_all(&mut self) {
        for effect in &mut self.effects {
            effect.update();
        }
    }

    /// 按注册顺序投递节拍；同一拍号重复投递时忽略并返回 `false`
    pub fn dispatch_beat(&mut self, event: BeatEvent) -> bool {
        if self.last_delivered == Some(event.beat) {
            return false;
        }
        self.last_delivered = Some(event.beat);
        for effect in &mut self.effects {
            effect.on_beat(event);
        }
        true
    }

    /// 按优先级稳定排序的（注册下标, 效果）
    fn sorted(&self) -> Vec<(usize, &dyn Effect)> {
        let mut sorted: Vec<_> = self.iter().enumerate().collect();
        sorted.sort_by_key(|(_, effect)| effect.priority());
        sorted
    }

    /// 绘制顺序（注册下标），每次调用重新排序
    #[must_use]
    pub fn render_order(&self) -> Vec<usize> {
        self.sorted().into_iter().map(|(i, _)| i).collect()
    }

    /// 按优先级绘制全部效果
    pub fn draw_all(&self, surface: &mut dyn Surface) {
        for (_, effect) in self.sorted() {
            effect.draw(surface);
        }
    }

    /// 对全部效果切换高负载模拟
    pub fn set_heavy_load(&mut self, enabled: bool) {
        for effect in &mut self.effects {
            effect.set_heavy_load(enabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::render::{DrawCall, RecordingSurface};

    /// 记录调用的探针效果
    struct Recorder {
        base: EffectBase,
        tag: i32,
        log: Arc<Mutex<Vec<(i32, &'static str)>>>,
    }

    impl Recorder {
        fn boxed(tag: i32, priority: i32, log: &Arc<Mutex<Vec<(i32, &'static str)>>>) -> Box<Self> {
            Box::new(Self {
                base: EffectBase::new(0.0, 0.0, priority),
                tag,
                log: log.clone(),
            })
        }
    }

    impl Effect for Recorder {
        fn base(&self) -> &EffectBase {
            &self.base
        }

        fn update(&mut self) {
            self.log.lock().unwrap().push((self.tag, "update"));
        }

        fn on_beat(&mut self, _event: BeatEvent) {
            self.log.lock().unwrap().push((self.tag, "beat"));
        }

        fn draw(&self, surface: &mut dyn Surface) {
            surface.fill_rect(self.tag, 0, 1, 1, [0; 4]);
        }
    }

    fn registry_abc() -> (EffectRegistry, Arc<Mutex<Vec<(i32, &'static str)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EffectRegistry::new();
        registry.push(Recorder::boxed(0, 2, &log));
        registry.push(Recorder::boxed(1, 0, &log));
        registry.push(Recorder::boxed(2, 1, &log));
        (registry, log)
    }

    #[test]
    fn test_render_order_independent_of_delivery_order() {
        let (mut registry, log) = registry_abc();
        assert!(registry.dispatch_beat(BeatEvent {
            beat: 0,
            beat_in_measure: 0
        }));
        assert_eq!(
            *log.lock().unwrap(),
            vec![(0, "beat"), (1, "beat"), (2, "beat")]
        );

        assert_eq!(registry.render_order(), vec![1, 2, 0]);
        let mut surface = RecordingSurface::new(10, 10);
        registry.draw_all(&mut surface);
        let drawn: Vec<i32> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::FillRect { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(drawn, vec![1, 2, 0]);
    }

    #[test]
    fn test_equal_priorities_keep_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EffectRegistry::new();
        for tag in 0..4 {
            registry.push(Recorder::boxed(tag, 5, &log));
        }
        registry.push(Recorder::boxed(9, -1, &log));
        assert_eq!(registry.render_order(), vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn test_repeated_beat_is_not_redelivered() {
        let (mut registry, log) = registry_abc();
        let event = BeatEvent {
            beat: 3,
            beat_in_measure: 3,
        };
        assert!(registry.dispatch_beat(event));
        assert!(!registry.dispatch_beat(event));
        registry.update_all();
        let beats = log.lock().unwrap().iter().filter(|(_, k)| *k == "beat").count();
        let updates = log.lock().unwrap().iter().filter(|(_, k)| *k == "update").count();
        assert_eq!(beats, 3);
        assert_eq!(updates, 3);

        registry.reset_delivery();
        assert!(registry.dispatch_beat(event));
    }
}
