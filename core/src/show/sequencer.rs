//! 场景序列器
//!
//! - 同一时刻至多一个活动场景，活动下标在一次播放中只增不减
//! - 场景用完拍数预算后切换到下一个，新场景从触发切换的拍号开始计拍
//! - 到达末尾后保持最后一个场景，不回绕

use tracing::{debug, info, warn};

use crate::show::scene::Scene;

/// 有序场景列表与当前活动下标
#[derive(Debug, Default)]
pub struct SceneSequencer {
    /// 场景列表
    scenes: Vec<Scene>,
    /// 活动场景下标；倒数期间为 `None`
    active: Option<usize>,
    /// 是否已报告全部场景完成
    finished_logged: bool,
}

impl SceneSequencer {
    /// 以场景列表创建（尚无活动场景）
    #[must_use]
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            active: None,
            finished_logged: false,
        }
    }

    /// 场景数
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// 是否没有场景
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// 全部场景
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// 全部场景（可变）
    pub fn scenes_mut(&mut self) -> &mut [Scene] {
        &mut self.scenes
    }

    /// 活动场景下标
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// 活动场景
    #[must_use]
    pub fn active(&self) -> Option<&Scene> {
        self.scenes.get(self.active?)
    }

    /// 活动场景（可变）
    pub fn active_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.get_mut(self.active?)
    }

    /// 开始新一轮播放：清除所有场景的开始拍号与投递记录，第一个场景从拍号 0 开始
    pub fn begin(&mut self) {
        for scene in &mut self.scenes {
            scene.set_start_beat(None);
            scene.effects_mut().reset_delivery();
        }
        self.finished_logged = false;
        self.warn_unreachable();
        match self.scenes.first_mut() {
            Some(first) => {
                first.set_start_beat(Some(0));
                self.active = Some(0);
                info!(scene = first.name(), "开始第一个场景");
            }
            None => {
                self.active = None;
                warn!("没有任何场景");
            }
        }
    }

    /// 退出播放（倒数或停止后），没有活动场景
    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// 切换到下一个场景，新场景从 `current_beat` 开始；已是最后一个场景时返回 `false`
    pub fn advance(&mut self, current_beat: u64) -> bool {
        let Some(from) = self.active else {
            return false;
        };
        let to = from + 1;
        let total = self.scenes.len();
        let from_name = self
            .scenes
            .get(from)
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        let Some(next) = self.scenes.get_mut(to) else {
            if !self.finished_logged {
                self.finished_logged = true;
                info!(beat = current_beat, "全部场景已完成");
            }
            return false;
        };
        next.set_start_beat(Some(current_beat));
        info!(
            from = from_name,
            to = next.name(),
            scene = to + 1,
            total,
            beat = current_beat,
            "场景切换"
        );
        self.active = Some(to);
        true
    }

    /// 检查活动场景是否用完拍数预算，用完则切换；发生切换时返回 `true`
    ///
    /// 场景的开始拍号尚未设置时，以当前拍号为开始且本帧不切换。
    pub fn check_transition(&mut self, current_beat: u64) -> bool {
        let Some(scene) = self.active_mut() else {
            return false;
        };
        let Some(duration) = scene.duration_beats() else {
            return false;
        };
        let Some(start) = scene.start_beat() else {
            scene.set_start_beat(Some(current_beat));
            info!(scene = scene.name(), beat = current_beat, "场景开始");
            return false;
        };
        let beats_in_scene = current_beat.saturating_sub(start);
        debug!(
            scene = scene.name(),
            current_beat, start, beats_in_scene, duration, "场景进度"
        );
        if beats_in_scene >= duration {
            info!(scene = scene.name(), beats = beats_in_scene, "场景完成");
            return self.advance(current_beat);
        }
        false
    }

    /// 活动场景的剩余拍数；不适用时为 `None`
    #[must_use]
    pub fn remaining_beats(&self, current_beat: u64) -> Option<u64> {
        self.active()?.remaining_beats(current_beat)
    }

    /// 手动场景之后的场景永远不会被激活，记录为配置异常
    fn warn_unreachable(&self) {
        let mut scenes = self.scenes.iter();
        let Some(manual) = scenes.find(|s| s.duration_beats().is_none()) else {
            return;
        };
        for scene in scenes {
            warn!(
                scene = scene.name(),
                after = manual.name(),
                "场景位于手动场景之后，不会被激活"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_scenes() -> SceneSequencer {
        SceneSequencer::new(vec![
            Scene::timed("A", 8),
            Scene::timed("B", 4),
            Scene::manual("C"),
        ])
    }

    #[test]
    fn test_transition_exactly_at_budget() {
        let mut seq = three_scenes();
        seq.begin();
        assert_eq!(seq.active_index(), Some(0));
        for beat in 0..8 {
            assert!(!seq.check_transition(beat), "beat {beat}");
        }
        assert!(seq.check_transition(8));
        assert_eq!(seq.active_index(), Some(1));
        assert_eq!(seq.active().unwrap().start_beat(), Some(8));
    }

    #[test]
    fn test_overshoot_reanchors_to_observed_beat() {
        let mut seq = three_scenes();
        seq.begin();
        assert!(seq.check_transition(11));
        assert_eq!(seq.active().unwrap().start_beat(), Some(11));
        assert!(!seq.check_transition(14));
        assert!(seq.check_transition(15));
        assert_eq!(seq.active_index(), Some(2));
    }

    #[test]
    fn test_manual_scene_never_advances_and_end_does_not_wrap() {
        let mut seq = three_scenes();
        seq.begin();
        seq.check_transition(8);
        seq.check_transition(12);
        assert_eq!(seq.active_index(), Some(2));
        for beat in 12..100 {
            assert!(!seq.check_transition(beat));
        }
        assert_eq!(seq.remaining_beats(50), None);
        assert!(!seq.advance(100));
        assert_eq!(seq.active_index(), Some(2));
    }

    #[test]
    fn test_last_timed_scene_stays_active() {
        let mut seq = SceneSequencer::new(vec![Scene::timed("A", 2), Scene::timed("B", 2)]);
        seq.begin();
        assert!(seq.check_transition(2));
        assert!(!seq.check_transition(4));
        assert!(!seq.check_transition(9));
        assert_eq!(seq.active_index(), Some(1));
        assert_eq!(seq.remaining_beats(9), Some(0));
    }

    #[test]
    fn test_lazy_start_beat() {
        let mut seq = three_scenes();
        seq.begin();
        seq.scenes_mut()[0].set_start_beat(None);
        assert!(!seq.check_transition(5));
        assert_eq!(seq.active().unwrap().start_beat(), Some(5));
        assert!(!seq.check_transition(12));
        assert!(seq.check_transition(13));
    }

    #[test]
    fn test_begin_resets_previous_session() {
        let mut seq = three_scenes();
        seq.begin();
        seq.check_transition(8);
        seq.deactivate();
        assert!(seq.active().is_none());
        assert!(!seq.check_transition(9));
        seq.begin();
        assert_eq!(seq.active_index(), Some(0));
        assert_eq!(seq.scenes()[0].start_beat(), Some(0));
        assert_eq!(seq.scenes()[1].start_beat(), None);
    }

    #[test]
    fn test_empty_sequencer_is_inert() {
        let mut seq = SceneSequencer::default();
        seq.begin();
        assert!(seq.is_empty());
        assert!(!seq.check_transition(10));
        assert_eq!(seq.remaining_beats(10), None);
    }
}
