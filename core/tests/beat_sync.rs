//! 节拍同步端到端测试：手动时间源 + 脚本化播放源

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};

use beat_show::{
    loops::main_loop::{FrameDriver, SessionConfig},
    media::ScriptedMedia,
    render::Surface,
    show::{BeatEvent, Effect, EffectBase, EffectRegistry, Scene, SceneSequencer},
    timing::{
        Tempo,
        clock::{BeatClock, BeatSource, ManualTimeSource},
        countdown::{Countdown, CountdownTick},
    },
};

/// 记录调用情况的效果
struct Counter {
    base: EffectBase,
    updates: Arc<AtomicU32>,
    beats: Arc<Mutex<Vec<u64>>>,
}

impl Counter {
    fn new() -> (Self, Arc<AtomicU32>, Arc<Mutex<Vec<u64>>>) {
        let updates = Arc::new(AtomicU32::new(0));
        let beats = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                base: EffectBase::new(0.0, 0.0, 0),
                updates: updates.clone(),
                beats: beats.clone(),
            },
            updates,
            beats,
        )
    }
}

impl Effect for Counter {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn update(&mut self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn on_beat(&mut self, event: BeatEvent) {
        self.beats.lock().unwrap().push(event.beat);
    }

    fn draw(&self, _surface: &mut dyn Surface) {}
}

/// 只记录投递顺序的效果
struct Tagged {
    base: EffectBase,
    name: char,
    log: Arc<Mutex<Vec<char>>>,
}

impl Effect for Tagged {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn update(&mut self) {}

    fn on_beat(&mut self, _event: BeatEvent) {
        self.log.lock().unwrap().push(self.name);
    }

    fn draw(&self, _surface: &mut dyn Surface) {}
}

fn tempo_120() -> Tempo {
    Tempo::new(120.0, 4).unwrap()
}

fn session() -> SessionConfig {
    SessionConfig {
        tempo: tempo_120(),
        fps: 30,
        countdown_beats: 4,
        size: (800, 600),
    }
}

#[test]
fn test_beat_never_decreases_while_anchor_unchanged() {
    let time = ManualTimeSource::new();
    let mut clock = BeatClock::new(time.clone(), &tempo_120());
    let media = ScriptedMedia::default();
    clock.arm_wall_clock();
    let mut last = 0;
    for step in 0..200 {
        time.advance(37 + step % 11);
        let beat = clock.current_beat(&media).unwrap();
        assert!(beat >= last);
        last = beat;
    }
}

#[test]
fn test_beat_boundaries_at_120_bpm() {
    let time = ManualTimeSource::new();
    let mut clock = BeatClock::new(time.clone(), &tempo_120());
    let media = ScriptedMedia::default();
    time.set(10_000);
    clock.arm_wall_clock();
    for (elapsed, beat) in [(0, 0), (499, 0), (500, 1), (1_999, 3)] {
        time.set(10_000 + elapsed);
        assert_eq!(clock.current_beat(&media), Some(beat), "elapsed {elapsed}");
    }
}

#[test]
fn test_countdown_four_beats() {
    let mut countdown = Countdown::new();
    countdown.start(4, &tempo_120(), 0);
    let mut remaining = Vec::new();
    let mut completions = 0;
    for ms in (0..=3_000).step_by(50) {
        match countdown.update(ms) {
            CountdownTick::Counting { remaining: r, pulse } => {
                if pulse {
                    remaining.push(r);
                }
            }
            CountdownTick::Completed => {
                assert_eq!(ms, 2_000);
                completions += 1;
            }
            CountdownTick::Inactive => {}
        }
    }
    assert_eq!(remaining, vec![4, 3, 2, 1]);
    assert_eq!(completions, 1);
}

#[test]
fn test_scene_transitions_exactly_on_budget() {
    let mut sequencer = SceneSequencer::new(vec![Scene::timed("A", 8), Scene::timed("B", 8)]);
    sequencer.begin();
    for beat in 0..8 {
        assert!(!sequencer.check_transition(beat), "beat {beat}");
        assert_eq!(sequencer.active_index(), Some(0));
    }
    assert!(sequencer.check_transition(8));
    assert_eq!(sequencer.active_index(), Some(1));
    assert_eq!(sequencer.active().and_then(Scene::start_beat), Some(8));
}

#[test]
fn test_render_order_decoupled_from_delivery() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = EffectRegistry::new();
    for (name, priority) in [('A', 2), ('B', 0), ('C', 1)] {
        registry.push(Box::new(Tagged {
            base: EffectBase::new(0.0, 0.0, priority),
            name,
            log: log.clone(),
        }));
    }
    assert_eq!(registry.render_order(), vec![1, 2, 0]);
    assert!(registry.dispatch_beat(BeatEvent {
        beat: 0,
        beat_in_measure: 0,
    }));
    assert_eq!(*log.lock().unwrap(), vec!['A', 'B', 'C']);
}

#[test]
fn test_repeated_beat_updates_without_redelivery() {
    let (counter, updates, beats) = Counter::new();
    let time = ManualTimeSource::new();
    let mut driver = FrameDriver::new(
        session(),
        time.clone(),
        ScriptedMedia::default(),
        vec![Scene::timed("A", 8).with(counter)],
    );
    driver.start_immediately();
    for ms in [0, 100, 200, 300, 400, 500, 600] {
        time.set(ms);
        driver.step();
    }
    assert_eq!(*beats.lock().unwrap(), vec![0, 1]);
    assert_eq!(updates.load(Ordering::SeqCst), 7);
}

#[test]
fn test_unknown_position_matches_wall_clock_exactly() {
    let time = ManualTimeSource::new();
    let media = ScriptedMedia::playing_unknown();
    let mut media_clock = BeatClock::new(time.clone(), &tempo_120());
    let mut wall_clock = BeatClock::new(time.clone(), &tempo_120());
    media_clock.arm_with_media();
    wall_clock.arm_wall_clock();
    for ms in (0..5_000).step_by(123) {
        time.set(ms);
        let reading = media_clock.read(&media).unwrap();
        assert_eq!(reading.source, BeatSource::WallClock);
        assert_eq!(Some(reading.beat), wall_clock.current_beat(&media));
    }
}

#[test]
fn test_media_requeried_every_frame() {
    let time = ManualTimeSource::new();
    let media = ScriptedMedia::default();
    let mut driver = FrameDriver::new(
        session(),
        time.clone(),
        media.clone(),
        vec![Scene::timed("A", 8)],
    );
    driver.start_immediately();
    let mut sources = Vec::new();
    for (ms, position) in [(100, None), (200, None), (300, Some(1_250)), (400, Some(1_350))] {
        time.set(ms);
        media.set_position(position);
        let reading = driver.step().reading.unwrap();
        sources.push((reading.source, reading.beat));
    }
    assert_eq!(
        sources,
        vec![
            (BeatSource::WallClock, 0),
            (BeatSource::WallClock, 0),
            (BeatSource::Media, 2),
            (BeatSource::Media, 2),
        ]
    );
    assert_eq!(driver.last_dispatched_beat(), Some(2));
}

#[test]
fn test_full_session_walks_all_scenes() {
    let time = ManualTimeSource::new();
    let media = ScriptedMedia::default();
    let mut driver = FrameDriver::new(
        session(),
        time.clone(),
        media.clone(),
        vec![
            Scene::timed("A", 2),
            Scene::timed("B", 4),
            Scene::manual("C"),
        ],
    );
    driver.start_countdown();
    let mut transitions = Vec::new();
    for ms in (0..8_000).step_by(33) {
        time.set(ms);
        // 播放开始后以媒体位置为准
        if media.play_count() > 0 {
            let start = driver.clock().media_start_ms().unwrap();
            media.set_position(Some(ms - start));
        }
        let report = driver.step();
        if report.transitioned {
            transitions.push((report.active_scene, report.reading.map(|r| r.beat)));
        }
    }
    assert_eq!(media.play_count(), 1);
    assert_eq!(transitions, vec![(Some(1), Some(2)), (Some(2), Some(6))]);
    assert_eq!(driver.sequencer().active_index(), Some(2));
    assert_eq!(driver.sequencer().remaining_beats(11), None);
}
