//! 主循环：按固定帧率推进节拍时钟、倒数与场景序列
//!
//! 每帧依次执行：
//! - 记录帧率样本并读取当前拍号（每帧只读取一次）
//! - 倒数中推进倒数，否则在出现新拍号时检查场景切换并投递节拍
//! - 对活动场景的全部效果调用 `update`（与是否有新拍无关）
//! - 绘制画面并发送给视觉循环，等待到下一帧

use std::sync::mpsc::{self, TrySendError};

use tracing::{debug, info, warn};

use crate::ShowError;
use crate::config::{AutoStart, Sys};
use crate::loops::key_map::KeyMap;
use crate::loops::{Command, ControlMsg, RawInputMsg, VisualMsg};
use crate::media::MediaSource;
use crate::render::{Canvas, HudInfo, Overlay, Surface};
use crate::show::{BeatEvent, Scene, SceneSequencer};
use crate::timing::Tempo;
use crate::timing::clock::{BeatClock, BeatReading, TimeSource};
use crate::timing::countdown::{Countdown, CountdownTick};
use crate::timing::fps::FpsMonitor;
use crate::timing::pacer::FramePacer;

/// 低于目标帧率此比例时，在节拍日志中报警
const FPS_WARN_RATIO: f32 = 0.8;
/// 低于目标帧率此比例时，在画面上显示 FPS
const FPS_SHOW_RATIO: f32 = 0.9;

/// 会话参数，会话期间不可变
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// 节奏
    pub tempo: Tempo,
    /// 目标帧率
    pub fps: u32,
    /// 倒数拍数
    pub countdown_beats: u64,
    /// 画面尺寸
    pub size: (u32, u32),
}

impl SessionConfig {
    /// 由系统配置构造
    ///
    /// # Errors
    ///
    /// BPM 或每小节拍数无效
    pub fn from_sys(sys: &Sys) -> Result<Self, ShowError> {
        Ok(Self {
            tempo: sys.tempo()?,
            fps: sys.show.fps.max(1),
            countdown_beats: sys.show.countdown_beats,
            size: (sys.show.width, sys.show.height),
        })
    }
}

/// 单帧推进结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// 本帧读到的拍号
    pub reading: Option<BeatReading>,
    /// 本帧倒数结果
    pub countdown: CountdownTick,
    /// 本帧投递的节拍
    pub dispatched: Option<BeatEvent>,
    /// 本帧是否发生场景切换
    pub transitioned: bool,
    /// 本帧结束时的活动场景
    pub active_scene: Option<usize>,
}

/// 帧驱动器：独占会话内全部状态
pub struct FrameDriver<T: TimeSource, M: MediaSource> {
    /// 会话参数
    session: SessionConfig,
    /// 节拍时钟
    clock: BeatClock<T>,
    /// 媒体播放源
    media: M,
    /// 倒数
    countdown: Countdown,
    /// 场景序列
    sequencer: SceneSequencer,
    /// 帧率监视
    fps: FpsMonitor,
    /// 叠加层
    overlay: Overlay,
    /// 最近一次投递的拍号，一次播放内单调不减
    last_dispatched: Option<u64>,
    /// 最近一帧读到的拍号
    current_beat: Option<u64>,
    /// 高负载模拟
    heavy_load: bool,
    /// 已推进的帧数
    frames: u64,
}

impl<T: TimeSource, M: MediaSource> FrameDriver<T, M> {
    /// 创建驱动器（尚未开始播放）
    pub fn new(session: SessionConfig, time: T, media: M, scenes: Vec<Scene>) -> Self {
        let interval = session.tempo.beat_interval_ms();
        info!(
            bpm = session.tempo.bpm(),
            interval_ms = interval,
            frames_per_beat = session.tempo.frames_per_beat(session.fps),
            scenes = scenes.len(),
            "会话已创建"
        );
        Self {
            clock: BeatClock::new(time, &session.tempo),
            media,
            countdown: Countdown::new(),
            sequencer: SceneSequencer::new(scenes),
            fps: FpsMonitor::new(session.fps),
            overlay: Overlay::new(session.size.0, session.size.1),
            last_dispatched: None,
            current_beat: None,
            heavy_load: false,
            frames: 0,
            session,
        }
    }

    /// 会话参数
    #[must_use]
    pub const fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// 节拍时钟
    #[must_use]
    pub const fn clock(&self) -> &BeatClock<T> {
        &self.clock
    }

    /// 倒数状态
    #[must_use]
    pub const fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// 场景序列
    #[must_use]
    pub const fn sequencer(&self) -> &SceneSequencer {
        &self.sequencer
    }

    /// 帧率监视
    #[must_use]
    pub const fn fps(&self) -> &FpsMonitor {
        &self.fps
    }

    /// 媒体播放源
    #[must_use]
    pub const fn media(&self) -> &M {
        &self.media
    }

    /// 最近一次投递的拍号
    #[must_use]
    pub const fn last_dispatched_beat(&self) -> Option<u64> {
        self.last_dispatched
    }

    /// 是否开启高负载模拟
    #[must_use]
    pub const fn heavy_load(&self) -> bool {
        self.heavy_load
    }

    /// 已推进的帧数
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// 执行一条控制命令
    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::StartCountdown => self.start_countdown(),
            Command::StartImmediately => self.start_immediately(),
            Command::Stop => self.stop(),
            Command::ToggleHeavyLoad => self.toggle_heavy_load(),
        }
    }

    /// 停止当前播放并开始倒数（倒数中调用会重新开始）
    pub fn start_countdown(&mut self) {
        if self.media.is_playing() {
            self.media.stop();
        }
        self.clock.release_media();
        self.sequencer.deactivate();
        let now = self.clock.now_ms();
        self.countdown
            .start(self.session.countdown_beats, &self.session.tempo, now);
    }

    /// 跳过倒数立即开始；音乐已在播放时忽略
    pub fn start_immediately(&mut self) {
        if self.media.is_playing() {
            debug!("音乐已在播放，忽略立即开始");
            return;
        }
        self.countdown.cancel();
        self.begin_playback();
    }

    /// 停止音乐并标记媒体未就绪；实时时钟零点保留
    ///
    /// 倒数中调用会取消倒数。
    pub fn stop(&mut self) {
        self.media.stop();
        self.clock.release_media();
        if self.countdown.is_counting() {
            self.countdown.cancel();
            info!("倒数已取消");
        }
    }

    /// 切换高负载模拟，并广播给全部场景的效果
    pub fn toggle_heavy_load(&mut self) {
        self.heavy_load = !self.heavy_load;
        for scene in self.sequencer.scenes_mut() {
            scene.effects_mut().set_heavy_load(self.heavy_load);
        }
        info!(enabled = self.heavy_load, "高负载模拟");
    }

    /// 开始播放：启动媒体、重设时钟零点、清除拍号游标并从第一个场景开始
    fn begin_playback(&mut self) {
        match self.media.play() {
            Ok(()) => self.clock.arm_with_media(),
            Err(e) => {
                warn!(error = %e, "音乐播放失败，改用实时时钟");
                self.clock.arm_wall_clock();
            }
        }
        self.last_dispatched = None;
        self.current_beat = None;
        self.sequencer.begin();
        info!("播放开始，场景开始切换");
    }

    /// 推进一帧（不含绘制与等待）
    pub fn step(&mut self) -> FrameReport {
        self.frames += 1;
        let now = self.clock.now_ms();
        self.fps.record_frame(now);
        let reading = self.clock.read(&self.media);
        self.current_beat = reading.map(|r| r.beat);

        let mut report = FrameReport {
            reading,
            countdown: CountdownTick::Inactive,
            dispatched: None,
            transitioned: false,
            active_scene: None,
        };

        if self.countdown.is_counting() {
            let tick = self.countdown.update(now);
            self.overlay.observe_countdown(tick);
            report.countdown = tick;
            if tick == CountdownTick::Completed {
                self.begin_playback();
            }
        } else if let Some(r) = reading
            && self.last_dispatched.is_none_or(|last| r.beat > last)
        {
            report.transitioned = self.sequencer.check_transition(r.beat);
            let event = BeatEvent {
                beat: r.beat,
                beat_in_measure: self.session.tempo.beat_in_measure(r.beat),
            };
            if let Some(scene) = self.sequencer.active_mut() {
                scene.on_beat(event);
                report.dispatched = Some(event);
            }
            if let Some(scene) = self.sequencer.active() {
                debug!(
                    beat = event.beat,
                    beat_in_measure = event.beat_in_measure,
                    scene = scene.name(),
                    index = self.sequencer.active_index().map_or(0, |i| i + 1),
                    total = self.sequencer.len(),
                    source = ?r.source,
                    "节拍"
                );
            }
            if self.fps.below(FPS_WARN_RATIO) {
                warn!(
                    fps = self.fps.average(),
                    target = self.fps.target(),
                    beat = event.beat,
                    "FPS 下降"
                );
            }
            self.last_dispatched = Some(r.beat);
        }

        if !self.countdown.is_counting()
            && let Some(scene) = self.sequencer.active_mut()
        {
            scene.update();
        }

        report.active_scene = self.sequencer.active_index();
        report
    }

    /// 绘制当前画面
    pub fn render(&self, surface: &mut dyn Surface) {
        self.overlay.draw_background(surface);
        if self.countdown.is_counting() {
            self.overlay
                .draw_countdown(surface, self.countdown.remaining());
        } else if let (Some(index), Some(scene)) =
            (self.sequencer.active_index(), self.sequencer.active())
        {
            scene.draw(surface);
            self.overlay.draw_hud(
                surface,
                &HudInfo {
                    number: index + 1,
                    total: self.sequencer.len(),
                    name: scene.name(),
                    remaining: self
                        .current_beat
                        .and_then(|beat| scene.remaining_beats(beat)),
                },
            );
        }
        if self.fps.below(FPS_SHOW_RATIO) {
            self.overlay.draw_fps(surface, self.fps.average());
        }
    }

    /// 按启动配置执行自动行为
    pub fn apply_auto_start(&mut self, auto_start: AutoStart) {
        match auto_start {
            AutoStart::Countdown => self.start_countdown(),
            AutoStart::Immediate => self.start_immediately(),
            AutoStart::Manual => info!("等待按键开始"),
        }
    }

    /// 结束会话，停止音乐
    pub fn shutdown(&mut self) {
        self.media.stop();
        info!(frames = self.frames, "会话结束");
    }
}

/// 运行帧循环
///
/// - 等待 `ControlMsg::Start` 后执行自动行为
/// - 每帧处理输入、推进、绘制并发送画面
/// - 视觉通道断开时结束
pub fn run<T: TimeSource, M: MediaSource>(
    mut driver: FrameDriver<T, M>,
    auto_start: AutoStart,
    key_map: &KeyMap,
    control_rx: &mpsc::Receiver<ControlMsg>,
    raw_input_rx: &mpsc::Receiver<RawInputMsg>,
    visual_tx: &mpsc::SyncSender<VisualMsg>,
) {
    match control_rx.recv() {
        Ok(ControlMsg::Start) => {}
        Err(_) => return,
    }
    driver.apply_auto_start(auto_start);

    let (width, height) = driver.session().size;
    let mut pacer = FramePacer::new(driver.session().fps);
    info!(
        period_ms = pacer.period().as_secs_f64() * 1000.0,
        width, height, "帧循环启动"
    );
    loop {
        while let Ok(raw_msg) = raw_input_rx.try_recv() {
            if let Some(cmd) = key_map.convert(raw_msg) {
                driver.handle_command(cmd);
            }
        }

        driver.step();

        let mut canvas = Canvas::new(width, height);
        driver.render(&mut canvas);
        match visual_tx.try_send(VisualMsg::Frame(canvas.into_image())) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => break,
        }

        pacer.wait();
    }
    driver.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ScriptedMedia;
    use crate::render::RecordingSurface;
    use crate::timing::clock::{BeatSource, ManualTimeSource};

    fn session() -> SessionConfig {
        SessionConfig {
            tempo: Tempo::new(120.0, 4).unwrap(),
            fps: 30,
            countdown_beats: 4,
            size: (800, 600),
        }
    }

    fn driver(
        scenes: Vec<Scene>,
    ) -> (
        ManualTimeSource,
        ScriptedMedia,
        FrameDriver<ManualTimeSource, ScriptedMedia>,
    ) {
        let time = ManualTimeSource::new();
        let media = ScriptedMedia::default();
        let d = FrameDriver::new(session(), time.clone(), media.clone(), scenes);
        (time, media, d)
    }

    #[test]
    fn test_nothing_happens_before_start() {
        let (time, _, mut d) = driver(vec![Scene::timed("A", 8)]);
        time.set(5_000);
        let report = d.step();
        assert_eq!(report.reading, None);
        assert_eq!(report.active_scene, None);
        assert_eq!(d.last_dispatched_beat(), None);
    }

    #[test]
    fn test_countdown_hands_off_to_playback() {
        let (time, media, mut d) = driver(vec![Scene::timed("A", 8)]);
        time.set(1_000);
        d.start_countdown();
        let mut completed_at = None;
        for ms in (1_000..=3_100).step_by(100) {
            time.set(ms);
            let report = d.step();
            assert!(report.dispatched.is_none() || completed_at.is_some());
            if report.countdown == CountdownTick::Completed {
                assert!(completed_at.is_none());
                completed_at = Some(ms);
            }
        }
        assert_eq!(completed_at, Some(3_000));
        assert_eq!(media.play_count(), 1);
        assert_eq!(d.clock().reference_start_ms(), Some(3_000));
        assert_eq!(d.sequencer().active_index(), Some(0));
    }

    #[test]
    fn test_media_position_drives_beats() {
        let (time, media, mut d) = driver(vec![Scene::timed("A", 8)]);
        d.start_immediately();
        media.set_position(Some(1_600));
        time.set(100);
        let report = d.step();
        assert_eq!(
            report.reading.map(|r| (r.beat, r.source)),
            Some((3, BeatSource::Media))
        );
        assert_eq!(report.dispatched.map(|e| e.beat_in_measure), Some(3));
    }

    #[test]
    fn test_stop_keeps_wall_clock_running() {
        let (time, _, mut d) = driver(vec![Scene::timed("A", 8)]);
        d.start_immediately();
        time.set(600);
        d.step();
        d.stop();
        time.set(1_100);
        let report = d.step();
        assert_eq!(
            report.reading,
            Some(BeatReading {
                beat: 2,
                source: BeatSource::WallClock
            })
        );
        assert_eq!(d.last_dispatched_beat(), Some(2));
    }

    #[test]
    fn test_stop_cancels_countdown() {
        let (time, media, mut d) = driver(vec![Scene::timed("A", 8)]);
        d.start_countdown();
        d.stop();
        time.set(10_000);
        let report = d.step();
        assert_eq!(report.countdown, CountdownTick::Inactive);
        assert_eq!(report.active_scene, None);
        assert_eq!(media.play_count(), 0);
    }

    #[test]
    fn test_start_immediately_ignored_while_playing() {
        let (time, media, mut d) = driver(vec![Scene::timed("A", 2), Scene::timed("B", 2)]);
        d.start_immediately();
        time.set(1_500);
        d.step();
        assert_eq!(d.sequencer().active_index(), Some(1));
        d.start_immediately();
        assert_eq!(media.play_count(), 1);
        assert_eq!(d.sequencer().active_index(), Some(1));
    }

    #[test]
    fn test_render_shows_countdown_then_scene() {
        let (time, _, mut d) = driver(vec![Scene::timed("A", 8)]);
        d.start_countdown();
        d.step();
        let mut surface = RecordingSurface::new(800, 600);
        d.render(&mut surface);
        assert!(
            surface
                .calls
                .iter()
                .any(|c| matches!(c, crate::render::DrawCall::StrokeCircle { .. }))
        );

        time.set(2_000);
        d.step();
        let mut surface = RecordingSurface::new(800, 600);
        d.render(&mut surface);
        assert!(
            !surface
                .calls
                .iter()
                .any(|c| matches!(c, crate::render::DrawCall::StrokeCircle { .. }))
        );
        assert_eq!(
            surface.calls.first(),
            Some(&crate::render::DrawCall::Clear(crate::render::overlay::BACKGROUND))
        );
    }

    #[test]
    fn test_heavy_load_toggle() {
        let (_, _, mut d) = driver(Vec::new());
        d.handle_command(Command::ToggleHeavyLoad);
        assert!(d.heavy_load());
        d.handle_command(Command::ToggleHeavyLoad);
        assert!(!d.heavy_load());
    }
}
