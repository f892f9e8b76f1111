//! # Beat Show 主程序

use std::{
    path::PathBuf,
    sync::mpsc,
    thread,
};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use beat_show::{
    ShowError,
    config::{AutoStart, DEFAULT_CONFIG_PATH, load_sys_or_default},
    logging,
    loops::{ControlMsg, RawInputMsg, VisualMsg, key_map::KeyMap, main_loop},
    media::{ImageStore, SilentMedia, music},
    resources::Resources,
    showcase,
    timing::clock::SystemTimeSource,
};
use beat_show_winit::WindowOptions;

#[derive(Parser)]
/// 命令行参数
struct ExecArgs {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    /// 配置文件路径
    config: PathBuf,
    #[arg(long)]
    /// 覆盖图片目录
    images_dir: Option<PathBuf>,
    #[arg(long)]
    /// 覆盖音乐目录
    musics_dir: Option<PathBuf>,
    #[arg(long)]
    /// 覆盖 BPM
    bpm: Option<f64>,
    #[arg(long)]
    /// 跳过倒数，窗口就绪后立即开始
    no_countdown: bool,
}

fn main() -> Result<()> {
    let args = ExecArgs::parse();
    logging::init_logging();
    let mut sys = load_sys_or_default(&args.config)?;
    if let Some(dir) = args.images_dir {
        sys.resources.images_dir = dir;
    }
    if let Some(dir) = args.musics_dir {
        sys.resources.musics_dir = dir;
    }
    if let Some(bpm) = args.bpm {
        sys.show.bpm = bpm;
    }
    if args.no_countdown {
        sys.show.auto_start = AutoStart::Immediate;
    }

    let session = main_loop::SessionConfig::from_sys(&sys)?;
    let resources = Resources::scan(&sys.resources.images_dir, &sys.resources.musics_dir);
    resources
        .check_required(&sys.resources.required_images, &sys.resources.required_musics)
        .map_err(ShowError::from)?;
    let summary = resources.summary();
    info!(images = ?summary.images, musics = ?summary.musics, "资源概要");

    let mut store = ImageStore::new(&resources);
    let scenes = showcase::build_show(&mut store, session.size)?;
    let music_path = resources.music_path(&sys.resources.music).map(PathBuf::from);
    let key_map = KeyMap::new(&sys.keys);
    let key_codes: Vec<String> = key_map.codes().map(str::to_string).collect();
    let auto_start = sys.show.auto_start;

    let (control_tx, control_rx) = mpsc::sync_channel::<ControlMsg>(1);
    let (visual_tx, visual_rx) = mpsc::sync_channel::<VisualMsg>(2);
    let (raw_input_tx, raw_input_rx) = mpsc::sync_channel::<RawInputMsg>(64);

    // 音频输出流需在使用它的线程内创建
    let main_thread = thread::spawn(move || {
        let time = SystemTimeSource::new();
        match music_path.as_deref().and_then(music::open_or_warn) {
            Some(player) => main_loop::run(
                main_loop::FrameDriver::new(session, time, player, scenes),
                auto_start,
                &key_map,
                &control_rx,
                &raw_input_rx,
                &visual_tx,
            ),
            None => main_loop::run(
                main_loop::FrameDriver::new(session, time, SilentMedia, scenes),
                auto_start,
                &key_map,
                &control_rx,
                &raw_input_rx,
                &visual_tx,
            ),
        }
    });

    info!("启动窗口");
    beat_show_winit::run(
        WindowOptions {
            title: "Beat Show".to_string(),
            size: session.size,
        },
        visual_rx,
        control_tx,
        raw_input_tx,
        key_codes.iter().map(String::as_str),
    )?;
    // 画面通道已随窗口关闭断开，帧循环会在下一帧退出
    main_thread
        .join()
        .map_err(|_| anyhow::anyhow!("帧循环线程异常退出"))?;
    Ok(())
}
