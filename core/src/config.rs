//! 系统配置定义与解析

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

use crate::ShowError;
use crate::timing::Tempo;

/// 默认配置文件名
pub const DEFAULT_CONFIG_PATH: &str = "config_show.toml";

/// 系统运行时配置
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Sys {
    /// 演出参数
    pub show: Show,
    /// 资源目录与必需资源
    pub resources: ResourcesCfg,
    /// 键位配置
    pub keys: Keys,
}

/// 启动后的自动行为
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutoStart {
    /// 先倒数再开始
    #[default]
    Countdown,
    /// 立即开始
    Immediate,
    /// 等待按键
    Manual,
}

/// 演出参数
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Show {
    /// 每分钟拍数
    pub bpm: f64,
    /// 每小节拍数
    pub beats_per_measure: u32,
    /// 目标帧率
    pub fps: u32,
    /// 倒数拍数
    pub countdown_beats: u64,
    /// 画面宽度
    pub width: u32,
    /// 画面高度
    pub height: u32,
    /// 启动后的自动行为
    pub auto_start: AutoStart,
}

impl Default for Show {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            beats_per_measure: 4,
            fps: 30,
            countdown_beats: 4,
            width: 800,
            height: 600,
            auto_start: AutoStart::Countdown,
        }
    }
}

/// 资源配置
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ResourcesCfg {
    /// 图片目录
    pub images_dir: PathBuf,
    /// 音乐目录
    pub musics_dir: PathBuf,
    /// 背景音乐键
    pub music: String,
    /// 必需图片键
    pub required_images: Vec<String>,
    /// 必需音乐键
    pub required_musics: Vec<String>,
}

impl Default for ResourcesCfg {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            musics_dir: PathBuf::from("musics"),
            music: "base".to_string(),
            required_images: vec!["star_1".to_string()],
            required_musics: vec!["base".to_string()],
        }
    }
}

/// 键位配置（按键代码字符串，如 `Space`、`KeyH`）
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Keys {
    /// 倒数后开始
    pub start_countdown: String,
    /// 立即开始
    pub start_immediately: String,
    /// 停止
    pub stop: String,
    /// 切换高负载模拟
    pub toggle_heavy_load: String,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            start_countdown: "Space".to_string(),
            start_immediately: "Enter".to_string(),
            stop: "Escape".to_string(),
            toggle_heavy_load: "KeyH".to_string(),
        }
    }
}

impl Sys {
    /// 校验并构造会话节奏
    ///
    /// # Errors
    ///
    /// BPM 或每小节拍数无效
    pub fn tempo(&self) -> Result<Tempo, ShowError> {
        Tempo::new(self.show.bpm, self.show.beats_per_measure)
    }
}

/// 从 TOML 字符串解析系统配置
///
/// # Errors
///
/// - TOML 解析失败
/// - 配置字段反序列化失败
pub fn parse_sys_str(s: &str) -> Result<Sys> {
    let cfg: Sys = toml::from_str(s)?;
    Ok(cfg)
}

/// 从指定路径加载系统配置（TOML）
///
/// # Errors
///
/// - 读取文件失败
/// - TOML 解析失败
/// - 配置字段反序列化失败
pub fn load_sys(path: &Path) -> Result<Sys> {
    let s = std::fs::read_to_string(path)?;
    parse_sys_str(&s)
}

/// 加载配置；文件不存在时使用默认值
///
/// # Errors
///
/// 文件存在但无法读取或解析
pub fn load_sys_or_default(path: &Path) -> Result<Sys> {
    if path.exists() {
        let sys = load_sys(path)?;
        info!(path = %path.display(), "已加载配置");
        Ok(sys)
    } else {
        info!(path = %path.display(), "未找到配置文件，使用默认配置");
        Ok(Sys::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let sys = parse_sys_str("").unwrap();
        assert_eq!(sys, Sys::default());
        assert!((sys.show.bpm - 120.0).abs() < f64::EPSILON);
        assert_eq!(sys.resources.required_images, vec!["star_1".to_string()]);
        assert_eq!(sys.keys.toggle_heavy_load, "KeyH");
    }

    #[test]
    fn test_partial_tables_override_fields() {
        let sys = parse_sys_str(
            r#"
            [show]
            bpm = 90.0
            auto_start = "manual"

            [keys]
            stop = "KeyQ"
            "#,
        )
        .unwrap();
        assert!((sys.show.bpm - 90.0).abs() < f64::EPSILON);
        assert_eq!(sys.show.fps, 30);
        assert_eq!(sys.show.auto_start, AutoStart::Manual);
        assert_eq!(sys.keys.stop, "KeyQ");
        assert_eq!(sys.keys.start_countdown, "Space");
    }

    #[test]
    fn test_tempo_validation() {
        let mut sys = Sys::default();
        assert!(sys.tempo().is_ok());
        sys.show.bpm = -1.0;
        assert!(matches!(sys.tempo(), Err(ShowError::InvalidTempo { .. })));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("beat-show-no-such-config.toml");
        assert_eq!(load_sys_or_default(&path).unwrap(), Sys::default());
    }
}
