//! 错误类型定义

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 播放会话与效果构建中可能出现的错误
#[derive(Debug, Error)]
pub enum ShowError {
    /// 缺少必需的资源文件（完整列表）
    #[error("{0}")]
    MissingResources(MissingResources),
    /// BPM 不是正的有限数
    #[error("无效的 BPM: {bpm}")]
    InvalidTempo {
        /// 配置的 BPM 值
        bpm: f64,
    },
    /// 每小节拍数为 0
    #[error("每小节拍数必须大于 0")]
    InvalidMeasure,
    /// 多帧效果没有任何图片
    #[error("效果 {effect} 至少需要一张有效图片")]
    EmptyFrames {
        /// 效果名称
        effect: &'static str,
    },
    /// 图片键无法解析
    #[error("未找到图片资源: {key}")]
    UnknownImage {
        /// 图片键
        key: String,
    },
    /// 图片解码失败
    #[error("图片解码失败: {0}")]
    Image(#[from] image::ImageError),
}

/// 资源类别
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// 图片（PNG）
    Image,
    /// 音乐（MP3）
    Music,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Music => f.write_str("music"),
        }
    }
}

/// 单个缺失的资源
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingResource {
    /// 资源类别
    pub kind: ResourceKind,
    /// 资源键（文件名去掉扩展名）
    pub key: String,
    /// 期望的文件路径
    pub expected: PathBuf,
}

/// 缺失资源的完整列表
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MissingResources {
    /// 所有缺失项，按检查顺序排列
    pub items: Vec<MissingResource>,
}

impl MissingResources {
    /// 是否没有缺失项
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 缺失的资源键列表
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(|m| m.key.as_str()).collect()
    }
}

impl fmt::Display for MissingResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "缺少 {} 个必需的资源文件:", self.items.len())?;
        for item in &self.items {
            writeln!(
                f,
                "  - {} `{}` ({})",
                item.kind,
                item.key,
                item.expected.display()
            )?;
        }
        Ok(())
    }
}

impl From<MissingResources> for ShowError {
    fn from(value: MissingResources) -> Self {
        Self::MissingResources(value)
    }
}
