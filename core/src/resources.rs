//! 资源提供者：扫描图片与音乐目录，按键解析文件路径

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use futures_lite::future;
use tracing::{debug, info, warn};

use crate::error::{MissingResource, MissingResources, ResourceKind};
use crate::filesystem::scan_by_ext;

/// 图片扩展名
const IMAGE_EXT: &str = "png";
/// 音乐扩展名
const MUSIC_EXT: &str = "mp3";

/// 资源概要
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceSummary {
    /// 可用图片键
    pub images: Vec<String>,
    /// 可用音乐键
    pub musics: Vec<String>,
}

/// 扫描得到的资源表
#[derive(Clone, Debug, Default)]
pub struct Resources {
    /// 图片目录
    images_dir: PathBuf,
    /// 音乐目录
    musics_dir: PathBuf,
    /// 图片键到路径
    images: BTreeMap<String, PathBuf>,
    /// 音乐键到路径
    musics: BTreeMap<String, PathBuf>,
}

impl Resources {
    /// 扫描图片与音乐目录；目录不存在只记录日志
    #[must_use]
    pub fn scan(images_dir: &Path, musics_dir: &Path) -> Self {
        info!("扫描资源文件");
        let images = scan_dir(images_dir, &[IMAGE_EXT], ResourceKind::Image);
        let musics = scan_dir(musics_dir, &[MUSIC_EXT], ResourceKind::Music);
        info!(images = images.len(), musics = musics.len(), "资源扫描完成");
        Self {
            images_dir: images_dir.to_path_buf(),
            musics_dir: musics_dir.to_path_buf(),
            images,
            musics,
        }
    }

    /// 图片键到路径的映射
    #[must_use]
    pub const fn images(&self) -> &BTreeMap<String, PathBuf> {
        &self.images
    }

    /// 图片路径
    #[must_use]
    pub fn image_path(&self, key: &str) -> Option<&Path> {
        self.images.get(key).map(PathBuf::as_path)
    }

    /// 音乐路径
    #[must_use]
    pub fn music_path(&self, key: &str) -> Option<&Path> {
        self.musics.get(key).map(PathBuf::as_path)
    }

    /// 图片是否存在于磁盘
    #[must_use]
    pub fn has_image(&self, key: &str) -> bool {
        self.image_path(key).is_some_and(Path::is_file)
    }

    /// 音乐是否存在于磁盘
    #[must_use]
    pub fn has_music(&self, key: &str) -> bool {
        self.music_path(key).is_some_and(Path::is_file)
    }

    /// 可用资源概要
    #[must_use]
    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary {
            images: self.images.keys().cloned().collect(),
            musics: self.musics.keys().cloned().collect(),
        }
    }

    /// 检查必需资源，一次性报告全部缺失项
    ///
    /// # Errors
    ///
    /// 任一键无法解析到现存文件时，返回包含所有缺失项的列表
    pub fn check_required<I, M>(&self, images: I, musics: M) -> Result<(), MissingResources>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        let mut missing = MissingResources::default();
        for key in images {
            let key = key.as_ref();
            if self.has_image(key) {
                debug!(key, "必需图片已找到");
            } else {
                let expected = self.expected_path(ResourceKind::Image, key);
                warn!(key, path = %expected.display(), "缺少必需图片");
                missing.items.push(MissingResource {
                    kind: ResourceKind::Image,
                    key: key.to_string(),
                    expected,
                });
            }
        }
        for key in musics {
            let key = key.as_ref();
            if self.has_music(key) {
                debug!(key, "必需音乐已找到");
            } else {
                let expected = self.expected_path(ResourceKind::Music, key);
                warn!(key, path = %expected.display(), "缺少必需音乐");
                missing.items.push(MissingResource {
                    kind: ResourceKind::Music,
                    key: key.to_string(),
                    expected,
                });
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// 缺失资源的期望路径：已登记则用登记路径，否则为 `目录/键.扩展名`
    fn expected_path(&self, kind: ResourceKind, key: &str) -> PathBuf {
        let (table, dir, ext) = match kind {
            ResourceKind::Image => (&self.images, &self.images_dir, IMAGE_EXT),
            ResourceKind::Music => (&self.musics, &self.musics_dir, MUSIC_EXT),
        };
        table
            .get(key)
            .cloned()
            .unwrap_or_else(|| dir.join(format!("{key}.{ext}")))
    }
}

/// 扫描单个目录，失败时记录并返回空表
fn scan_dir(dir: &Path, exts: &[&str], kind: ResourceKind) -> BTreeMap<String, PathBuf> {
    match future::block_on(scan_by_ext(dir, exts)) {
        Ok(found) => {
            for (key, path) in &found {
                debug!(%kind, key, path = %path.display(), "发现资源");
            }
            found
        }
        Err(e) => {
            warn!(%kind, dir = %dir.display(), error = %e, "资源目录不可用");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_tree(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("beat-show-res-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(root.join("images")).unwrap();
        std::fs::create_dir_all(root.join("musics")).unwrap();
        root
    }

    #[test]
    fn test_check_required_reports_every_missing_key() {
        let root = temp_tree("missing");
        std::fs::write(root.join("images/star_1.png"), b"x").unwrap();

        let res = Resources::scan(&root.join("images"), &root.join("musics"));
        let err = res
            .check_required(["star_1", "star_2"], ["base"])
            .unwrap_err();
        assert_eq!(err.keys(), vec!["star_2", "base"]);
        assert_eq!(err.items[0].expected, root.join("images").join("star_2.png"));
        assert_eq!(err.items[1].kind, ResourceKind::Music);
        assert_eq!(err.items[1].expected, root.join("musics").join("base.mp3"));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_scan_keys_by_stem() {
        let root = temp_tree("scan");
        std::fs::write(root.join("images/star_1.png"), b"x").unwrap();
        std::fs::write(root.join("musics/base.MP3"), b"x").unwrap();

        let res = Resources::scan(&root.join("images"), &root.join("musics"));
        assert!(res.has_image("star_1"));
        assert!(res.has_music("base"));
        assert!(res.check_required(["star_1"], ["base"]).is_ok());
        assert_eq!(
            res.summary(),
            ResourceSummary {
                images: vec!["star_1".into()],
                musics: vec!["base".into()],
            }
        );

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_directories_yield_empty_tables() {
        let root = std::env::temp_dir().join("beat-show-res-absent");
        let res = Resources::scan(&root.join("images"), &root.join("musics"));
        assert!(res.images().is_empty());
        assert!(res.music_path("base").is_none());
    }
}
