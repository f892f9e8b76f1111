//! 图片解码与缓存
//!
//! 按资源键加载 PNG，缓存解码后的 RGBA 图像及其缩放版本。

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
    sync::Arc,
};

use async_fs as afs;
use futures_lite::future;
use image::{ImageError, RgbaImage, imageops::FilterType};
use tracing::debug;

use crate::ShowError;
use crate::resources::Resources;

/// 缩放缓存键：资源键 + 千分比缩放
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ScaledKey {
    /// 资源键
    key: String,
    /// 缩放比例 × 1000
    permille: u32,
}

/// 图片缓存
#[derive(Debug, Default)]
pub struct ImageStore {
    /// 资源键到文件路径的映射
    paths: BTreeMap<String, PathBuf>,
    /// 原始尺寸的解码结果
    decoded: HashMap<String, Arc<RgbaImage>>,
    /// 缩放后的解码结果
    scaled: HashMap<ScaledKey, Arc<RgbaImage>>,
}

impl ImageStore {
    /// 以资源扫描结果创建
    #[must_use]
    pub fn new(resources: &Resources) -> Self {
        Self {
            paths: resources.images().clone(),
            ..Self::default()
        }
    }

    /// 直接登记一张已解码的图片（无需文件）
    pub fn insert(&mut self, key: impl Into<String>, image: RgbaImage) {
        self.decoded.insert(key.into(), Arc::new(image));
    }

    /// 是否能解析该键
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.decoded.contains_key(key) || self.paths.contains_key(key)
    }

    /// 按原始尺寸加载
    ///
    /// # Errors
    ///
    /// - 键无法解析：`ShowError::UnknownImage`
    /// - 文件读取或解码失败：`ShowError::Image`
    pub fn load(&mut self, key: &str) -> Result<Arc<RgbaImage>, ShowError> {
        if let Some(img) = self.decoded.get(key) {
            return Ok(img.clone());
        }
        let path = self.paths.get(key).ok_or_else(|| ShowError::UnknownImage {
            key: key.to_string(),
        })?;
        let bytes = future::block_on(afs::read(path)).map_err(ImageError::IoError)?;
        let rgba = Arc::new(image::load_from_memory(&bytes)?.to_rgba8());
        debug!(key, width = rgba.width(), height = rgba.height(), "图片已解码");
        self.decoded.insert(key.to_string(), rgba.clone());
        Ok(rgba)
    }

    /// 按比例缩放后加载（结果按比例缓存）
    ///
    /// # Errors
    ///
    /// 同 [`ImageStore::load`]
    pub fn scaled(&mut self, key: &str, scale: f32) -> Result<Arc<RgbaImage>, ShowError> {
        let permille = (scale.max(0.0) * 1000.0).round() as u32;
        if permille == 1000 {
            return self.load(key);
        }
        let cache_key = ScaledKey {
            key: key.to_string(),
            permille,
        };
        if let Some(img) = self.scaled.get(&cache_key) {
            return Ok(img.clone());
        }
        let original = self.load(key)?;
        let resized = Arc::new(scale_image(&original, scale));
        self.scaled.insert(cache_key, resized.clone());
        Ok(resized)
    }

    /// 返回候选键中第一个可解析的键
    #[must_use]
    pub fn first_available<'a>(&self, keys: &[&'a str]) -> Option<&'a str> {
        keys.iter().copied().find(|k| self.contains(k))
    }
}

/// 按比例缩放图片（尺寸至少为 1×1）
#[must_use]
pub fn scale_image(image: &RgbaImage, scale: f32) -> RgbaImage {
    let w = ((image.width() as f32 * scale) as u32).max(1);
    let h = ((image.height() as f32 * scale) as u32).max(1);
    image::imageops::resize(image, w, h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_images_are_cached_per_scale() {
        let mut store = ImageStore::default();
        store.insert("star_1", RgbaImage::new(100, 50));
        let half = store.scaled("star_1", 0.5).unwrap();
        assert_eq!(half.dimensions(), (50, 25));
        let again = store.scaled("star_1", 0.5).unwrap();
        assert!(Arc::ptr_eq(&half, &again));
        let full = store.scaled("star_1", 1.0).unwrap();
        assert_eq!(full.dimensions(), (100, 50));
    }

    #[test]
    fn test_unknown_key_is_reported() {
        let mut store = ImageStore::default();
        assert!(matches!(
            store.load("nope"),
            Err(ShowError::UnknownImage { key }) if key == "nope"
        ));
    }

    #[test]
    fn test_first_available_prefers_earlier_keys() {
        let mut store = ImageStore::default();
        store.insert("star_1", RgbaImage::new(1, 1));
        assert_eq!(store.first_available(&["star_2", "star_1"]), Some("star_1"));
        assert_eq!(store.first_available(&["star_3"]), None);
    }
}
