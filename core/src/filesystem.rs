//! 资源目录扫描

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use async_fs as afs;
use futures_lite::{StreamExt, stream};

/// 扫描目录下指定扩展名的文件，返回 `文件名去扩展名 → 路径`
///
/// - 扩展名比较不区分大小写
/// - 只收集普通文件，不递归子目录
/// - 同名键保留排序靠前的路径
///
/// # Errors
///
/// 目录不存在或无法读取
pub async fn scan_by_ext(dir: &Path, exts: &[&str]) -> io::Result<BTreeMap<String, PathBuf>> {
    let mut entries = afs::read_dir(dir).await?;
    let raw: Vec<io::Result<afs::DirEntry>> = StreamExt::collect(&mut entries).await;
    let items = raw.into_iter().collect::<io::Result<Vec<_>>>()?;

    let mut collected: Vec<(String, PathBuf)> = stream::iter(items)
        .then(|entry| async move {
            let Ok(ft) = entry.file_type().await else {
                return None;
            };
            if !ft.is_file() {
                return None;
            }
            let p = entry.path();
            let stem = p.file_stem().and_then(|s| s.to_str()).map(str::to_string)?;
            let ext = p.extension().and_then(|s| s.to_str())?;
            exts.iter()
                .any(|x| ext.eq_ignore_ascii_case(x))
                .then_some((stem, p))
        })
        .filter_map(|x| x)
        .collect()
        .await;
    collected.sort_by(|a, b| a.1.cmp(&b.1));

    let mut found = BTreeMap::new();
    for (stem, p) in collected {
        found.entry(stem).or_insert(p);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future;

    #[test]
    fn test_scan_filters_by_extension_case_insensitively() {
        let dir = std::env::temp_dir().join(format!("beat-show-scan-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested.png")).unwrap();
        for name in ["star_1.png", "star_2.PNG", "notes.txt", "base.mp3"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }

        let found = future::block_on(scan_by_ext(&dir, &["png"])).unwrap();
        let keys: Vec<&str> = found.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["star_1", "star_2"]);
        assert_eq!(found["star_1"], dir.join("star_1.png"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("beat-show-scan-does-not-exist");
        assert!(future::block_on(scan_by_ext(&dir, &["png"])).is_err());
    }
}
