use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions accepted as product images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// A folder of product images found under the asset root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetGroup {
    /// Directory name exactly as found on disk (a raw category label)
    pub folder: String,
    /// Image file names, sorted
    pub files: Vec<String>,
}

impl AssetGroup {
    pub fn new(folder: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            folder: folder.into(),
            files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Read-only view over the product asset directory.
///
/// Every scan goes back to the filesystem, so scanning twice yields the same
/// groups unless the directory changed in between.
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Lazily yields one group per subdirectory of the root, in name order.
    ///
    /// A missing or unreadable root yields nothing.
    pub fn groups(&self) -> AssetGroups {
        let folders = match list_entries(&self.root, true) {
            Ok(folders) => folders,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Asset root not readable, skipping asset scan");
                Vec::new()
            }
        };

        debug!(root = %self.root.display(), folders = folders.len(), "Scanning asset folders");

        AssetGroups {
            root: self.root.clone(),
            folders: folders.into_iter(),
        }
    }

    /// First existing directory among `candidates`, with its images.
    pub fn find_group(&self, candidates: &[&str]) -> Option<AssetGroup> {
        let folder = candidates
            .iter()
            .find(|candidate| self.root.join(candidate).is_dir())?;

        Some(AssetGroup::new(*folder, self.image_files(folder)))
    }

    /// Image file names in `folder`; empty when the folder cannot be read.
    pub fn image_files(&self, folder: &str) -> Vec<String> {
        let dir = self.root.join(folder);
        match list_entries(&dir, false) {
            Ok(files) => files.into_iter().filter(|f| is_image_file(f)).collect(),
            Err(e) => {
                warn!(folder = %dir.display(), error = %e, "Asset folder not readable");
                Vec::new()
            }
        }
    }
}

/// Iterator returned by [`AssetCatalog::groups`]. Folder contents are read
/// only when the group is reached.
#[derive(Debug)]
pub struct AssetGroups {
    root: PathBuf,
    folders: std::vec::IntoIter<String>,
}

impl Iterator for AssetGroups {
    type Item = AssetGroup;

    fn next(&mut self) -> Option<Self::Item> {
        let folder = self.folders.next()?;
        let files = match list_entries(&self.root.join(&folder), false) {
            Ok(entries) => entries.into_iter().filter(|f| is_image_file(f)).collect(),
            Err(e) => {
                warn!(folder = %folder, error = %e, "Asset folder not readable");
                Vec::new()
            }
        };
        Some(AssetGroup::new(folder, files))
    }
}

/// Sorted entry names of `dir`, keeping directories or files only.
fn list_entries(dir: &Path, directories: bool) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // Follows symlinks, so a linked category folder counts as a directory
        if entry.path().is_dir() != directories {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(name = ?raw, "Skipping asset with non UTF-8 name"),
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn asset_tree(layout: &[(&str, &[&str])]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (folder, files) in layout {
            let path = dir.path().join(folder);
            fs::create_dir_all(&path).unwrap();
            for file in *files {
                File::create(path.join(file)).unwrap();
            }
        }
        dir
    }

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_image_file("watch.JPG"));
        assert!(is_image_file("watch.webp"));
        assert!(is_image_file("a.b.Jpeg"));
        assert!(!is_image_file("notes.txt"));
        assert!(!is_image_file("jpg"));
        assert!(!is_image_file(".DS_Store"));
    }

    #[test]
    fn groups_are_sorted_and_filtered() {
        let dir = asset_tree(&[
            ("watches", &["b.png", "a.webp", "readme.md"]),
            ("camera", &["c.gif"]),
        ]);
        File::create(dir.path().join("stray.png")).unwrap();

        let groups: Vec<AssetGroup> = AssetCatalog::new(dir.path()).groups().collect();
        assert_eq!(
            groups,
            vec![
                AssetGroup::new("camera", vec!["c.gif".into()]),
                AssetGroup::new("watches", vec!["a.webp".into(), "b.png".into()]),
            ]
        );
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let catalog = AssetCatalog::new(dir.path().join("absent"));
        assert!(!catalog.exists());
        assert_eq!(catalog.groups().count(), 0);
        assert_eq!(catalog.find_group(&["watches"]), None);
    }

    #[test]
    fn find_group_honours_candidate_order() {
        let dir = asset_tree(&[("mouse", &["m1.png"]), ("mice", &["m2.png"])]);
        let catalog = AssetCatalog::new(dir.path());

        let group = catalog.find_group(&["mice", "mouse"]).unwrap();
        assert_eq!(group.folder, "mice");
        assert_eq!(group.files, vec!["m2.png".to_string()]);

        let group = catalog.find_group(&["tv", "mouse"]).unwrap();
        assert_eq!(group.folder, "mouse");
    }

    #[test]
    fn rescanning_is_stable() {
        let dir = asset_tree(&[("speakers", &["s1.jpg", "s2.jpg"])]);
        let catalog = AssetCatalog::new(dir.path());
        let first: Vec<_> = catalog.groups().collect();
        let second: Vec<_> = catalog.groups().collect();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_folders_are_scanned() {
        let dir = asset_tree(&[("shared-watches", &["w1.png"])]);
        let root = TempDir::new().unwrap();
        std::os::unix::fs::symlink(dir.path().join("shared-watches"), root.path().join("watches"))
            .unwrap();

        let catalog = AssetCatalog::new(root.path());
        let groups: Vec<AssetGroup> = catalog.groups().collect();
        assert_eq!(groups, vec![AssetGroup::new("watches", vec!["w1.png".into()])]);
        assert_eq!(
            catalog.find_group(&["watches"]).map(|g| g.files),
            Some(vec!["w1.png".to_string()])
        );
    }
}
