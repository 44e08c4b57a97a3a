//! Page files exposed as a kalamar store.
//!
//! The access point is a directory relative to the site root (`""` for the
//! root, `"lorem/ipsum"` below it) and the query is a file stem: searching
//! `("lorem/ipsum", "index")` yields every `index.<ext>` file there.

use std::fs;
use std::path::{Path, PathBuf};

use crate::kalamar::{AccessPoint, Items, SiteError, Store};

/// Read-only store over the page files of a site directory.
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_for(&self, access_point: &AccessPoint) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in access_point.as_str().split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        dir
    }
}

/// `name` is `<stem>.<ext>` with a non-empty extension.
fn has_stem(name: &str, stem: &str) -> bool {
    name.rsplit_once('.')
        .map_or(false, |(s, ext)| s == stem && !ext.is_empty())
}

impl Store for PageStore {
    type Item = PathBuf;
    type Query = str;

    fn search<'a>(
        &'a self,
        access_point: &AccessPoint,
        stem: &str,
    ) -> Result<Items<'a, PathBuf>, SiteError> {
        let dir = self.dir_for(access_point);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) if !dir.is_dir() => return Ok(Box::new(std::iter::empty())),
            Err(e) => return Err(SiteError::backend(e)),
        };
        let stem = stem.to_string();
        Ok(Box::new(
            entries
                .filter_map(Result::ok)
                .filter(move |entry| {
                    entry
                        .file_name()
                        .to_str()
                        .map_or(false, |name| has_stem(name, &stem))
                })
                .filter(|entry| entry.file_type().map_or(false, |t| t.is_file()))
                .map(|entry| entry.path()),
        ))
    }

    fn save(&self, _item: &PathBuf) -> Result<(), SiteError> {
        Err(SiteError::Unimplemented { operation: "save" })
    }

    fn remove(&self, _item: &PathBuf) -> Result<(), SiteError> {
        Err(SiteError::Unimplemented {
            operation: "remove",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_need_an_extension() {
        assert!(has_stem("index.html", "index"));
        assert!(has_stem(".hidden_template.html", ".hidden_template"));
        assert!(has_stem("archive.tar.gz", "archive.tar"));
        assert!(!has_stem("index", "index"));
        assert!(!has_stem("index.", "index"));
        assert!(!has_stem("indexes.html", "index"));
    }

    #[test]
    fn search_lists_matching_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "a").unwrap();
        fs::write(dir.path().join("index.txt"), "b").unwrap();
        fs::write(dir.path().join("other.html"), "c").unwrap();
        fs::create_dir(dir.path().join("index.d")).unwrap();

        let store = PageStore::new(dir.path());
        let mut found: Vec<PathBuf> = store
            .search(&AccessPoint::new(""), "index")
            .unwrap()
            .collect();
        found.sort();
        assert_eq!(
            found,
            [dir.path().join("index.html"), dir.path().join("index.txt")]
        );
    }

    #[test]
    fn missing_directory_is_an_empty_search() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.html"), "x").unwrap();
        let store = PageStore::new(dir.path());
        let ap = AccessPoint::new("nope/deeper");
        assert_eq!(store.search(&ap, "index").unwrap().count(), 0);
        let ap = AccessPoint::new("about.html");
        assert_eq!(store.search(&ap, "index").unwrap().count(), 0);
    }

    #[test]
    fn pages_are_read_only() {
        let store = PageStore::new("/srv/site");
        assert!(matches!(
            store.save(&PathBuf::from("/srv/site/index.html")),
            Err(SiteError::Unimplemented { operation: "save" })
        ));
    }
}
