//! Site directory layout: pages under `site_root` and static mounts.
//!
//! Pages are served verbatim. A path ending in `/` looks for `index.<ext>`
//! in that directory; any other path looks for `<name>.<ext>` in its parent.
//! Static mounts map their prefix to a directory and serve files by exact
//! name. A target behind a dot-prefixed segment is reported as hidden only
//! when it exists, so unknown hidden paths stay indistinguishable from any
//! other missing path.

mod mime;
mod pages;
mod path;

pub use mime::content_type_for;
pub use pages::PageStore;
pub use path::RequestPath;

use crate::config::KrakenConfig;
use crate::kalamar::{AccessPoint, Site, SiteError};
use std::path::{Path, PathBuf};

/// Where a request path lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// An existing file that may be served.
    File(PathBuf),
    /// An existing file behind a dot-prefixed segment.
    Hidden,
    /// A page directory requested without its trailing slash.
    NeedsSlash,
    /// Nothing on disk matches.
    Missing,
}

/// Filesystem view of a kraken site.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    pages: Site<PageStore>,
    mounts: Vec<(String, PathBuf)>,
}

impl SiteLayout {
    pub fn new(root: impl Into<PathBuf>, mounts: Vec<(String, PathBuf)>) -> Self {
        Self {
            pages: Site::new(PageStore::new(root)),
            mounts,
        }
    }

    pub fn from_config(cfg: &KrakenConfig) -> Self {
        let mounts = cfg
            .static_mounts
            .iter()
            .map(|m| (m.prefix.trim_matches('/').to_string(), cfg.mount_dir(m)))
            .collect();
        Self::new(cfg.site_root.clone(), mounts)
    }

    pub fn root(&self) -> &Path {
        self.pages.store().root()
    }

    /// The mount directory and remaining path when `path` targets a mount.
    pub fn mount_for(&self, path: &RequestPath) -> Option<(&Path, RequestPath)> {
        self.mounts.iter().find_map(|(prefix, dir)| {
            path.strip_prefix(prefix)
                .map(|rest| (dir.as_path(), rest))
        })
    }

    /// Resolve the remainder of a static-mount request inside `dir`.
    pub async fn lookup_static(dir: &Path, rest: &RequestPath) -> Lookup {
        if rest.segments().is_empty() || rest.is_directory() {
            return Lookup::Missing;
        }
        let file = join_segments(dir, rest.segments());
        if !is_file(&file).await {
            return Lookup::Missing;
        }
        if rest.is_hidden() {
            Lookup::Hidden
        } else {
            Lookup::File(file)
        }
    }

    /// Resolve a page request against the site root.
    ///
    /// Blocking. Several files sharing the requested name (`index.html` and
    /// `index.txt`, say) are reported as
    /// [`NotExactlyOne::MultipleResultsFound`](crate::kalamar::NotExactlyOne).
    pub fn lookup_page(&self, path: &RequestPath) -> Result<Lookup, SiteError> {
        let segments = path.segments();
        if path.is_directory() {
            return Ok(match self.find_page(segments, "index")? {
                Some(file) => visible_or_hidden(path, file),
                None => Lookup::Missing,
            });
        }

        let Some((name, parents)) = segments.split_last() else {
            return Ok(Lookup::Missing);
        };
        if let Some(file) = self.find_page(parents, name)? {
            return Ok(visible_or_hidden(path, file));
        }
        if self.find_page(segments, "index")?.is_some() {
            return Ok(if path.is_hidden() {
                Lookup::Hidden
            } else {
                Lookup::NeedsSlash
            });
        }
        Ok(Lookup::Missing)
    }

    fn find_page(&self, dir: &[String], stem: &str) -> Result<Option<PathBuf>, SiteError> {
        match self.pages.open(&AccessPoint::new(dir.join("/")), stem) {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn visible_or_hidden(path: &RequestPath, file: PathBuf) -> Lookup {
    if path.is_hidden() {
        Lookup::Hidden
    } else {
        Lookup::File(file)
    }
}

fn join_segments(base: &Path, segments: &[String]) -> PathBuf {
    let mut out = base.to_path_buf();
    for segment in segments {
        out.push(segment);
    }
    out
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
