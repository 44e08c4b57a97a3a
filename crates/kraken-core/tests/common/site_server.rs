//! Runs a real kraken server over a throwaway demo site for integration tests.
//!
//! The server gets its own thread and current-thread runtime so tests can
//! stay blocking and drive it with `kraken_core::probe`.

#![allow(dead_code)]

use std::fs;
use std::net::TcpListener as StdTcpListener;
use std::path::{Path, PathBuf};
use std::thread;

use kraken_core::config::{KrakenConfig, SessionBackend};
use kraken_core::controllers::{demo, ControllerRegistry};
use kraken_core::server::{self, AppState};
use tempfile::TempDir;
use tokio::sync::oneshot;

pub const LOGO_LEN: usize = 12677;
pub const SECRET_KEY: &str = "6b72616b656e2d746573742d736563726574";

/// Write the demo site layout under `root`.
pub fn write_demo_site(root: &Path) {
    fs::create_dir_all(root.join("lorem/ipsum")).unwrap();
    fs::create_dir_all(root.join("__logo")).unwrap();
    fs::write(root.join("index.html"), "<html><body>Dyko root</body></html>\n").unwrap();
    fs::write(root.join(".hidden_template.html"), "secret\n").unwrap();
    fs::write(
        root.join("lorem/ipsum/index.txt"),
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n",
    )
    .unwrap();
    let logo: Vec<u8> = (0..LOGO_LEN).map(|i| (i % 251) as u8).collect();
    fs::write(root.join("__logo/dyko.png"), logo).unwrap();
    fs::write(root.join("__logo/.hidden_file"), "hidden\n").unwrap();
}

/// A running server; stops when dropped.
pub struct SiteServer {
    pub base_url: String,
    pub cookie_name: String,
    site: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SiteServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn site_root(&self) -> &Path {
        self.site.path()
    }
}

impl Drop for SiteServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Start a server over a fresh demo site with in-memory sessions.
pub fn start() -> SiteServer {
    start_with(|_| {})
}

/// Start a server with sqlite sessions stored at `db_path`.
pub fn start_sqlite(db_path: PathBuf) -> SiteServer {
    start_with(move |cfg| {
        cfg.session.backend = SessionBackend::Sqlite;
        cfg.session.sqlite_path = Some(db_path);
    })
}

/// Start a server after letting `customize` adjust the configuration.
pub fn start_with(customize: impl FnOnce(&mut KrakenConfig)) -> SiteServer {
    let site = tempfile::tempdir().unwrap();
    write_demo_site(site.path());

    let mut cfg = KrakenConfig {
        site_root: site.path().to_path_buf(),
        secret_key: Some(SECRET_KEY.to_string()),
        ..KrakenConfig::default()
    };
    customize(&mut cfg);

    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let cookie_name = cfg.session_cookie.clone();

    let (tx, rx) = oneshot::channel::<()>();
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let mut controllers = ControllerRegistry::new();
            demo::register(&mut controllers).unwrap();
            let state = AppState::from_config(&cfg, controllers).await.unwrap();
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let _ = ready_tx.send(());
            server::serve_on(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });
    });
    ready_rx.recv().unwrap();

    SiteServer {
        base_url: format!("http://{}", addr),
        cookie_name,
        site,
        shutdown: Some(tx),
        handle: Some(handle),
    }
}
