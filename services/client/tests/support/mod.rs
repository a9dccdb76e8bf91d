//! Helpers shared by the integration tests: a fake backend on a random local
//! port, wiring that mirrors the binary, and a log buffer for asserting on
//! `tracing` output.

#![allow(dead_code)]

use axum::Router;
use client_lib::adapters::{
    CatalogueContentService, HttpAuthAdapter, HttpContentAdapter, HttpDispatcher,
    HttpTestAdapter, MemoryMirror, MirroredTestService,
};
use client_lib::app::AppState;
use client_lib::config::ServiceEndpoints;
use quiz_core::ports::MirrorStorage;
use reqwest::Url;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Serves `routes` under `/api` and returns that base URL.
pub async fn spawn_backend(routes: Router) -> Url {
    let app = Router::new().nest("/api", routes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    Url::parse(&format!("http://{}/api", addr)).expect("base url")
}

/// A base URL nothing listens on.
pub fn unreachable_backend() -> Url {
    Url::parse("http://127.0.0.1:1/api").expect("base url")
}

pub fn dispatcher(base: Url) -> Arc<HttpDispatcher> {
    Arc::new(HttpDispatcher::new(ServiceEndpoints::uniform(base), None).expect("http client"))
}

/// The same wiring as the binary, against one base URL and an in-memory mirror.
pub fn wire_app(base: Url) -> (AppState, Arc<dyn MirrorStorage>) {
    let http = dispatcher(base.clone());
    let mirror: Arc<dyn MirrorStorage> = Arc::new(MemoryMirror::new());

    let app = AppState {
        auth: Arc::new(HttpAuthAdapter::new(http.clone())),
        tests: Arc::new(MirroredTestService::new(
            HttpTestAdapter::new(http.clone()),
            mirror.clone(),
        )),
        content: Arc::new(CatalogueContentService::new(HttpContentAdapter::new(http))),
        mirror: mirror.clone(),
    };
    (app, mirror)
}

#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

pub struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("lock output").clone();
        String::from_utf8(bytes).expect("utf8 log output")
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
