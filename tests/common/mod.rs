//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which points a default configuration at a
//! temporary cache directory and builds the full [`AppContext`] and router.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;
use tower::ServiceExt;

use imgcache::config::Config;
use imgcache::server::{create_router, AppContext};

/// Test harness wrapping an [`AppContext`] backed by a temporary directory.
pub struct TestHarness {
    pub ctx: AppContext,
    dir: TempDir,
}

impl TestHarness {
    /// Create a harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a harness from `config`, overriding its cache root.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        config.store.root = dir.path().to_path_buf();
        let ctx = AppContext::new(config);
        Self { ctx, dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Send one request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router()
            .oneshot(request)
            .await
            .expect("router call failed")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// PUT /push with `data` base64-encoded.
    pub async fn push(&self, data: &[u8]) -> Response<Body> {
        let body = serde_json::json!({ "encimg": imgcache_store::codec::encode(data) });
        self.send(
            Request::put("/push")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Encode a `width`x`height` test image in `format`.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Jpeg)
}
