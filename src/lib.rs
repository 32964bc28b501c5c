//! OCR Gateway Library
//!
//! A thin HTTP front-end that accepts image uploads, queues them, and runs
//! text detection against a limited-concurrency OCR engine. The binary lives
//! in main.rs; this crate exposes the pieces integration tests build on.
//!
//! # Modules
//!
//! - `admission`: queue, request store, notifier set, and reaper
//! - `ocr`: detection engine, preprocessing adapter, and result types
//! - `routes`: the HTTP surface

pub mod admission;
pub mod config;
pub mod error;
pub mod ocr;
pub mod routes;
pub mod state;
