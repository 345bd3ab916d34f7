// src/infrastructure/mod.rs
pub mod http;

pub use http::HttpNoteApi;
