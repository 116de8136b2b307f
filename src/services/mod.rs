// src/services/mod.rs
pub mod editor;
pub mod gemini_service;
pub mod image_processor;
pub mod prompt_builder;
pub mod session_store;

pub use gemini_service::{GeminiService, ImageEditor};
pub use image_processor::ImageProcessor;
pub use session_store::SessionStore;
