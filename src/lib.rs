// src/lib.rs

//! mojiset: collects the Japanese characters used across a website.

pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
