// src/lib.rs

//! Job Scout Library
//!
//! Collects job postings, keeps the junior-level ones and scores them
//! against a candidate profile.

pub mod classifier;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
