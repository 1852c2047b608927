//! ffstage - staged media operations on top of ffmpeg
//!
//! Audio extraction, compression, container conversion, trimming and
//! metadata inspection. Every operation stages the uploaded bytes to a
//! scoped temporary file, runs ffmpeg or ffprobe against it, and removes
//! every temporary file before returning.

pub mod cli;
pub mod config;
pub mod error;
pub mod formats;
pub mod pipeline;
pub mod timecode;
pub mod tools;
