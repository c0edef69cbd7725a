//! Legenda - Batch Subtitle Translation
//!
//! Finds MKV containers lacking a target-language subtitle, extracts a text
//! subtitle track in the source language with mkvtoolnix and translates it
//! block by block through a LibreTranslate-compatible service, keeping
//! inline markup and cue layout intact.

pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod library;
pub mod media;
pub mod progress;
pub mod report;
pub mod shield;
pub mod subtitle;
pub mod tracks;
pub mod translate;
pub mod workflow;
