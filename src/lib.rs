//! # Viroscope - Viral Genome Analysis Assistant
//!
//! A terminal assistant that loads one viral genome, charts its nucleotide
//! composition, k-mer frequencies and codon usage, and asks a local LLM
//! (an Ollama-compatible endpoint) for written analyses.
//!
//! ## Architecture
//!
//! The application follows an event-driven architecture with clear separation:
//! - `formats`: Upload decoding and sequence extraction (FASTA, GenBank, raw)
//! - `stats`: Composition, k-mer and codon statistics with chart descriptors
//! - `prompt`: Analysis catalog and prompt templates
//! - `gateway`: Blocking HTTP client for the text-generation endpoint
//! - `worker`: Background thread that answers prompts one at a time
//! - `model`: Session state (upload, widgets, transcripts, request queue)
//! - `event`: Keyboard event handling
//! - `ui`: TUI rendering with ratatui
//! - `controller`: Orchestration of state transitions
//! - `report`: Plain-text output for batch mode

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod formats;
pub mod gateway;
pub mod genetic_code;
pub mod model;
pub mod prompt;
pub mod report;
pub mod stats;
pub mod ui;
pub mod worker;
