//! # chat-rag-client
//!
//! Client for a retrieval-augmented question-answering service: ingest web
//! sites, ask questions against them, pick the answering model, and manage
//! the ingested sites.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────┐   ┌─────────────┐
//! │  input   │──▶│ ClientController │──▶│   Backend   │──▶ HTTP service
//! │  / CLI   │   │  state + flows   │   │  (reqwest)  │
//! └──────────┘   └───┬──────────┬───┘   └─────────────┘
//!                    ▼          ▼
//!               ┌────────┐ ┌──────────────┐
//!               │  View  │ │ SessionStore │
//!               └────────┘ └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ragc --base-url http://127.0.0.1:8000 ingest https://docs.example.com
//! ragc ask "How do I deploy?"
//! ragc sites
//! ragc chat
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`api`] | `Backend` trait, HTTP transport, response decoding |
//! | [`chat`] | Interactive session |
//! | [`config`] | TOML configuration parsing |
//! | [`controller`] | Client state and request/response flows |
//! | [`format`] | Status messages and rendered text |
//! | [`input`] | Text inputs and the Enter/Shift+Enter contract |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`models`] | Wire types |
//! | [`storage`] | Persistent session id |
//! | [`view`] | Display surface |

pub mod api;
pub mod chat;
pub mod config;
pub mod controller;
pub mod format;
pub mod input;
pub mod logging;
pub mod models;
pub mod storage;
pub mod view;
