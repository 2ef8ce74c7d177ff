//! Display surface driven by the controller.
//!
//! The controller never formats output for a particular device; it calls
//! [`View`] methods with finished strings. [`TerminalView`] prints them for
//! the `ragc` binary. [`MemoryView`] keeps the latest value of every display
//! area so flows can be asserted without a terminal.

use std::io::Write;
use std::sync::Mutex;

use crate::format;
use crate::models::ModelInfo;

/// The two mutually exclusive panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Ingest,
    Sites,
}

pub trait View: Send + Sync {
    /// Shows `panel` and hides the other one.
    fn show_panel(&self, panel: Panel);
    fn set_toggle_label(&self, label: &str);
    fn populate_models(&self, models: &[ModelInfo], selected: Option<&str>);
    fn show_ingest_output(&self, text: &str);
    fn show_answer(&self, text: &str);
    fn show_tokens(&self, text: &str);
    fn clear_sites(&self);
    fn render_sites(&self, sites: &[String]);
    fn show_sites_count(&self, text: &str);
    fn show_sites_status(&self, text: &str);
}

/// Prints updates to stdout.
///
/// Empty strings (cleared areas) print nothing.
#[derive(Default)]
pub struct TerminalView {
    /// Drops panel switches, label changes, and in-progress placeholders.
    one_shot: bool,
    hide_models: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view for single commands, where only results are worth printing.
    pub fn one_shot() -> Self {
        Self {
            one_shot: true,
            hide_models: false,
        }
    }

    pub fn without_models(mut self) -> Self {
        self.hide_models = true;
        self
    }

    fn line(&self, text: &str) {
        if text.is_empty() || (self.one_shot && is_placeholder(text)) {
            return;
        }
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

fn is_placeholder(text: &str) -> bool {
    matches!(
        text,
        format::INGESTING | format::THINKING | format::LOADING | format::TOKENS_PLACEHOLDER
    )
}

impl View for TerminalView {
    fn show_panel(&self, panel: Panel) {
        if self.one_shot {
            return;
        }
        match panel {
            Panel::Ingest => self.line("-- ingest --"),
            Panel::Sites => self.line("-- sites --"),
        }
    }

    fn set_toggle_label(&self, label: &str) {
        if self.one_shot {
            return;
        }
        self.line(&format!("(/sites: {})", label));
    }

    fn populate_models(&self, models: &[ModelInfo], selected: Option<&str>) {
        if self.hide_models {
            return;
        }
        if models.is_empty() {
            self.line("No models available.");
            return;
        }
        for model in models {
            let marker = if Some(model.id.as_str()) == selected {
                "*"
            } else {
                " "
            };
            self.line(&format!("{} {}", marker, model.id));
        }
    }

    fn show_ingest_output(&self, text: &str) {
        self.line(text);
    }

    fn show_answer(&self, text: &str) {
        self.line(text);
    }

    fn show_tokens(&self, text: &str) {
        self.line(text);
    }

    fn clear_sites(&self) {}

    fn render_sites(&self, sites: &[String]) {
        for site in sites {
            self.line(&format!("  {}", site));
        }
    }

    fn show_sites_count(&self, text: &str) {
        self.line(text);
    }

    fn show_sites_status(&self, text: &str) {
        self.line(text);
    }
}

/// Snapshot of everything a [`MemoryView`] displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub panel: Panel,
    pub toggle_label: String,
    pub models: Vec<String>,
    pub selected_model: Option<String>,
    pub ingest_output: String,
    pub answer: String,
    pub tokens: String,
    pub sites: Vec<String>,
    pub sites_count: String,
    pub sites_status: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            panel: Panel::Ingest,
            toggle_label: String::new(),
            models: Vec::new(),
            selected_model: None,
            ingest_output: String::new(),
            answer: String::new(),
            tokens: String::new(),
            sites: Vec::new(),
            sites_count: String::new(),
            sites_status: String::new(),
        }
    }
}

/// Keeps the current contents of every display area in memory.
#[derive(Default)]
pub struct MemoryView {
    state: Mutex<ViewState>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl View for MemoryView {
    fn show_panel(&self, panel: Panel) {
        self.lock().panel = panel;
    }

    fn set_toggle_label(&self, label: &str) {
        self.lock().toggle_label = label.to_string();
    }

    fn populate_models(&self, models: &[ModelInfo], selected: Option<&str>) {
        let mut state = self.lock();
        state.models = models.iter().map(|m| m.id.clone()).collect();
        state.selected_model = selected.map(str::to_string);
    }

    fn show_ingest_output(&self, text: &str) {
        self.lock().ingest_output = text.to_string();
    }

    fn show_answer(&self, text: &str) {
        self.lock().answer = text.to_string();
    }

    fn show_tokens(&self, text: &str) {
        self.lock().tokens = text.to_string();
    }

    fn clear_sites(&self) {
        self.lock().sites.clear();
    }

    fn render_sites(&self, sites: &[String]) {
        self.lock().sites.extend(sites.iter().cloned());
    }

    fn show_sites_count(&self, text: &str) {
        self.lock().sites_count = text.to_string();
    }

    fn show_sites_status(&self, text: &str) {
        self.lock().sites_status = text.to_string();
    }
}

impl ViewState {
    pub fn ingest_visible(&self) -> bool {
        self.panel == Panel::Ingest
    }

    pub fn sites_visible(&self) -> bool {
        self.panel == Panel::Sites
    }
}
