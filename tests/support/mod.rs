#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc;

use netpanel::backend::mock::MockBackend;
use netpanel::backend::SignalSender;
use netpanel::settings::SettingsStore;
use netpanel::{
    ManagerSignal, MemorySettingsStore, NetworkEntry, NetworkingController, Prompter, SeenNetworks,
    Ssid, TextPrompt,
};

/// Answers prompts from a fixed script and records what was asked.
///
/// An exhausted script cancels every text prompt and declines every
/// confirmation.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    confirms: VecDeque<bool>,
    pub text_prompts: Vec<TextPrompt>,
    pub confirm_messages: Vec<String>,
    /// Runs while each prompt is open.
    on_open: Option<Box<dyn FnMut()>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, answer: Option<&str>) -> Self {
        self.answers.push_back(answer.map(str::to_string));
        self
    }

    pub fn confirm_with(mut self, confirmed: bool) -> Self {
        self.confirms.push_back(confirmed);
        self
    }

    pub fn on_open(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_open = Some(Box::new(hook));
        self
    }

    /// Sends a `Refresh` while each prompt is open.
    pub fn emit_while_open(self, signals: SignalSender) -> Self {
        self.on_open(move || signals.send(ManagerSignal::Refresh).unwrap())
    }

    pub fn titles(&self) -> Vec<&str> {
        self.text_prompts.iter().map(|p| p.title.as_str()).collect()
    }

    fn open(&mut self) {
        if let Some(hook) = &mut self.on_open {
            hook();
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, prompt: &TextPrompt) -> Option<String> {
        self.open();
        self.text_prompts.push(prompt.clone());
        self.answers.pop_front().flatten()
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.open();
        self.confirm_messages.push(message.to_string());
        self.confirms.pop_front().unwrap_or(false)
    }
}

pub type TestPanel<S = MemorySettingsStore> = NetworkingController<MockBackend, S, ScriptedPrompter>;

pub fn seen(entries: Vec<NetworkEntry>) -> SeenNetworks {
    entries.into_iter().collect()
}

pub fn ssid(name: &str) -> Ssid {
    Ssid::from(name)
}

/// Active panel over `networks` with queued signals drained and the call
/// log cleared.
pub fn panel(networks: Vec<NetworkEntry>, known: &[&str], prompter: ScriptedPrompter) -> TestPanel {
    panel_with_settings(networks, known, prompter, MemorySettingsStore::new())
}

pub fn panel_with_settings<S: SettingsStore>(
    networks: Vec<NetworkEntry>,
    known: &[&str],
    prompter: ScriptedPrompter,
    settings: S,
) -> TestPanel<S> {
    let (tx, rx) = mpsc::channel();
    let backend = MockBackend::new().with_signals(tx);
    backend.set_networks(seen(networks));
    for name in known {
        backend.set_known(&ssid(name), true);
    }

    let mut panel = NetworkingController::new(backend, settings, prompter, rx);
    panel.activate();
    panel.process_signals();
    panel.manager().clear_calls();
    panel
}

/// Like [`panel`], with a sender into the panel's own signal channel.
pub fn panel_with_sender(
    networks: Vec<NetworkEntry>,
    prompter: impl FnOnce(SignalSender) -> ScriptedPrompter,
) -> TestPanel {
    let (tx, rx) = mpsc::channel();
    let backend = MockBackend::new().with_signals(tx.clone());
    backend.set_networks(seen(networks));

    let mut panel = NetworkingController::new(backend, MemorySettingsStore::new(), prompter(tx), rx);
    panel.activate();
    panel.process_signals();
    panel.manager().clear_calls();
    panel
}
