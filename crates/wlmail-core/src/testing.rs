//! In-memory collaborators for the engine's unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;

use anyhow::{Result, anyhow};
use chrono::{TimeZone, Utc};

use crate::collab::{Delivery, MessageLoader, TemplateRenderer, TemplateResult, TextEditor};
use crate::compose::Session;
use crate::model::{Address, Attachment, Message, MessageId};
use crate::prompt::Prompt;

pub(crate) fn reply_fixture() -> Message {
    let mut msg = Message::new(Address::new("W1AW"));
    msg.id = MessageId::from("REPLYMID0001".to_string());
    msg.date = Utc
        .with_ymd_and_hms(2024, 3, 9, 14, 5, 0)
        .single()
        .unwrap_or_default();
    msg.to = vec![Address::new("N0CALL"), Address::new("K1ABC")];
    msg.cc = vec![Address::new("KB2XYZ"), Address::new("k1abc")];
    msg.subject = "Re: Stock report".to_string();
    msg.body = "Inventory is low.\n".to_string();
    msg.attachments = vec![Attachment::new("stock.csv", b"item,qty\ncots,3\n".to_vec())];
    msg
}

pub(crate) struct MapLoader(HashMap<String, Message>);

impl MapLoader {
    pub(crate) fn with(reference: &str, msg: Message) -> Self {
        Self(HashMap::from([(reference.to_string(), msg)]))
    }
}

impl MessageLoader for MapLoader {
    fn load(&self, reference: &str) -> Result<Message> {
        self.0
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow!("no message {}", reference))
    }
}

/// Returns queued answers in order, echoing the seed once they run out.
#[derive(Default)]
pub(crate) struct ScriptedEditor {
    answers: VecDeque<Result<String>>,
    pub(crate) seeds: Vec<String>,
}

impl ScriptedEditor {
    pub(crate) fn respond(&mut self, text: &str) {
        self.answers.push_back(Ok(text.to_string()));
    }

    pub(crate) fn fail(&mut self, reason: &str) {
        self.answers.push_back(Err(anyhow!(reason.to_string())));
    }
}

impl TextEditor for ScriptedEditor {
    fn edit_text(&mut self, seed: &str) -> Result<String> {
        self.seeds.push(seed.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| Ok(seed.to_string()))
    }
}

#[derive(Default)]
pub(crate) struct FakeForms {
    pub(crate) result: Option<TemplateResult>,
    pub(crate) calls: RefCell<Vec<(String, String, bool)>>,
}

impl TemplateRenderer for FakeForms {
    fn render(
        &self,
        name: &str,
        subject_hint: &str,
        reply: Option<&Message>,
    ) -> Result<TemplateResult> {
        self.calls.borrow_mut().push((
            name.to_string(),
            subject_hint.to_string(),
            reply.is_some(),
        ));
        self.result
            .clone()
            .ok_or_else(|| anyhow!("template {} not found", name))
    }
}

#[derive(Default)]
pub(crate) struct RecordingOutbox {
    pub(crate) delivered: Vec<Message>,
    pub(crate) fail: bool,
}

impl Delivery for RecordingOutbox {
    fn deliver(&mut self, message: &Message) -> Result<()> {
        if self.fail {
            return Err(anyhow!("outbox is read-only"));
        }
        self.delivered.push(message.clone());
        Ok(())
    }
}

/// Owns the fakes and the scripted terminal for one compose run.
pub(crate) struct Harness {
    input: String,
    output: Vec<u8>,
    diagnostics: Vec<u8>,
    pub(crate) editor: ScriptedEditor,
    pub(crate) forms: FakeForms,
    pub(crate) outbox: RecordingOutbox,
}

impl Harness {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            output: Vec::new(),
            diagnostics: Vec::new(),
            editor: ScriptedEditor::default(),
            forms: FakeForms::default(),
            outbox: RecordingOutbox::default(),
        }
    }

    pub(crate) fn session<T>(&mut self, f: impl FnOnce(&mut Session<'_>) -> T) -> T {
        let prompt = Prompt::new(Cursor::new(self.input.clone().into_bytes()), &mut self.output)
            .with_diagnostics(&mut self.diagnostics);
        let mut session = Session::new(
            Address::new("N0CALL"),
            prompt,
            &mut self.editor,
            &self.forms,
            &mut self.outbox,
        );
        f(&mut session)
    }

    pub(crate) fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub(crate) fn diagnostics(&self) -> String {
        String::from_utf8_lossy(&self.diagnostics).into_owned()
    }
}
