use crate::address::join_addresses;
use crate::compose::{ComposeOutcome, Session};
use crate::error::{ComposeError, Result};
use crate::model::Message;

const RULE: &str = "================================================================";

/// Where the operator is in the post/edit/discard review of a rendered form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Previewing,
    Editing,
    Confirmed,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAnswer {
    Accept,
    Edit,
    Quit,
    Help,
}

impl ReviewAnswer {
    pub fn parse(input: &str) -> Self {
        match input {
            "" | "y" | "Y" => Self::Accept,
            "e" => Self::Edit,
            "q" => Self::Quit,
            _ => Self::Help,
        }
    }
}

impl ReviewState {
    pub fn on_answer(self, answer: ReviewAnswer) -> Self {
        match (self, answer) {
            (Self::Previewing, ReviewAnswer::Accept) => Self::Confirmed,
            (Self::Previewing, ReviewAnswer::Edit) => Self::Editing,
            (Self::Previewing, ReviewAnswer::Quit) => Self::Discarded,
            (state, _) => state,
        }
    }

    pub fn on_edited(self) -> Self {
        match self {
            Self::Editing => Self::Previewing,
            state => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Discarded)
    }
}

impl Session<'_> {
    /// Fills the message from a named form and lets the operator review it
    /// before posting.
    pub fn compose_with_template(
        &mut self,
        name: &str,
        reply: Option<&Message>,
    ) -> Result<ComposeOutcome> {
        let mut msg = self.compose_header(reply)?;

        let rendered = match self.forms.render(name, &msg.subject, reply) {
            Ok(rendered) => rendered,
            Err(err) => {
                let err = ComposeError::Template {
                    name: name.to_string(),
                    reason: format!("{:#}", err),
                };
                tracing::warn!(error = %err, "template rendering failed");
                self.prompt.warn(&format!("failed to compose message for template: {}", err))?;
                return Ok(ComposeOutcome::Aborted {
                    reason: err.to_string(),
                });
            }
        };
        msg.subject = rendered.subject;
        msg.attachments.extend(rendered.attachments);
        let mut body = rendered.body;

        self.show_preview(&msg, &body)?;
        let mut state = ReviewState::Previewing;
        while !state.is_terminal() {
            state = match state {
                ReviewState::Previewing => {
                    let answer =
                        ReviewAnswer::parse(&self.prompt.ask("Post message to outbox? [Y,q,e,?]: ")?);
                    if answer == ReviewAnswer::Help {
                        self.prompt.say("y = post message to outbox")?;
                        self.prompt.say("e = edit message body")?;
                        self.prompt.say("q = quit, discarding the message")?;
                    }
                    state.on_answer(answer)
                }
                ReviewState::Editing => {
                    body = self.compose_body(&body)?;
                    self.prompt.say(&body)?;
                    self.prompt.say(RULE)?;
                    state.on_edited()
                }
                ReviewState::Confirmed | ReviewState::Discarded => state,
            };
        }

        if state == ReviewState::Discarded {
            tracing::debug!(template = name, "template message discarded");
            return Ok(ComposeOutcome::Discarded);
        }
        msg.body = body;
        self.post(msg)
    }

    fn show_preview(&mut self, msg: &Message, body: &str) -> Result<()> {
        self.prompt.say(RULE)?;
        self.prompt.say(&format!("To: {}", join_addresses(&msg.to)))?;
        self.prompt.say(&format!("Cc: {}", join_addresses(&msg.cc)))?;
        self.prompt.say(&format!("From: {}", msg.from))?;
        self.prompt.say(&format!("Subject: {}", msg.subject))?;
        for att in &msg.attachments {
            self.prompt.say(&format!("Attachment: {}", att.name))?;
        }
        self.prompt.say(RULE)?;
        self.prompt.say(body)?;
        self.prompt.say(RULE)?;
        Ok(())
    }
}
