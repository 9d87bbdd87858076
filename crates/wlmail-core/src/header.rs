use crate::address::{cc_candidates, join_addresses, parse_address_list, resolve_cc};
use crate::compose::Session;
use crate::error::{ComposeError, Result};
use crate::model::{Address, Message, NO_SUBJECT, P2P_ONLY_FLAG};

const REPLY_PREFIX: &str = "Re:";

/// `Re: <subject>` with any existing prefix folded into one.
pub fn reply_subject(subject: &str) -> String {
    let trimmed = subject.trim();
    let rest = match trimmed.get(..REPLY_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(REPLY_PREFIX) => &trimmed[REPLY_PREFIX.len()..],
        _ => trimmed,
    };
    format!("{} {}", REPLY_PREFIX, rest.trim())
        .trim_end()
        .to_string()
}

impl Session<'_> {
    /// Asks the operator for From, To, Cc and Subject. A reply context
    /// supplies the defaults and fixes the subject.
    pub fn compose_header(&mut self, reply: Option<&Message>) -> Result<Message> {
        let from = self.prompt.ask(&format!("From [{}]: ", self.identity))?;
        let from = if from.is_empty() {
            self.identity.clone()
        } else {
            Address::new(from)
        };
        let mut msg = Message::new(from);

        let label = match reply {
            Some(r) => format!("To [{}]: ", r.from),
            None => "To: ".to_string(),
        };
        let to = self.prompt.ask(&label)?;
        match reply {
            Some(r) if to.is_empty() => msg.add_to(r.from.clone()),
            _ => msg.to.extend(parse_address_list(&to)),
        }

        let candidates = reply
            .map(|r| cc_candidates(r, &self.identity))
            .unwrap_or_default();
        let label = match reply {
            Some(_) => format!("Cc (! to remove cc's) [{}]: ", join_addresses(&candidates)),
            None => "Cc (! to remove cc's): ".to_string(),
        };
        let cc = self.prompt.ask(&label)?;
        for addr in resolve_cc(&cc, candidates) {
            msg.add_cc(addr);
        }

        match msg.receiver_count() {
            0 => {
                self.prompt.say("Message must have at least one recipient")?;
                return Err(ComposeError::NoRecipients);
            }
            1 => {
                let answer = self.prompt.ask("P2P only [y/N]: ")?;
                if answer.eq_ignore_ascii_case("y") {
                    msg.set_flag(P2P_ONLY_FLAG, "true");
                }
            }
            _ => {}
        }

        let subject = match reply {
            Some(r) => {
                let subject = reply_subject(&r.subject);
                self.prompt.say(&format!("Subject: {}", subject))?;
                subject
            }
            None => self.prompt.ask("Subject: ")?,
        };
        msg.subject = if subject.is_empty() {
            NO_SUBJECT.to_string()
        } else {
            subject
        };
        tracing::debug!(
            mid = %msg.id,
            receivers = msg.receiver_count(),
            reply = reply.is_some(),
            "header composed"
        );
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::reply_subject;
    use crate::error::ComposeError;
    use crate::model::{Address, Message, NO_SUBJECT};
    use crate::testing::{Harness, reply_fixture};

    #[test]
    fn reply_subject_never_doubles_the_prefix() {
        assert_eq!(reply_subject("Re: Stock report"), "Re: Stock report");
        assert_eq!(reply_subject("Stock report"), "Re: Stock report");
        assert_eq!(reply_subject("  RE:Stock report "), "Re: Stock report");
        assert_eq!(reply_subject(""), "Re:");
        for s in ["Re: Re: x", "x", "", "Re:", "re:   spaced  "] {
            let once = reply_subject(s);
            assert_eq!(reply_subject(&once), once);
        }
    }

    #[test]
    fn fresh_header_takes_typed_values() {
        let mut h = Harness::new("\nW1AW, K1ABC\nKB2XYZ\nField day\n");
        let msg = h.session(|s| s.compose_header(None)).unwrap();
        assert_eq!(msg.from, Address::new("N0CALL"));
        assert_eq!(msg.to, vec![Address::new("W1AW"), Address::new("K1ABC")]);
        assert_eq!(msg.cc, vec![Address::new("KB2XYZ")]);
        assert_eq!(msg.subject, "Field day");
        assert!(!msg.is_p2p_only());
    }

    #[test]
    fn empty_to_in_reply_defaults_to_original_sender() {
        let reply = reply_fixture();
        let mut h = Harness::new("\n\n\n");
        let msg = h.session(|s| s.compose_header(Some(&reply))).unwrap();
        assert_eq!(msg.to, vec![reply.from.clone()]);
        assert_eq!(msg.subject, "Re: Stock report");
        assert!(h.output().contains("Subject: Re: Stock report\n"));
    }

    #[test]
    fn reply_cc_defaults_to_other_receivers() {
        let reply = reply_fixture();
        let mut h = Harness::new("\n\n\n");
        let msg = h.session(|s| s.compose_header(Some(&reply))).unwrap();
        assert_eq!(msg.cc, vec![Address::new("K1ABC"), Address::new("KB2XYZ")]);
        assert!(msg.cc.iter().all(|a| *a != Address::new("n0call")));
        assert!(h.output().contains("Cc (! to remove cc's) [K1ABC, KB2XYZ]: "));
    }

    #[test]
    fn bang_drops_cc_candidates_and_asks_about_p2p() {
        let reply = reply_fixture();
        let mut h = Harness::new("\n\n!\ny\n");
        let msg = h.session(|s| s.compose_header(Some(&reply))).unwrap();
        assert!(msg.cc.is_empty());
        assert_eq!(msg.receiver_count(), 1);
        assert!(msg.is_p2p_only());
    }

    #[test]
    fn typed_cc_replaces_candidates() {
        let reply = reply_fixture();
        let mut h = Harness::new("\n\nLA5NTA\n\n");
        let msg = h.session(|s| s.compose_header(Some(&reply))).unwrap();
        assert_eq!(msg.cc, vec![Address::new("LA5NTA")]);
    }

    #[test]
    fn no_receivers_aborts_before_subject() {
        let mut h = Harness::new("\n\n\nnever read\n");
        let err = h.session(|s| s.compose_header(None)).unwrap_err();
        assert!(matches!(err, ComposeError::NoRecipients));
        assert!(h.output().contains("Message must have at least one recipient"));
        assert!(!h.output().contains("Subject:"));
    }

    #[test]
    fn blank_subject_gets_placeholder_and_from_override_is_kept() {
        let mut h = Harness::new("LA5NTA\nW1AW\n\n\n\n");
        let msg: Message = h.session(|s| s.compose_header(None)).unwrap();
        assert_eq!(msg.from, Address::new("LA5NTA"));
        assert_eq!(msg.subject, NO_SUBJECT);
    }
}
