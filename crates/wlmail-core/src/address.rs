use std::collections::HashSet;

use crate::model::{Address, Message};

/// Cc answer that drops every suggested carbon copy.
pub const REMOVE_CC: &str = "!";

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

/// Splits free text into addresses, keeping their order and spelling.
pub fn parse_address_list(input: &str) -> Vec<Address> {
    input
        .split(is_delimiter)
        .filter(|part| !part.is_empty())
        .map(Address::new)
        .collect()
}

/// Takes each argument as one address, skipping blanks.
pub fn literal_addresses<I, S>(raw: I) -> Vec<Address>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|s| Address::new(s.as_ref()))
        .filter(|addr| !addr.is_empty())
        .collect()
}

pub fn dedup_addresses(addrs: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut seen = HashSet::new();
    addrs
        .into_iter()
        .filter(|addr| seen.insert(addr.clone()))
        .collect()
}

/// Everyone the original message went to, minus ourselves.
pub fn cc_candidates(reply: &Message, identity: &Address) -> Vec<Address> {
    dedup_addresses(
        reply
            .receivers()
            .filter(|addr| *addr != identity)
            .cloned(),
    )
}

pub fn resolve_cc(input: &str, candidates: Vec<Address>) -> Vec<Address> {
    match input {
        REMOVE_CC => Vec::new(),
        "" => candidates,
        other => parse_address_list(other),
    }
}

pub fn join_addresses(addrs: &[Address]) -> String {
    addrs
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{cc_candidates, literal_addresses, parse_address_list, resolve_cc};
    use crate::model::{Address, Message};

    fn addrs(list: &[&str]) -> Vec<Address> {
        list.iter().map(|s| Address::new(s)).collect()
    }

    #[test]
    fn splits_on_whitespace_commas_and_semicolons() {
        assert_eq!(
            parse_address_list(" LA5NTA, w1aw;foo@example.com  N0CALL,,"),
            addrs(&["LA5NTA", "W1AW", "foo@example.com", "N0CALL"])
        );
        assert!(parse_address_list("  ,  ").is_empty());
    }

    #[test]
    fn literal_addresses_drop_blank_arguments() {
        assert_eq!(
            literal_addresses(["W1AW", "", "  ", "N0CALL"]),
            addrs(&["W1AW", "N0CALL"])
        );
    }

    #[test]
    fn cc_candidates_exclude_identity_and_duplicates() {
        let mut reply = Message::new(Address::new("W1AW"));
        reply.to = addrs(&["n0call", "K1ABC"]);
        reply.cc = addrs(&["N0CALL", "k1abc", "KB2XYZ"]);
        let got = cc_candidates(&reply, &Address::new("N0CALL"));
        assert_eq!(got, addrs(&["K1ABC", "KB2XYZ"]));
    }

    #[test]
    fn bang_removes_all_candidates() {
        assert!(resolve_cc("!", addrs(&["K1ABC", "KB2XYZ"])).is_empty());
        assert_eq!(resolve_cc("", addrs(&["K1ABC"])), addrs(&["K1ABC"]));
        assert_eq!(
            resolve_cc("W1AW", addrs(&["K1ABC"])),
            addrs(&["W1AW"])
        );
    }
}
