use crate::model::{DATE_FORMAT, Message};

/// Quoted copy of `reply` used to seed the editor.
pub fn build_citation(reply: &Message) -> String {
    let mut out = format!(
        "--- {} {} wrote: ---\n",
        reply.date.format(DATE_FORMAT),
        reply.from
    );
    for line in reply.body.lines() {
        out.push('>');
        out.push_str(line);
        out.push('\n');
    }
    out
}
