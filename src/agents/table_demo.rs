//! Deterministic content-generation handler
//!
//! Produces a fixed templated HTML table for a topic. No external
//! dependency; exists to exercise the render-hint path end to end.

use crate::message::{Message, RenderHint};

/// Placeholder topic when the dispatch arguments carry none
pub const UNKNOWN_TOPIC: &str = "Unbekannt";

pub struct TableDemoAgent;

impl TableDemoAgent {
    /// Reads the `topic` argument from the last message's dispatch
    /// instruction and returns the caption plus HTML artifact.
    pub fn handle(&self, history: &[Message]) -> Message {
        let topic = history
            .last()
            .and_then(|msg| msg.dispatch.as_ref())
            .and_then(|dispatch| dispatch.argument("topic"))
            .unwrap_or(UNKNOWN_TOPIC);

        let caption = format!("Hier ist die angeforderte HTML-Tabelle zum Thema '{topic}'.");
        Message::assistant_with_hint(caption, RenderHint::html(render_table(topic)))
    }
}

fn render_table(topic: &str) -> String {
    format!(
        concat!(
            "<h4>Ergebnis-Tabelle für '{topic}'</h4>\n",
            "<table border=\"1\" style=\"width:100%; border-collapse: collapse; ",
            "border-radius: 8px; overflow: hidden;\">\n",
            "  <tr style=\"background-color: #f2f2f2;\">",
            "<th style=\"padding: 8px;\">Spalte 1</th>",
            "<th style=\"padding: 8px;\">Spalte 2</th></tr>\n",
            "  <tr><td style=\"padding: 8px;\">Daten A</td>",
            "<td style=\"padding: 8px;\">123</td></tr>\n",
            "  <tr><td style=\"padding: 8px;\">Daten B</td>",
            "<td style=\"padding: 8px;\">456</td></tr>\n",
            "</table>"
        ),
        topic = topic
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DispatchInstruction, RenderKind};

    fn dispatch_message(instruction: DispatchInstruction) -> Message {
        Message::assistant_dispatch("", instruction)
    }

    #[test]
    fn payload_is_byte_identical_for_same_topic() {
        let agent = TableDemoAgent;
        let history = vec![dispatch_message(
            DispatchInstruction::new("content_generation").with_argument("topic", "Umsatz"),
        )];
        let first = agent.handle(&history);
        let second = agent.handle(&history);
        assert_eq!(
            first.render_hint.as_ref().unwrap().payload,
            second.render_hint.as_ref().unwrap().payload
        );
    }

    #[test]
    fn topic_appears_in_caption_and_payload() {
        let agent = TableDemoAgent;
        let history = vec![dispatch_message(
            DispatchInstruction::new("content_generation").with_argument("topic", "sales"),
        )];
        let reply = agent.handle(&history);
        let hint = reply.render_hint.as_ref().unwrap();
        assert_eq!(hint.kind, RenderKind::Html);
        assert!(reply.text.contains("sales"));
        assert!(hint.payload.contains("sales"));
        assert!(hint.payload.contains("<table"));
    }

    #[test]
    fn missing_topic_falls_back_to_placeholder() {
        let agent = TableDemoAgent;
        let history = vec![dispatch_message(DispatchInstruction::new(
            "content_generation",
        ))];
        let reply = agent.handle(&history);
        assert!(reply.text.contains(UNKNOWN_TOPIC));
        assert!(reply.render_hint.as_ref().unwrap().payload.contains(UNKNOWN_TOPIC));
    }

    #[test]
    fn missing_dispatch_also_falls_back() {
        let agent = TableDemoAgent;
        let reply = agent.handle(&[Message::user("Tabelle")]);
        assert!(reply.text.contains(UNKNOWN_TOPIC));
    }
}
