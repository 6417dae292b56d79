//! JSON diff builder.
//!
//! Emits the diff as an array of tagged event objects, one per builder
//! callback, serialized with `serde_json` at `end()`. Line content is
//! passed through `String::from_utf8_lossy` so the output is always
//! valid JSON even for non-UTF-8 input.

use bstr::BStr;
use serde::Serialize;

use super::DiffBuilder;

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Event {
    Skip { left: u32, right: u32 },
    Common { text: String },
    Insert { text: String },
    Delete { text: String },
    Replace { left: String, right: String },
    Edit { left: String, right: String },
}

fn lossy(line: &BStr) -> String {
    String::from_utf8_lossy(line).into_owned()
}

pub struct JsonBuilder {
    events: Vec<Event>,
}

impl JsonBuilder {
    pub fn new() -> Self {
        JsonBuilder { events: Vec::new() }
    }
}

impl DiffBuilder for JsonBuilder {
    fn skip(&mut self, n_left: u32, n_right: u32, _is_final: bool) {
        self.events.push(Event::Skip {
            left: n_left,
            right: n_right,
        });
    }

    fn common(&mut self, line: &BStr) {
        self.events.push(Event::Common { text: lossy(line) });
    }

    fn insert(&mut self, line: &BStr) {
        self.events.push(Event::Insert { text: lossy(line) });
    }

    fn delete(&mut self, line: &BStr) {
        self.events.push(Event::Delete { text: lossy(line) });
    }

    fn replace(&mut self, left: &BStr, right: &BStr) {
        self.events.push(Event::Replace {
            left: lossy(left),
            right: lossy(right),
        });
    }

    fn edit(&mut self, left: &BStr, right: &BStr) {
        self.events.push(Event::Edit {
            left: lossy(left),
            right: lossy(right),
        });
    }

    fn end(&mut self) -> String {
        let events = std::mem::take(&mut self.events);
        // Serialization of strings and integers cannot fail.
        serde_json::to_string(&events).unwrap_or_default()
    }
}
