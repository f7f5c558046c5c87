//! Incremental scanner for a stream of top-level JSON objects.
//!
//! Used for bodies that are one big JSON array (`[{...},\n{...}]`) delivered in
//! arbitrary pieces. The scanner does not parse JSON; it only finds the byte
//! span of each complete top-level object so it can be handed to `serde_json`.
//!
//! The automaton has three states and a depth counter:
//!
//! | state        | byte  | next state   | effect                          |
//! |--------------|-------|--------------|---------------------------------|
//! | `Structural` | `"`   | `InString`   |                                 |
//! | `Structural` | `{`   | `Structural` | depth += 1 (remember start at 0)|
//! | `Structural` | `}`   | `Structural` | depth -= 1 (emit span at 0)     |
//! | `InString`   | `\`   | `Escaped`    |                                 |
//! | `InString`   | `"`   | `Structural` |                                 |
//! | `Escaped`    | any   | `InString`   |                                 |
//!
//! State survives between calls to [`JsonObjectScanner::push`], so a chunk may
//! end anywhere: inside a string, right after a backslash, between objects.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ScanState {
    #[default]
    Structural,
    InString,
    Escaped,
}

/// Finds complete top-level `{...}` spans across chunk boundaries.
#[derive(Debug, Default)]
pub struct JsonObjectScanner {
    buffer: Vec<u8>,
    state: ScanState,
    depth: usize,
    /// Offset of the opening brace of the object in progress.
    start: Option<usize>,
    /// Everything before this offset has been fed through the automaton.
    cursor: usize,
}

impl JsonObjectScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return the raw bytes of every object it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);
        let mut objects = Vec::new();
        let mut emitted_through = 0;

        while self.cursor < self.buffer.len() {
            let pos = self.cursor;
            let byte = self.buffer[pos];
            self.cursor += 1;

            self.state = match (self.state, byte) {
                (ScanState::Escaped, _) => ScanState::InString,
                (ScanState::InString, b'\\') => ScanState::Escaped,
                (ScanState::InString, b'"') => ScanState::Structural,
                (ScanState::InString, _) => ScanState::InString,
                (ScanState::Structural, b'"') => ScanState::InString,
                (ScanState::Structural, b'{') => {
                    if self.depth == 0 {
                        self.start = Some(pos);
                    }
                    self.depth += 1;
                    ScanState::Structural
                }
                (ScanState::Structural, b'}') if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        if let Some(start) = self.start.take() {
                            objects.push(self.buffer[start..=pos].to_vec());
                            emitted_through = pos + 1;
                        }
                    }
                    ScanState::Structural
                }
                (ScanState::Structural, _) => ScanState::Structural,
            };
        }

        if emitted_through > 0 {
            self.buffer.drain(..emitted_through);
            self.cursor -= emitted_through;
            if let Some(start) = self.start.as_mut() {
                *start -= emitted_through;
            }
        }
        objects
    }

    /// Whether an object has been opened but not yet closed.
    pub fn has_partial_object(&self) -> bool {
        self.start.is_some()
    }

    /// Bytes held back for the next chunk.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }
}
