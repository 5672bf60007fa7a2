//! The positional byte reader the driver lexes against. Byte-range
//! mechanics and included-range snapping are this trait's problem; the
//! driver only ever calls through it.

use parsegraph_core::{Length, Symbol};

/// The three positions a completed lex leaves behind: where the token's
/// content started (after any skipped padding), where it ended, and how
/// far the lexer peeked past that end while disambiguating ("lookahead
/// bytes").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexedSpan {
    pub token_start: Length,
    pub token_end: Length,
    pub lookahead_end: Length,
}

/// A positional reader over the source bytes, respecting included ranges,
/// that also carries the grammar's compiled lex automaton.
/// `reset`/`start`/`advance`/`mark_end`/`finish` mirror tree-sitter's own
/// `TSLexer` struct; `lex` stands in for the generated parser's
/// per-state `lex_fn` table, which is itself built from these same five
/// primitives in the real implementation and so is grouped with them here
/// rather than modeled as a second external collaborator.
pub trait Lexer {
    /// Jump the cursor to an absolute position, discarding any in-progress
    /// token state.
    fn reset(&mut self, position: Length);

    /// Begin a new token: records the current cursor position as this
    /// token's content start.
    fn start(&mut self);

    /// The byte under the cursor, or `None` at EOF / past the last
    /// included range.
    fn current_byte(&self) -> Option<u8>;

    /// Advance the cursor by one byte, skipping transparently over any
    /// excluded range.
    fn advance(&mut self);

    /// Record the cursor's current position as this token's content end.
    /// A scanner may keep calling `advance` afterward to disambiguate; the
    /// extra bytes read become lookahead bytes.
    fn mark_end(&mut self);

    /// Finalize the in-progress token and return its measured span.
    fn finish(&mut self) -> LexedSpan;

    fn position(&self) -> Length;

    /// Recognize one token starting at the cursor under lex automaton
    /// `lex_state`, calling `start`/`advance`/`mark_end`/`finish`
    /// internally. Returns the recognized symbol, or `None` if nothing in
    /// this lex state matches at the cursor.
    fn lex(&mut self, lex_state: u16) -> Option<Symbol>;
}

/// A reference [`Lexer`] over a plain `&str`, with no included-range
/// splitting. Exists because lists the lexer's byte-range
/// mechanics as an external collaborator, but a runnable test suite needs
/// one concrete implementation.
pub struct TextLexer<'s> {
    text: &'s [u8],
    position: Length,
    token_start: Length,
    token_end: Option<Length>,
}

impl<'s> TextLexer<'s> {
    pub fn new(text: &'s str) -> Self {
        TextLexer { text: text.as_bytes(), position: Length::ZERO, token_start: Length::ZERO, token_end: None }
    }
}

impl Lexer for TextLexer<'_> {
    fn reset(&mut self, position: Length) {
        self.position = position;
        self.token_start = position;
        self.token_end = None;
    }

    fn start(&mut self) {
        self.token_start = self.position;
        self.token_end = None;
    }

    fn current_byte(&self) -> Option<u8> {
        self.text.get(self.position.bytes as usize).copied()
    }

    fn advance(&mut self) {
        if let Some(b) = self.current_byte() {
            let step = if b == b'\n' { Length::new(1, 1, 0) } else { Length::new(1, 0, 1) };
            self.position = self.position + step;
        }
    }

    fn mark_end(&mut self) {
        self.token_end = Some(self.position);
    }

    fn finish(&mut self) -> LexedSpan {
        let token_end = self.token_end.unwrap_or(self.position);
        LexedSpan { token_start: self.token_start, token_end, lookahead_end: self.position }
    }

    fn position(&self) -> Length {
        self.position
    }

    /// Reference recognizer for tests: skips leading whitespace as
    /// padding, then recognizes exactly one byte as a token whose symbol
    /// is that byte's value. `lex_state` is ignored — a real compiled
    /// lexer picks different automata per state; this one grammar-neutral
    /// rule is enough to drive the integration tests' hand-built grammars.
    fn lex(&mut self, _lex_state: u16) -> Option<Symbol> {
        while matches!(self.current_byte(), Some(b' ') | Some(b'\t') | Some(b'\n')) {
            self.advance();
        }
        self.start();
        let byte = self.current_byte()?;
        self.advance();
        self.mark_end();
        Some(byte as Symbol)
    }
}
