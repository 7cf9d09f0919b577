//! Output Emitter
//!
//! Abstraction for text production during emission. Headers and bodies are
//! built in memory with [`StringEmitter`]; statements nested inside a
//! statement expression are printed on one line through [`InlineEmitter`].

/// Trait for emitting generated text.
pub trait Emitter {
    /// Emit a text fragment.
    fn emit(&mut self, text: &str);

    /// Emit a line break.
    fn emit_newline(&mut self);

    /// Emit indentation for nesting `level`.
    fn emit_indent(&mut self, level: usize);

    /// Emit a single space.
    fn emit_space(&mut self);
}

/// String-based emitter.
///
/// Builds a string incrementally; the indentation width is fixed at
/// construction.
pub struct StringEmitter {
    buffer: String,
    indent_width: usize,
}

impl Default for StringEmitter {
    fn default() -> Self {
        Self::new(4)
    }
}

impl StringEmitter {
    /// Create a new string emitter indenting `indent_width` spaces per level.
    pub fn new(indent_width: usize) -> Self {
        StringEmitter {
            buffer: String::new(),
            indent_width,
        }
    }

    /// Create with pre-allocated capacity.
    pub fn with_capacity(indent_width: usize, capacity: usize) -> Self {
        StringEmitter {
            buffer: String::with_capacity(capacity),
            indent_width,
        }
    }

    /// Get the generated output.
    pub fn output(self) -> String {
        self.buffer
    }

    /// Get the current buffer contents without consuming.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Ensure the output ends with a single newline.
    pub fn ensure_trailing_newline(&mut self) {
        if !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    /// Remove trailing blank lines, leaving content followed by one newline.
    pub fn trim_trailing_blank_lines(&mut self) {
        while self.buffer.ends_with("\n\n") || self.buffer.ends_with(" \n") {
            self.buffer.pop();
        }
    }
}

impl Emitter for StringEmitter {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn emit_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn emit_indent(&mut self, level: usize) {
        let spaces = level * self.indent_width;
        for _ in 0..spaces {
            self.buffer.push(' ');
        }
    }

    fn emit_space(&mut self) {
        self.buffer.push(' ');
    }
}

/// Single-line emitter writing into a borrowed buffer.
///
/// Line breaks become spaces and indentation is dropped, so a statement
/// sequence prints as `a; b; c;`.
pub struct InlineEmitter<'a> {
    buffer: &'a mut String,
}

impl<'a> InlineEmitter<'a> {
    pub fn new(buffer: &'a mut String) -> Self {
        InlineEmitter { buffer }
    }
}

impl Emitter for InlineEmitter<'_> {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn emit_newline(&mut self) {
        self.buffer.push(' ');
    }

    fn emit_indent(&mut self, _level: usize) {}

    fn emit_space(&mut self) {
        self.buffer.push(' ');
    }
}
