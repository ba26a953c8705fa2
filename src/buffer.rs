//! Growable, indent-aware GLSL source buffer.
//!
//! Grounded on `vrend_shader.c`'s `emit_buf`/`add_str_to_glsl_main`: every statement
//! line written to the shader body is prefixed with one tab per indent level so the
//! emitted source reads as hand-formatted GLSL. Re-expressed here as a `String`-backed
//! type instead of the original's manual buffer growth/`realloc` dance, which Rust's
//! `String` already does for us.

use std::fmt::Write as _;

/// Accumulates GLSL source text with C-brace-style indentation tracking.
#[derive(Clone, Debug, Default)]
pub struct GlslBuffer {
    text: String,
    indent: u32,
}

impl GlslBuffer {
    pub fn new() -> Self {
        GlslBuffer::default()
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Writes one indented, newline-terminated statement line.
    pub fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.text.push('\t');
        }
        self.text.push_str(s);
        self.text.push('\n');
    }

    /// Like [`GlslBuffer::line`] but built from `format_args!`.
    pub fn line_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        for _ in 0..self.indent {
            self.text.push('\t');
        }
        let _ = self.text.write_fmt(args);
        self.text.push('\n');
    }

    /// Writes a bare line with no indentation (used for `#version`/`#extension`, which
    /// must start at column 0 regardless of nesting).
    pub fn raw_line(&mut self, s: &str) {
        self.text.push_str(s);
        self.text.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.text.push('\n');
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Convenience macro mirroring the original's `emit_buf(ctx, "...")` call sites.
macro_rules! glsl_line {
    ($buf:expr, $($arg:tt)*) => {
        $buf.line_fmt(format_args!($($arg)*))
    };
}

pub(crate) use glsl_line;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indentation_is_one_tab_per_level() {
        let mut buf = GlslBuffer::new();
        buf.line("void main() {");
        buf.indent();
        buf.line("gl_Position = vec4(0.0);");
        buf.dedent();
        buf.line("}");
        assert_eq!(
            buf.into_string(),
            "void main() {\n\tgl_Position = vec4(0.0);\n}\n"
        );
    }

    #[test]
    fn dedent_below_zero_saturates() {
        let mut buf = GlslBuffer::new();
        buf.dedent();
        buf.line("x");
        assert_eq!(buf.into_string(), "x\n");
    }

    #[test]
    fn line_fmt_matches_manual_formatting() {
        let mut buf = GlslBuffer::new();
        glsl_line!(buf, "vec{} tmp{};", 4, 0);
        assert_eq!(buf.into_string(), "vec4 tmp0;\n");
    }
}
