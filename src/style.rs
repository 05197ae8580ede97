//! ANSI styling for terminal diagnostics.

pub struct Style;

impl Style {
    fn wrap(code: &str, text: &str) -> String {
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    pub fn bold_red(text: &str) -> String {
        Self::wrap("1;31", text)
    }

    pub fn red(text: &str) -> String {
        Self::wrap("31", text)
    }

    pub fn blue(text: &str) -> String {
        Self::wrap("34", text)
    }

    pub fn cyan(text: &str) -> String {
        Self::wrap("36", text)
    }

    pub fn green(text: &str) -> String {
        Self::wrap("32", text)
    }
}
