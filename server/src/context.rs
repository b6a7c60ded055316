use crate::{config::Config, font::FontWidths};

/// Everything a connection worker reads, built once at startup and shared
/// behind an `Arc`.
#[derive(Debug, Default)]
pub struct Context {
    pub config: Config,
    pub font_widths: FontWidths,
}

impl Context {
    pub fn new(config: Config, font_widths: FontWidths) -> Context {
        Context {
            config,
            font_widths,
        }
    }
}
