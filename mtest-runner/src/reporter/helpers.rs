// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::helpers::name_width;
use owo_colors::{OwoColorize, Style};
use swrite::{SWrite, swrite};

#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) is_colorized: bool,
    pub(super) count: Style,
    pub(super) pass: Style,
    pub(super) fail: Style,
    pub(super) worker: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.is_colorized = true;
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.worker = Style::new().blue();
    }
}

/// Centers `text` in a line of `=` characters that fills `width` columns.
///
/// The text is separated from the padding by one space on each side. If the text doesn't fit,
/// the padding shrinks to nothing.
pub(super) fn banner(text: &str, width: usize, style: Style) -> String {
    let text_width = name_width(text);
    let padding = width.saturating_sub(text_width + 2) / 2;
    let pad = "=".repeat(padding);

    let mut out = String::with_capacity(width + 16);
    swrite!(out, "{pad} {} {pad}", text.style(style));
    if padding * 2 + text_width + 2 < width {
        out.push('=');
    }
    out
}
