// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column-aligned tables for the `list`, `actions`, `timeline`, and `stats`
//! views.
//!
//! Widths are counted in characters, so agent names and action arguments
//! outside ASCII neither misalign rows nor split inside a code point.

use std::io::Write;

use crate::color;

const SEP: &str = "  ";

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// How a cell is colored once padded.
#[derive(Clone, Copy)]
enum CellStyle {
    Plain,
    Muted,
    /// Green, yellow, or red by runner status or action result.
    Status,
}

pub struct Column {
    name: &'static str,
    align: Align,
    style: CellStyle,
    min_width: usize,
    max_width: Option<usize>,
}

impl Column {
    fn with(name: &'static str, align: Align, style: CellStyle) -> Self {
        Self {
            name,
            align,
            style,
            min_width: 0,
            max_width: None,
        }
    }

    pub fn left(name: &'static str) -> Self {
        Self::with(name, Align::Left, CellStyle::Plain)
    }

    /// Counts and durations.
    pub fn right(name: &'static str) -> Self {
        Self::with(name, Align::Right, CellStyle::Plain)
    }

    pub fn muted(name: &'static str) -> Self {
        Self::with(name, Align::Left, CellStyle::Muted)
    }

    pub fn status(name: &'static str) -> Self {
        Self::with(name, Align::Left, CellStyle::Status)
    }

    /// Cut longer values to `max` characters.
    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }

    #[cfg(test)]
    pub fn with_min(mut self, min: usize) -> Self {
        self.min_width = min;
        self
    }

    fn clip<'a>(&self, text: &'a str) -> &'a str {
        match self.max_width.and_then(|max| text.char_indices().nth(max)) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    colorize: bool,
}

impl Table {
    /// Colored when the terminal and `NO_COLOR`/`COLOR` allow it.
    pub fn new(columns: Vec<Column>) -> Self {
        Self::with_color(columns, color::should_colorize())
    }

    pub fn with_color(columns: Vec<Column>, colorize: bool) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            colorize,
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Write the header and every row; nothing at all when there are no rows.
    ///
    /// A trailing left-aligned column is not padded. Color is applied after
    /// padding so escape codes never count toward a width.
    pub fn render(&self, out: &mut impl Write) {
        if self.rows.is_empty() {
            return;
        }
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| row.get(i).map_or(0, |cell| col.clip(cell).chars().count()))
                    .chain([col.name.len(), col.min_width])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header = self.line(&widths, move |i| self.columns[i].name, |text, _| {
            if self.colorize {
                color::apply_header(text)
            } else {
                text.to_string()
            }
        });
        let _ = writeln!(out, "{header}");

        for row in &self.rows {
            let line = self.line(
                &widths,
                move |i| self.columns[i].clip(row.get(i).map_or("", String::as_str)),
                |text, col| self.stylize(text, col.style),
            );
            let _ = writeln!(out, "{line}");
        }
    }

    fn line<'a>(
        &self,
        widths: &[usize],
        text: impl Fn(usize) -> &'a str,
        style: impl Fn(&str, &Column) -> String,
    ) -> String {
        let last = self.columns.len() - 1;
        let cells: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let text = text(i);
                let fill = widths[i].saturating_sub(text.chars().count());
                let padded = match col.align {
                    Align::Left if i == last => text.to_string(),
                    Align::Left => format!("{text}{}", " ".repeat(fill)),
                    Align::Right => format!("{}{text}", " ".repeat(fill)),
                };
                style(&padded, col)
            })
            .collect();
        cells.join(SEP)
    }

    fn stylize(&self, text: &str, style: CellStyle) -> String {
        match style {
            _ if !self.colorize => text.to_string(),
            CellStyle::Plain => text.to_string(),
            CellStyle::Muted => color::apply_muted(text),
            CellStyle::Status => color::apply_status(text),
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
