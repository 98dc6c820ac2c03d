use crate::error::{AdbError, Result};
use colored::*;
use comfy_table::Table;
use serde::Serialize;

pub mod tables;

pub use tables::format_size;

/// Output format selected on the command line
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputType {
    #[default]
    Table,
    Json,
    Plain,
}

/// Prints command results as tables, JSON or plain lines
pub struct OutputFormatter {
    color_enabled: bool,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            color_enabled: true,
            quiet: false,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print `items` in the chosen format
    pub fn print<T>(&self, format: OutputType, items: &[T]) -> Result<()>
    where
        T: TableFormat + PlainFormat + Serialize,
    {
        match format {
            OutputType::Table => self.table(items),
            OutputType::Json => self.json(items),
            OutputType::Plain => self.plain(items),
        }
    }

    pub fn table<T: TableFormat>(&self, items: &[T]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        println!("{}", render_table(items));
        Ok(())
    }

    pub fn json<T: Serialize + ?Sized>(&self, items: &T) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let json = serde_json::to_string_pretty(items)
            .map_err(|e| AdbError::Format(format!("cannot encode JSON: {}", e)))?;
        if self.color_enabled {
            println!("{}", colorize_json(&json));
        } else {
            println!("{}", json);
        }
        Ok(())
    }

    pub fn plain<T: PlainFormat>(&self, items: &[T]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        for item in items {
            println!("{}", item.plain());
        }
        Ok(())
    }

    pub fn message(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            if self.color_enabled {
                println!("{}", msg.bright_green());
            } else {
                println!("{}", msg);
            }
        }
    }

    pub fn warning(&self, msg: &str) {
        if !self.quiet {
            if self.color_enabled {
                eprintln!("{}", msg.bright_yellow());
            } else {
                eprintln!("WARNING: {}", msg);
            }
        }
    }

    /// Errors are printed even in quiet mode
    pub fn error(&self, msg: &str) {
        if self.color_enabled {
            eprintln!("{}", msg.bright_red());
        } else {
            eprintln!("ERROR: {}", msg);
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Types that can be shown as a table row
pub trait TableFormat {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Types that can be shown as one line of plain text
pub trait PlainFormat {
    fn plain(&self) -> String;
}

impl<T: ToString> PlainFormat for T {
    fn plain(&self) -> String {
        self.to_string()
    }
}

pub fn render_table<T: TableFormat>(items: &[T]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

/// Color the keys of pretty-printed JSON
fn colorize_json(json: &str) -> String {
    json.lines()
        .map(|line| {
            let indent = line.len() - line.trim_start().len();
            match line.trim_start().split_once("\": ") {
                Some((key, value)) if key.starts_with('"') => {
                    format!("{}{}: {}", " ".repeat(indent), key[1..].cyan(), value)
                }
                _ => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
