// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Status lines and resource documents for command output

use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Writes either human-readable status lines or, with an output format, only
/// the resulting resource document.
pub struct Printer<W: Write> {
    out: W,
    output: Option<OutputFormat>,
    dry_run: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, output: Option<OutputFormat>, dry_run: bool) -> Self {
        Self {
            out,
            output,
            dry_run,
        }
    }

    /// Whether persistence must be skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn status(&mut self, message: &str) -> Result<()> {
        if self.output.is_none() {
            writeln!(self.out, "{}", message)?;
        }
        Ok(())
    }

    pub fn print_obj<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        match self.output {
            Some(OutputFormat::Yaml) => write!(self.out, "{}", serde_yaml::to_string(obj)?)?,
            Some(OutputFormat::Json) => writeln!(self.out, "{}", serde_json::to_string_pretty(obj)?)?,
            None => {}
        }
        Ok(())
    }

    pub fn result(&mut self, message: &str) -> Result<()> {
        let suffix = if self.dry_run { " (dry run)" } else { "" };
        self.status(&format!("{}{}", message, suffix))
    }

    /// Like `result`, noting when nothing changed
    pub fn change_result(&mut self, changed: bool, message: &str) -> Result<()> {
        if changed {
            self.result(message)
        } else {
            self.result(&format!("{} (no change)", message))
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
