/// Coloured console output for batch analysis
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use orient_core::{AnalysisResult, BatchReport, FileError};
use std::io::{self, Write};

/// Writes progress, results and errors to a terminal or any other writer.
#[derive(Debug, Clone, Copy)]
pub struct ReportPrinter {
    color: bool,
}

impl ReportPrinter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint<W: Write>(&self, writer: &mut W, color: Color, text: &str) -> io::Result<()> {
        if self.color {
            writer.queue(SetForegroundColor(color))?;
            writer.queue(Print(text))?;
            writer.queue(ResetColor)?;
        } else {
            writer.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    pub fn progress<W: Write>(&self, writer: &mut W, index: usize, total: usize, name: &str) -> io::Result<()> {
        self.paint(writer, Color::DarkGrey, &format!("[{index}/{total}] {name}\n"))?;
        writer.flush()
    }

    pub fn note<W: Write>(&self, writer: &mut W, message: &str) -> io::Result<()> {
        self.paint(writer, Color::DarkGrey, &format!("{message}\n"))?;
        writer.flush()
    }

    pub fn result<W: Write>(&self, writer: &mut W, result: &AnalysisResult) -> io::Result<()> {
        let text = result.to_string();
        for line in text.lines() {
            let color = match line.split_once(':') {
                Some(("File", _)) => Color::Cyan,
                Some(("Best Fit Machine", _)) if result.fitting_machines.is_empty() => Color::Yellow,
                Some(("Best Fit Machine", _)) => Color::Green,
                _ => Color::White,
            };
            self.paint(writer, color, line)?;
            writer.write_all(b"\n")?;
        }
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn failure<W: Write>(&self, writer: &mut W, failure: &FileError) -> io::Result<()> {
        let text = format!("{} - ERROR: {}\n\n", failure.file_name, failure.kind);
        self.paint(writer, Color::Red, &text)?;
        writer.flush()
    }

    pub fn warning<W: Write>(&self, writer: &mut W, message: &str) -> io::Result<()> {
        self.paint(writer, Color::Yellow, &format!("{message}\n"))?;
        writer.flush()
    }

    pub fn finished<W: Write>(&self, writer: &mut W, report: &BatchReport) -> io::Result<()> {
        self.paint(writer, Color::Green, "All files processed.\n")?;
        if !report.failures.is_empty() {
            let text = format!(
                "{} of {} files could not be analysed.\n",
                report.failures.len(),
                report.len()
            );
            self.paint(writer, Color::Yellow, &text)?;
        }
        writer.flush()
    }
}
