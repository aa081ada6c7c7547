//! Rendering surfaces
//!
//! [`ChatView`] is the seam between the dispatcher and whatever draws the
//! chat. [`ChatLog`] keeps everything in memory; [`TerminalView`] prints to
//! stdout.

use colored::{ColoredString, Colorize};
use std::io::Write;

use super::dispatch::{Banner, Bubble, BubbleKind, RenderInstruction};

/// A surface that can show bubbles, a user list and the connection banner
pub trait ChatView {
    /// Append a bubble after everything already shown
    fn append_bubble(&mut self, bubble: &Bubble);

    /// Replace the whole user list
    fn replace_userlist(&mut self, users: &[String]);

    fn set_banner(&mut self, banner: &Banner);

    /// Apply one instruction produced by the dispatcher
    fn apply(&mut self, instruction: &RenderInstruction) {
        match instruction {
            RenderInstruction::AppendBubble(bubble) => self.append_bubble(bubble),
            RenderInstruction::ReplaceUserlist(users) => self.replace_userlist(users),
            RenderInstruction::SetBanner(banner) => self.set_banner(banner),
        }
    }
}

/// In-memory chat state. History is append-only and unbounded.
#[derive(Debug, Clone)]
pub struct ChatLog {
    bubbles: Vec<Bubble>,
    users: Vec<String>,
    banner: Banner,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            bubbles: Vec::new(),
            users: Vec::new(),
            banner: Banner::Hidden,
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for ChatLog {
    fn append_bubble(&mut self, bubble: &Bubble) {
        self.bubbles.push(bubble.clone());
    }

    fn replace_userlist(&mut self, users: &[String]) {
        self.users = users.to_vec();
    }

    fn set_banner(&mut self, banner: &Banner) {
        self.banner = banner.clone();
    }
}

/// Line-oriented colored terminal output
pub struct TerminalView<W: Write> {
    out: W,
    show_userlist: bool,
    bell: bool,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_userlist: false,
            bell: true,
        }
    }

    /// Ring the terminal bell for messages from others
    pub fn with_bell(mut self, bell: bool) -> Self {
        self.bell = bell;
        self
    }

    /// Flip whether user list updates are printed; returns the new setting
    pub fn toggle_userlist(&mut self) -> bool {
        self.show_userlist = !self.show_userlist;
        self.show_userlist
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled_author(bubble: &Bubble) -> ColoredString {
        match bubble.kind {
            BubbleKind::Message => bubble.author.bold(),
            BubbleKind::OwnMessage => bubble.author.green().bold(),
            BubbleKind::Info => bubble.author.cyan(),
            BubbleKind::Warning => bubble.author.yellow(),
            BubbleKind::Error => bubble.author.red().bold(),
        }
    }

    fn write_line(&mut self, line: String) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn append_bubble(&mut self, bubble: &Bubble) {
        let bell = if self.bell && bubble.wants_notification() {
            "\x07"
        } else {
            ""
        };

        let line = format!(
            "{}{} {}: {}",
            bell,
            format!("[{}]", bubble.time_label()).dimmed(),
            Self::styled_author(bubble),
            bubble.text
        );
        self.write_line(line);
    }

    fn replace_userlist(&mut self, users: &[String]) {
        if !self.show_userlist {
            return;
        }

        let line = format!("{} {}", "Online:".bold(), users.join(", "));
        self.write_line(line);
    }

    fn set_banner(&mut self, banner: &Banner) {
        let Some(text) = banner.text() else {
            return;
        };

        let line = match banner {
            Banner::GaveUp { .. } => format!("{} {}", "✗".red().bold(), text.red()),
            _ => format!("{} {}", "→".yellow().bold(), text.dimmed()),
        };
        self.write_line(line);
    }
}
