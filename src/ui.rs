use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::notices::{Notice, NoticeKind};
use crate::stopwatch::StopwatchState;
use timer_core::{format_duration, LapClass, TimerState};

/// Rows used by the stopwatch header (title, time, status, count).
const HEADER_ROWS: usize = 6;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GlyphStyle {
    Bold,
    Regular,
    Small,
    Fastest,
    Slowest,
    Alert,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TextLine {
    pub text: String,
    pub style: GlyphStyle,
}

impl TextLine {
    fn new(style: GlyphStyle, text: impl Into<String>) -> Self {
        Self { text: text.into(), style }
    }

    fn blank() -> Self {
        Self::new(GlyphStyle::Regular, "")
    }
}

/// A full screen: body lines from the top, footer lines pinned to the bottom.
#[derive(Debug, Default)]
pub struct Screen {
    pub body: Vec<TextLine>,
    pub footer: Vec<TextLine>,
}

pub fn post_screen<W: Write>(
    out: &mut W,
    screensize: (u16, u16),
    screen: &Screen,
) -> io::Result<()> {
    let (width, height) = (screensize.0 as usize, screensize.1 as usize);
    queue!(out, Clear(ClearType::All))?;

    let footer_top = height.saturating_sub(screen.footer.len());
    for (row, line) in screen.body.iter().take(footer_top).enumerate() {
        post_line(out, row, width, line)?;
    }
    for (i, line) in screen.footer.iter().enumerate() {
        let row = footer_top + i;
        if row >= height {
            break;
        }
        post_line(out, row, width, line)?;
    }
    out.flush()
}

fn post_line<W: Write>(out: &mut W, row: usize, width: usize, line: &TextLine) -> io::Result<()> {
    queue!(out, MoveTo(0, row as u16))?;
    match line.style {
        GlyphStyle::Bold => queue!(out, SetAttribute(Attribute::Bold))?,
        GlyphStyle::Regular => {}
        GlyphStyle::Small => queue!(out, SetAttribute(Attribute::Dim))?,
        GlyphStyle::Fastest => queue!(out, SetForegroundColor(Color::Green))?,
        GlyphStyle::Slowest => queue!(out, SetForegroundColor(Color::Red))?,
        GlyphStyle::Alert => queue!(
            out,
            SetForegroundColor(Color::Yellow),
            SetAttribute(Attribute::Bold)
        )?,
    }
    let text: String = line.text.chars().take(width).collect();
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
    Ok(())
}

pub fn stopwatch_screen(
    state: &StopwatchState,
    now_ms: f64,
    screensize: (u16, u16),
    notice: Option<&Notice>,
) -> Screen {
    let engine = &state.timer;
    let mut body = Vec::new();

    body.push(TextLine::new(GlyphStyle::Bold, "STOPWATCH"));
    body.push(TextLine::blank());
    body.push(TextLine::new(
        GlyphStyle::Bold,
        format!("  {}", format_duration(engine.elapsed_ms(now_ms))),
    ));
    let status = match engine.state() {
        TimerState::Idle => "Ready",
        TimerState::Running => "Running",
        TimerState::Paused => "Paused",
    };
    body.push(TextLine::new(GlyphStyle::Small, format!("  {}", status)));
    body.push(TextLine::blank());
    body.push(TextLine::new(
        GlyphStyle::Regular,
        format!("Laps: {}", engine.lap_count()),
    ));

    let mut footer = Vec::new();
    if let Some(notice) = notice {
        let style = match notice.kind {
            NoticeKind::Info => GlyphStyle::Regular,
            NoticeKind::Error => GlyphStyle::Alert,
        };
        footer.push(TextLine::new(style, notice.text.clone()));
    }
    footer.push(TextLine::new(
        GlyphStyle::Small,
        format!(
            "SPACE={}  l=lap  r=reset  c=clear laps",
            state.toggle_label().to_lowercase()
        ),
    ));
    footer.push(TextLine::new(
        GlyphStyle::Small,
        "e=export  up/dn=scroll  h=help  q=quit",
    ));

    // Lap list, most recent first.
    let laps = engine.laps();
    let classes = engine.classify_laps();
    let max_visible = (screensize.1 as usize)
        .saturating_sub(HEADER_ROWS + footer.len())
        .max(1);
    let start = laps.len().saturating_sub(state.lap_scroll_offset);

    for idx in (0..start).rev().take(max_visible) {
        let lap = &laps[idx];
        let (style, marker) = match classes[idx] {
            LapClass::Fastest => (GlyphStyle::Fastest, "  fastest"),
            LapClass::Slowest => (GlyphStyle::Slowest, "  slowest"),
            LapClass::None => (GlyphStyle::Regular, ""),
        };
        body.push(TextLine::new(
            style,
            format!(
                "Lap {:>3}  {}  (Total {}){}",
                lap.index,
                format_duration(lap.lap_duration_ms),
                format_duration(lap.cumulative_ms),
                marker
            ),
        ));
    }

    Screen { body, footer }
}

pub fn draw_stopwatch<W: Write>(
    out: &mut W,
    screensize: (u16, u16),
    state: &StopwatchState,
    now_ms: f64,
    notice: Option<&Notice>,
) -> io::Result<()> {
    post_screen(out, screensize, &stopwatch_screen(state, now_ms, screensize, notice))
}

pub fn draw_help<W: Write>(out: &mut W, screensize: (u16, u16), help_text: &str) -> io::Result<()> {
    let mut body = Vec::new();
    for (i, line) in help_text.lines().enumerate() {
        let style = if i == 0 { GlyphStyle::Bold } else { GlyphStyle::Regular };
        body.push(TextLine::new(style, line));
    }
    let footer = vec![TextLine::new(GlyphStyle::Small, "Press any key to close")];
    post_screen(out, screensize, &Screen { body, footer })
}

pub fn draw_confirm<W: Write>(
    out: &mut W,
    screensize: (u16, u16),
    title: &str,
    message: &str,
) -> io::Result<()> {
    let mut body = vec![
        TextLine::new(GlyphStyle::Bold, title),
        TextLine::blank(),
    ];
    body.extend(message.lines().map(|l| TextLine::new(GlyphStyle::Regular, l)));
    body.push(TextLine::blank());
    body.push(TextLine::new(GlyphStyle::Regular, "  y = Yes"));
    body.push(TextLine::new(GlyphStyle::Regular, "  n = Cancel"));
    post_screen(out, screensize, &Screen { body, footer: Vec::new() })
}
