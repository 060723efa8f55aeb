//! Rendering for the terminal front-end.
//!
//! Zones are drawn as columns. Each zone group is drawn as one window frame
//! covering all of its zones, with a tab strip listing the group's windows in
//! tab order. Groups are painted back to front using the host z-order so the
//! frontmost group ends up on top.

use std::fmt::{Debug, Display};

use indoc::indoc;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::assigned::AssignedWindows;
use crate::host::{MemoryHost, WindowSystem};
use crate::keybindings::KeyBindings;
use crate::layout::{zone_rects, zone_set_rect};

const HELP_HEADER: &str = indoc! {"
    Windows snapped into the same zones share a frame and show up as tabs.
    Closing a window leaves its tab behind until cycling runs into it.
"};

/// Everything needed to paint one frame.
pub struct SceneView<'a, W: Copy + Eq + Ord> {
    pub assigned: &'a AssignedWindows<W>,
    pub host: &'a MemoryHost<W>,
    pub zone_count: usize,
    pub desktops: usize,
    pub status: &'a str,
    pub help: Option<&'a KeyBindings>,
}

pub fn draw<W>(frame: &mut Frame<'_>, view: &SceneView<'_, W>)
where
    W: Copy + Eq + Ord + Debug + Display,
{
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(Paragraph::new(header_line(view)), header);

    let zones = zone_rects(body, view.zone_count);
    for (idx, rect) in zones.iter().enumerate() {
        let style = if view.assigned.is_zone_empty(idx) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(format!(" zone {idx} "));
        frame.render_widget(block, *rect);
    }

    for zone_set in groups_back_to_front(view.assigned, view.host) {
        let Some(rect) = zone_set_rect(&zones, &zone_set) else {
            continue;
        };
        draw_group(frame, view, &zone_set, inset(rect));
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            view.status.to_string(),
            Style::default().fg(Color::Yellow),
        ))),
        footer,
    );

    if let Some(bindings) = view.help {
        draw_help(frame, bindings);
    }
}

fn header_line<W>(view: &SceneView<'_, W>) -> Line<'static>
where
    W: Copy + Eq + Ord + Debug + Display,
{
    let foreground = view
        .host
        .foreground()
        .map(|w| format!("W{w}"))
        .unwrap_or_else(|| "-".to_string());
    let snapped = view.assigned.snapped_windows();
    let unsnapped: Vec<String> = view
        .host
        .live_windows()
        .filter(|w| !snapped.contains_key(w))
        .map(|w| format!("W{w}"))
        .collect();
    let unsnapped = if unsnapped.is_empty() {
        "-".to_string()
    } else {
        unsnapped.join(" ")
    };
    Line::from(vec![
        Span::styled(
            format!(
                " desktop {}/{} ",
                view.host.current_desktop() + 1,
                view.desktops
            ),
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        Span::raw(format!(
            "  focus: {foreground}  unsnapped: {unsnapped}  (? for help)"
        )),
    ])
}

/// Zone-sets ordered so the group holding the frontmost window comes last.
fn groups_back_to_front<W>(assigned: &AssignedWindows<W>, host: &MemoryHost<W>) -> Vec<Vec<usize>>
where
    W: Copy + Eq + Ord + Debug,
{
    let mut groups: Vec<(usize, Vec<usize>)> = assigned
        .zone_sets()
        .map(|zones| {
            let depth = host
                .topmost_of(assigned.zone_set_windows(zones))
                .map_or(usize::MAX, |(_, depth)| depth);
            (depth, zones.clone())
        })
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0));
    groups.into_iter().map(|(_, zones)| zones).collect()
}

fn draw_group<W>(frame: &mut Frame<'_>, view: &SceneView<'_, W>, zone_set: &[usize], rect: Rect)
where
    W: Copy + Eq + Ord + Debug + Display,
{
    let tabs = view.assigned.zone_set_windows(zone_set);
    let shown = view
        .host
        .topmost_of(tabs)
        .map(|(w, _)| w)
        .filter(|w| view.host.is_on_current_desktop(*w));
    let focused = view.host.foreground().is_some_and(|w| tabs.contains(&w));

    let mut strip = Vec::with_capacity(tabs.len() * 2);
    for tab in tabs {
        let mut style = Style::default();
        if !view.host.is_window_live(*tab) {
            style = style.fg(Color::Red).add_modifier(Modifier::CROSSED_OUT);
        } else if !view.host.is_on_current_desktop(*tab) {
            style = style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
        }
        if Some(*tab) == shown {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        strip.push(Span::styled(format!(" W{tab} "), style));
        strip.push(Span::raw(" "));
    }

    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Blue)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {zone_set:?} "));
    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    let body = match shown {
        Some(w) => format!("window W{w}"),
        None => "no tab on this desktop".to_string(),
    };
    let lines = vec![Line::from(strip), Line::raw(""), Line::raw(body)];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_help(frame: &mut Frame<'_>, bindings: &KeyBindings) {
    let mut lines: Vec<Line> = HELP_HEADER.lines().map(Line::raw).collect();
    lines.push(Line::raw(""));
    for (action, combos) in bindings.help_entries() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<22}", combos.join(", ")),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(action.to_string()),
        ]));
    }

    let area = frame.area();
    let height = (lines.len() as u16 + 2).min(area.height);
    let width = 72.min(area.width);
    let rect = centered(area, width, height);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" help ")),
        rect,
    );
}

fn inset(rect: Rect) -> Rect {
    if rect.width <= 2 || rect.height <= 2 {
        return rect;
    }
    Rect {
        x: rect.x + 1,
        y: rect.y + 1,
        width: rect.width - 2,
        height: rect.height - 2,
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}
