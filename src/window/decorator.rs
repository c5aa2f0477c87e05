//! Window chrome for the terminal shell: border, title bar and the
//! minimize / maximize / close buttons. One terminal cell is one pixel.

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Modifier, Style};

use crate::layout::{Point, Rect, ResizeEdge, rect_contains, to_i32};

const BUTTON_WIDTH: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleButton {
    Minimize,
    Maximize,
    Close,
}

impl TitleButton {
    fn label(self, maximized: bool) -> &'static str {
        match self {
            TitleButton::Minimize => "[_]",
            TitleButton::Maximize if maximized => "[◱]",
            TitleButton::Maximize => "[□]",
            TitleButton::Close => "[x]",
        }
    }
}

/// What a pointer-down on a window landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Button(TitleButton),
    TitleBar,
    Edge(ResizeEdge),
    Body,
}

/// Button rectangles, right-aligned inside the title row.
pub fn title_buttons(bounds: Rect) -> Vec<(TitleButton, Rect)> {
    let needed = BUTTON_WIDTH * 3 + 2;
    if bounds.width < needed || bounds.height == 0 {
        return Vec::new();
    }
    let width = to_i32(BUTTON_WIDTH);
    let close_x = bounds.right() - 1 - width;
    [TitleButton::Close, TitleButton::Maximize, TitleButton::Minimize]
        .into_iter()
        .enumerate()
        .map(|(idx, button)| {
            let offset = width * i32::try_from(idx).unwrap_or(0);
            (button, Rect::new(close_x - offset, bounds.y, BUTTON_WIDTH, 1))
        })
        .collect()
}

pub fn hit_test(bounds: Rect, point: Point, resizable: bool) -> Option<Hit> {
    if !rect_contains(bounds, point) {
        return None;
    }
    if let Some((button, _)) = title_buttons(bounds)
        .into_iter()
        .find(|(_, rect)| rect_contains(*rect, point))
    {
        return Some(Hit::Button(button));
    }
    let left = point.x == bounds.x;
    let right = point.x == bounds.right() - 1;
    let top = point.y == bounds.y;
    let bottom = point.y == bounds.bottom() - 1;
    if resizable {
        let edge = match (left, right, top, bottom) {
            (true, _, true, _) => Some(ResizeEdge::TopLeft),
            (_, true, true, _) => Some(ResizeEdge::TopRight),
            (true, _, _, true) => Some(ResizeEdge::BottomLeft),
            (_, true, _, true) => Some(ResizeEdge::BottomRight),
            (true, _, _, _) => Some(ResizeEdge::Left),
            (_, true, _, _) => Some(ResizeEdge::Right),
            (_, _, _, true) => Some(ResizeEdge::Bottom),
            _ => None,
        };
        if let Some(edge) = edge {
            return Some(Hit::Edge(edge));
        }
    }
    if top {
        return Some(Hit::TitleBar);
    }
    Some(Hit::Body)
}

#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    pub bounds: Rect,
    pub title: &'a str,
    pub focused: bool,
    pub maximized: bool,
}

pub trait WindowDecorator: std::fmt::Debug {
    /// Paint the frame of `chrome` into `buffer`, touching only cells inside
    /// `clip`. The interior is cleared.
    fn render_window(&self, buffer: &mut Buffer, clip: ratatui::layout::Rect, chrome: &Chrome<'_>);
}

#[derive(Debug)]
pub struct OpenStepDecorator;

impl WindowDecorator for OpenStepDecorator {
    fn render_window(&self, buffer: &mut Buffer, clip: ratatui::layout::Rect, chrome: &Chrome<'_>) {
        let rect = chrome.bounds;
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let header_style = if chrome.focused {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        };
        let border_style = Style::default().fg(Color::DarkGray).bg(Color::Black);
        let body_style = Style::default().fg(Color::Gray).bg(Color::Black);

        let left = rect.x;
        let right = rect.right() - 1;
        let top = rect.y;
        let bottom = rect.bottom() - 1;

        let mut put = |x: i32, y: i32, symbol: &str, style: Style| {
            if let Some(pos) = cell_at(clip, x, y)
                && let Some(cell) = buffer.cell_mut(pos)
            {
                cell.set_symbol(symbol);
                cell.set_style(style);
            }
        };

        // Title row
        put(left, top, "┌", border_style);
        put(right, top, "┐", border_style);
        for x in (left + 1)..right {
            put(x, top, " ", header_style);
        }
        let buttons = title_buttons(rect);
        let title_room = buttons
            .last()
            .map_or(right - left - 1, |(_, first)| first.x - left - 2);
        let title: String = chrome
            .title
            .chars()
            .take(usize::try_from(title_room.max(0)).unwrap_or(0))
            .collect();
        for (idx, ch) in title.chars().enumerate() {
            let x = left + 1 + i32::try_from(idx).unwrap_or(0);
            put(x, top, &ch.to_string(), header_style);
        }
        for (button, area) in &buttons {
            for (idx, ch) in button.label(chrome.maximized).chars().enumerate() {
                let x = area.x + i32::try_from(idx).unwrap_or(0);
                put(x, top, &ch.to_string(), header_style);
            }
        }

        // Sides and interior
        for y in (top + 1)..bottom {
            put(left, y, "│", border_style);
            put(right, y, "│", border_style);
            for x in (left + 1)..right {
                put(x, y, " ", body_style);
            }
        }

        // Bottom
        put(left, bottom, "└", border_style);
        put(right, bottom, "┘", border_style);
        for x in (left + 1)..right {
            put(x, bottom, "─", border_style);
        }
    }
}

/// Buffer coordinates of `(x, y)` when it falls inside `clip`.
pub fn cell_at(clip: ratatui::layout::Rect, x: i32, y: i32) -> Option<(u16, u16)> {
    let cx = u16::try_from(x).ok()?;
    let cy = u16::try_from(y).ok()?;
    let inside = cx >= clip.x
        && cy >= clip.y
        && u32::from(cx) < u32::from(clip.x) + u32::from(clip.width)
        && u32::from(cy) < u32::from(clip.y) + u32::from(clip.height);
    inside.then_some((cx, cy))
}
