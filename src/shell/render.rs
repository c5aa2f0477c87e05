use indoc::indoc;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::Shell;
use crate::apps::{EXPLORER, NOTEPAD, RESUME, SETTINGS, TERMINAL};
use crate::layout::{self, to_i32};
use crate::lifecycle::ConfirmAction;
use crate::window::decorator::{Chrome, cell_at};
use crate::window::{ContentState, Window, WindowId, WindowState};

const HELP_TEXT: &str = indoc! {"
    Drag a title bar to move a window. Drop it on the
    left or right edge to snap, or on the top row to
    maximize. Drag a border to resize.

    Click a taskbar button to focus or minimize.
"};

const CANCEL_LABEL: &str = "[ Cancel ]";
const CONFIRM_LABEL: &str = "[ Close ]";
const TASKBAR_LABEL_MAX: usize = 16;

/// Hit areas of the unsaved-changes dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmLayout {
    pub dialog: Rect,
    pub cancel: Rect,
    pub confirm: Rect,
}

pub fn confirm_layout(area: Rect) -> Option<ConfirmLayout> {
    let width = area.width.min(44);
    let height = area.height.min(7);
    if width < 24 || height < 6 {
        return None;
    }
    let dialog = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let button_y = dialog.y + dialog.height - 2;
    let cancel_w = label_width(CANCEL_LABEL);
    let confirm_w = label_width(CONFIRM_LABEL);
    let confirm_x = dialog.x + dialog.width - 2 - confirm_w;
    let cancel_x = confirm_x.saturating_sub(cancel_w + 1);
    Some(ConfirmLayout {
        dialog,
        cancel: Rect::new(cancel_x, button_y, cancel_w, 1),
        confirm: Rect::new(confirm_x, button_y, confirm_w, 1),
    })
}

/// Taskbar buttons, left to right in creation order. Windows pending close
/// have no button.
pub fn taskbar_buttons(shell: &Shell, area: Rect) -> Vec<(WindowId, Rect)> {
    let Some(row) = taskbar_row(area) else {
        return Vec::new();
    };
    let mut x = row.x;
    let end = row.x + row.width;
    let mut buttons = Vec::new();
    for window in shell.wm().windows().filter(|w| !w.is_closing()) {
        let width = label_width(&taskbar_label(shell, window));
        if x + width > end {
            break;
        }
        buttons.push((window.id(), Rect::new(x, row.y, width, 1)));
        x += width + 1;
    }
    buttons
}

pub fn render(frame: &mut Frame<'_>, shell: &Shell) {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return;
    }
    let buffer = frame.buffer_mut();
    buffer.set_style(area, Style::default().bg(Color::Cyan));

    let wm = shell.wm();
    let decorator = shell.decorator();
    let preview = wm.gesture_preview().copied();
    for window in wm.visible_windows() {
        let bounds = match preview {
            Some(preview) if preview.window_id == window.id() => preview.bounds,
            _ => window.bounds(),
        };
        let title = window_title(window);
        let chrome = Chrome {
            bounds,
            title: &title,
            focused: wm.is_focused(window.id()),
            maximized: window.state() == WindowState::Maximized,
        };
        decorator.render_window(buffer, area, &chrome);
        render_body(buffer, area, shell, window, bounds);
    }
    if let Some(zone) = preview.and_then(|preview| preview.zone_bounds) {
        render_snap_hint(buffer, area, zone);
    }

    render_taskbar(buffer, area, shell);
    if let Some(pending) = shell.pending_close() {
        render_confirm(frame, area, shell, pending.window, pending.selected);
    }
    if shell.help_visible() {
        render_help(frame, area, shell);
    }
}

fn window_title(window: &Window) -> String {
    if window.has_unsaved_changes() {
        format!("*{}", window.title())
    } else {
        window.title().to_string()
    }
}

fn body_lines(shell: &Shell, window: &Window) -> Vec<String> {
    if window.content() == ContentState::Loading {
        return vec!["Loading…".to_string()];
    }
    match window.app_id().as_str() {
        EXPLORER => ["▸ Documents", "▸ Pictures", "▸ Projects", "  notes.txt"]
            .map(str::to_string)
            .to_vec(),
        NOTEPAD => {
            let text = shell.document(window.id()).unwrap_or_default();
            let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
            if text.is_empty() || text.ends_with('\n') {
                lines.push(String::new());
            }
            if let Some(last) = lines.last_mut() {
                last.push('▏');
            }
            lines
        }
        SETTINGS => ["Theme       OpenStep", "Snap bands  on", "Taskbar     bottom"]
            .map(str::to_string)
            .to_vec(),
        RESUME => ["Experience", "  Window systems engineer", "Skills", "  Rust, layout engines"]
            .map(str::to_string)
            .to_vec(),
        TERMINAL => vec!["$ ▏".to_string()],
        _ => Vec::new(),
    }
}

fn render_body(buffer: &mut Buffer, clip: Rect, shell: &Shell, window: &Window, bounds: layout::Rect) {
    if bounds.width < 3 || bounds.height < 3 {
        return;
    }
    let inner_width = usize::try_from(bounds.width - 2).unwrap_or(0);
    let rows = bounds.height - 2;
    let style = Style::default().fg(Color::Gray).bg(Color::Black);
    for (row, line) in (0..rows).zip(body_lines(shell, window)) {
        let y = bounds.y + 1 + to_i32(row);
        for (col, ch) in line.chars().take(inner_width).enumerate() {
            let x = bounds.x + 1 + i32::try_from(col).unwrap_or(i32::MAX);
            if let Some(pos) = cell_at(clip, x, y)
                && let Some(cell) = buffer.cell_mut(pos)
            {
                cell.set_char(ch);
                cell.set_style(style);
            }
        }
    }
}

fn render_snap_hint(buffer: &mut Buffer, clip: Rect, zone: layout::Rect) {
    if zone.is_empty() {
        return;
    }
    let style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let right = zone.right() - 1;
    let bottom = zone.bottom() - 1;
    let mut mark = |x: i32, y: i32, symbol: &str| {
        if let Some(pos) = cell_at(clip, x, y)
            && let Some(cell) = buffer.cell_mut(pos)
        {
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
    };
    for x in zone.x..=right {
        mark(x, zone.y, "═");
        mark(x, bottom, "═");
    }
    for y in zone.y..=bottom {
        mark(zone.x, y, "║");
        mark(right, y, "║");
    }
    mark(zone.x, zone.y, "╔");
    mark(right, zone.y, "╗");
    mark(zone.x, bottom, "╚");
    mark(right, bottom, "╝");
}

fn render_taskbar(buffer: &mut Buffer, area: Rect, shell: &Shell) {
    let Some(row) = taskbar_row(area) else {
        return;
    };
    let bar = Style::default().bg(Color::Gray).fg(Color::Black);
    buffer.set_string(row.x, row.y, " ".repeat(usize::from(row.width)), bar);
    let wm = shell.wm();
    let mut used = row.x;
    for (id, rect) in taskbar_buttons(shell, area) {
        let Some(window) = wm.window(id) else {
            continue;
        };
        let style = if wm.is_focused(id) {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if window.state() == WindowState::Minimized {
            bar.add_modifier(Modifier::DIM)
        } else {
            bar
        };
        buffer.set_stringn(
            rect.x,
            rect.y,
            taskbar_label(shell, window),
            usize::from(rect.width),
            style,
        );
        used = rect.x + rect.width + 1;
    }
    if let Some(message) = shell.latest_announcement() {
        let room = usize::from((row.x + row.width).saturating_sub(used));
        let width = message.chars().count().min(room);
        if width > 0 {
            let x = row.x + row.width - u16::try_from(width).unwrap_or(0);
            buffer.set_stringn(x, row.y, &message, width, bar);
        }
    }
}

fn render_confirm(
    frame: &mut Frame<'_>,
    area: Rect,
    shell: &Shell,
    window: WindowId,
    selected: ConfirmAction,
) {
    let Some(layout) = confirm_layout(area) else {
        return;
    };
    let name = shell
        .wm()
        .window(window)
        .map_or_else(|| window.to_string(), |w| w.title().to_string());
    frame.render_widget(Clear, layout.dialog);
    let block = Block::default()
        .title(" Unsaved changes ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(block, layout.dialog);
    let body = Rect {
        x: layout.dialog.x + 2,
        y: layout.dialog.y + 1,
        width: layout.dialog.width.saturating_sub(4),
        height: layout.dialog.height.saturating_sub(4),
    };
    let paragraph = Paragraph::new(format!("Close {name} and discard changes?"))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, body);

    let selected_style = Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let plain = Style::default().bg(Color::Black).fg(Color::White);
    let (cancel_style, confirm_style) = match selected {
        ConfirmAction::Cancel => (selected_style, plain),
        ConfirmAction::Confirm => (plain, selected_style),
    };
    let buffer = frame.buffer_mut();
    buffer.set_string(layout.cancel.x, layout.cancel.y, CANCEL_LABEL, cancel_style);
    buffer.set_string(layout.confirm.x, layout.confirm.y, CONFIRM_LABEL, confirm_style);
}

fn render_help(frame: &mut Frame<'_>, area: Rect, shell: &Shell) {
    let width = area.width.min(60);
    let height = area.height.min(24);
    let rect = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let mut text = String::from(HELP_TEXT);
    text.push('\n');
    for (action, combos) in shell.bindings().help_entries() {
        text.push_str(&format!("{:<22} {}\n", action.to_string(), combos.join(", ")));
    }
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}

fn taskbar_row(area: Rect) -> Option<Rect> {
    (area.height > 0).then(|| Rect::new(area.x, area.y + area.height - 1, area.width, 1))
}

fn taskbar_label(shell: &Shell, window: &Window) -> String {
    let name = shell
        .wm()
        .catalog()
        .get(window.app_id())
        .map_or(window.title(), |profile| profile.display_name.as_str());
    let name: String = name.chars().take(TASKBAR_LABEL_MAX - 2).collect();
    format!(" {name} ")
}

fn label_width(label: &str) -> u16 {
    u16::try_from(label.chars().count()).unwrap_or(u16::MAX)
}
