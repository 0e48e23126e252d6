use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn keybind(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        keybind("Ctrl-C", 6, "Quit"),
        keybind("Tab", 9, "Cycle focus: query → location → results"),
        keybind("Enter", 7, "Submit query"),
        keybind("Ctrl-R", 6, "Resubmit (replaces a running request)"),
        keybind("Esc", 9, "Cancel running request / leave help"),
        keybind("Ctrl-N/P", 4, "Next/previous demo scenario"),
        keybind("Ctrl-L", 6, "Clear result"),
        keybind("F1", 10, "Show this help"),
        Line::from(""),
        Line::from("Results:"),
        keybind("←/→", 9, "Switch tabs (also h/l or 1-5)"),
        keybind("↑/↓", 9, "Scroll (also j/k)"),
        keybind("s", 11, "Save document as legal_document.txt"),
        keybind("y", 11, "Copy document to clipboard"),
        keybind("?", 11, "Show this help"),
        keybind("q", 11, "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Links are shown for reference only; open them in a browser you trust.",
            Style::default().fg(Color::Gray),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
