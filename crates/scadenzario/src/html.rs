use anyhow::Result;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::grid::{CalendarView, DisplayRecord, GridCell, MonthCursor};
use crate::types::{delete_href, edit_href};

/// Presentation policy injected by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Task indicators shown per cell before the "+N more" summary.
    /// 2 suits narrow deployments, 4 is the desktop default.
    pub max_visible: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { max_visible: 4 }
    }
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Write the page for `view` as a standalone HTML file.
pub fn generate_html(view: &CalendarView, opts: RenderOptions, path: &Path) -> Result<()> {
    let html = render_page(view, opts);
    fs::write(path, html.into_string())?;
    Ok(())
}

pub fn render_page(view: &CalendarView, opts: RenderOptions) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Scadenzario" }
                // Markdown and math rendering for assistant replies
                script src="https://cdn.jsdelivr.net/npm/marked/marked.min.js" {}
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css";
                script defer src="https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.js" {}
                script defer src="https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/contrib/auto-render.min.js" {}
                style { (PreEscaped(CSS)) }
            }
            body {
                div.container {
                    (render_header(view))
                    div.weekday-row {
                        @for name in WEEKDAYS {
                            div.weekday { (name) }
                        }
                    }
                    div.calendar-grid #"calendarGrid" {
                        @for cell in &view.cells {
                            (render_cell(cell, opts.max_visible))
                        }
                    }
                    (render_assistant_panel())
                }
                script { (PreEscaped(JAVASCRIPT)) }
            }
        }
    }
}

/// Month heading plus the prev/next/today navigation links. The links are
/// the query-parameter form of the month cursor; "Today" is the bare page,
/// which defaults to the current month.
fn render_header(view: &CalendarView) -> Markup {
    let (prev_href, next_href) = match MonthCursor::new(view.year, view.month) {
        Some(c) => {
            let mut prev = c;
            prev.advance(-1);
            let mut next = c;
            next.advance(1);
            (month_href(prev), month_href(next))
        }
        None => ("/".to_string(), "/".to_string()),
    };

    html! {
        div.calendar-header {
            a.nav-btn href=(prev_href) { "\u{2039}" }
            h1 #"currentMonthYear" { (view.title) }
            a.nav-btn href=(next_href) { "\u{203a}" }
            a.nav-btn.today-btn href="/" { "Today" }
        }
    }
}

fn month_href(cursor: MonthCursor) -> String {
    format!("/?year={}&month={}", cursor.year(), cursor.month())
}

fn render_cell(cell: &GridCell, max_visible: usize) -> Markup {
    html! {
        div.calendar-day.other-month[!cell.in_month].today[cell.is_today] {
            span.day-number { (cell.day) }
            @for record in cell.tasks.iter().take(max_visible) {
                (render_task_indicator(record))
            }
            @if cell.tasks.len() > max_visible {
                div.more-count { "+" (cell.tasks.len() - max_visible) " more" }
            }
        }
    }
}

fn render_task_indicator(record: &DisplayRecord) -> Markup {
    // Overdue wins over the priority marker
    let class = if record.overdue {
        "overdue"
    } else {
        record.priority.css_class()
    };

    html! {
        div.task-indicator.(class) {
            @if record.overdue {
                span.alert { "!" }
            }
            a.task-link href=(edit_href(&record.task_id)) { (record.title) }
            a.task-del href=(delete_href(&record.task_id))
                onclick="return confirmDelete(event, this.href)" { "\u{d7}" }
        }
    }
}

fn render_assistant_panel() -> Markup {
    html! {
        div.ai-panel {
            div.ai-header { "Study Assistant" }
            div.ai-responses #"aiResponseArea" {}
            div.ai-input-row {
                textarea #"aiInput" rows="1" placeholder="Ask about your tasks..." {}
                button #"aiSendBtn" { "Send" }
            }
        }
    }
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #f8fafc;
    color: #1e293b;
    min-height: 100vh;
    line-height: 1.4;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 24px 16px 48px;
}

.calendar-header {
    display: flex;
    align-items: center;
    gap: 16px;
    margin-bottom: 20px;
}

.calendar-header h1 {
    font-size: 1.6em;
    font-weight: 700;
    min-width: 220px;
    text-align: center;
}

.nav-btn {
    display: inline-block;
    padding: 6px 14px;
    border: 1px solid #cbd5e1;
    border-radius: 8px;
    background: #fff;
    color: #334155;
    text-decoration: none;
    font-weight: 600;
}

.nav-btn:hover {
    background: #f1f5f9;
}

.today-btn {
    margin-left: auto;
}

.weekday-row {
    display: grid;
    grid-template-columns: repeat(7, 1fr);
    gap: 4px;
    margin-bottom: 4px;
}

.weekday {
    text-align: center;
    font-size: 0.75em;
    font-weight: 700;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: #64748b;
    padding: 6px 0;
}

.calendar-grid {
    display: grid;
    grid-template-columns: repeat(7, 1fr);
    gap: 4px;
}

.calendar-day {
    min-height: 96px;
    padding: 6px;
    background: #fff;
    border: 1px solid #e2e8f0;
    border-radius: 8px;
    overflow: hidden;
}

.calendar-day.other-month {
    background: #f1f5f9;
    color: #94a3b8;
}

.calendar-day.today {
    border-color: #2563eb;
    box-shadow: inset 0 0 0 1px #2563eb;
}

.day-number {
    font-weight: 700;
    font-size: 0.85em;
}

.task-indicator {
    display: flex;
    align-items: center;
    gap: 4px;
    margin-top: 4px;
    padding: 2px 6px;
    border-radius: 6px;
    font-size: 0.72em;
    white-space: nowrap;
}

.task-indicator .task-link {
    flex: 1;
    overflow: hidden;
    text-overflow: ellipsis;
    color: inherit;
    text-decoration: none;
}

.task-indicator .task-del {
    color: inherit;
    text-decoration: none;
    opacity: 0.5;
}

.task-indicator .task-del:hover {
    opacity: 1;
}

.indicator-high {
    background: #fef3c7;
    border: 1px solid #f59e0b;
}

.indicator-med {
    background: #e0e7ff;
    border: 1px solid #818cf8;
}

.task-indicator.overdue {
    background: #dc2626;
    border: none;
    color: #fff;
}

.task-indicator.overdue .alert {
    font-weight: 900;
}

.more-count {
    margin-top: 4px;
    font-size: 0.68em;
    font-weight: 600;
    text-align: center;
    color: #64748b;
}

.ai-panel {
    margin-top: 32px;
    background: #fff;
    border: 1px solid #e2e8f0;
    border-radius: 12px;
    overflow: hidden;
}

.ai-header {
    padding: 12px 16px;
    font-weight: 700;
    border-bottom: 1px solid #e2e8f0;
}

.ai-responses {
    max-height: 320px;
    overflow-y: auto;
    padding: 16px;
    display: flex;
    flex-direction: column;
    gap: 10px;
}

.bubble {
    max-width: 80%;
    padding: 10px 14px;
    border-radius: 16px;
    font-size: 0.9em;
    line-height: 1.5;
}

.bubble.user {
    align-self: flex-end;
    background: #2563eb;
    color: #fff;
    border-bottom-right-radius: 4px;
}

.bubble.assistant {
    align-self: flex-start;
    background: #e2e8f0;
    border-bottom-left-radius: 4px;
}

.bubble.error {
    align-self: flex-start;
    background: #fef2f2;
    border: 1px solid #fecaca;
    color: #991b1b;
}

.ai-input-row {
    display: flex;
    gap: 8px;
    padding: 12px 16px;
    border-top: 1px solid #e2e8f0;
}

.ai-input-row textarea {
    flex: 1;
    resize: none;
    border: 1px solid #cbd5e1;
    border-radius: 8px;
    padding: 8px 12px;
    font: inherit;
}

.ai-input-row button {
    padding: 8px 20px;
    border: none;
    border-radius: 8px;
    background: #2563eb;
    color: #fff;
    font-weight: 600;
    cursor: pointer;
}

@media (max-width: 768px) {
    .calendar-day {
        min-height: 72px;
    }

    .calendar-header h1 {
        font-size: 1.2em;
        min-width: 150px;
    }
}
"#;

const JAVASCRIPT: &str = r#"
const aiInput = document.getElementById('aiInput');
const aiSendBtn = document.getElementById('aiSendBtn');
const aiResponseArea = document.getElementById('aiResponseArea');

aiInput.addEventListener('input', () => {
    aiInput.style.height = 'auto';
    aiInput.style.height = aiInput.scrollHeight + 'px';
});

aiInput.addEventListener('keydown', (e) => {
    if (e.key === 'Enter' && !e.shiftKey) {
        e.preventDefault();
        aiSendBtn.click();
    }
});

aiSendBtn.addEventListener('click', async () => {
    const prompt = aiInput.value.trim();
    if (!prompt) return;

    const userBubble = document.createElement('div');
    userBubble.className = 'bubble user';
    userBubble.textContent = prompt;
    aiResponseArea.appendChild(userBubble);

    aiInput.value = '';
    aiInput.style.height = 'auto';
    aiResponseArea.scrollTop = aiResponseArea.scrollHeight;

    try {
        const res = await fetch('/ask_ai', {
            method: 'POST',
            headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
            body: `prompt=${encodeURIComponent(prompt)}`,
        });
        const data = await res.json();

        const aiBubble = document.createElement('div');
        aiBubble.className = 'bubble assistant';
        aiBubble.innerHTML = marked.parse(data.response);
        aiResponseArea.appendChild(aiBubble);

        if (window.renderMathInElement) {
            renderMathInElement(aiBubble, {
                delimiters: [
                    { left: '$$', right: '$$', display: true },
                    { left: '$', right: '$', display: false },
                ],
            });
        }
        aiResponseArea.scrollTop = aiResponseArea.scrollHeight;
    } catch (err) {
        console.error(err);
        const errorMsg = document.createElement('div');
        errorMsg.className = 'bubble error';
        errorMsg.textContent = 'Error contacting AI.';
        aiResponseArea.appendChild(errorMsg);
    }
});

function confirmDelete(event, href) {
    event.preventDefault();
    if (window.confirm('Delete this task?')) {
        window.location = href;
    }
    return false;
}
"#;
