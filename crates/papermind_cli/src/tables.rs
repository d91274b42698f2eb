//! Plain-text rendering of paginated bot and file listings.

use std::fmt::Write as _;

use papermind::listing::{format_iso_date, format_size};
use papermind::pagination::{Page, BOTS_PER_PAGE, FILES_PER_PAGE};
use papermind_api::{Bot, StoredFile};

pub fn render_bots(bots: &[Bot], page: usize) -> String {
    if bots.is_empty() {
        return "No bots yet.\n".to_string();
    }

    let page = Page::of(bots, page, BOTS_PER_PAGE);
    let mut out = String::new();
    for bot in page.items {
        let _ = writeln!(out, "{}  {}", bot.id, bot.bot_name);
        if !bot.description.is_empty() {
            let _ = writeln!(out, "    {}", bot.description);
        }
        if let Some(created_at) = &bot.created_at {
            let _ = writeln!(out, "    created {}", format_iso_date(created_at));
        }
    }
    out.push_str(&pager(&page));
    out
}

pub fn render_files(files: &[StoredFile], page: usize) -> String {
    if files.is_empty() {
        return "No files uploaded.\n".to_string();
    }

    let page = Page::of(files, page, FILES_PER_PAGE);
    let mut out = String::new();
    for file in page.items {
        let created = file
            .created_at
            .as_deref()
            .map(format_iso_date)
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{}  {}  {}  {}",
            file.id,
            file.name,
            format_size(file.size),
            created
        );
    }
    out.push_str(&pager(&page));
    out
}

/// Footer such as `page 2/5  < 1 [2] 3 >`.
pub fn pager<T>(page: &Page<'_, T>) -> String {
    let mut out = format!("page {}/{} ", page.page, page.total_pages);
    if page.has_previous() {
        out.push_str(" <");
    }
    for number in page.window.clone() {
        if number == page.page {
            let _ = write!(out, " [{number}]");
        } else {
            let _ = write!(out, " {number}");
        }
    }
    if page.has_next() {
        out.push_str(" >");
    }
    out.push('\n');
    out
}
