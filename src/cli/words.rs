//! `tango words`

use anyhow::Result;

use tango::catalog::{WordPage, DEFAULT_PAGE_SIZE};
use tango::WordCatalog;

pub(crate) fn cmd_words(query: &str, page: usize) -> Result<()> {
    let result = WordCatalog::builtin().search(query, page, DEFAULT_PAGE_SIZE);
    print!("{}", render_page(&result));
    Ok(())
}

fn render_page(page: &WordPage) -> String {
    if page.total == 0 {
        return "No words match.\n".to_string();
    }
    let mut out = String::new();
    for word in &page.words {
        out.push_str(&format!("{:<20} {}\n", word.slug, word.term));
    }
    out.push_str(&format!(
        "\nPage {}/{} ({} words)\n",
        page.page, page.total_pages, page.total
    ));
    out
}
