//! Terminal output helpers

/// Cyan URL, wrapped in an OSC 8 hyperlink when stdout supports it
pub fn terminal_link(url: &str) -> String {
    format_link(
        url,
        supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout),
    )
}

fn format_link(url: &str, hyperlink: bool) -> String {
    if hyperlink {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", url, url)
    } else {
        format!("\x1b[36m{}\x1b[0m", url)
    }
}
