//! HTML pages.

use crate::library::{Book, ChapterNav, TocEntry};
use crate::server::state::{BookSummary, DirectoryEntry};
use quick_xml::escape::escape;
use std::fmt::Write;

const STYLE: &str = r#"
        body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
        a { color: #0066cc; text-decoration: none; }
        a:hover { text-decoration: underline; }
        .page { max-width: 760px; margin: 2rem auto; padding: 0 1rem; }
        .entry { padding: 0.75rem 0; border-bottom: 1px solid #eee; }
        .meta { color: #666; font-size: 0.9rem; }
        .reader { display: flex; }
        .toc { width: 260px; flex-shrink: 0; height: 100vh; overflow-y: auto; position: sticky; top: 0; background: #f7f7f7; padding: 1rem; box-sizing: border-box; }
        .toc ul { list-style: none; padding-left: 1rem; margin: 0; }
        .toc > ul { padding-left: 0; }
        .toc li { margin: 0.3rem 0; }
        .content { flex: 1; max-width: 760px; margin: 0 auto; padding: 2rem 1rem; line-height: 1.6; }
        .content img { max-width: 100%; }
        .nav { display: flex; justify-content: space-between; margin: 2rem 0; }
        .disabled { color: #aaa; }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        body = body,
    )
}

/// URL of a chapter.
pub fn chapter_url(book_id: &str, index: usize) -> String {
    format!("/read/{}/{}", urlencoding::encode(book_id), index)
}

/// Directory chooser shown when several roots are configured.
pub fn directories_page(title: &str, directories: &[DirectoryEntry]) -> String {
    let mut body = format!("<div class=\"page\">\n<h1>{}</h1>\n", escape(title));

    for dir in directories {
        let _ = writeln!(
            body,
            r#"<div class="entry"><a href="/?dir_index={index}">{name}</a><div class="meta">{path}</div></div>"#,
            index = dir.index,
            name = escape(dir.name.as_str()),
            path = escape(dir.path.as_str()),
        );
    }

    body.push_str("</div>");
    layout(title, &body)
}

/// Books under one root.
pub fn library_page(title: &str, books: &[BookSummary], show_back: bool) -> String {
    let mut body = format!("<div class=\"page\">\n<h1>{}</h1>\n", escape(title));

    if show_back {
        body.push_str("<p><a href=\"/\">&larr; All directories</a></p>\n");
    }

    if books.is_empty() {
        body.push_str("<p class=\"meta\">No books found.</p>\n");
    }

    for book in books {
        let _ = writeln!(
            body,
            r#"<div class="entry"><a href="{url}">{title}</a><div class="meta">{author} &middot; {chapters} chapters</div></div>"#,
            url = escape(chapter_url(&book.id, 0).as_str()),
            title = escape(book.title.as_str()),
            author = escape(book.author.as_str()),
            chapters = book.chapters,
        );
    }

    body.push_str("</div>");
    layout(title, &body)
}

fn write_toc(out: &mut String, book: &Book, book_id: &str, entries: &[TocEntry]) {
    if entries.is_empty() {
        return;
    }

    out.push_str("<ul>");
    for entry in entries {
        out.push_str("<li>");
        match book.chapter_index_for_href(&entry.file_href) {
            Some(index) => {
                let mut href = chapter_url(book_id, index);
                if let Some(anchor) = entry.anchor() {
                    href.push('#');
                    href.push_str(&urlencoding::encode(anchor));
                }
                let _ = write!(
                    out,
                    r#"<a href="{}">{}</a>"#,
                    escape(href.as_str()),
                    escape(entry.title.as_str())
                );
            }
            None => out.push_str(&escape(entry.title.as_str())),
        }
        write_toc(out, book, book_id, &entry.children);
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

/// Chapter reader.
///
/// Chapter markup comes from the trusted snapshot and is inserted as is.
pub fn reader_page(book_id: &str, book: &Book, nav: ChapterNav) -> String {
    let chapter = &book.spine[nav.index];

    let mut toc = String::new();
    write_toc(&mut toc, book, book_id, &book.toc);

    let prev = match nav.prev {
        Some(i) => format!(r#"<a href="{}">&larr; Previous</a>"#, chapter_url(book_id, i)),
        None => r#"<span class="disabled">&larr; Previous</span>"#.to_string(),
    };
    let next = match nav.next {
        Some(i) => format!(r#"<a href="{}">Next &rarr;</a>"#, chapter_url(book_id, i)),
        None => r#"<span class="disabled">Next &rarr;</span>"#.to_string(),
    };

    let body = format!(
        r#"<div class="reader">
<nav class="toc">
    <p><a href="/">&larr; Library</a></p>
    <h3>{book_title}</h3>
    <p class="meta">{authors}</p>
    {toc}
</nav>
<main class="content">
    <div class="nav">{prev}<span class="meta">{position} / {total}</span>{next}</div>
    {content}
    <div class="nav">{prev}{next}</div>
    <p class="meta">{source} &middot; processed {processed}</p>
</main>
</div>"#,
        book_title = escape(book.metadata.title.as_str()),
        authors = escape(book.authors_display().as_str()),
        toc = toc,
        prev = prev,
        next = next,
        position = nav.index + 1,
        total = book.chapter_count(),
        content = chapter.content,
        source = escape(book.source_file.as_str()),
        processed = escape(book.processed_at_display().as_str()),
    );

    let title = if chapter.title.is_empty() {
        book.metadata.title.clone()
    } else {
        format!("{} - {}", chapter.title, book.metadata.title)
    };

    layout(&title, &body)
}
