use std::io::Write;

use anyhow::{bail, Context};

use crate::{app::service::INCOMING_TAG, book::Book, filter::Filter};

/// Tags with a column of their own; the "Other Tags" column leaves them out.
const TAGS_WITH_OWN_COLUMN: &[&str] = &["bookshelf:", "topic:", INCOMING_TAG, "level:"];

#[derive(Debug, Clone, PartialEq)]
pub struct GridColumn {
    pub name: &'static str,
    title: Option<&'static str>,
    pub default_visible: bool,
    pub moderator_only: bool,
    pub sorting_enabled: bool,
}

const fn column(name: &'static str) -> GridColumn {
    GridColumn {
        name,
        title: None,
        default_visible: false,
        moderator_only: false,
        sorting_enabled: false,
    }
}

/// Admin grid columns, in default display order.
pub fn columns() -> Vec<GridColumn> {
    vec![
        GridColumn { default_visible: true, sorting_enabled: true, ..column("title") },
        GridColumn { default_visible: true, ..column("languages") },
        GridColumn { title: Some("Other Tags"), ..column("tags") },
        GridColumn { default_visible: true, ..column("bookshelves") },
        GridColumn { sorting_enabled: true, ..column("country") },
        GridColumn { default_visible: true, moderator_only: true, ..column("incoming") },
        GridColumn { default_visible: true, ..column("level") },
        GridColumn { default_visible: true, ..column("topic") },
        GridColumn { sorting_enabled: true, ..column("harvestState") },
        column("harvestLog"),
        GridColumn { sorting_enabled: true, ..column("summary") },
        column("inCirculation"),
        GridColumn { sorting_enabled: true, ..column("license") },
        GridColumn { sorting_enabled: true, ..column("copyright") },
        GridColumn { sorting_enabled: true, ..column("pageCount") },
        GridColumn { sorting_enabled: true, ..column("phashOfFirstContentImage") },
        GridColumn { sorting_enabled: true, ..column("createdAt") },
        GridColumn { sorting_enabled: true, ..column("publisher") },
        GridColumn { sorting_enabled: true, ..column("originalPublisher") },
        GridColumn {
            default_visible: true,
            moderator_only: true,
            sorting_enabled: true,
            ..column("uploader")
        },
    ]
}

/// Look up columns by name; an empty list means the default visible set.
pub fn select_columns(names: &[String], moderator: bool) -> anyhow::Result<Vec<GridColumn>> {
    let all = columns();
    if names.is_empty() {
        return Ok(all
            .into_iter()
            .filter(|c| c.default_visible && (moderator || !c.moderator_only))
            .collect());
    }
    names
        .iter()
        .map(|name| {
            all.iter()
                .find(|c| c.name == name.as_str())
                .cloned()
                .with_context(|| format!("unknown grid column {name:?}"))
        })
        .collect()
}

/// Store `order` for a sortable column; a leading `-` sorts descending.
pub fn sort_order(spec: &str) -> anyhow::Result<String> {
    let (descending, name) = match spec.trim().strip_prefix('-') {
        Some(name) => (true, name),
        None => (false, spec.trim()),
    };
    let Some(column) = columns().into_iter().find(|c| c.name == name) else {
        bail!("unknown grid column {name:?}");
    };
    if !column.sorting_enabled {
        bail!("column {name:?} cannot be sorted");
    }
    Ok(if descending {
        format!("-{name}")
    } else {
        name.to_string()
    })
}

/// `harvestState` → `Harvest State`, `animal stories` → `Animal Stories`.
pub fn title_case(s: &str) -> String {
    let mut spaced = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_uppercase() && prev.is_some_and(char::is_lowercase) {
            spaced.push(' ');
        }
        spaced.push(c);
        prev = Some(c);
    }
    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn yes_no(value: bool) -> String {
    let answer = if value { "Yes" } else { "No" };
    answer.to_string()
}

/// `axis:value`, quoting values of more than one word so the search box
/// keeps them together.
fn axis_phrase(axis: &str, value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("{axis}:\"{}\"", value.replace('"', ""))
    } else {
        format!("{axis}:{value}")
    }
}

fn append_search(filter: &mut Filter, text: &str) {
    filter.search = Some(match filter.search.take() {
        Some(search) if !search.trim().is_empty() => format!("{search} {text}"),
        _ => text.to_string(),
    });
}

impl GridColumn {
    pub fn title(&self) -> String {
        self.title
            .map(str::to_string)
            .unwrap_or_else(|| title_case(self.name))
    }

    pub fn cell(&self, book: &Book) -> String {
        match self.name {
            "title" => book.title.clone(),
            "languages" => book
                .languages
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            "tags" => book
                .tags
                .iter()
                .filter(|t| !TAGS_WITH_OWN_COLUMN.iter().any(|own| t.starts_with(own)))
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            "bookshelves" => book.bookshelves.join(","),
            "country" => book.country.clone(),
            "incoming" => yes_no(book.tags.iter().any(|t| t == INCOMING_TAG)),
            "level" => book.best_level().unwrap_or_default(),
            "topic" => book
                .tags
                .iter()
                .filter_map(|t| t.strip_prefix("topic:"))
                .collect::<Vec<_>>()
                .join(", "),
            "harvestState" => book.harvest_state.clone(),
            "harvestLog" => book.harvest_log_text(),
            "summary" => book.summary.clone(),
            "inCirculation" => yes_no(book.in_circulation),
            "license" => book.license.clone(),
            "copyright" => book.copyright.clone(),
            "pageCount" => book.page_count.clone(),
            "phashOfFirstContentImage" => book.phash_of_first_content_image.clone(),
            "createdAt" => book
                .upload_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            "publisher" => book.publisher.clone(),
            "originalPublisher" => book.original_publisher.clone(),
            "uploader" => book
                .uploader
                .as_ref()
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Narrow `filter` by what the user typed into this column's filter box.
    pub fn add_to_filter(&self, filter: &mut Filter, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match self.name {
            // no title: or language: axis, so these search every field
            "title" | "languages" => append_search(filter, value),
            "tags" => filter.other_tags = Some(value.to_string()),
            "bookshelves" => filter.bookshelf = Some(value.to_string()),
            "topic" => filter.topic = Some(title_case(value)),
            "level" => append_search(filter, &axis_phrase("level", &title_case(value))),
            "country" | "harvestState" | "copyright" | "uploader" => {
                append_search(filter, &axis_phrase(self.name, value))
            }
            "incoming" => match value {
                "Yes" => filter.other_tags = Some(INCOMING_TAG.to_string()),
                "All" => {}
                other => bail!("incoming can only be filtered by Yes or All, got {other:?}"),
            },
            "inCirculation" => match value {
                "Yes" => filter.in_circulation = Some(true),
                "No" => filter.in_circulation = Some(false),
                // "All" and anything else leave the default
                _ => {}
            },
            name => bail!("column {name:?} cannot be filtered"),
        }
        Ok(())
    }
}

/// Write `books` as CSV with a header row of column titles.
pub fn write_csv<W: Write>(writer: W, columns: &[GridColumn], books: &[Book]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(columns.iter().map(GridColumn::title))?;
    for book in books {
        wtr.write_record(columns.iter().map(|c| c.cell(book)))?;
    }
    wtr.flush()?;

    Ok(())
}
