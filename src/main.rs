use anyhow::{bail, Context};
use clap::Parser;
use inquire::error::InquireResult;
use tracing_subscriber::EnvFilter;

mod app;
mod book;
mod cli;
mod config;
mod filter;
mod grid;
mod query;
mod search_query;
#[cfg(test)]
mod tests;

use app::{CatalogService, ParseRemote};
use cli::{Command, FilterArgs};
use config::Config;
use filter::Filter;

fn confirm(message: String, yes: bool) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }
    match inquire::prompt_confirmation(message) {
        InquireResult::Ok(answer) => Ok(answer),
        InquireResult::Err(err) => bail!("An error occurred: {}", err),
    }
}

/// Apply `COLUMN=VALUE` grid filters on top of `filter`.
fn apply_column_filters(filter: &mut Filter, column_filters: &[String]) -> anyhow::Result<()> {
    for column_filter in column_filters {
        let (name, value) = column_filter
            .split_once('=')
            .with_context(|| format!("expected COLUMN=VALUE, got {column_filter:?}"))?;
        let column = grid::select_columns(&[name.trim().to_string()], true)?;
        for column in column {
            column.add_to_filter(filter, value)?;
        }
    }
    Ok(())
}

/// Search box text followed by whatever the grid filters appended.
fn combined_text(text: Option<String>, filter: &mut Filter) -> String {
    [text, filter.search.take()]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "shelf=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    tracing::debug!("{:?}", args.command);

    // splitting needs neither config nor server
    if let Command::Split { text, phrases } = &args.command {
        return print_json(&search_query::split(text, phrases));
    }

    let config = Config::load()?;

    if let Command::Compile {
        text,
        phrases,
        filter,
        page,
    } = args.command
    {
        let mut filter = filter.into_filter();
        let mut known = config.fixed_phrases.clone();
        known.extend(phrases);
        if let Some(text) = text {
            filter.merge_search_text(&text, &known);
        }
        return print_json(&query::compile(&filter, &config.book_params(page)));
    }

    let service = CatalogService::new(Box::new(ParseRemote::new(config.connection()?)));

    match args.command {
        Command::Split { .. } | Command::Compile { .. } => Ok(()),

        Command::Search {
            text,
            filter,
            column_filters,
            page,
            count,
            csv,
            columns,
            moderator,
            sort,
            lang,
        } => {
            let mut filter = FilterArgs::into_filter(filter);
            apply_column_filters(&mut filter, &column_filters)?;
            let text = combined_text(text, &mut filter);

            if count {
                if !text.is_empty() {
                    let known = service.known_phrases(&config.fixed_phrases)?;
                    filter.merge_search_text(&text, &known);
                }
                println!("{} books found", service.book_count(&filter)?);
                return Ok(());
            }

            let mut params = config.book_params(page);
            if let Some(sort) = sort {
                params.order = Some(grid::sort_order(&sort)?);
            }
            let mut result = if text.is_empty() {
                service.search_books(&params, &filter)?
            } else {
                let (_, result) =
                    service.search_text(&text, filter, &params, &config.fixed_phrases)?;
                result
            };

            if let Some(lang) = &lang {
                for book in &mut result.books {
                    book.localize_title(lang);
                }
            }

            if csv {
                let columns = grid::select_columns(&columns, moderator)?;
                grid::write_csv(std::io::stdout().lock(), &columns, &result.books)?;
                return Ok(());
            }

            print_json(&result)
        }

        Command::Book { id, lang } => {
            let mut book = service.get_book(&id)?;
            if let Some(lang) = &lang {
                book.localize_title(lang);
            }
            print_json(&book)
        }

        Command::Topics {} => print_json(&service.topic_list()?),

        Command::Bookshelves { category } => print_json(&service.bookshelves(category.as_deref())?),

        Command::Language { iso_code } => match service.language_info(&iso_code)? {
            Some(language) => print_json(&language),
            None => bail!("no language with ISO code {iso_code:?}"),
        },

        Command::Circulation { id, state, yes } => {
            let in_circulation = state.as_bool();
            let verb = if in_circulation { "into" } else { "out of" };
            if !confirm(format!("Put book {id} {verb} circulation?"), yes)? {
                return Ok(());
            }
            let book = service.set_in_circulation(&id, in_circulation)?;
            println!("{} is now {verb} circulation", book.title);
            Ok(())
        }

        Command::Incoming { id, state, yes } => {
            let incoming = state.as_bool();
            let message = if incoming {
                format!("Mark book {id} as incoming?")
            } else {
                format!("Remove book {id} from incoming?")
            };
            if !confirm(message, yes)? {
                return Ok(());
            }
            let book = service.set_incoming(&id, incoming)?;
            print_json(&book.tags)
        }

        Command::Artifact {
            id,
            artifact,
            visibility,
            yes,
        } => {
            if !confirm(
                format!("Set {artifact} of book {id} to {visibility:?}?"),
                yes,
            )? {
                return Ok(());
            }
            let mut book = service.get_book(&id)?;
            book.set_librarian_visibility(&artifact, visibility.as_option());
            service.update_visibility(&book)?;
            print_json(&book.artifact_visibility)
        }
    }
}
