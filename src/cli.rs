use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::filter::Filter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_bool(self) -> bool {
        self == YesNo::Yes
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum Visibility {
    Show,
    Hide,
    /// Forget the librarian's decision.
    Clear,
}

impl Visibility {
    pub fn as_option(self) -> Option<bool> {
        match self {
            Visibility::Show => Some(true),
            Visibility::Hide => Some(false),
            Visibility::Clear => None,
        }
    }
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Book language (ISO code)
    #[clap(short, long)]
    pub language: Option<String>,

    /// Topic, without the `topic:` prefix
    #[clap(long)]
    pub topic: Option<String>,

    /// Bookshelf key, without the `bookshelf:` prefix
    #[clap(long)]
    pub bookshelf: Option<String>,

    /// Raw tag constraint. Wins over --topic and --bookshelf.
    #[clap(long)]
    pub other_tags: Option<String>,

    /// Book feature, e.g. `talkingBook`
    #[clap(long)]
    pub feature: Option<String>,

    /// Only books in (or out of) circulation. Default: in circulation.
    #[clap(long, value_enum)]
    pub in_circulation: Option<YesNo>,

    #[clap(long)]
    pub uploader: Option<String>,

    #[clap(long)]
    pub copyright: Option<String>,

    #[clap(long)]
    pub country: Option<String>,

    #[clap(long)]
    pub harvest_state: Option<String>,
}

impl FilterArgs {
    pub fn into_filter(self) -> Filter {
        Filter {
            search: None,
            language: self.language,
            topic: self.topic,
            bookshelf: self.bookshelf,
            other_tags: self.other_tags,
            feature: self.feature,
            in_circulation: self.in_circulation.map(YesNo::as_bool),
            uploader: self.uploader,
            copyright: self.copyright,
            country: self.country,
            harvest_state: self.harvest_state,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show how search text is split into phrases and free text.
    /// Works offline.
    Split {
        /// Search box text
        #[clap(allow_hyphen_values = true)]
        text: String,

        /// A known phrase, e.g. `topic:Animals`. Repeatable.
        #[clap(short, long = "phrase")]
        phrases: Vec<String>,
    },
    /// Print the store query for a search. Works offline.
    Compile {
        /// Search box text
        #[clap(allow_hyphen_values = true)]
        text: Option<String>,

        /// A known phrase, e.g. `topic:Animals`. Repeatable.
        #[clap(short, long = "phrase")]
        phrases: Vec<String>,

        #[clap(flatten)]
        filter: FilterArgs,

        /// Page, starting at 0
        #[clap(long, default_value = "0")]
        page: u32,
    },
    /// Search books
    Search {
        /// Search box text; `topic:`, `bookshelf:`, `uploader:` ... are recognized
        #[clap(allow_hyphen_values = true)]
        text: Option<String>,

        #[clap(flatten)]
        filter: FilterArgs,

        /// Grid column filter, e.g. `level=2` or `inCirculation=No`. Repeatable.
        #[clap(short = 'w', long = "where", value_name = "COLUMN=VALUE")]
        column_filters: Vec<String>,

        /// Page, starting at 0
        #[clap(long, default_value = "0")]
        page: u32,

        /// Print the count only
        #[clap(short = 'c', long, default_value = "false")]
        count: bool,

        /// Print a CSV grid instead of JSON
        #[clap(long, default_value = "false")]
        csv: bool,

        /// Grid columns for --csv, comma separated
        #[clap(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Include moderator-only grid columns
        #[clap(long, default_value = "false")]
        moderator: bool,

        /// Sort by a grid column, `-` prefix for descending (e.g. `-createdAt`)
        #[clap(long, allow_hyphen_values = true)]
        sort: Option<String>,

        /// Show titles in this language (ISO code) when the book has one
        #[clap(long)]
        lang: Option<String>,
    },
    /// Show one book
    Book {
        /// Book object id
        id: String,

        /// Show the title in this language (ISO code) when the book has one
        #[clap(long)]
        lang: Option<String>,
    },
    /// List known topics
    Topics {},
    /// List bookshelves
    Bookshelves {
        #[clap(long)]
        category: Option<String>,
    },
    /// Show a language by ISO code
    Language {
        iso_code: String,
    },
    /// Put a book in or out of circulation (moderators)
    Circulation {
        id: String,

        #[clap(value_enum)]
        state: YesNo,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
    /// Mark or unmark a book as incoming (moderators)
    Incoming {
        id: String,

        #[clap(value_enum)]
        state: YesNo,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
    /// Offer or withhold an artifact (epub, pdf, bloomReader, readOnline) (moderators)
    Artifact {
        id: String,

        artifact: String,

        #[clap(value_enum)]
        visibility: Visibility,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
}
