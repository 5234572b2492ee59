use structopt::StructOpt;

pub const DEFAULT_LIMIT: i64 = 300;

#[derive(StructOpt, Debug, Clone, PartialEq)]
#[structopt(name = "doglog", about = "Search and tail logs from Datadog.")]
pub struct Opt {
    /// Special case to search the 'service' message field, e.g., -s send-email is equivalent to
    /// -q 'service:send-email'. Merged with the -q query using 'AND' if the -q query is present.
    #[structopt(short, long)]
    pub service: Option<String>,

    /// Query terms to search on (Datadog search syntax). Defaults to '*'.
    #[structopt(short, long)]
    pub query: Option<String>,

    /// The maximum number of messages to request from Datadog. Must be greater than 0.
    #[structopt(short, long, default_value = "300", allow_hyphen_values = true)]
    pub limit: i64,

    /// Whether to tail the output. Requires a relative search.
    #[structopt(short, long)]
    pub tail: bool,

    /// Path to the config file.
    #[structopt(short, long, default_value = "~/.doglog")]
    pub config: String,

    /// Time range to search backwards from the current moment. Examples: 30m, 2h, 4d
    #[structopt(short, long, default_value = "2h")]
    pub range: String,

    /// Starting time to search from. Allows variable formats, including '1:32pm' or '1/4/2019 12:30:00'.
    #[structopt(long)]
    pub start: Option<String>,

    /// Ending time to search from. Allows variable formats, including '6:45am' or
    /// '2019-01-04 12:30:00'. Defaults to now if --start is provided but no --end.
    #[structopt(long)]
    pub end: Option<String>,

    /// Output messages in json format.
    #[structopt(short, long)]
    pub json: bool,

    /// Don't use colors in output.
    #[structopt(long = "no-colors")]
    pub no_colors: bool,
}

/// Renders the help text shown alongside every fatal argument error.
pub fn usage() -> String {
    let mut buf = Vec::new();
    if Opt::clap().write_help(&mut buf).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}
