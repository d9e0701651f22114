//! Line-oriented terminal host for the search session.
//!
//! Every plain line replaces the search text. Lines starting with `:` are
//! commands: `:show N`, `:open [N]`, `:close`, `:quit`. `:open` without an
//! index opens the file in the detail view.

use std::fmt::Write as _;
use std::time::Instant;

use colored::Colorize;
use github_search::{FileDescriptor, GitHubSearchClient, GitHubSearchResult, SearchPage};
use search_session::{LoadState, PreviewTicket, SearchTicket, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// New search text.
    Query(String),
    /// Push the detail view for the 1-based result index.
    Show(usize),
    /// Open the 1-based result in the browser.
    Open(usize),
    /// Open the previewed file in the browser.
    OpenPreviewed,
    Close,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let Some(rest) = line.trim_end_matches(['\r', '\n']).strip_prefix(':') else {
        return Command::Query(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();
    let index = arg.and_then(|n| n.parse::<usize>().ok());

    match (name, index) {
        ("show", Some(n)) if n > 0 => Command::Show(n),
        ("open", Some(n)) if n > 0 => Command::Open(n),
        ("open", None) if arg.is_none() => Command::OpenPreviewed,
        ("close", _) => Command::Close,
        ("quit" | "q", _) => Command::Quit,
        _ => Command::Unknown(rest.to_string()),
    }
}

/// Outcome of a spawned request, tagged with its ticket number.
enum Event {
    Search(u64, GitHubSearchResult<SearchPage>),
    Preview(u64, GitHubSearchResult<String>),
}

/// Runs the interactive loop until `:quit` or end of input.
pub async fn run(client: GitHubSearchClient) -> std::io::Result<()> {
    let mut session = Session::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(
        repository = %client.config().repository,
        language = %client.config().language,
        "search shell started"
    );
    println!("{}", render_list(&session));

    loop {
        let deadline = session.debounce_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_command(&line) {
                    Command::Query(text) => {
                        session.on_search_text_changed(&text, Instant::now());
                    }
                    Command::Show(n) => match session.files().get(n - 1).cloned() {
                        Some(file) => {
                            if let Some(ticket) = session.select(file) {
                                spawn_preview(&client, ticket, tx.clone());
                            }
                            println!("{}", render_preview(&session));
                            continue;
                        }
                        None => println!("{}", format!("no result #{n}").yellow()),
                    },
                    cmd @ (Command::Open(_) | Command::OpenPreviewed) => {
                        match browser_target(&session, &cmd) {
                            Some(file) => open_in_browser(file),
                            None => println!("{}", "nothing to open".yellow()),
                        }
                        continue;
                    }
                    Command::Close => session.close_preview(),
                    Command::Quit => break,
                    Command::Unknown(cmd) => {
                        println!("{}", format!("unknown command ':{cmd}'").yellow());
                        continue;
                    }
                }
            }
            _ = sleep_until(deadline) => {
                if let Some(ticket) = session.poll_debounce(Instant::now()) {
                    spawn_search(&client, ticket, tx.clone());
                }
            }
            Some(event) = rx.recv() => {
                match event {
                    Event::Search(seq, outcome) => {
                        session.complete_search(seq, outcome);
                    }
                    Event::Preview(seq, outcome) => {
                        session.complete_preview(seq, outcome);
                        println!("{}", render_preview(&session));
                        continue;
                    }
                }
            }
        }

        println!("{}", render_list(&session));
    }

    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

fn spawn_search(client: &GitHubSearchClient, ticket: SearchTicket, tx: mpsc::UnboundedSender<Event>) {
    let client = client.clone();
    tokio::spawn(async move {
        let outcome = client.search_page(&ticket.terms).await;
        // Receiver only goes away on shutdown.
        let _ = tx.send(Event::Search(ticket.seq, outcome));
    });
}

fn spawn_preview(client: &GitHubSearchClient, ticket: PreviewTicket, tx: mpsc::UnboundedSender<Event>) {
    let client = client.clone();
    tokio::spawn(async move {
        let outcome = client.fetch_content(&ticket.file).await;
        let _ = tx.send(Event::Preview(ticket.seq, outcome));
    });
}

/// File an `:open` command refers to: a list entry, or the previewed file.
fn browser_target<'a>(session: &'a Session, cmd: &Command) -> Option<&'a FileDescriptor> {
    match cmd {
        Command::Open(n) => session.files().get(n.checked_sub(1)?),
        Command::OpenPreviewed => session.previewed_file(),
        _ => None,
    }
}

fn open_in_browser(file: &FileDescriptor) {
    match open::that(&file.html_url) {
        Ok(()) => info!(url = %file.html_url, "opened in browser"),
        Err(err) => {
            warn!(url = %file.html_url, error = %err, "failed to open browser");
            println!("{}", format!("could not open {}: {err}", file.html_url).red());
        }
    }
}

/// Search prompt plus the current result list.
pub fn render_list(session: &Session) -> String {
    let mut out = String::new();
    let marker = if session.is_loading() {
        "…".cyan().to_string()
    } else {
        " ".to_string()
    };
    let _ = writeln!(out, "{marker} search: {}", session.search_text());

    match session.results() {
        LoadState::Idle => {
            let _ = write!(out, "  {}", "type to search".dimmed());
        }
        LoadState::Loading { .. } => {
            let _ = write!(out, "  {}", "searching".dimmed());
        }
        LoadState::Ready(page) if page.items.is_empty() => {
            let _ = write!(out, "  {}", "no results".dimmed());
        }
        LoadState::Ready(page) => {
            for (i, f) in page.items.iter().enumerate() {
                let _ = writeln!(out, "  {:>2}. {}", i + 1, f.path);
            }
            let _ = write!(out, "  {}", page_summary(page).dimmed());
        }
        LoadState::Failed(failure) => {
            let _ = write!(out, "  {}", failure.to_string().red());
        }
    }
    out
}

/// "30 of 112" style counter, flagged when GitHub gave up early.
fn page_summary(page: &SearchPage) -> String {
    let mut summary = format!("{} of {}", page.items.len(), page.total_count);
    if page.incomplete_results {
        summary.push_str(", incomplete");
    }
    summary
}

/// Detail view for the selected file.
pub fn render_preview(session: &Session) -> String {
    let Some(file) = session.previewed_file() else {
        return "no preview open".dimmed().to_string();
    };

    let header = format!("── {} ──", file.path).bold().to_string();
    let body = match session.preview() {
        LoadState::Idle | LoadState::Loading { .. } => "loading…".dimmed().to_string(),
        LoadState::Ready(text) => text.clone(),
        LoadState::Failed(failure) => failure.to_string().red().to_string(),
    };
    format!("{header}\n{body}\n{}", file.html_url.dimmed())
}
