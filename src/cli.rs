//! Terminal front end for the student records client
//!
//! Parses slash commands, renders the controllers' state as plain text and
//! drives the application from async stdin.

use crate::app::{StudentRecordsApp, View};
use crate::controllers::dashboard::DashboardState;
use crate::controllers::delete::DELETE_PROMPT;
use crate::controllers::{CreateOutcome, EditOutcome, ListState};
use crate::error::{ClientError, Result};
use crate::models::stats::{month_label, share};
use crate::models::filter::PAGE_SIZE_CHOICES;
use crate::models::{Category, FilterState, SortDirection, SortField, Student, StudentField};
use crate::notify::{Level, Notification, Notifier};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

pub type Assignments = Vec<(StudentField, String)>;

/// Command types for the CLI
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dashboard,
    Refresh,
    List,
    Search(String),
    Category(Option<Category>),
    Sort(SortField, Option<SortDirection>),
    Size(u32),
    /// Zero-based page
    Page(u32),
    Next,
    Prev,
    First,
    Last,
    Show(i64),
    Add(Assignments),
    Edit(i64, Assignments),
    Delete(i64),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  /dashboard                   analytics overview
  /refresh                     re-sync dashboard (or reload the list)
  /list                        all students
  /search <keyword>            search by keyword
  /category <CS|CIVIL|MECHANICAL|ELECTRICAL|IT|all>
  /sort <field> [asc|desc]     firstName, lastName, email, category, createdAt
  /size <n>                    students per page (5, 10, 20 or 50)
  /page <n> | /next | /prev | /first | /last
  /show <id>                   student details
  /add firstName=..; email=..; ...
  /edit <id> phoneNumber=..; ...
  /delete <id>
  /quit";

fn invalid(msg: impl Into<String>) -> ClientError {
    ClientError::InvalidCommand(msg.into())
}

fn parse_id(arg: &str) -> Result<i64> {
    arg.trim()
        .parse()
        .map_err(|_| invalid(format!("Not a student id: {}", arg.trim())))
}

/// Parse `field=value; field=value` pairs.
pub fn parse_assignments(input: &str) -> Result<Assignments> {
    input
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| invalid(format!("Expected field=value, got: {}", part)))?;
            Ok((key.parse::<StudentField>()?, value.trim().to_string()))
        })
        .collect()
}

/// Parse a command from user input
pub fn parse_command(input: &str) -> Result<Command> {
    let input = input.trim();
    let (name, rest) = input.split_once(' ').unwrap_or((input, ""));
    let rest = rest.trim();

    let command = match name {
        "/dashboard" => Command::Dashboard,
        "/refresh" => Command::Refresh,
        "/list" => Command::List,
        "/search" => Command::Search(rest.to_string()),
        "/category" if rest.eq_ignore_ascii_case("all") => Command::Category(None),
        "/category" => Command::Category(Some(rest.parse()?)),
        "/sort" => {
            let mut args = rest.split_whitespace();
            let field = args
                .next()
                .ok_or_else(|| invalid("Usage: /sort <field> [asc|desc]"))?
                .parse()?;
            let direction = args.next().map(str::parse).transpose()?;
            Command::Sort(field, direction)
        }
        "/size" => {
            let size = rest
                .parse::<u32>()
                .ok()
                .filter(|size| PAGE_SIZE_CHOICES.contains(size))
                .ok_or_else(|| invalid(format!("Page size must be one of {:?}", PAGE_SIZE_CHOICES)))?;
            Command::Size(size)
        }
        "/page" => {
            let shown: u32 = rest
                .parse()
                .map_err(|_| invalid(format!("Not a page number: {}", rest)))?;
            let page = shown
                .checked_sub(1)
                .ok_or_else(|| invalid("Pages start at 1"))?;
            Command::Page(page)
        }
        "/next" => Command::Next,
        "/prev" => Command::Prev,
        "/first" => Command::First,
        "/last" => Command::Last,
        "/show" => Command::Show(parse_id(rest)?),
        "/add" => Command::Add(parse_assignments(rest)?),
        "/edit" => {
            let (id, fields) = rest.split_once(' ').unwrap_or((rest, ""));
            Command::Edit(parse_id(id)?, parse_assignments(fields)?)
        }
        "/delete" => Command::Delete(parse_id(rest)?),
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other if other.starts_with('/') => {
            return Err(invalid(format!("Unknown command: {}", other)))
        }
        _ => return Err(invalid("Commands start with '/'; try /help")),
    };
    Ok(command)
}

/// Format a notification for display
pub fn format_notification(notification: &Notification) -> String {
    match notification.level {
        Level::Success => format!("✔ {}", notification.message),
        Level::Error => format!("✖ {}", notification.message),
    }
}

/// Prints notifications to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        log::debug!("notification: {:?}", notification);
        println!("{}", format_notification(&notification));
    }
}

/// Pagination line, hidden when everything fits on one page.
pub fn format_pagination(page: u32, total_pages: u32) -> Option<String> {
    if total_pages <= 1 {
        return None;
    }
    Some(format!("Showing page {} of {}", u64::from(page) + 1, total_pages))
}

pub fn format_student_row(student: &Student) -> String {
    format!(
        "#{:<5} {:<24} {:<28} {:<11} {}",
        student.id,
        student.full_name(),
        student.email,
        student.category,
        student.institute
    )
}

pub fn format_student_list(state: &ListState, filters: &FilterState) -> String {
    let mut out = format!(
        "== {} ({} students, sorted by {} {}) ==\n",
        filters.title(),
        state.total_elements,
        filters.sort_by,
        filters.direction
    );
    if state.students.is_empty() {
        out.push_str("No students found\n");
    }
    for student in &state.students {
        out.push_str(&format_student_row(student));
        out.push('\n');
    }
    if let Some(line) = format_pagination(state.page, state.total_pages) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn or_missing(value: &str) -> &str {
    if value.is_empty() {
        "Not provided"
    } else {
        value
    }
}

pub fn format_student_detail(student: &Student) -> String {
    let mut out = format!(
        "{} [{}] #{}\n  Email:       {}\n  Phone:       {}\n  Gender:      {}\n  Institution: {}\n  Address:     {}\n",
        student.full_name(),
        student.category,
        student.id,
        or_missing(&student.email),
        or_missing(&student.phone_number),
        student.gender,
        or_missing(&student.institute),
        or_missing(&student.address),
    );
    if let Some(created) = student.created_at {
        out.push_str(&format!("  Registered:  {}\n", created.format("%Y-%m-%d %H:%M")));
    }
    out
}

/// Widest trend bar, in columns.
const BAR_WIDTH: u64 = 40;

/// Bar for `count`, scaled so that `peak` fills [`BAR_WIDTH`]. Non-zero counts
/// get at least one column.
pub fn trend_bar(count: u64, peak: u64) -> String {
    if peak == 0 {
        return String::new();
    }
    let columns = (u128::from(count) * u128::from(BAR_WIDTH)).div_ceil(u128::from(peak));
    "#".repeat(columns.min(u128::from(BAR_WIDTH)) as usize)
}

pub fn format_dashboard(state: &DashboardState) -> String {
    let snapshot = &state.snapshot;
    let mut out = String::from("== Analytics Overview ==\n");
    out.push_str(&format!(
        "Total students: {}   Active depts: {}   Partner inst.: {}\n",
        snapshot.total,
        snapshot.active_departments(),
        snapshot.partner_institutes()
    ));

    for (title, breakdown) in [
        ("Departments", &snapshot.category),
        ("Institutes", &snapshot.institute),
        ("Gender", &snapshot.gender),
    ] {
        out.push_str(&format!("{}:\n", title));
        for entry in breakdown {
            out.push_str(&format!(
                "  {:<14} {:>5} ({:.1}%)\n",
                entry.label,
                entry.count,
                share(entry, breakdown)
            ));
        }
    }

    if let Some(year) = state.year {
        out.push_str(&format!("Registrations in {}:\n", year));
        let series = snapshot.monthly_series();
        let peak = series.iter().copied().max().unwrap_or(0);
        for (idx, count) in series.iter().enumerate() {
            let label = month_label(idx as u32 + 1).unwrap_or("?");
            out.push_str(&format!("  {} {:>6} {}\n", label, count, trend_bar(*count, peak)));
        }
    }
    if let Some(synced) = state.last_synced {
        out.push_str(&format!("Last synced {}\n", synced.format("%H:%M:%S")));
    }
    out
}

/// Async stdin reader that yields one line at a time
///
/// # Returns
/// - `Ok(Some(line))` - User entered a line
/// - `Ok(None)` - EOF reached (Ctrl+D)
/// - `Err(e)` - I/O error
pub async fn read_line_async(reader: &mut BufReader<Stdin>, prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    match reader.read_line(&mut line).await? {
        0 => Ok(None),
        _ => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
    }
}

async fn print_list(app: &StudentRecordsApp) {
    let filters = app.list().filters().await;
    print!("{}", format_student_list(&app.list().snapshot(), &filters));
}

/// Execute one command. Returns `Ok(false)` when the user asked to quit.
pub async fn execute(
    app: &mut StudentRecordsApp,
    command: Command,
    reader: &mut BufReader<Stdin>,
) -> Result<bool> {
    match command {
        Command::Quit => return Ok(false),
        Command::Help => println!("{}", HELP),
        Command::Dashboard => {
            app.show_dashboard().await;
            print!("{}", format_dashboard(&app.dashboard().snapshot()));
        }
        Command::Refresh if app.view() == View::Students => {
            app.list().refetch().await;
            print_list(app).await;
        }
        Command::Refresh => {
            app.show_dashboard().await;
            print!("{}", format_dashboard(&app.dashboard().snapshot()));
        }
        Command::List => {
            app.show_students().await;
            print_list(app).await;
        }
        Command::Search(keyword) => {
            app.search(&keyword).await;
            print_list(app).await;
        }
        Command::Category(category) => {
            app.select_category(category).await;
            print_list(app).await;
        }
        Command::Sort(field, direction) => {
            let direction = match direction {
                Some(direction) => direction,
                None => app.list().filters().await.direction,
            };
            app.list().set_sort(field, direction).await;
            print_list(app).await;
        }
        Command::Size(size) => {
            app.list().set_size(size).await?;
            print_list(app).await;
        }
        Command::Page(page) => {
            app.list().set_page(page).await;
            print_list(app).await;
        }
        Command::Next => {
            app.list().next_page().await;
            print_list(app).await;
        }
        Command::Prev => {
            app.list().previous_page().await;
            print_list(app).await;
        }
        Command::First => {
            app.list().first_page().await;
            print_list(app).await;
        }
        Command::Last => {
            app.list().last_page().await;
            print_list(app).await;
        }
        Command::Show(id) => match app.show_detail(id) {
            Some(student) => print!("{}", format_student_detail(student)),
            None => println!("Student #{} is not on the current page", id),
        },
        Command::Add(fields) => {
            app.show_add();
            for (field, value) in &fields {
                app.create_mut().set_field(*field, value)?;
            }
            if !app.create().can_submit() {
                println!("First name and email are required");
                return Ok(true);
            }
            if let CreateOutcome::Created(student) = app.submit_create().await {
                println!("Registered {}", format_student_row(&student));
                print_list(app).await;
            }
        }
        Command::Edit(id, fields) => {
            if app.show_detail(id).is_none() {
                println!("Student #{} is not on the current page", id);
                return Ok(true);
            }
            app.begin_edit_with(&fields)?;
            match app.submit_edit().await {
                Some(EditOutcome::Unchanged) => println!("Nothing changed"),
                Some(EditOutcome::Updated(_)) => print_list(app).await,
                Some(EditOutcome::Failed) | None => {}
            }
        }
        Command::Delete(id) => {
            let answer = read_line_async(reader, &format!("{} [y/N] ", DELETE_PROMPT)).await?;
            let confirmed = matches!(
                answer.as_deref().map(str::trim),
                Some("y") | Some("Y") | Some("yes")
            );
            app.delete_student(id, &confirmed).await;
            if app.view() == View::Students {
                print_list(app).await;
            }
        }
    }
    Ok(true)
}

/// Run the client control loop until /quit or EOF.
pub async fn run_client_loop(app: &mut StudentRecordsApp) -> Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin());
    println!("{}", HELP);

    app.show_dashboard().await;
    print!("{}", format_dashboard(&app.dashboard().snapshot()));

    while let Some(line) = read_line_async(&mut reader, "> ").await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match execute(app, command, &mut reader).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("{}", e),
        }
    }

    log::info!("Exiting");
    Ok(())
}
