use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use studyplan::{
    course::CourseTable,
    serialize::{CourseInfo, TimetableView},
    Action, Course, CourseList, Planner, PlannerConfig, Scheduler,
};

/// Interactive daily study planner.
#[derive(Parser, Debug)]
struct Args {
    /// Course list to start from (.csv table or .json export)
    #[arg(long)]
    courses: Option<PathBuf>,

    /// Config file (defaults to ./planner.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Day to plan, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(short, long)]
    verbose: bool,
}

enum Command {
    Apply(Action),
    Find(Option<String>),
    Schedule,
    Stats,
    Deadlines,
    Json,
    Help,
    Exit,
}

fn print_help() {
    println!("Commands:");
    println!("  ADD <course name> / <subject name>");
    println!("  DONE <course id or name>");
    println!("  CHAPTER <course id or name>");
    println!("  REMOVE <course id or name>");
    println!("  CLEAR");
    println!("  FIND [subject]");
    println!("  SCHEDULE");
    println!("  STATS");
    println!("  DEADLINES");
    println!("  JSON");
    println!("  EXIT");
}

fn parse(line: &str, next_id: &mut usize) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word.to_uppercase().as_str() {
        "ADD" | "+" => {
            let (name, subject) = rest.split_once('/')?;
            let (name, subject) = (name.trim(), subject.trim());
            if name.is_empty() || subject.is_empty() {
                return None;
            }
            *next_id += 1;
            Command::Apply(Action::AddCourse(Course::new(
                format!("local-{next_id}"),
                name.to_string(),
                subject.to_string(),
                false,
            )))
        }
        "DONE" if !rest.is_empty() => Command::Apply(Action::CompleteCourse(rest.to_string())),
        "CHAPTER" if !rest.is_empty() => {
            Command::Apply(Action::CompleteChapter(rest.to_string()))
        }
        "REMOVE" | "-" if !rest.is_empty() => {
            Command::Apply(Action::RemoveCourse(rest.to_string()))
        }
        "CLEAR" | "--" => Command::Apply(Action::ClearCourses),
        "FIND" | "LS" => Command::Find((!rest.is_empty()).then(|| rest.to_string())),
        "SCHEDULE" | "S" => Command::Schedule,
        "STATS" => Command::Stats,
        "DEADLINES" => Command::Deadlines,
        "JSON" => Command::Json,
        "HELP" | "?" => Command::Help,
        "EXIT" | "QUIT" => Command::Exit,
        _ => return None,
    };
    Some(command)
}

fn load_courses(path: &Path) -> anyhow::Result<CourseList> {
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(CourseList::from_json(&json)?)
    } else {
        Ok(CourseTable::load(path)?.to_courses()?)
    }
}

/// Current time of day on the planned date.
fn reference_time(date: NaiveDate) -> NaiveDateTime {
    date.and_time(Local::now().time())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("PLANNER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let config = PlannerConfig::load_from(args.config.as_deref())?;
    let courses = match &args.courses {
        Some(path) => load_courses(path)?,
        None => CourseList::default(),
    };
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut planner = Planner::new(courses, Scheduler::new(config)?);
    let mut next_id = 0;

    loop {
        let names: Vec<&str> = planner.courses().iter().map(Course::course_name).collect();
        println!("Current courses: {:?}", names);

        print!("> ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        if input.trim().is_empty() {
            print!("\x1B[2J\x1B[1;1H");
            println!("Please enter a command");
            print_help();
            continue;
        }

        let Some(command) = parse(&input, &mut next_id) else {
            print!("\x1B[2J\x1B[1;1H");
            println!("Invalid command");
            print_help();
            continue;
        };

        match command {
            Command::Apply(action) => {
                if let Err(err) = planner.dispatch(action) {
                    println!("{err}");
                }
            }
            Command::Find(subject) => {
                print!("\x1B[2J\x1B[1;1H");
                planner
                    .courses()
                    .pending()
                    .filter(|c| {
                        subject
                            .as_deref()
                            .map_or(true, |s| c.subject_name().starts_with(s))
                    })
                    .for_each(|course| println!("{}", course));
            }
            Command::Schedule => {
                print!("\x1B[2J\x1B[1;1H");
                let blocks = planner.timetable(date);
                print!("{}", TimetableView::new(date, &blocks));
            }
            Command::Stats => print!("{}", planner.progress()),
            Command::Deadlines => {
                for event in planner.deadlines() {
                    let mark = if event.completed { "x" } else { " " };
                    println!("[{}] {}  {}", mark, event.date, event.title);
                }
                let upcoming = planner.upcoming(reference_time(date));
                if upcoming.is_empty() {
                    println!("No upcoming deadlines");
                }
                for deadline in upcoming {
                    println!("{}", deadline);
                }
            }
            Command::Json => {
                let blocks = planner.timetable(date);
                let courses: Vec<CourseInfo> =
                    planner.courses().iter().map(CourseInfo::from).collect();
                let out = serde_json::json!({
                    "courses": courses,
                    "progress": planner.progress(),
                    "timetable": TimetableView::new(date, &blocks),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Command::Help => print_help(),
            Command::Exit => break,
        }
    }

    Ok(())
}
