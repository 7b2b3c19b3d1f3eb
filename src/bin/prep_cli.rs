use clap::{Args, Parser, Subcommand};
use meeting_prep::components::brief::{prepare_brief, BriefRequest};
use meeting_prep::components::google_sheets::contact_notes_or_empty;
use meeting_prep::components::meeting_watch::{MeetingSnapshot, MeetingWatch};
use meeting_prep::components::Meeting;
use meeting_prep::error::{validation_error, Error, PrepResult};
use meeting_prep::shutdown::wait_for_signal;
use meeting_prep::startup;
use meeting_prep::web::AppState;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "prep_cli")]
#[command(version, about = "Terminal client for upcoming meetings and prep briefs")]
struct Cli {
    /// Google access token (see get_access_token)
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print upcoming meetings on every refresh until interrupted
    Watch,
    /// Generate a prep brief for one upcoming meeting
    Prepare(PrepareArgs),
}

#[derive(Args, Debug)]
struct PrepareArgs {
    /// Position of the meeting in the upcoming list, starting at 1
    #[arg(default_value_t = 1)]
    index: usize,

    /// Spreadsheet holding the Contacts worksheet
    #[arg(long, env = "CONTACTS_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    startup::init_logging("warn")?;

    let config = startup::load_config()?;
    let state = AppState::from_config(&config)?;

    match cli.command {
        Commands::Watch => {
            let period = Duration::from_secs(config.tunables.refresh_interval_secs);
            watch(&state, cli.token, period).await?
        }
        Commands::Prepare(args) => prepare(&state, &cli.token, args).await?,
    }

    Ok(())
}

fn print_meetings(meetings: &[Meeting]) {
    if meetings.is_empty() {
        println!("No upcoming meetings.");
        return;
    }
    for (i, meeting) in meetings.iter().enumerate() {
        println!(
            "{:>2}. {} - {} ({} attendees)",
            i + 1,
            meeting.display_start(),
            meeting.title,
            meeting.attendees.len()
        );
    }
}

async fn watch(state: &AppState, token: String, period: Duration) -> PrepResult<()> {
    let watch = MeetingWatch::start(state.meetings.clone(), token, period);
    let mut snapshots = watch.subscribe();
    println!("Loading meetings...");

    let shutdown = wait_for_signal();
    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            _ = &mut shutdown => break Ok(()),
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
        }

        let snapshot = snapshots.borrow_and_update().clone();
        match snapshot {
            MeetingSnapshot::Loading => {}
            MeetingSnapshot::Ready(meetings) => {
                println!();
                print_meetings(&meetings);
            }
            MeetingSnapshot::Failed(message) => eprintln!("{}", message),
            MeetingSnapshot::SignedOut => break Err(Error::Unauthorized),
        }
    };

    watch.stop().await;
    result
}

async fn prepare(state: &AppState, token: &str, args: PrepareArgs) -> PrepResult<()> {
    let meetings = state.meetings.upcoming_meetings(token).await?;
    let meeting = args
        .index
        .checked_sub(1)
        .and_then(|i| meetings.get(i))
        .ok_or_else(|| {
            validation_error(&format!(
                "No meeting at position {} ({} upcoming)",
                args.index,
                meetings.len()
            ))
        })?;

    let spreadsheet_id = args
        .spreadsheet_id
        .or_else(|| state.default_spreadsheet_id.clone());
    let contact_notes =
        contact_notes_or_empty(state.contacts.as_ref(), token, spreadsheet_id.as_deref()).await;

    let request = BriefRequest {
        title: meeting.title.clone(),
        date: meeting.start.clone(),
        attendees: meeting.attendee_emails(),
        contact_notes,
        description: meeting.description.clone(),
    };

    println!("Preparing brief for {}...", meeting.title);
    let brief = prepare_brief(state.generator.as_deref(), &request).await?;
    println!("\n{}", brief.to_plain_text(&meeting.title, &meeting.display_start()));

    Ok(())
}
