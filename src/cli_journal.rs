use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

mod cli_style;

use cli_style::{
    get_prompt, get_styles, print_command_echo, print_empty_list, print_error, print_goodbye,
    print_key_value, print_key_value_colored, print_list_item, print_section_footer,
    print_section_header, print_success, print_warning,
};

use mood_fusion_server::mood::{assemble, EegBandPowers};
use mood_fusion_server::user::{
    MoodEntryDraft, MoodEntryFilter, NewUser, SqliteUserStore, UserManager,
};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the mood database, looked up from the current directory if omitted.
    #[clap(value_parser = parse_path)]
    pub path: Option<PathBuf>,
}

#[derive(Parser)]
#[command(styles=get_styles(),name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates a user with a password.
    AddUser {
        user_handle: String,
        email: String,
        full_name: String,
        password: String,
    },

    /// Replaces the password of a user.
    SetPassword {
        user_handle: String,
        password: String,
    },

    /// Compares a password with the stored hash, without recording the attempt.
    CheckPassword {
        user_handle: String,
        password: String,
    },

    /// Shows the profile of a user.
    Show { user_handle: String },

    /// Shows all user handles.
    UserHandles,

    /// Shows the most recent journal entries of a user.
    Journal {
        user_handle: String,
        #[clap(long, default_value_t = 10)]
        limit: usize,
    },

    /// Runs a mood analysis from a facial emotion and EEG band powers.
    /// With --save-for the result is written to that user's journal.
    Analyze {
        facial_emotion: String,
        alpha: f64,
        beta: f64,
        theta: f64,
        delta: f64,
        gamma: f64,
        #[clap(long)]
        save_for: Option<String>,
    },

    /// Shows the path of the current database.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

fn execute_command(
    line: String,
    user_manager: &UserManager,
    db_path: String,
) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            print_command_echo(&line);
            match cli.command {
                InnerCommand::AddUser {
                    user_handle,
                    email,
                    full_name,
                    password,
                } => {
                    let new_user = NewUser {
                        handle: user_handle,
                        email,
                        full_name,
                        dob: None,
                        password,
                    };
                    match user_manager.sign_up(&new_user) {
                        Ok(user) => {
                            print_success(&format!("Created user {} ({})", user.handle, user.id))
                        }
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    }
                }
                InnerCommand::SetPassword {
                    user_handle,
                    password,
                } => {
                    let result = user_manager
                        .get_user_by_handle(&user_handle)
                        .and_then(|user| user_manager.set_password(user.id, &password));
                    match result {
                        Ok(()) => print_success("Password updated"),
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    }
                }
                InnerCommand::CheckPassword {
                    user_handle,
                    password,
                } => {
                    let result = user_manager
                        .get_user_by_handle(&user_handle)
                        .and_then(|user| user_manager.check_password(user.id, &password));
                    match result {
                        Ok(true) => print_success("The password is correct"),
                        Ok(false) => print_warning("The password does not match"),
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    }
                }
                InnerCommand::Show { user_handle } => {
                    let user = match user_manager.get_user_by_handle(&user_handle) {
                        Ok(user) => user,
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    };
                    print_section_header(&user.handle);
                    print_key_value("Id", &user.id.to_string());
                    print_key_value("Email", &user.email);
                    print_key_value("Full name", &user.full_name);
                    print_key_value(
                        "Date of birth",
                        &user
                            .dob
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    print_section_footer();
                }
                InnerCommand::UserHandles => match user_manager.get_all_user_handles() {
                    Ok(handles) => {
                        print_section_header("Users");
                        if handles.is_empty() {
                            print_empty_list("no users yet");
                        }
                        for handle in handles.iter() {
                            print_list_item(handle, 0);
                        }
                        print_section_footer();
                    }
                    Err(err) => return CommandExecutionResult::Error(err.to_string()),
                },
                InnerCommand::Journal { user_handle, limit } => {
                    let filter = MoodEntryFilter {
                        limit,
                        ..Default::default()
                    };
                    let entries = match user_manager.mood_entries(&user_handle, &filter) {
                        Ok(entries) => entries,
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    };
                    print_section_header(&format!("Journal of {}", user_handle));
                    if entries.is_empty() {
                        print_empty_list("no entries");
                    }
                    for entry in entries.iter() {
                        let summary = format!(
                            "{}  {} / {}",
                            entry.mood_date,
                            entry.mood.as_deref().unwrap_or("-"),
                            entry.eeg_emotional_state.as_deref().unwrap_or("-"),
                        );
                        print_list_item(&summary, 0);
                        if let Some(note) = entry.note.as_deref() {
                            print_list_item(note, 2);
                        }
                    }
                    print_section_footer();
                }
                InnerCommand::Analyze {
                    facial_emotion,
                    alpha,
                    beta,
                    theta,
                    delta,
                    gamma,
                    save_for,
                } => {
                    let powers = EegBandPowers::new(alpha, beta, theta, delta, gamma);
                    let session = match assemble(&facial_emotion, &powers) {
                        Ok(session) => session,
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    };
                    let report = session.report();
                    print_section_header(&report.combined_analysis.title);
                    print_key_value_colored(
                        "Face",
                        report.facial_analysis.title,
                        report.facial_analysis.color,
                    );
                    print_key_value_colored(
                        "Brain",
                        &format!(
                            "{} ({})",
                            report.eeg_analysis.emotional_state, report.eeg_analysis.dominant_band
                        ),
                        report.eeg_analysis.color,
                    );
                    print_key_value("Reading", &report.combined_analysis.interpretation);
                    print_key_value("Ask", &report.combined_analysis.chat_ask);
                    if session.fusion().fallback {
                        print_warning("No curated interpretation for this pairing");
                    }
                    print_section_footer();

                    if let Some(handle) = save_for {
                        let draft = MoodEntryDraft::from_session(&handle, &session, None);
                        match user_manager.save_mood_entry(&draft) {
                            Ok(entry) => print_success(&format!(
                                "Saved to the journal of {} for {}",
                                handle, entry.mood_date
                            )),
                            Err(err) => return CommandExecutionResult::Error(err.to_string()),
                        }
                    }
                }
                InnerCommand::Where => {
                    print_key_value("Database", &db_path);
                }
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }

        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct MyHelper {
    commands_names: Vec<String>,
}

impl MyHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        MyHelper { commands_names }
    }
}

impl Completer for MyHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for MyHelper {}
impl Validator for MyHelper {}
impl Helper for MyHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let db_file_path = match cli_args.path {
        Some(path) => path,
        None => SqliteUserStore::infer_path().with_context(|| {
            "Could not infer the mood database path, please specify it explicitly."
        })?,
    };
    let user_store = SqliteUserStore::new(&db_file_path)?;
    let user_manager = UserManager::new(Arc::new(user_store));

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<MyHelper, FileHistory>::with_config(config)?;

    let helper = MyHelper::new();
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(&get_prompt());

        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &user_manager, db_file_path.display().to_string()) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        print_goodbye();
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        print_error(&err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                print_goodbye();
                break;
            }
            Err(e) => {
                print_error(&format!("{:?}", e));
                break;
            }
        }
    }
    Ok(())
}
