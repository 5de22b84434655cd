//! Interactive study loop.
//!
//! One task owns everything: the timer controller, the notes panel and the
//! chat session. Ticks, stdin lines and chat replies are multiplexed with
//! `select!`; doubt requests run on spawned tasks and report back over a
//! channel tagged with the session generation they were issued under.

use clap::Args;
use physfocus_core::chat::{top_sources, ChatReply, ChatSession, DoubtClient};
use physfocus_core::storage::{Config, TimerConfig};
use physfocus_core::{
    DurationConfig, Event, NotesPanel, SessionRecorder, TimerController, TimerEngine, TimerMode,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::ask::SHOWN_SOURCES;
use crate::alert::TerminalAlerter;

const GREETING: &str = "Hi! I'm your physics doubt solver. Ask me a formula or a concept.";

const HELP: &str = "\
commands:
  start | pause | t        start or pause the countdown
  reset                    rewind the current countdown
  mode <focus|short|long>  switch mode (stops the timer)
  set <focus> <short> <long>
                           change durations in minutes (timer must be paused)
  status                   show the timer
  todo <text>              add a to-do
  done <n>                 toggle to-do n
  rm <n>                   delete to-do n
  todos                    list to-dos
  note <text>              append a line to the notes
  notes                    show the notes
  clear-notes              erase the notes
  ask <question>           ask the doubt solver (also: ? <question>)
  new                      start a new chat
  stats                    focus statistics
  alarm                    play the alarm to check sound
  help                     this text
  quit                     leave";

#[derive(Args)]
pub struct StudyArgs {
    /// Mode to start in
    #[arg(long, default_value = "focus")]
    mode: TimerMode,
    /// Start the countdown right away
    #[arg(long)]
    start: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum StudyCommand {
    Toggle,
    Reset,
    Mode(TimerMode),
    Set(DurationConfig),
    Status,
    TodoAdd(String),
    TodoToggle(usize),
    TodoDelete(usize),
    Todos,
    Note(String),
    Notes,
    ClearNotes,
    Ask(String),
    NewChat,
    Stats,
    Alarm,
    Help,
    Quit,
}

/// Parse one input line. To-do positions are 1-based on input and
/// returned 0-based.
fn parse_command(line: &str) -> Result<StudyCommand, String> {
    let line = line.trim();
    if let Some(question) = line.strip_prefix('?') {
        return Ok(StudyCommand::Ask(question.trim().to_string()));
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let position = |rest: &str| -> Result<usize, String> {
        match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("expected a to-do number, got '{rest}'")),
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "start" | "pause" | "t" | "toggle" => StudyCommand::Toggle,
        "reset" => StudyCommand::Reset,
        "mode" => StudyCommand::Mode(rest.parse()?),
        "set" => {
            let minutes: Vec<u32> = rest
                .split_whitespace()
                .map(|m| m.parse::<u32>().map_err(|_| format!("not a number: '{m}'")))
                .collect::<Result<_, _>>()?;
            match minutes[..] {
                [focus, short, long] => StudyCommand::Set(DurationConfig::new(focus, short, long)),
                _ => return Err("usage: set <focus> <short> <long>".into()),
            }
        }
        "status" => StudyCommand::Status,
        "todo" => StudyCommand::TodoAdd(rest.to_string()),
        "done" => StudyCommand::TodoToggle(position(rest)?),
        "rm" => StudyCommand::TodoDelete(position(rest)?),
        "todos" => StudyCommand::Todos,
        "note" => StudyCommand::Note(rest.to_string()),
        "notes" => StudyCommand::Notes,
        "clear-notes" => StudyCommand::ClearNotes,
        "ask" => StudyCommand::Ask(rest.to_string()),
        "new" => StudyCommand::NewChat,
        "stats" => StudyCommand::Stats,
        "alarm" => StudyCommand::Alarm,
        "help" | "h" => StudyCommand::Help,
        "quit" | "exit" | "q" => StudyCommand::Quit,
        "" => return Err(String::new()),
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(command)
}

type Controller = TimerController<TerminalAlerter, SessionRecorder>;

struct Study {
    config: Config,
    controller: Controller,
    notes: NotesPanel,
    chat: ChatSession,
    client: DoubtClient,
    replies: mpsc::Sender<(u64, ChatReply)>,
}

pub async fn run(args: StudyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let client = DoubtClient::from_config(&config.chat);
    let controller = TimerController::new(
        TimerEngine::new(config.timer.durations()),
        TerminalAlerter::new(config.alerts.sound),
        SessionRecorder::new(),
    );
    let (replies, mut reply_rx) = mpsc::channel(4);

    let mut study = Study {
        config,
        controller,
        notes: NotesPanel::new(),
        chat: ChatSession::with_greeting(GREETING),
        client,
        replies,
    };

    study.controller.switch_mode(args.mode);
    if args.start {
        study.controller.toggle();
    }
    println!("{GREETING}\nType 'help' for commands.");
    study.print_status();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = study.controller.next_tick() => study.on_tick(event),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(StudyCommand::Quit) => break,
                    Ok(command) => study.execute(command),
                    Err(message) if message.is_empty() => {}
                    Err(message) => println!("{message}"),
                }
            }
            Some((generation, reply)) = reply_rx.recv() => study.on_reply(generation, reply),
        }
    }

    study.chat.close();
    study.print_stats();
    Ok(())
}

impl Study {
    fn execute(&mut self, command: StudyCommand) {
        match command {
            StudyCommand::Toggle => {
                self.controller.toggle();
                self.print_status();
            }
            StudyCommand::Reset => {
                self.controller.reset();
                self.print_status();
            }
            StudyCommand::Mode(mode) => {
                self.controller.switch_mode(mode);
                self.print_status();
            }
            StudyCommand::Set(durations) => self.apply_durations(durations),
            StudyCommand::Status => self.print_status(),
            StudyCommand::TodoAdd(text) => match self.notes.todos.add(&text) {
                Some(item) => println!("added: {}", item.text),
                None => println!("nothing to add"),
            },
            StudyCommand::TodoToggle(index) => {
                match self.notes.todos.id_at(index).and_then(|id| self.notes.todos.toggle(id)) {
                    Some(true) => println!("done"),
                    Some(false) => println!("reopened"),
                    None => println!("no to-do #{}", index + 1),
                }
            }
            StudyCommand::TodoDelete(index) => {
                let removed = self
                    .notes
                    .todos
                    .id_at(index)
                    .is_some_and(|id| self.notes.todos.delete(id));
                if !removed {
                    println!("no to-do #{}", index + 1);
                }
            }
            StudyCommand::Todos => self.print_todos(),
            StudyCommand::Note(line) => self.notes.append_line(&line),
            StudyCommand::Notes => {
                if self.notes.text().is_empty() {
                    println!("(no notes)");
                } else {
                    println!("{}", self.notes.text());
                }
            }
            StudyCommand::ClearNotes => self.notes.clear_text(),
            StudyCommand::Ask(question) => self.ask(&question),
            StudyCommand::NewChat => {
                self.chat.restart();
                println!("new chat started");
            }
            StudyCommand::Stats => self.print_stats(),
            StudyCommand::Alarm => {
                if self.controller.test_alarm().is_ok() {
                    println!("alarm played");
                }
            }
            StudyCommand::Help => println!("{HELP}"),
            StudyCommand::Quit => {}
        }
    }

    fn apply_durations(&mut self, durations: DurationConfig) {
        if !self.controller.engine().can_edit_settings() {
            println!("Pause the timer to change durations.");
            return;
        }
        self.controller.apply_settings(durations);
        self.config.timer = TimerConfig {
            focus_duration: durations.minutes(TimerMode::Focus),
            short_break: durations.minutes(TimerMode::ShortBreak),
            long_break: durations.minutes(TimerMode::LongBreak),
        };
        if let Err(e) = self.config.save() {
            warn!(error = %e, "could not persist durations");
            eprintln!("warning: durations apply to this session only ({e})");
        }
        self.print_status();
    }

    fn ask(&mut self, question: &str) {
        let ticket = match self.chat.begin(question) {
            Ok(ticket) => ticket,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        debug!(generation = ticket.generation, "dispatching doubt");
        println!("Thinking...");

        let client = self.client.clone();
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let reply = ticket.run(&client).await;
            // The loop may already be gone; nothing to deliver to then.
            let _ = replies.send((ticket.generation, reply)).await;
        });
    }

    fn on_reply(&mut self, generation: u64, reply: ChatReply) {
        if !self.chat.finish(generation, reply) {
            return;
        }
        if let Some(turn) = self.chat.transcript().last() {
            println!("AI: {}", turn.text);
            for source in top_sources(&turn.sources, SHOWN_SOURCES) {
                println!("    - {} <{}>", source.title, source.uri);
            }
        }
    }

    fn on_tick(&mut self, event: Option<Event>) {
        let engine = self.controller.engine();
        match event {
            Some(Event::TimerCompleted { mode, .. }) => {
                let next = match mode {
                    TimerMode::Focus => "short",
                    _ => "focus",
                };
                println!("Type 'mode {next}' then 'start' to continue.");
            }
            _ if engine.remaining_secs() % 60 == 0 => {
                println!("{} {} remaining", engine.mode().label(), engine.clock());
            }
            _ => {}
        }
    }

    fn print_status(&self) {
        let engine = self.controller.engine();
        let state = if engine.is_running() { "running" } else { "paused" };
        println!(
            "[{}] {} ({state}, {:.0}% left)",
            engine.mode().label(),
            engine.clock(),
            engine.progress() * 100.0
        );
    }

    fn print_todos(&self) {
        if self.notes.todos.is_empty() {
            println!("(no to-dos)");
            return;
        }
        for (i, item) in self.notes.todos.items().iter().enumerate() {
            let mark = if item.completed { "x" } else { " " };
            println!("{:>2}. [{mark}] {}", i + 1, item.text);
        }
        println!("{} remaining", self.notes.todos.remaining());
    }

    fn print_stats(&self) {
        let stats = self.controller.sink().stats();
        println!(
            "Focus time: {}h {}m across {} focus session(s), {} session(s) total",
            stats.hours, stats.minutes, stats.focus_sessions, stats.total_sessions
        );
        for day in &stats.daily {
            let bar = "#".repeat((day.minutes / 5) as usize);
            println!("  {} {:>4}m {bar}", day.day, day.minutes);
        }
    }
}
