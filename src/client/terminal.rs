use log::info;
use std::error::Error;
use std::io::Write;
use tokio::io::{ AsyncBufReadExt, BufReader };

use super::view::{ message_header, ChatView, INPUT_HINT };
use super::ChatSession;

const HELP: &str = "\
Commands:
  /key     open or close the API key editor
  /save    store the key typed in the editor
  /cancel  close the editor without changes
  /clear   forget the stored key
  /quit    leave the chat
End a line with \\ to continue the message on the next line.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Quit,
    Help,
    ToggleEditor,
    SaveKey,
    CancelEditor,
    ClearKey,
    Unknown(String),
    /// Text typed while the key editor is open.
    KeyDraft(String),
    /// Text followed by Shift+Enter.
    Continue(String),
    /// Text followed by Enter.
    Send(String),
}

pub fn classify_line(line: &str, editor_open: bool) -> LineAction {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(command) = line.strip_prefix('/') {
        return match command.trim() {
            "quit" | "exit" => LineAction::Quit,
            "help" => LineAction::Help,
            "key" => LineAction::ToggleEditor,
            "save" => LineAction::SaveKey,
            "cancel" => LineAction::CancelEditor,
            "clear" => LineAction::ClearKey,
            other => LineAction::Unknown(other.to_string()),
        };
    }
    if editor_open {
        return LineAction::KeyDraft(line.to_string());
    }
    match line.strip_suffix('\\') {
        Some(text) => LineAction::Continue(text.to_string()),
        None => LineAction::Send(line.to_string()),
    }
}

/// Prints each message once, in order, as the transcript grows.
#[derive(Debug, Default)]
pub struct Renderer {
    rendered: usize,
}

impl Renderer {
    pub fn render(&mut self, view: &ChatView<'_>) -> String {
        let mut out = String::new();
        for message in view.messages.iter().skip(self.rendered) {
            out.push_str(&message_header(message));
            out.push('\n');
            for line in message.content().lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        self.rendered = view.messages.len();
        out
    }
}

fn banner(view: &ChatView<'_>) -> String {
    let mut out = format!("[{}]\n", view.key_button_label);
    if let Some(welcome) = &view.welcome {
        out.push_str(&format!("{}\n{}\n", welcome.title, welcome.text));
        if let Some(hint) = welcome.missing_key_hint {
            out.push_str(hint);
            out.push('\n');
        }
    }
    out.push_str(INPUT_HINT);
    out.push('\n');
    out
}

fn print_prompt(session: &ChatSession) {
    let view = session.view();
    let prompt = if view.editor_open {
        "key> ".to_string()
    } else if session.input().is_empty() {
        format!("{} > ", view.placeholder)
    } else {
        "... ".to_string()
    };
    print!("{}", prompt);
    let _ = std::io::stdout().flush();
}

pub async fn run(session: &mut ChatSession) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut renderer = Renderer::default();

    print!("{}", banner(&session.view()));
    print_prompt(session);

    while let Some(line) = lines.next_line().await? {
        match classify_line(&line, session.is_editor_open()) {
            LineAction::Quit => break,
            LineAction::Help => println!("{}", HELP),
            LineAction::Unknown(command) => println!("Unknown command '/{}'. Try /help.", command),
            LineAction::ToggleEditor => {
                session.toggle_editor();
                if session.is_editor_open() {
                    println!("Set your Perplexity API key, then /save (or /cancel).");
                } else {
                    println!("[{}]", session.view().key_button_label);
                }
            }
            LineAction::SaveKey => {
                if session.save_key() {
                    println!("[{}]", session.view().key_button_label);
                } else {
                    println!("The API key is empty.");
                }
            }
            LineAction::CancelEditor => session.cancel_editor(),
            LineAction::ClearKey => {
                if session.clear_key() {
                    println!("API key cleared.");
                } else {
                    println!("No API key is saved.");
                }
            }
            LineAction::KeyDraft(draft) => session.set_key_draft(draft),
            LineAction::Continue(_) | LineAction::Send(_) if !session.view().input_enabled => {
                println!("{}", session.view().placeholder);
            }
            LineAction::Continue(text) => {
                let pending = format!("{}{}", session.input(), text);
                session.set_input(pending);
                session.press_enter(true).await;
            }
            LineAction::Send(text) => {
                let pending = format!("{}{}", session.input(), text);
                session.set_input(pending);
                if let Some(turn) = session.begin_turn() {
                    print!("{}", renderer.render(&session.view()));
                    println!("{}", session.view().loading.unwrap_or_default());
                    session.resolve_turn(turn).await;
                    info!("Turn finished; transcript has {} messages", session.transcript().len());
                }
            }
        }

        print!("{}", renderer.render(&session.view()));
        print_prompt(session);
    }

    Ok(())
}
