//! Interactive game loop.

use fabula::{FabulaConfig, GameController, GameState, GameStatus, GeminiClient};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

type Input = Lines<BufReader<Stdin>>;

/// What the player typed at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// A zero-based choice index
    Choose(usize),
    Restart,
    Quit,
    Invalid,
}

fn parse_command(line: &str, choices: usize) -> Command {
    match line.trim().to_lowercase().as_str() {
        "q" | "quit" => Command::Quit,
        "r" | "restart" => Command::Restart,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=choices).contains(&n) => Command::Choose(n - 1),
            _ => Command::Invalid,
        },
    }
}

/// Short human description of an illustration reference.
///
/// Inline data references are summarized by type and decoded size.
fn describe_image_ref(reference: &str) -> String {
    match reference
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
    {
        Some((mime, payload)) => {
            let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
            let bytes = (payload.len() / 4 * 3).saturating_sub(padding);
            format!("inline {} image, {} bytes", mime, bytes)
        }
        None => reference.to_string(),
    }
}

/// Run an adventure in the terminal until the player quits.
#[instrument(skip_all)]
pub async fn play(
    config: &FabulaConfig,
    theme: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let client = Arc::new(GeminiClient::new(api_key, config)?);
    let game = GameController::new(client.clone(), client, config);

    let watcher = tokio::spawn(announce_illustrations(game.subscribe()));
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let result = run_loop(&game, &mut input, theme).await;
    watcher.abort();
    result
}

async fn run_loop(
    game: &GameController,
    input: &mut Input,
    theme: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(mut theme) = choose_theme(input, theme).await? else {
        return Ok(());
    };

    println!("\nYour adventure begins...\n");
    game.start_game(&theme).await;

    loop {
        let state = game.state();
        let choices = state.scene().as_ref().map_or(0, |s| s.choices().len());

        match state.status() {
            GameStatus::Playing => render_scene(&state),
            GameStatus::Error => {
                println!(
                    "\nSomething went wrong: {}",
                    state.error().as_deref().unwrap_or("unknown error")
                );
                println!("Enter r to restart or q to quit.");
            }
            GameStatus::Start => {
                let Some(next) = choose_theme(input, None).await? else {
                    return Ok(());
                };
                theme = next;
                game.start_game(&theme).await;
                continue;
            }
            GameStatus::Loading => {
                tokio::task::yield_now().await;
                continue;
            }
        }

        let Some(line) = prompt(input, "> ").await? else {
            return Ok(());
        };

        match parse_command(&line, choices) {
            Command::Quit => {
                info!("Player quit");
                return Ok(());
            }
            Command::Restart => {
                game.reset_game().await;
            }
            Command::Choose(index) => {
                let choice = state
                    .scene()
                    .as_ref()
                    .and_then(|s| s.choice(index))
                    .map(str::to_string);
                if let Some(choice) = choice {
                    println!("\n> {}\n", choice);
                    game.make_choice(&choice).await;
                }
            }
            Command::Invalid => {
                println!("Enter a choice number between 1 and {}, r or q.", choices);
            }
        }
    }
}

fn render_scene(state: &GameState) {
    let Some(scene) = state.scene() else {
        return;
    };

    println!("{}\n", scene.description());
    for (i, choice) in scene.choices().iter().enumerate() {
        println!("  {}. {}", i + 1, choice);
    }
    println!("\nEnter a number, r to restart or q to quit.");
}

/// Ask for a theme unless one was given. `None` means stdin closed.
async fn choose_theme(
    input: &mut Input,
    theme: Option<String>,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if let Some(theme) = theme {
        return Ok(Some(theme));
    }

    println!("Welcome to Fabula.");
    prompt(input, "Choose a theme (leave blank for a classic fantasy quest): ").await
}

async fn prompt(
    input: &mut Input,
    text: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

/// Print illustration references as they arrive.
async fn announce_illustrations(mut rx: watch::Receiver<GameState>) {
    let mut last: Option<String> = None;

    while rx.changed().await.is_ok() {
        let current = rx.borrow_and_update().image_ref().clone();
        if current.is_some() && current != last {
            if let Some(reference) = &current {
                println!("[illustration: {}]", describe_image_ref(reference));
            }
        } else {
            debug!("State changed without a new illustration");
        }
        last = current;
    }
}
