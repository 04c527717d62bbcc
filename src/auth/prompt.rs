use super::CodePrompt;
use crate::error::{AppError, Result};
use console::Term;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};
use url::Url;

const CODE_PROMPT: &str = "Enter the code from that page here";

/// Asks for the code shown after granting access.
///
/// Falls back to reading a line from standard input when no terminal is
/// attached, so the code can be piped in.
pub struct TerminalPrompt;

impl CodePrompt for TerminalPrompt {
    fn request_code(&self, auth_url: &Url) -> Result<String> {
        println!("Authorize this app by visiting this url:\n{}", auth_url);
        println!();

        if io::stdin().is_terminal() && Term::stderr().is_term() {
            return Input::<String>::new()
                .with_prompt(CODE_PROMPT)
                .interact_text()
                .map_err(|e| AppError::Auth(format!("Failed to read authorization code: {}", e)));
        }

        print!("{}: ", CODE_PROMPT);
        io::stdout().flush()?;
        read_code(&mut io::stdin().lock())
    }
}

fn read_code<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| AppError::Auth(format!("Failed to read authorization code: {}", e)))?;

    if read == 0 {
        return Err(AppError::Auth(
            "Input closed before an authorization code was entered".to_string(),
        ));
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
