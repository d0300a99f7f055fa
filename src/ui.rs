// UI layer: the interactive numbered menu. Input goes through the
// `Prompter` trait so the same flows run against a real terminal
// (`TermPrompter`, backed by `dialoguer`) or a scripted input in tests.
// Output goes to any `Write`.

use crate::api::{Document, FileStoreClient, Store};
use crate::display::{write_document_summary, write_store_table};
use crate::upload::{upload_folder, UploadOptions};
use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use dialoguer::{Input, Password};
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::PathBuf;
use tracing::debug;

/// Source of user answers. `None` means input is exhausted (EOF).
pub trait Prompter {
    fn line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Like `line`, without echoing what is typed.
    fn secret(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn clear_screen(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Prompts on the controlling terminal. When stdin is not a terminal
/// (piped or redirected) answers are read line by line from it instead,
/// and secrets are echoed like any other input.
pub struct TermPrompter;

impl TermPrompter {
    fn piped(&self, prompt: &str) -> io::Result<Option<String>> {
        read_line_from(&mut io::stdin().lock(), &mut io::stderr(), prompt)
    }
}

impl Prompter for TermPrompter {
    fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if !io::stdin().is_tty() {
            return self.piped(prompt);
        }
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
        eof_as_none(answer)
    }

    fn secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if !io::stdin().is_tty() {
            return self.piped(prompt);
        }
        let answer = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact();
        eof_as_none(answer)
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
    }
}

/// Write `prompt: ` to `out` and read one line from `input`, without its
/// line ending. `None` at end of input.
fn read_line_from(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}: ", prompt)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(|c: char| c == '\n' || c == '\r').len();
    line.truncate(trimmed);
    Ok(Some(line))
}

/// API key for the interactive session: `flag_key` when one was supplied,
/// otherwise asked for with a hidden prompt. Surrounding whitespace is
/// dropped; an empty answer or end of input yields `None`.
pub fn resolve_api_key(
    flag_key: Option<&str>,
    prompter: &mut dyn Prompter,
) -> io::Result<Option<String>> {
    if let Some(key) = flag_key {
        return Ok(Some(key.to_string()));
    }
    let answer = prompter.secret("Please enter your Gemini API Key")?;
    Ok(answer
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty()))
}

fn eof_as_none(answer: io::Result<String>) -> io::Result<Option<String>> {
    match answer {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// How one answer to the selection prompt is understood.
#[derive(Debug, PartialEq, Eq)]
pub enum Choice {
    Cancel,
    /// Zero-based index into the listed items.
    Item(usize),
    Invalid,
}

/// `0` cancels, `1..=len` picks an item, anything else is invalid.
pub fn parse_choice(input: &str, len: usize) -> Choice {
    match input.trim().parse::<i64>() {
        Ok(0) => Choice::Cancel,
        Ok(n) if n >= 1 && (n as u64) <= len as u64 => Choice::Item(n as usize - 1),
        _ => Choice::Invalid,
    }
}

/// Print `items` as a 1-based list with a `[0] Cancel` entry and ask until
/// the answer is valid. Returns `None` when the list is empty, the user
/// cancels, or input runs out.
pub fn select_item<T>(
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
    heading: &str,
    items: Vec<T>,
    label: impl Fn(&T) -> &str,
) -> Result<Option<T>> {
    if items.is_empty() {
        writeln!(out, "No items found to select.")?;
        return Ok(None);
    }

    writeln!(out, "{}", heading)?;
    for (i, item) in items.iter().enumerate() {
        writeln!(out, "  [{}] {}", i + 1, label(item))?;
    }
    writeln!(out, "  [0] Cancel")?;
    out.flush()?;

    loop {
        let answer = match prompter.line("Your choice")? {
            Some(answer) => answer,
            None => return Ok(None),
        };
        match parse_choice(&answer, items.len()) {
            Choice::Cancel => {
                writeln!(out, "Operation cancelled.")?;
                return Ok(None);
            }
            Choice::Item(index) => return Ok(items.into_iter().nth(index)),
            Choice::Invalid => {
                writeln!(out, "Invalid input. Please enter a number from the list.")?;
                out.flush()?;
            }
        }
    }
}

/// The interactive menu loop bound to one client.
pub struct Shell<'a, P: Prompter> {
    client: &'a FileStoreClient,
    prompter: P,
    options: UploadOptions,
}

impl<'a, P: Prompter> Shell<'a, P> {
    pub fn new(client: &'a FileStoreClient, prompter: P, options: UploadOptions) -> Self {
        Shell {
            client,
            prompter,
            options,
        }
    }

    /// Show the menu and dispatch until the user quits or input runs out.
    /// Errors from a handler are printed and the loop goes on.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<()> {
        self.prompter.clear_screen()?;
        loop {
            write_menu(out)?;
            let choice = match self.prompter.line("Enter your choice")? {
                Some(choice) => choice.trim().to_lowercase(),
                None => break,
            };
            self.prompter.clear_screen()?;
            debug!(choice = %choice, "menu choice");

            let result = match choice.as_str() {
                "1" => self.list_stores(out),
                "2" => self.create_store(out),
                "3" => self.delete_store(out),
                "4" => self.list_documents(out),
                "5" => self.upload_files(out),
                "6" => self.delete_document(out),
                "q" => break,
                _ => writeln!(out, "Invalid choice. Please try again.").map_err(Into::into),
            };
            if let Err(e) = result {
                writeln!(out, "\n--- AN ERROR OCCURRED ---")?;
                writeln!(out, "{:#}", e)?;
                writeln!(out, "-------------------------\n")?;
            }
            out.flush()?;

            if self.prompter.line("Press Enter to continue")?.is_none() {
                break;
            }
            self.prompter.clear_screen()?;
        }
        writeln!(out, "Goodbye!")?;
        Ok(())
    }

    fn list_stores(&mut self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Fetching File Stores...\n")?;
        let stores = self.client.list_stores()?;
        if stores.is_empty() {
            writeln!(out, "No File Stores found.")?;
            return Ok(());
        }
        writeln!(out, "Available File Stores:")?;
        write_store_table(out, &stores)?;
        Ok(())
    }

    fn create_store(&mut self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Create a New File Store")?;
        out.flush()?;
        let display_name = self
            .prompter
            .line("Enter a display name for the new store")?
            .unwrap_or_default();
        let display_name = display_name.trim();
        if display_name.is_empty() {
            writeln!(out, "Name cannot be empty.")?;
            return Ok(());
        }
        writeln!(out, "Creating store '{}'...", display_name)?;
        let store = self.client.create_store(display_name)?;
        writeln!(out, "Success! Store created with ID: {}", store.name)?;
        Ok(())
    }

    fn delete_store(&mut self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Delete a File Store")?;
        let store = match self.select_store(out, "Select a store to DELETE:")? {
            Some(store) => store,
            None => return Ok(()),
        };
        if !self.confirm(&store.display_name)? {
            writeln!(out, "Operation cancelled.")?;
            return Ok(());
        }
        self.client.delete_store(&store.name)?;
        writeln!(out, "Store '{}' has been deleted.", store.display_name)?;
        Ok(())
    }

    fn list_documents(&mut self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "List Documents in a Store")?;
        let store = match self.select_store(out, "Select a store to view its documents:")? {
            Some(store) => store,
            None => return Ok(()),
        };
        let documents = self.client.list_documents(&store.name)?;
        if documents.is_empty() {
            writeln!(
                out,
                "This store ('{}') contains no documents.",
                store.display_name
            )?;
            return Ok(());
        }
        writeln!(out, "Documents in '{}':", store.display_name)?;
        for doc in &documents {
            write_document_summary(out, doc)?;
        }
        writeln!(out, "{}", "-".repeat(40))?;
        Ok(())
    }

    fn upload_files(&mut self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Upload Files to a Store")?;
        let store = match self.select_store(out, "Select a destination store for your files:")? {
            Some(store) => store,
            None => return Ok(()),
        };
        let folder = self
            .prompter
            .line("Enter the full path to the folder with your files")?
            .unwrap_or_default();
        let folder = PathBuf::from(folder.trim());
        if !folder.is_dir() {
            writeln!(out, "Error: Folder '{}' not found.", folder.display())?;
            return Ok(());
        }
        upload_folder(self.client, &store.name, &folder, &self.options, out)?;
        Ok(())
    }

    fn delete_document(&mut self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Delete a Document from a Store")?;
        let store = match self.select_store(out, "First, select the store containing the document:")? {
            Some(store) => store,
            None => return Ok(()),
        };
        let documents = self.client.list_documents(&store.name)?;
        let document = match select_item(
            &mut self.prompter,
            out,
            "Now, select the document to DELETE:",
            documents,
            |d: &Document| d.display_name.as_str(),
        )? {
            Some(document) => document,
            None => return Ok(()),
        };
        if !self.confirm(&document.display_name)? {
            writeln!(out, "Operation cancelled.")?;
            return Ok(());
        }
        self.client.delete_document(&document.name)?;
        writeln!(out, "Document '{}' has been deleted.", document.display_name)?;
        Ok(())
    }

    fn select_store(&mut self, out: &mut dyn Write, heading: &str) -> Result<Option<Store>> {
        let stores = self.client.list_stores()?;
        select_item(&mut self.prompter, out, heading, stores, |s: &Store| {
            s.display_name.as_str()
        })
    }

    /// Only an explicit `y` confirms.
    fn confirm(&mut self, what: &str) -> Result<bool> {
        let prompt = format!(
            "Are you sure you want to permanently delete '{}'? [y/n]",
            what
        );
        let answer = self.prompter.line(&prompt)?.unwrap_or_default();
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

fn write_menu(out: &mut dyn Write) -> io::Result<()> {
    let rule = "=".repeat(41);
    let thin = "-".repeat(41);
    writeln!(out, "{}", rule)?;
    writeln!(out, "        Gemini File Store Manager")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "1. List all File Stores")?;
    writeln!(out, "2. Create a new File Store")?;
    writeln!(out, "3. Delete a File Store")?;
    writeln!(out, "{}", thin)?;
    writeln!(out, "4. List Documents in a Store")?;
    writeln!(out, "5. Upload Files to a Store")?;
    writeln!(out, "6. Delete a Document from a Store")?;
    writeln!(out, "{}", thin)?;
    writeln!(out, "q. Quit")?;
    writeln!(out, "{}", rule)?;
    out.flush()
}
