//! # Interactive membership shell.
//!
//! A line-oriented menu that drives a [`Tree`] loaded from, and saved back to, a member file.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use crate::{
    codec,
    error::Result,
    member::{Level, Member},
    tree::{Inserted, Tree},
};

const MENU: &str = "\n=== Gym Membership Database ===\n\
                    1. Lookup member by ID\n\
                    2. Add new member\n\
                    3. Edit member (change level or payment status)\n\
                    4. Cancel/delete member\n\
                    5. Save and exit\n\
                    Enter your choice (1-5): ";

/// A menu loop reading commands from `input` and writing prompts and results to `output`.
#[derive(Debug)]
pub struct Shell<R, W> {
    tree: Tree,
    data: PathBuf,
    input: R,
    output: W,
}

impl<R, W> Shell<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Creates a shell over the members stored at `data`. A missing file starts an empty tree.
    pub fn open(data: impl Into<PathBuf>, input: R, output: W) -> Self {
        let data = data.into();
        let tree = codec::load(&data);
        Self::new(tree, data, input, output)
    }

    /// Creates a shell over an already loaded tree that will be saved to `data` on exit.
    pub fn new(tree: Tree, data: impl Into<PathBuf>, input: R, output: W) -> Self {
        Self {
            tree,
            data: data.into(),
            input,
            output,
        }
    }

    /// The members currently held by the shell.
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Run the menu until the user chooses to exit or the input ends, then save the members and
    /// release them.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails, or if saving fails. A failed
    /// save is also reported on the output.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(choice) = self.prompt(MENU)? else {
                break;
            };
            match choice.parse::<u32>() {
                Ok(1) => self.lookup()?,
                Ok(2) => self.add()?,
                Ok(3) => self.edit()?,
                Ok(4) => self.cancel()?,
                Ok(5) => break,
                _ => writeln!(self.output, "Invalid choice, try again.")?,
            }
        }
        self.save_and_release()
    }

    fn lookup(&mut self) -> Result<()> {
        let Some(id) = self.prompt_number::<u32>("Enter member ID to search: ")? else {
            return Ok(());
        };
        match self.tree.get(id) {
            Some(member) => writeln!(self.output, "{member}")?,
            None => writeln!(self.output, "Member not found.")?,
        }
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let Some(first_name) = self.prompt("Enter first name: ")? else {
            return Ok(());
        };
        let Some(last_name) = self.prompt("Enter last name: ")? else {
            return Ok(());
        };
        let Some(id) = self.prompt_number::<u32>("Enter member ID: ")? else {
            return Ok(());
        };
        let Some(level) = self.prompt_number::<u16>("Enter member level (0-3): ")? else {
            return Ok(());
        };
        let Some(paid) = self.prompt_number::<i64>("Is paid? (1 for yes, 0 for no): ")? else {
            return Ok(());
        };
        let member = Member::new(&first_name, &last_name, id, Level::from(level), paid != 0);
        let message = match self.tree.insert(&member) {
            Inserted::Inserted => "Member added successfully.",
            Inserted::Duplicate => "Member already exists.",
            Inserted::AllocationFailed => "Failed to add member.",
        };
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    fn edit(&mut self) -> Result<()> {
        let Some(id) = self.prompt_number::<u32>("Enter member ID to edit: ")? else {
            return Ok(());
        };
        if !self.tree.contains(id) {
            writeln!(self.output, "Member not found.")?;
            return Ok(());
        }
        let menu = "What would you like to change?\n\
                    1. Change level\n\
                    2. Change paid status\n\
                    Enter choice (1-2): ";
        let Some(choice) = self.prompt_number::<u32>(menu)? else {
            return Ok(());
        };
        match choice {
            1 => {
                let Some(level) = self.prompt_number::<u16>("Enter new level (0-3): ")? else {
                    return Ok(());
                };
                self.tree.set_level(id, Level::from(level));
                writeln!(self.output, "Level updated.")?;
            }
            2 => {
                let Some(paid) = self.prompt_number::<i64>("Is paid? (1 for yes, 0 for no): ")?
                else {
                    return Ok(());
                };
                self.tree.set_paid(id, paid != 0);
                writeln!(self.output, "Payment status updated.")?;
            }
            _ => writeln!(self.output, "Invalid choice, try again.")?,
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        let Some(id) = self.prompt_number::<u32>("Enter member ID to delete: ")? else {
            return Ok(());
        };
        match self.tree.remove(id) {
            Some(_) => writeln!(self.output, "Member deleted successfully.")?,
            None => writeln!(self.output, "Member not found.")?,
        }
        Ok(())
    }

    fn save_and_release(&mut self) -> Result<()> {
        writeln!(self.output, "Saving to {}...", self.data.display())?;
        let saved = codec::dump(&self.tree, &self.data);
        match &saved {
            Ok(()) => writeln!(self.output, "Data saved successfully.")?,
            Err(err) => {
                tracing::error!(path = %self.data.display(), %err, "failed to save members");
                writeln!(self.output, "Error saving data.")?;
            }
        }
        self.tree.clear();
        writeln!(self.output, "Goodbye!")?;
        saved
    }

    /// Print `text`, then read one line. Returns `None` once the input is exhausted.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }

    /// Like [`Shell::prompt`], but parses the answer as a number. An answer that is not a number
    /// is reported and yields `None`.
    fn prompt_number<T: std::str::FromStr>(&mut self, text: &str) -> Result<Option<T>> {
        let Some(answer) = self.prompt(text)? else {
            return Ok(None);
        };
        match answer.trim().parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.output, "Invalid number.")?;
                Ok(None)
            }
        }
    }
}
