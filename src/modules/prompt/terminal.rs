use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

use super::dialog::{Dialog, DialogResponse, FieldKind, PromptError, PromptService};

/// Where masked field values are read from
enum SecretInput {
    Terminal, // Read from the controlling terminal with echo disabled
    Reader,   // Read from the same reader as plain fields
}

/// Renders dialogs as numbered menus on a terminal
pub struct TerminalPrompt<R, W> {
    reader: R,
    writer: W,
    secrets: SecretInput,
}

impl TerminalPrompt<StdinLock<'static>, Stdout> {
    /// Prompt on stdin/stdout, masked fields read from the terminal without echo
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self {
            reader: stdin.lock(),
            writer: io::stdout(),
            secrets: SecretInput::Terminal,
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Prompt over arbitrary streams; masked fields are read from `reader` as well
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            secrets: SecretInput::Reader,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    // Read one line exactly as typed, without its line terminator.
    // None once the input is closed.
    fn read_raw_line(&mut self) -> io::Result<Option<String>> {
        let mut input = String::new();
        if self.reader.read_line(&mut input)? == 0 {
            return Ok(None);
        }
        if input.ends_with('\n') {
            input.pop();
            if input.ends_with('\r') {
                input.pop();
            }
        }
        Ok(Some(input))
    }

    fn read_secret(&mut self) -> io::Result<String> {
        match self.secrets {
            SecretInput::Terminal => rpassword::read_password(),
            SecretInput::Reader => rpassword::read_password_from_bufread(&mut self.reader),
        }
    }

    // Match typed input against the menu: a 1-based number or a button label
    fn parse_choice(dialog: &Dialog, order: &[usize], input: &str) -> Option<usize> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| order.get(i).copied());
        }
        order
            .iter()
            .copied()
            .find(|&i| dialog.actions[i].label.eq_ignore_ascii_case(input))
    }
}

impl<R: BufRead, W: Write> PromptService for TerminalPrompt<R, W> {
    fn present(&mut self, dialog: &Dialog) -> Result<DialogResponse, PromptError> {
        // Header: title and optional message
        writeln!(self.writer, "\n=== {} ===", dialog.title)?;
        if !dialog.message.is_empty() {
            writeln!(self.writer, "{}", dialog.message)?;
        }

        // Ask for every field in order, masked ones without echo
        let mut field_values = Vec::with_capacity(dialog.fields.len());
        for field in &dialog.fields {
            write!(self.writer, "{}: ", field.placeholder)?;
            self.writer.flush()?;

            let value = match field.kind {
                FieldKind::Plain => self.read_raw_line()?,
                FieldKind::Masked => match self.read_secret() {
                    Ok(secret) => Some(secret),
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => None,
                    Err(e) => return Err(e.into()),
                },
            };
            match value {
                Some(value) => field_values.push(value),
                // Input closed mid-dialog, treat as dismissed
                None => return Ok(DialogResponse::new(None, field_values)),
            }
        }

        // Nothing to choose from, the dialog resolves on its own
        let order = dialog.display_order();
        if order.is_empty() {
            return Ok(DialogResponse::new(None, field_values));
        }

        // Numbered menu, dismiss action last
        for (n, &index) in order.iter().enumerate() {
            writeln!(self.writer, "  {}. {}", n + 1, dialog.actions[index].label)?;
        }

        // Keep asking until the input names an action or the input closes
        loop {
            write!(self.writer, "Choose an option (1-{}): ", order.len())?;
            self.writer.flush()?;

            let input = match self.read_raw_line()? {
                Some(input) => input,
                None => return Ok(DialogResponse::new(None, field_values)),
            };
            match Self::parse_choice(dialog, &order, &input) {
                Some(index) => return Ok(DialogResponse::new(Some(index), field_values)),
                None => writeln!(self.writer, "Invalid choice '{}'.", input.trim())?,
            }
        }
    }
}
