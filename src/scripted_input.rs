use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use tracing::warn;

use crate::game::{Command, CommandSource};

/// Commands read ahead of time from a script, one character per command.
pub struct ScriptedInput {
    script_commands: VecDeque<Command>,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        Ok(Self::parse(lines.iter().map(String::as_str)))
    }

    pub fn from_script(script: &str) -> Self {
        Self::parse(script.lines())
    }

    fn parse<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let mut script_commands = VecDeque::new();
        for line in lines {
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            for char_code in trimmed_line.chars().filter(|c| !c.is_whitespace()) {
                match Command::from_char(char_code) {
                    Some(command) => script_commands.push_back(command),
                    None => warn!("unknown key in script: {char_code:?}"),
                }
            }
        }
        Self { script_commands }
    }

    pub fn remaining(&self) -> usize {
        self.script_commands.len()
    }
}

impl CommandSource for ScriptedInput {
    fn next_command(&mut self) -> Option<Command> {
        self.script_commands.pop_front()
    }
}
