//! Line-oriented command interpreter driving a single queue.

use std::str::SplitWhitespace;

use anyhow::{anyhow, bail, Context};
use itertools::Itertools;
use log::debug;

use crate::{
    alloc::{Allocator, FailPolicy},
    ops,
    queue::{Queue, TieBreak},
};

pub const HELP: &str = "\
new                 create a new, empty queue
free                release the queue
ih <str> [n]        insert <str> at the head, n times
it <str> [n]        insert <str> at the tail, n times
rh [str]            remove from the head, checking the value if given
rhq                 remove from the head without reading the value
reverse             reverse the queue in place
sort                sort the queue in natural order
size [n]            report the size, checking it if given
show                print the queue
option fail <pct>   refuse pct percent of storage requests
option length <n>   buffer capacity used by rh
option ties <stable|right>
help                print this message
quit                leave";

#[derive(Debug, PartialEq)]
pub enum Command {
    New,
    Free,
    InsertHead { value: String, count: usize },
    InsertTail { value: String, count: usize },
    RemoveHead { expected: Option<String> },
    RemoveHeadQuiet,
    Reverse,
    Sort,
    Size { expected: Option<usize> },
    Show,
    Option(Setting),
    Help,
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum Setting {
    FailPercent(u8),
    Length(usize),
    Ties(TieBreak),
}

struct Words<'a>(SplitWhitespace<'a>);

impl<'a> Words<'a> {
    fn next_str(&mut self) -> Option<&'a str> {
        self.0.next()
    }

    fn required(&mut self, what: &str) -> anyhow::Result<&'a str> {
        self.next_str()
            .ok_or_else(|| anyhow!("Expected {what} but found nothing"))
    }

    fn number<T>(&mut self, what: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.next_str()
            .map(|word| {
                word.parse::<T>()
                    .with_context(|| format!("Invalid {what}: {word}"))
            })
            .transpose()
    }

    fn finish(mut self) -> anyhow::Result<()> {
        match self.0.next() {
            Some(extra) => bail!("Unexpected argument: {extra}"),
            None => Ok(()),
        }
    }
}

impl Command {
    /// Parses one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = Words(line.split_whitespace());
        let name = words.required("a command")?;

        let command = match name {
            "new" => Command::New,
            "free" => Command::Free,
            "ih" | "it" => {
                let value = words.required("a value to insert")?.to_owned();
                let count = words.number("count")?.unwrap_or(1);
                if name == "ih" {
                    Command::InsertHead { value, count }
                } else {
                    Command::InsertTail { value, count }
                }
            }
            "rh" => Command::RemoveHead {
                expected: words.next_str().map(str::to_owned),
            },
            "rhq" => Command::RemoveHeadQuiet,
            "reverse" => Command::Reverse,
            "sort" => Command::Sort,
            "size" => Command::Size {
                expected: words.number("size")?,
            },
            "show" => Command::Show,
            "option" => Command::Option(Setting::parse(&mut words)?),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            unknown => bail!("Unknown command: {unknown}"),
        };

        words.finish()?;
        Ok(Some(command))
    }
}

impl Setting {
    fn parse(words: &mut Words) -> anyhow::Result<Self> {
        let setting = match words.required("an option name")? {
            "fail" => {
                let percent: u8 = words
                    .number("percentage")?
                    .ok_or_else(|| anyhow!("Expected a percentage"))?;
                if percent > 100 {
                    bail!("Percentage must be between 0 and 100, got {percent}");
                }
                Setting::FailPercent(percent)
            }
            "length" => {
                let length = words
                    .number("length")?
                    .ok_or_else(|| anyhow!("Expected a buffer length"))?;
                Setting::Length(length)
            }
            "ties" => match words.required("stable or right")? {
                "stable" => Setting::Ties(TieBreak::Stable),
                "right" => Setting::Ties(TieBreak::PreferRight),
                other => bail!("Unknown tie break: {other}"),
            },
            other => bail!("Unknown option: {other}"),
        };
        Ok(setting)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub fail_percent: u8,
    pub seed: Option<u64>,
    pub length: usize,
    pub ties: TieBreak,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fail_percent: 0,
            seed: None,
            length: 1024,
            ties: TieBreak::Stable,
        }
    }
}

impl Config {
    fn fail_policy(&self) -> FailPolicy {
        if self.fail_percent == 0 {
            FailPolicy::Never
        } else {
            FailPolicy::percent(self.fail_percent, self.seed)
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Continue(Vec<String>),
    Quit,
}

/// Holds the queue under test, which is absent until `new` runs.
#[derive(Debug, Default)]
pub struct Session {
    queue: Option<Queue>,
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            queue: None,
            config,
        }
    }

    pub fn queue(&self) -> Option<&Queue> {
        self.queue.as_ref()
    }

    pub fn execute(&mut self, command: Command) -> anyhow::Result<Outcome> {
        debug!("executing {command:?}");

        let mut lines = vec![];
        match command {
            Command::New => {
                ops::destroy(self.queue.take());
                let alloc = Allocator::new(self.config.fail_policy());
                self.queue = Some(Queue::with_allocator(alloc).context("new failed")?);
                lines.push(self.show());
            }
            Command::Free => {
                ops::destroy(self.queue.take());
                lines.push(self.show());
            }
            Command::InsertHead { value, count } => {
                self.insert(&value, count, ops::insert_head)
                    .context("ih failed")?;
                lines.push(self.show());
            }
            Command::InsertTail { value, count } => {
                self.insert(&value, count, ops::insert_tail)
                    .context("it failed")?;
                lines.push(self.show());
            }
            Command::RemoveHead { expected } => {
                let mut buffer = self.output_buffer().context("rh failed")?;
                ops::remove_head(self.queue.as_mut(), Some(&mut buffer[..])).context("rh failed")?;
                let removed = until_terminator(&buffer);
                lines.push(format!("Removed {removed} from queue"));
                if let Some(expected) = expected {
                    if removed != expected {
                        bail!("Removed value {removed} does not match expected value {expected}");
                    }
                }
                lines.push(self.show());
            }
            Command::RemoveHeadQuiet => {
                ops::remove_head(self.queue.as_mut(), None).context("rhq failed")?;
                lines.push(self.show());
            }
            Command::Reverse => {
                ops::reverse(self.queue.as_mut());
                lines.push(self.show());
            }
            Command::Sort => {
                let ties = self.config.ties;
                if let Some(queue) = self.queue.as_mut() {
                    queue.sort_with(ties);
                }
                lines.push(self.show());
            }
            Command::Size { expected } => {
                let size = ops::size(self.queue.as_ref());
                lines.push(format!("Queue size = {size}"));
                if let Some(expected) = expected {
                    if size != expected {
                        bail!("Queue size {size} does not match expected size {expected}");
                    }
                }
            }
            Command::Show => lines.push(self.show()),
            Command::Option(setting) => self.apply(setting),
            Command::Help => lines.extend(HELP.lines().map(str::to_owned)),
            Command::Quit => return Ok(Outcome::Quit),
        }

        Ok(Outcome::Continue(lines))
    }

    fn insert<F>(&mut self, value: &str, count: usize, insert: F) -> anyhow::Result<()>
    where
        F: Fn(Option<&mut Queue>, &str) -> Result<(), crate::QueueError>,
    {
        for done in 0..count {
            insert(self.queue.as_mut(), value)
                .with_context(|| format!("inserted {done} of {count}"))?;
        }
        Ok(())
    }

    /// Zeroed buffer of the configured length, refused rather than aborting
    /// when the length cannot be allocated.
    fn output_buffer(&self) -> anyhow::Result<Vec<u8>> {
        let length = self.config.length;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(length)
            .map_err(|_| anyhow!("buffer of {length} bytes"))?;
        buffer.resize(length, 0);
        Ok(buffer)
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::FailPercent(percent) => {
                self.config.fail_percent = percent;
                let policy = self.config.fail_policy();
                if let Some(queue) = self.queue.as_mut() {
                    queue.allocator_mut().set_policy(policy);
                }
            }
            Setting::Length(length) => self.config.length = length,
            Setting::Ties(ties) => self.config.ties = ties,
        }
    }

    fn show(&self) -> String {
        match &self.queue {
            Some(queue) => format!("q = [{}]", queue.iter().join(" ")),
            None => "q = NULL".to_owned(),
        }
    }
}

fn until_terminator(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).into_owned()
}
