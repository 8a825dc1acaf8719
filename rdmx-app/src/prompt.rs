use std::io::{self, BufRead, Write};

pub const DEFAULT_PARTICIPANT: &str = "001";

/// Asks for the participant id on the console.
///
/// An empty answer takes the default; a closed input cancels the run.
pub fn prompt_participant<R, W>(input: &mut R, output: &mut W) -> io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "Participant ID [{DEFAULT_PARTICIPANT}]: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let id = line.trim();
    Ok(Some(if id.is_empty() {
        DEFAULT_PARTICIPANT.to_string()
    } else {
        id.to_string()
    }))
}
