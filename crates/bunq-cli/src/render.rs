use color_eyre::eyre::Result;
use serde_json::Value;

pub enum CommandOutput {
    Plain(String),
    Json(Value),
}
pub type CommandResult = Result<CommandOutput>;

impl From<&str> for CommandOutput {
    fn from(text: &str) -> Self {
        CommandOutput::Plain(text.to_owned())
    }
}
impl From<String> for CommandOutput {
    fn from(text: String) -> Self {
        CommandOutput::Plain(text)
    }
}
impl From<Value> for CommandOutput {
    fn from(value: Value) -> Self {
        CommandOutput::Json(value)
    }
}

pub fn render_result(result: CommandResult, quiet: bool) -> Result<()> {
    let output = result?;
    if quiet {
        return Ok(());
    }

    match output {
        CommandOutput::Plain(text) => println!("{text}"),
        CommandOutput::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}
