//! Interactive bin configuration session.
//!
//! Prompts for the customer, bin size and material, then reads one command
//! per line until `done` or `quit`. Input and output are generic so the
//! whole session can be driven from a test.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::debug;

use bolt_core::catalog::{self, BinSize, Item, MATERIALS};
use bolt_core::customer::{validate_name, Customer};
use bolt_core::fraction::{self, Fraction};
use bolt_core::layout::BinLayoutModel;
use bolt_core::settings::Settings;

const HELP: &str = "\
Commands:
  add <diameter> <entry>...   add lengths and/or items to a row
                              e.g. add 1/4 nut flatwasher 1/2 3/4 1-1/2
  blank <diameter>            reserve an empty slot in a row
  undo                        remove the most recent addition
  clear                       remove every row
  show                        print the bin grid and row summaries
  lengths <diameter>          list stock lengths for a diameter
  diameters                   list standard diameters
  size <56|72>                change bin size (clears the layout)
  material <name>             change material (clears the layout)
  done                        save and exit
  quit                        exit without saving
  help                        show this message

Items: nut, flatwasher, lockwasher, locknut, nylon-locknut, blank";

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { diameter: Fraction, lengths: Vec<Fraction>, items: Vec<Item> },
    Blank(Fraction),
    Undo,
    Clear,
    Show,
    Lengths(Fraction),
    Diameters,
    Size(BinSize),
    Material(String),
    Done,
    Quit,
    Help,
}

/// What the session loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue(String),
    Done,
    Quit,
}

/// Parse one command line.
pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("Empty command, type 'help' for a list");
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "add" | "a" => {
            let (diameter, entries) = args
                .split_first()
                .context("Usage: add <diameter> <entry>...")?;
            let diameter = fraction::parse(diameter)?;
            let mut lengths = Vec::new();
            let mut items = Vec::new();
            for entry in entries {
                match entry.parse::<Item>() {
                    Ok(item) => items.push(item),
                    Err(_) => lengths.push(fraction::parse(entry)?),
                }
            }
            Command::Add { diameter, lengths, items }
        }
        "blank" | "b" => Command::Blank(fraction::parse(single_arg(&args, "blank <diameter>")?)?),
        "undo" | "u" => Command::Undo,
        "clear" => Command::Clear,
        "show" | "s" => Command::Show,
        "lengths" | "l" => Command::Lengths(fraction::parse(single_arg(&args, "lengths <diameter>")?)?),
        "diameters" | "d" => Command::Diameters,
        "size" => Command::Size(single_arg(&args, "size <56|72>")?.parse()?),
        "material" | "m" => {
            if args.is_empty() {
                bail!("Usage: material <name>");
            }
            Command::Material(args.join(" "))
        }
        "done" | "save" => Command::Done,
        "quit" | "q" | "exit" => Command::Quit,
        "help" | "h" | "?" => Command::Help,
        other => bail!("Unknown command '{}', type 'help' for a list", other),
    };
    Ok(command)
}

fn single_arg<'a>(args: &[&'a str], usage: &str) -> Result<&'a str> {
    match args {
        [arg] => Ok(arg),
        _ => bail!("Usage: {}", usage),
    }
}

/// Apply a command to the model and describe the result.
///
/// Model errors are returned unchanged so the caller can report them and
/// keep going; the model is untouched in that case.
pub fn apply_command(model: &mut BinLayoutModel, command: Command) -> Result<Outcome> {
    let message = match command {
        Command::Add { diameter, lengths, items } => {
            model.add_or_update_row(diameter, &lengths, &items)?;
            match model.row_for(diameter) {
                Some(row) => row.summary(model.max_denominator()),
                None => String::new(),
            }
        }
        Command::Blank(diameter) => {
            model.add_blank(diameter)?;
            format!("Blank slot added to {}\"", diameter)
        }
        Command::Undo => {
            let removed = model.remove_last_contribution()?;
            format!("Removed {} from {}\"", removed.entry, removed.diameter)
        }
        Command::Clear => {
            model.clear();
            "Layout cleared".to_string()
        }
        Command::Show => describe(model),
        Command::Lengths(diameter) => {
            let lengths = catalog::available_lengths(diameter);
            if lengths.is_empty() {
                format!("No stock lengths listed for {}\"", diameter)
            } else {
                format!("{}\": {}", diameter, lengths.join(", "))
            }
        }
        Command::Diameters => catalog::standard_diameters()?
            .into_iter()
            .map(|d| match catalog::thread_pitch(d) {
                Some(tpi) => format!("{}\"-{}", d, tpi),
                None => format!("{}\"", d),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Command::Size(size) => {
            model.select_bin_size(size);
            format!("Bin size set to {} slots ({} rows)", size, size.max_rows())
        }
        Command::Material(material) => {
            model.select_material(material);
            format!("Material set to {}", model.material())
        }
        Command::Done => return Ok(Outcome::Done),
        Command::Quit => return Ok(Outcome::Quit),
        Command::Help => HELP.to_string(),
    };
    Ok(Outcome::Continue(message))
}

/// Header, row summaries and grid, as printed by `show`
pub fn describe(model: &BinLayoutModel) -> String {
    let mut out = format!(
        "Customer: {} ({})\nBin: {} slots, {}\n",
        model.customer().name,
        model.customer().phone,
        model.bin_size(),
        model.material()
    );
    for line in model.row_summaries() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&model.render_grid().to_text());
    out
}

/// Line-oriented prompt session over any reader and writer
pub struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Session { input, output }
    }

    /// Print `prompt` and read one trimmed line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Ask until `accept` returns a value.
    fn ask_until<T>(&mut self, prompt: &str, mut accept: impl FnMut(&str) -> Result<T>) -> Result<T> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                bail!("Input ended before setup was complete");
            };
            match accept(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&format!("  {}", e))?,
            }
        }
    }

    /// Run the whole wizard. Returns the finished model, or `None` if the user
    /// quit without saving.
    pub fn run(&mut self, settings: &Settings) -> Result<Option<BinLayoutModel>> {
        self.say("Bolt Bin Configuration")?;
        self.say("======================")?;

        let name = self.ask_until("Customer name: ", |s| Ok(validate_name(s)?))?;
        let customer = self.ask_until("Phone (10 digits): ", |s| Ok(Customer::new(&name, s)?))?;

        let size = self.ask_until("Bin size [56/72] (56): ", |s| {
            if s.is_empty() {
                Ok(BinSize::default())
            } else {
                Ok(s.parse::<BinSize>()?)
            }
        })?;

        let mut menu = String::from("Materials:\n");
        for (i, material) in MATERIALS.iter().enumerate() {
            menu.push_str(&format!("  {}. {}\n", i + 1, material));
        }
        self.say(menu.trim_end())?;
        let material = self.ask_until("Material (number or name): ", pick_material)?;

        let mut model = BinLayoutModel::new(size, material)
            .with_limits(settings.limits)
            .with_max_denominator(settings.max_denominator)
            .with_customer(customer);

        self.say("Type 'help' for commands.")?;
        loop {
            let prompt = format!("[{}/{} rows] > ", model.row_count(), model.max_rows());
            let Some(line) = self.ask(&prompt)? else {
                debug!("input closed, finishing session");
                return Ok(Some(model));
            };
            if line.is_empty() {
                continue;
            }
            let outcome = parse_command(&line).and_then(|command| apply_command(&mut model, command));
            match outcome {
                Ok(Outcome::Continue(message)) => {
                    if !message.is_empty() {
                        self.say(&message)?;
                    }
                }
                Ok(Outcome::Done) => return Ok(Some(model)),
                Ok(Outcome::Quit) => return Ok(None),
                Err(e) => self.say(&format!("Error: {}", e))?,
            }
        }
    }
}

/// Accept a 1-based index into [`MATERIALS`] or any non-empty name
fn pick_material(answer: &str) -> Result<String> {
    if let Ok(index) = answer.parse::<usize>() {
        return MATERIALS
            .get(index.wrapping_sub(1))
            .map(|m| m.to_string())
            .with_context(|| format!("Pick a number between 1 and {}", MATERIALS.len()));
    }
    if answer.is_empty() {
        bail!("Material is required");
    }
    Ok(answer.to_string())
}

/// Where `done` saves when no `--out` was given
pub fn default_output(settings: &Settings) -> PathBuf {
    settings.output_dir.join(bolt_core::file_io::DEFAULT_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn f(text: &str) -> Fraction {
        fraction::parse(text).unwrap()
    }

    fn model() -> BinLayoutModel {
        BinLayoutModel::new(BinSize::Slots56, "Grade 5 Zinc")
    }

    #[test]
    fn test_parse_add_mixes_items_and_lengths() {
        let command = parse_command("add 1/4 nut 1/2 Nylon-Locknut 1-1/2").unwrap();
        assert_eq!(
            command,
            Command::Add {
                diameter: f("1/4"),
                lengths: vec![f("1/2"), f("1-1/2")],
                items: vec![Item::Nut, Item::NylonLocknut],
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("add").is_err());
        assert!(parse_command("add 1/4 bogus").is_err());
        assert!(parse_command("size 64").is_err());
        assert!(parse_command("material").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("UNDO").unwrap(), Command::Undo);
        assert_eq!(parse_command("size 72").unwrap(), Command::Size(BinSize::Slots72));
        assert_eq!(
            parse_command("material Stainless Steel").unwrap(),
            Command::Material("Stainless Steel".to_string())
        );
        assert_eq!(parse_command("blank 3/8").unwrap(), Command::Blank(f("3/8")));
    }

    #[test]
    fn test_apply_add_and_undo() {
        let mut m = model();
        let outcome = apply_command(&mut m, parse_command("add 1/4 nut 1/2 3/4").unwrap()).unwrap();
        assert_eq!(outcome, Outcome::Continue("1/4\" (Nut, 1/2, 3/4)".to_string()));

        let outcome = apply_command(&mut m, Command::Undo).unwrap();
        assert_eq!(outcome, Outcome::Continue("Removed 3/4 from 1/4\"".to_string()));
        assert_eq!(m.rows()[0].lengths(), &[f("1/2")]);
    }

    #[test]
    fn test_apply_error_leaves_model_unchanged() {
        let mut m = model();
        assert!(apply_command(&mut m, Command::Undo).is_err());
        apply_command(&mut m, parse_command("add 1/2 1 2 3 4 5 6 7 8").unwrap()).unwrap();
        let before = m.render_grid();
        assert!(apply_command(&mut m, parse_command("add 1/2 nut").unwrap()).is_err());
        assert_eq!(m.render_grid(), before);
    }

    #[test]
    fn test_apply_lookups() {
        let mut m = model();
        match apply_command(&mut m, Command::Diameters).unwrap() {
            Outcome::Continue(text) => assert!(text.starts_with("1/4\"-20, 5/16\"-18")),
            other => panic!("unexpected outcome {:?}", other),
        }
        match apply_command(&mut m, Command::Lengths(f("1/4"))).unwrap() {
            Outcome::Continue(text) => assert!(text.starts_with("1/4\": ")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_pick_material() {
        assert_eq!(pick_material("1").unwrap(), MATERIALS[0]);
        assert!(pick_material("0").is_err());
        assert!(pick_material("99").is_err());
        assert!(pick_material("").is_err());
        assert_eq!(pick_material("Brass").unwrap(), "Brass");
    }

    #[test]
    fn test_full_session() {
        let script = "Jane Doe\n12345\n555-123-4567\n72\n2\nadd 1/4 nut 1/2\nbogus\nblank 3/8\nshow\ndone\n";
        let mut output = Vec::new();
        let result = Session::new(Cursor::new(script), &mut output)
            .run(&Settings::default())
            .unwrap();

        let model = result.unwrap();
        assert_eq!(model.bin_size(), BinSize::Slots72);
        assert_eq!(model.material(), MATERIALS[1]);
        assert_eq!(model.customer().phone, "555-123-4567");
        assert_eq!(model.row_count(), 2);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Error: Unknown command 'bogus'"));
        assert!(text.contains("Row 2: 3/8\" (Blank)"));
    }

    #[test]
    fn test_session_quit_discards() {
        let script = "Jane Doe\n5551234567\n\nBrass\nadd 1/4 nut\nquit\n";
        let mut output = Vec::new();
        let result = Session::new(Cursor::new(script), &mut output)
            .run(&Settings::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_session_input_ends_during_setup() {
        let mut output = Vec::new();
        assert!(Session::new(Cursor::new("Jane Doe\n"), &mut output)
            .run(&Settings::default())
            .is_err());
    }
}
