/// Terminal presentation of a duel and reading the user's pick.
use std::io::{self, BufRead, Write};

use tasteduel_core::{CategoryType, Item, Prediction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    First,
    Second,
    Quit,
}

/// Accepts 1/2 (or a/b, left/right) and q/quit. Case-insensitive.
pub fn parse_choice(input: &str) -> Option<Choice> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "a" | "l" | "left" => Some(Choice::First),
        "2" | "b" | "r" | "right" => Some(Choice::Second),
        "q" | "quit" | "exit" => Some(Choice::Quit),
        _ => None,
    }
}

/// Keep asking until the answer parses. End of input counts as quitting.
pub fn read_choice(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<Choice> {
    loop {
        write!(output, "Your pick [1/2, q to stop]: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(Choice::Quit);
        }
        match parse_choice(&line) {
            Some(choice) => return Ok(choice),
            None => writeln!(output, "Please answer 1, 2 or q.")?,
        }
    }
}

fn category_line(item: &Item) -> Option<String> {
    let categories = item.categories.as_ref()?;
    let parts: Vec<String> = CategoryType::ALL
        .into_iter()
        .filter_map(|t| categories.get(t).map(|values| format!("{t}: {}", values.join(", "))))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

/// Render one duel, with the model's guess underneath when `prediction` is given.
pub fn render_pair(
    output: &mut impl Write,
    item_a: &Item,
    item_b: &Item,
    prediction: Option<&Prediction>,
    round: usize,
    rounds: usize,
) -> io::Result<()> {
    writeln!(output, "\nDuel {round}/{rounds}: which do you prefer?\n")?;
    for (label, item) in [("1", item_a), ("2", item_b)] {
        writeln!(output, "  [{label}] {}", item.name)?;
        if !item.description.is_empty() {
            writeln!(output, "      {}", item.description)?;
        }
        if let Some(line) = category_line(item) {
            writeln!(output, "      {line}")?;
        }
    }
    if let Some(p) = prediction {
        writeln!(
            output,
            "\n  Model guess: {:.0}% for {} (confidence {:.0}%)",
            p.expected_outcome_a * 100.0,
            item_a.name,
            p.confidence * 100.0,
        )?;
    }
    writeln!(output)
}

/// Progress line shown every few duels.
pub fn render_progress(output: &mut impl Write, completed: usize, confidence: f64) -> io::Result<()> {
    writeln!(output, "{completed} comparisons, ranking confidence {:.0}%", confidence * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasteduel_core::Categories;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1\n"), Some(Choice::First));
        assert_eq!(parse_choice(" B "), Some(Choice::Second));
        assert_eq!(parse_choice("Quit"), Some(Choice::Quit));
        assert_eq!(parse_choice("3"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[test]
    fn test_read_choice_retries_until_valid() {
        let mut input = io::Cursor::new("maybe\n\n2\n");
        let mut output = Vec::new();
        assert_eq!(read_choice(&mut input, &mut output).unwrap(), Choice::Second);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Please answer").count(), 2);
    }

    #[test]
    fn test_read_choice_eof_quits() {
        let mut input = io::Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(read_choice(&mut input, &mut output).unwrap(), Choice::Quit);
    }

    #[test]
    fn test_render_pair() {
        let a = Item::new(1, "Pizza")
            .with_description("Flat bread with toppings")
            .with_categories(Categories::default().with(CategoryType::Cuisine, "Italian").with(CategoryType::Ingredient, vec!["Cheese", "Tomato"]));
        let b = Item::new(2, "Sushi");
        let p = Prediction { expected_outcome_a: 0.64, confidence: 0.3 };

        let mut out = Vec::new();
        render_pair(&mut out, &a, &b, Some(&p), 3, 20).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Duel 3/20"));
        assert!(text.contains("[1] Pizza"));
        assert!(text.contains("[2] Sushi"));
        assert!(text.contains("cuisine: Italian | ingredient: Cheese, Tomato"));
        assert!(text.contains("64% for Pizza (confidence 30%)"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_progress() {
        let mut out = Vec::new();
        render_progress(&mut out, 15, 0.427).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "15 comparisons, ranking confidence 43%\n");
    }

    #[test]
    fn test_terminal_write_errors_surface() {
        assert!(render_progress(&mut BrokenPipe, 5, 0.5).is_err());
        let item = Item::new(1, "Pizza");
        assert!(render_pair(&mut BrokenPipe, &item, &item, None, 1, 1).is_err());
    }
}
