use regex::Regex;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

const RULE_WIDTH: usize = 51;

/// The horizontal rule printed between build sections.
pub fn rule_line() -> String {
    "-".repeat(RULE_WIDTH)
}

fn visible_len(ansi: &Regex, s: &str) -> usize {
    ansi.replace_all(s, "").chars().count()
}

/// Lines of an ASCII box around `lines`, sized by their visible width.
pub fn boxed_lines(lines: &[String]) -> Vec<String> {
    let ansi = Regex::new("\x1b\\[[0-9;]*m").expect("static regex");

    let width = lines
        .iter()
        .map(|s| visible_len(&ansi, s))
        .max()
        .unwrap_or(0);

    let border = "-".repeat(width + 4);
    let mut boxed = Vec::with_capacity(lines.len() + 2);
    boxed.push(border.clone());
    for line in lines {
        let pad = width - visible_len(&ansi, line);
        boxed.push(format!("| {}{} |", line, " ".repeat(pad)));
    }
    boxed.push(border);
    boxed
}

/// Prints the provided lines inside an ASCII box
pub fn print_ansi_boxed_lines(lines: &[String]) {
    for line in boxed_lines(lines) {
        println_pad!("{}", line);
    }
}
