use colored::Colorize;

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn subheader(title: &str) {
    println!("{}", title.bold());
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn print_value(name: &str, value: &str, source: Option<&str>) {
    match source {
        Some(source) => println!(
            "  {:<36} {} {}",
            format!("{name}:"),
            value.cyan(),
            format!("({source})").dimmed()
        ),
        None => println!("  {:<36} {}", format!("{name}:"), value.cyan())
    }
}

pub fn bool_str(b: bool) -> colored::ColoredString {
    if b { "yes".green() } else { "no".red() }
}
