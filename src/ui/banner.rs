use yansi::Paint;

/// Styled title line shown above the menu
pub fn banner(title: &str) -> String {
    let rule = "=".repeat(title.chars().count() + 4);
    format!(
        "{}\n  {}\n{}",
        Paint::rgb(&rule, 108, 112, 134),
        Paint::rgb(title, 249, 226, 175).bold(),
        Paint::rgb(&rule, 108, 112, 134),
    )
}

pub fn print_banner(title: &str) {
    println!("{}", banner(title));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_contains_title() {
        yansi::disable();
        let text = banner("GSM");
        assert_eq!(text, "=======\n  GSM\n=======");
    }
}
