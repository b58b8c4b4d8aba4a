use rustyline::DefaultEditor;

/// Asks whether to pick up from a saved checkpoint. Declining restarts the
/// run and throws the prior progress away, so "no" is the default.
pub fn confirm_resume(last_position: u64) -> bool {
    println!("Found saved progress at position {last_position}.");
    println!("Resume from position {}? [y/N] ", last_position + 1);

    let mut rl = DefaultEditor::new().unwrap();
    loop {
        let input = rl.readline("").unwrap_or_default();
        let input = input.trim().to_lowercase();

        if input == "y" || input == "yes" {
            return true;
        } else if input == "n" || input == "no" || input.is_empty() {
            return false;
        } else {
            println!("Please enter 'y' or 'n'.");
        }
    }
}
