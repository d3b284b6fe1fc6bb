/// Line-oriented user input.
///
/// Returns the trimmed line the user entered, or `default` when they entered
/// nothing. `None` means no usable answer at all: an empty line with no
/// default, a closed stdin, or a non-interactive session. Callers treat it as
/// "no selection".
pub trait Prompter {
    fn prompt(&self, message: &str, default: Option<&str>) -> Option<String>;
}
