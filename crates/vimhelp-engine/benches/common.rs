// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_help_lines(sections: usize) -> Vec<String> {
    let mut lines = vec![
        "*bench.txt*  For Vim version 9.1.  Last change: 2024 Jan 01".to_string(),
        String::new(),
    ];
    for section in 0..sections {
        lines.push("=".repeat(78));
        lines.push(format!(
            "{section}. Section {section}{:>50}",
            format!("*bench-{section}*")
        ));
        lines.push(String::new());
        lines.push(format!(
            "Use CTRL-W to split *win-split-{section}* and see |window| or 'tabstop'."
        ));
        lines.push("Press <Esc> to stop, or use [count] with the command.".to_string());
        lines.push("Example: >".to_string());
        lines.push("    :set ts=8".to_string());
        lines.push("<".to_string());
        lines.push(String::new());
    }
    lines
}

#[allow(dead_code)]
pub fn generate_index_table(rows: usize) -> Vec<String> {
    let mut lines = vec!["#*#table:form=index 1:tag 17:command 33:opt:note 36:desc#*#".to_string()];
    for row in 0..rows {
        lines.push(format!(
            "{:<16}{:<19}entry number {row}",
            format!("|i_CTRL-{row}|"),
            format!("CTRL-{row}")
        ));
    }
    lines.push(String::new());
    lines
}

#[allow(dead_code)]
pub fn generate_tags(sections: usize) -> Vec<String> {
    let mut tags = vec![
        "'tabstop'\toptions.txt\t/*'tabstop'*".to_string(),
        "window\twindows.txt\t/*window*".to_string(),
    ];
    for section in 0..sections {
        tags.push(format!("bench-{section}\tbench.txt\t/*bench-{section}*"));
        tags.push(format!("i_CTRL-{section}\tinsert.txt\t/*i_CTRL-{section}*"));
    }
    tags
}
