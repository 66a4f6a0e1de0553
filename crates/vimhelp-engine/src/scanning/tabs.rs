/// Replaces each tab with spaces up to the next multiple of `tab_stop`.
///
/// Columns are counted in characters. A `tab_stop` of zero removes tabs.
pub fn expand_tabs(line: &str, tab_stop: usize) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + tab_stop * 2);
    let mut column = 0usize;
    for ch in line.chars() {
        match ch {
            '\t' => {
                if tab_stop > 0 {
                    let pad = tab_stop - column % tab_stop;
                    out.extend(std::iter::repeat_n(' ', pad));
                    column += pad;
                }
            }
            '\r' | '\n' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}
