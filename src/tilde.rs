/// Replaces every `~` in `line` with `home`, left to right.
///
/// Expansion is not quote-aware. Text inserted from `home` is never rescanned, so a home
/// directory that itself contains `~` expands once. Without a home directory the line is
/// returned unchanged.
pub fn expand(line: &str, home: Option<&str>) -> String {
    let Some(home) = home else {
        return line.to_owned();
    };
    let tildes = line.matches('~').count();
    let mut expanded = String::with_capacity(line.len() + tildes * home.len());
    for ch in line.chars() {
        match ch {
            '~' => expanded.push_str(home),
            c => expanded.push(c),
        }
    }
    expanded
}
