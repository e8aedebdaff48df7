/// Canonical lowercase, hyphen-delimited token.
///
/// Runs of anything that is not a letter or digit collapse into one hyphen and
/// leading/trailing hyphens are dropped. Empty output means "no slug".
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    out
}
