/// Lazily compiled static regex for a literal pattern.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("static regex literal"));
        &*RE
    }};
}

/// Build a `Vec<Fragment>` from plain strings and `(color_index, text)` pairs.
///
/// ```
/// use rulelink::{Fragment, fragments};
///
/// let frags = fragments!["A", "-", (0, "23")];
/// assert_eq!(frags[2], Fragment::linked(0, "23"));
/// ```
#[macro_export]
macro_rules! fragments {
    ($($item:expr),* $(,)?) => {
        vec![ $($crate::Fragment::from($item)),* ]
    };
}
