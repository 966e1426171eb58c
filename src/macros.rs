macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a classifier [`Rule`](crate::classifier::Rule).
///
/// `cues` is an OR-mask: the rule is only considered when the trigger scan saw
/// at least one of those cues (an empty mask means "always considered"). The
/// production may still decline by returning `None`, in which case the next
/// rule in order is tried.
macro_rules! rule {
    (
        name: $name:expr
        $(, cues: $cues:expr)?
        , prod: |$signals:ident : &Signals| -> $ret_ty:ty $body:block
        $(,)?
    ) => {{
        fn production($signals: &$crate::classifier::Signals<'_>) -> $ret_ty $body

        $crate::classifier::Rule { name: $name, cues: { 0 $(| $cues)? }, production }
    }};
}
