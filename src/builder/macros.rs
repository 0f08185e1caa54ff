//! Macros for ergonomic transition tables.

/// Build a `Vec<Transition>` from `[trigger, source => target]` rows.
///
/// A target of `stay` delivers the event to the active leaf's `on_step`.
///
/// # Example
///
/// ```
/// use sortie::machine::{Target, Transition};
/// use sortie::transitions;
///
/// let table = transitions![
///     ["say", "ground.idle" => "ground.say"],
///     ["hold", "ground.say" => "ground.idle"],
///     ["count", "ground.say" => stay],
/// ];
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table[0], Transition::to("say", "ground.idle", "ground.say"));
/// assert_eq!(table[2].target, Target::Stay);
/// ```
#[macro_export]
macro_rules! transitions {
    (@row $trigger:expr, $source:expr => stay) => {
        $crate::machine::Transition::stay($trigger, $source)
    };
    (@row $trigger:expr, $source:expr => $target:expr) => {
        $crate::machine::Transition::to($trigger, $source, $target)
    };
    ($([$($row:tt)*]),* $(,)?) => {
        vec![$($crate::transitions!(@row $($row)*)),*]
    };
}
