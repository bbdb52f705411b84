//! Field declaration macro.

/// Build a [`Field`](crate::Field) for a named struct member.
///
/// `field!(Window, width)` expands to a `Field<Window, _>` named `"width"`
/// whose accessors borrow `window.width`. The result is a constant expression.
#[macro_export]
macro_rules! field {
    ($settings:ty, $member:ident) => {
        $crate::Field::<$settings, _>::new(
            stringify!($member),
            |settings: &$settings| &settings.$member,
            |settings: &mut $settings| &mut settings.$member,
        )
    };
}
