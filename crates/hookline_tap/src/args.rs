//! Argument tuples carried by hook invocations.
//!
//! A hook's payload is a tuple whose length is its arity. Every tap receives
//! its own clone of the tuple, so payload types only need [`Clone`].
//!
//! ```
//! use hookline_tap::args::{HookArgs, WaterfallArgs};
//!
//! assert_eq!(<() as HookArgs>::ARITY, 0);
//! assert_eq!(<(u32, String) as HookArgs>::ARITY, 2);
//!
//! let mut args = (1_u32, "unchanged");
//! args.replace_head(2);
//! assert_eq!(args, (2, "unchanged"));
//! ```

use variadics_please::all_tuples;

/// A tuple of invocation arguments.
///
/// Implemented for tuples of up to twelve elements, including `()` for hooks
/// that carry no payload.
pub trait HookArgs: Clone + Send + Sync + 'static {
    /// Number of elements in the tuple.
    const ARITY: usize;
}

/// An argument tuple whose first element doubles as a waterfall accumulator.
///
/// Waterfall hooks thread each tap's result into the first argument of the
/// next tap, so they are only available for tuples with at least one element.
pub trait WaterfallArgs: HookArgs {
    /// Type of the leading element.
    type Head: Clone + Send + Sync + 'static;

    /// Returns the leading element.
    fn head(&self) -> &Self::Head;

    /// Overwrites the leading element.
    fn replace_head(&mut self, head: Self::Head);
}

macro_rules! impl_hook_args {
    ($($arg:ident),*) => {
        impl<$($arg: Clone + Send + Sync + 'static),*> HookArgs for ($($arg,)*) {
            const ARITY: usize = {
                let names: &[&str] = &[$(stringify!($arg)),*];
                names.len()
            };
        }
    };
}

all_tuples!(impl_hook_args, 0, 12, T);

macro_rules! impl_waterfall_args {
    ($head:ident $(, $arg:ident)*) => {
        impl<$head, $($arg),*> WaterfallArgs for ($head, $($arg,)*)
        where
            $head: Clone + Send + Sync + 'static,
            $($arg: Clone + Send + Sync + 'static,)*
        {
            type Head = $head;

            fn head(&self) -> &Self::Head {
                &self.0
            }

            fn replace_head(&mut self, head: Self::Head) {
                self.0 = head;
            }
        }
    };
}

all_tuples!(impl_waterfall_args, 1, 12, T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_matches_tuple_length() {
        assert_eq!(<() as HookArgs>::ARITY, 0);
        assert_eq!(<(u8,) as HookArgs>::ARITY, 1);
        assert_eq!(<(u8, u16, u32) as HookArgs>::ARITY, 3);
        assert_eq!(
            <(u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8) as HookArgs>::ARITY,
            12
        );
    }

    #[test]
    fn replace_head_leaves_tail_untouched() {
        let mut args = (String::from("a"), 7_i64, vec![1_u8]);
        args.replace_head(String::from("b"));

        assert_eq!(args.head(), "b");
        assert_eq!(args.1, 7);
        assert_eq!(args.2, vec![1]);
    }
}
