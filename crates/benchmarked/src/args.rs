//! Positional argument packs as seen by observers.

use std::fmt::Debug;

/// An argument pack that can be presented as an ordered sequence.
///
/// Instrumented methods take their positional arguments as one value
/// (usually a tuple); observers receive it as `&[&dyn Debug]`, one entry per
/// positional argument, in call order. A forwarded block is never part of it.
pub trait Arguments {
    /// Borrow each positional argument in order.
    fn positional(&self) -> Vec<&dyn Debug>;

    /// Number of positional arguments.
    fn arity(&self) -> usize {
        self.positional().len()
    }
}

impl Arguments for () {
    fn positional(&self) -> Vec<&dyn Debug> {
        Vec::new()
    }

    fn arity(&self) -> usize {
        0
    }
}

macro_rules! tuple_arguments {
    ($len:expr => $($name:ident . $idx:tt),+) => {
        impl<$($name: Debug),+> Arguments for ($($name,)+) {
            fn positional(&self) -> Vec<&dyn Debug> {
                vec![$(&self.$idx as &dyn Debug),+]
            }

            fn arity(&self) -> usize {
                $len
            }
        }
    };
}

tuple_arguments!(1 => A.0);
tuple_arguments!(2 => A.0, B.1);
tuple_arguments!(3 => A.0, B.1, C.2);
tuple_arguments!(4 => A.0, B.1, C.2, D.3);
tuple_arguments!(5 => A.0, B.1, C.2, D.3, E.4);
tuple_arguments!(6 => A.0, B.1, C.2, D.3, E.4, F.5);
tuple_arguments!(7 => A.0, B.1, C.2, D.3, E.4, F.5, G.6);
tuple_arguments!(8 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);

// Variadic packs
impl<T: Debug> Arguments for Vec<T> {
    fn positional(&self) -> Vec<&dyn Debug> {
        self.iter().map(|arg| arg as &dyn Debug).collect()
    }

    fn arity(&self) -> usize {
        self.len()
    }
}

impl<T: Debug, const N: usize> Arguments for [T; N] {
    fn positional(&self) -> Vec<&dyn Debug> {
        self.iter().map(|arg| arg as &dyn Debug).collect()
    }

    fn arity(&self) -> usize {
        N
    }
}

impl<T: Debug> Arguments for &[T] {
    fn positional(&self) -> Vec<&dyn Debug> {
        self.iter().map(|arg| arg as &dyn Debug).collect()
    }

    fn arity(&self) -> usize {
        self.len()
    }
}
