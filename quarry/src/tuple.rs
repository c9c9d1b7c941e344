//! Fixed-arity tuples of independent arbitraries.
//!
//! Shrinking moves one position at a time, all candidates for the first
//! position before any for the second, and so on. The number of candidates is
//! the sum of the positions' candidates, never their product.

use std::rc::Rc;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::rng::Random;
use crate::stream::Stream;
use crate::value::{Cloner, Context, Value, ValueMeta};

macro_rules! tuple_arbitrary {
    (
        $(#[$doc:meta])* $name:ident,
        $ctor:ident,
        $(($T:ident, $A:ident, $field:ident, $idx:tt)),+
    ) => {
        $(#[$doc])*
        pub struct $name<$($T),+> {
            $($field: BoxedArbitrary<$T>,)+
        }

        impl<$($T: Clone + 'static),+> $name<$($T),+> {
            /// Combine per-position values, keeping each position's metadata
            fn wrap(values: ($(Value<$T>,)+)) -> Value<($($T,)+)> {
                let ($($field,)+) = values;
                $(let $field = $field.into_parts();)+
                let raw = ($($field.0,)+);
                let metas = ($($field.1,)+);

                let cloneable = false $(|| metas.$idx.cloner.is_some())+;
                let cloner = if cloneable {
                    let metas = metas.clone();
                    let cloner: Cloner<($($T,)+)> = Rc::new(move |raw: &($($T,)+)| {
                        ($(metas.$idx.clone_value(&raw.$idx),)+)
                    });
                    Some(cloner)
                } else {
                    None
                };
                Value::from_parts(raw, Context::new(metas), cloner)
            }

            fn rebuild_all(
                value: &($($T,)+),
                metas: &($(ValueMeta<$T>,)+),
            ) -> ($(Value<$T>,)+) {
                ($(metas.$idx.rebuild(&value.$idx),)+)
            }
        }

        impl<$($T: Clone + 'static),+> Arbitrary<($($T,)+)> for $name<$($T),+> {
            fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<($($T,)+)> {
                Self::wrap(($(self.$field.generate(rng, bias_factor),)+))
            }

            fn can_shrink_without_context(&self, value: &($($T,)+)) -> bool {
                true $(&& self.$field.can_shrink_without_context(&value.$idx))+
            }

            fn shrink(&self, value: &($($T,)+), context: &Context) -> Stream<Value<($($T,)+)>> {
                let metas: Rc<($(ValueMeta<$T>,)+)> = context
                    .downcast()
                    .unwrap_or_else(|| Rc::new(($(ValueMeta::<$T>::default(),)+)));
                let value = Rc::new(value.clone());

                let mut stream = Stream::nil();
                $(
                    stream = {
                        let arbitrary = Rc::clone(&self.$field);
                        let value = Rc::clone(&value);
                        let metas = Rc::clone(&metas);
                        stream.join_lazy(move || {
                            arbitrary
                                .shrink(&value.$idx, &metas.$idx.context)
                                .map(move |shrunk| {
                                    let mut next = Self::rebuild_all(&value, &metas);
                                    next.$idx = shrunk;
                                    Self::wrap(next)
                                })
                        })
                    };
                )+
                stream
            }
        }

        /// Tuple of values drawn independently from each arbitrary
        pub fn $ctor<$($T, $A),+>($($field: $A),+) -> $name<$($T),+>
        where
            $($T: Clone + 'static, $A: Arbitrary<$T> + 'static,)+
        {
            $name {
                $($field: $field.boxed(),)+
            }
        }
    };
}

tuple_arbitrary!(
    /// Single-element tuple
    Tuple1, tuple1,
    (T0, A0, arb0, 0)
);
tuple_arbitrary!(
    /// Pair
    Tuple2, tuple2,
    (T0, A0, arb0, 0), (T1, A1, arb1, 1)
);
tuple_arbitrary!(
    Tuple3, tuple3,
    (T0, A0, arb0, 0), (T1, A1, arb1, 1), (T2, A2, arb2, 2)
);
tuple_arbitrary!(
    Tuple4, tuple4,
    (T0, A0, arb0, 0), (T1, A1, arb1, 1), (T2, A2, arb2, 2), (T3, A3, arb3, 3)
);
tuple_arbitrary!(
    Tuple5, tuple5,
    (T0, A0, arb0, 0), (T1, A1, arb1, 1), (T2, A2, arb2, 2), (T3, A3, arb3, 3),
    (T4, A4, arb4, 4)
);
tuple_arbitrary!(
    Tuple6, tuple6,
    (T0, A0, arb0, 0), (T1, A1, arb1, 1), (T2, A2, arb2, 2), (T3, A3, arb3, 3),
    (T4, A4, arb4, 4), (T5, A5, arb5, 5)
);
