//! Generated values, their opaque shrink contexts and the cloning protocol.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Opaque per-arbitrary shrink state attached to a [`Value`].
///
/// Only the arbitrary that produced a context knows its concrete type.
/// Callers pass it back untouched to `shrink`.
#[derive(Clone, Default)]
pub struct Context(Option<Rc<dyn Any>>);

impl Context {
    /// An empty context, as for values supplied from outside the engine
    pub fn none() -> Self {
        Self(None)
    }

    /// Wrap arbitrary-specific shrink state
    pub fn new<C: Any>(state: C) -> Self {
        Self(Some(Rc::new(state)))
    }

    /// Whether this context carries any state
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Recover the concrete state, or `None` when absent or of another shape
    pub fn downcast<C: Any>(&self) -> Option<Rc<C>> {
        self.0.clone().and_then(|state| state.downcast::<C>().ok())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Context(..)"),
            None => f.write_str("Context(none)"),
        }
    }
}

/// Produces an independent copy of a stateful value.
pub type Cloner<T> = Rc<dyn Fn(&T) -> T>;

/// Values wrapping mutable iteration state.
///
/// `clone_method` must return an instance sharing no mutable state with `self`
/// and positioned where `self` was when it was generated, so that replaying a
/// property on it reads exactly what the first run read.
pub trait CloneMethod {
    fn clone_method(&self) -> Self;
}

/// Build a cloner from a [`CloneMethod`] implementation
pub fn clone_method_cloner<T: CloneMethod + 'static>() -> Cloner<T> {
    Rc::new(|value: &T| value.clone_method())
}

/// One produced instance with its shrink context.
///
/// A value is immutable once created. When `has_to_be_cloned` is true, every
/// read through [`Value::value`] goes through the attached cloner so that
/// repeated reads never observe state mutated by an earlier consumer.
pub struct Value<T> {
    value: T,
    context: Context,
    cloner: Option<Cloner<T>>,
}

impl<T> Value<T> {
    /// Create a plain value
    pub fn new(value: T, context: Context) -> Self {
        Self {
            value,
            context,
            cloner: None,
        }
    }

    /// Create a value that must be cloned through `cloner` before reuse
    pub fn with_cloner(value: T, context: Context, cloner: Cloner<T>) -> Self {
        Self {
            value,
            context,
            cloner: Some(cloner),
        }
    }

    /// Assemble a value from its parts; `cloner` may be absent
    pub fn from_parts(value: T, context: Context, cloner: Option<Cloner<T>>) -> Self {
        Self {
            value,
            context,
            cloner,
        }
    }

    /// Whether reads have to go through the clone capability
    pub fn has_to_be_cloned(&self) -> bool {
        self.cloner.is_some()
    }

    /// The stored instance, without cloning
    pub fn value_ref(&self) -> &T {
        &self.value
    }

    /// The opaque shrink context
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The attached clone capability, if any
    pub fn cloner(&self) -> Option<&Cloner<T>> {
        self.cloner.as_ref()
    }

    /// Everything but the instance itself
    pub fn meta(&self) -> ValueMeta<T> {
        ValueMeta {
            context: self.context.clone(),
            cloner: self.cloner.clone(),
        }
    }

    /// Split into the raw instance and its metadata
    pub fn into_parts(self) -> (T, ValueMeta<T>) {
        (
            self.value,
            ValueMeta {
                context: self.context,
                cloner: self.cloner,
            },
        )
    }
}

impl<T: CloneMethod + 'static> Value<T> {
    /// Create a value for a type carrying its own clone method
    pub fn cloneable(value: T, context: Context) -> Self {
        Self::with_cloner(value, context, clone_method_cloner())
    }
}

impl<T: Clone> Value<T> {
    /// Read the instance.
    ///
    /// Stateful instances are cloned through their clone capability, plain
    /// ones through `Clone`.
    pub fn value(&self) -> T {
        match &self.cloner {
            Some(cloner) => cloner(&self.value),
            None => self.value.clone(),
        }
    }
}

impl<T: Clone> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value(),
            context: self.context.clone(),
            cloner: self.cloner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("value", &self.value)
            .field("context", &self.context)
            .field("has_to_be_cloned", &self.cloner.is_some())
            .finish()
    }
}

/// Structural equality on the instance and cloneability; contexts are ignored.
impl<T: PartialEq> PartialEq for Value<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.has_to_be_cloned() == other.has_to_be_cloned()
    }
}

/// Context and clone capability of one slot inside a composite value.
pub struct ValueMeta<T> {
    pub context: Context,
    pub cloner: Option<Cloner<T>>,
}

impl<T> ValueMeta<T> {
    /// Copy `value` if it is stateful, then re-attach this slot's metadata
    pub fn rebuild(&self, value: &T) -> Value<T>
    where
        T: Clone,
    {
        Value {
            value: self.clone_value(value),
            context: self.context.clone(),
            cloner: self.cloner.clone(),
        }
    }

    /// Copy `value`, deep-cloning it when this slot is stateful
    pub fn clone_value(&self, value: &T) -> T
    where
        T: Clone,
    {
        match &self.cloner {
            Some(cloner) => cloner(value),
            None => value.clone(),
        }
    }
}

impl<T> Clone for ValueMeta<T> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            cloner: self.cloner.clone(),
        }
    }
}

impl<T> Default for ValueMeta<T> {
    fn default() -> Self {
        Self {
            context: Context::none(),
            cloner: None,
        }
    }
}
