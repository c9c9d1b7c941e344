//! Lazy shrink streams.
//!
//! A [`Stream`] is a boxed iterator with the handful of combinators the
//! shrinkers need. Nothing is computed until the consumer pulls: `join_lazy`
//! and `lazy` defer even the *construction* of the next stream until every
//! candidate before it has been consumed, which keeps nested shrink trees from
//! being materialized.

/// Lazy, possibly infinite sequence of values
pub struct Stream<T> {
    iter: Box<dyn Iterator<Item = T>>,
}

impl<T: 'static> Stream<T> {
    /// Wrap any iterator
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = T> + 'static,
    {
        Self {
            iter: Box::new(iter),
        }
    }

    /// The empty stream
    pub fn nil() -> Self {
        Self::new(std::iter::empty())
    }

    /// A stream over already computed values
    pub fn of(values: Vec<T>) -> Self {
        Self::new(values.into_iter())
    }

    /// A stream holding exactly one value
    pub fn once(value: T) -> Self {
        Self::new(std::iter::once(value))
    }

    /// A stream whose content is only built when first pulled
    pub fn lazy<F>(producer: F) -> Self
    where
        F: FnOnce() -> Stream<T> + 'static,
    {
        Self::new(Lazy::Pending(Some(Box::new(producer))))
    }

    /// Transform every element
    pub fn map<U, F>(self, f: F) -> Stream<U>
    where
        U: 'static,
        F: FnMut(T) -> U + 'static,
    {
        Stream::new(self.iter.map(f))
    }

    /// Replace every element by a stream and flatten, one stream at a time
    pub fn flat_map<U, F>(self, f: F) -> Stream<U>
    where
        U: 'static,
        F: FnMut(T) -> Stream<U> + 'static,
    {
        Stream::new(self.iter.flat_map(f))
    }

    /// Keep the elements matching `predicate`
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + 'static,
    {
        Self::new(self.iter.filter(predicate))
    }

    /// Drop the first `n` elements
    pub fn skip(self, n: usize) -> Self {
        Self::new(self.iter.skip(n))
    }

    /// Keep at most `n` elements
    pub fn take(self, n: usize) -> Self {
        Self::new(self.iter.take(n))
    }

    /// Concatenate `other` after this stream
    pub fn join(self, other: Stream<T>) -> Self {
        Self::new(self.iter.chain(other.iter))
    }

    /// Concatenate a stream built only once this one is exhausted
    pub fn join_lazy<F>(self, producer: F) -> Self
    where
        F: FnOnce() -> Stream<T> + 'static,
    {
        self.join(Stream::lazy(producer))
    }

    /// The `n`-th element, or the last one if the stream is shorter
    pub fn nth_or_last(mut self, n: usize) -> Option<T> {
        let mut last = None;
        for _ in 0..=n {
            match self.iter.next() {
                Some(value) => last = Some(value),
                None => break,
            }
        }
        last
    }

    /// Whether every element matches `predicate` (consumes the stream)
    pub fn every<F>(mut self, predicate: F) -> bool
    where
        F: FnMut(T) -> bool,
    {
        self.iter.all(predicate)
    }

    /// Whether some element matches `predicate`, with that element
    pub fn has<F>(mut self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter.find(|value| predicate(value))
    }
}

impl<T> Iterator for Stream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.iter.next()
    }
}

impl<T: 'static> FromIterator<T> for Stream<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter.into_iter().collect())
    }
}

type Producer<T> = Box<dyn FnOnce() -> Stream<T>>;

/// Deferred stream construction
enum Lazy<T> {
    Pending(Option<Producer<T>>),
    Running(Stream<T>),
}

impl<T> Iterator for Lazy<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Lazy::Pending(producer) = self {
            let stream = match producer.take() {
                Some(producer) => producer(),
                None => return None,
            };
            *self = Lazy::Running(stream);
        }
        match self {
            Lazy::Running(stream) => stream.next(),
            Lazy::Pending(_) => None,
        }
    }
}
