//! Total orders used to rank stream elements.
//!
//! The greatest elements under an order are the ones retained; the least is
//! evicted first. Implementations must be pure and total.

use std::cmp::Ordering;
use std::marker::PhantomData;

pub trait TotalOrder<E>: Send + Sync {
    fn compare(&self, a: &E, b: &E) -> Ordering;
}

impl<E, F> TotalOrder<E> for F
where
    F: Fn(&E, &E) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &E, b: &E) -> Ordering {
        self(a, b)
    }
}

/// The element's own `Ord` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Natural;

impl<E: Ord> TotalOrder<E> for Natural {
    fn compare(&self, a: &E, b: &E) -> Ordering {
        a.cmp(b)
    }
}

/// Inverts another order, so the structure keeps the K smallest instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reversed<O>(pub O);

impl<E, O: TotalOrder<E>> TotalOrder<E> for Reversed<O> {
    fn compare(&self, a: &E, b: &E) -> Ordering {
        self.0.compare(b, a)
    }
}

/// Orders elements by a key extracted from each of them.
pub struct ByKey<E, K, F> {
    key: F,
    _marker: PhantomData<fn(&E) -> K>,
}

impl<E, K, F> ByKey<E, K, F>
where
    K: Ord,
    F: Fn(&E) -> K + Send + Sync,
{
    pub fn new(key: F) -> Self {
        Self { key, _marker: PhantomData }
    }
}

impl<E, K, F> TotalOrder<E> for ByKey<E, K, F>
where
    K: Ord,
    F: Fn(&E) -> K + Send + Sync,
{
    fn compare(&self, a: &E, b: &E) -> Ordering {
        (self.key)(a).cmp(&(self.key)(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_orders() {
        let by_len = |a: &String, b: &String| a.len().cmp(&b.len());
        let (short, long) = (String::from("ab"), String::from("abc"));
        assert_eq!(TotalOrder::<String>::compare(&by_len, &short, &long), Ordering::Less);
    }

    #[test]
    fn reversed_flips_natural() {
        let order = Reversed(Natural);
        assert_eq!(order.compare(&1u32, &2), Ordering::Greater);
        assert_eq!(order.compare(&2u32, &2), Ordering::Equal);
    }

    #[test]
    fn by_key_uses_extracted_key() {
        let order = ByKey::new(|pair: &(u32, &str)| pair.0);
        assert_eq!(order.compare(&(3, "x"), &(1, "y")), Ordering::Greater);
        assert_eq!(order.compare(&(2, "x"), &(2, "y")), Ordering::Equal);
    }
}
