//! Cheapest-store selection.

use crate::models::{Priced, Recommendation, StoreQuote};

/// Returns the store with the lowest price.
///
/// Ties keep the first store encountered. Returns `None` for empty input.
pub fn cheapest<'a, T, I>(items: I) -> Option<StoreQuote>
where
    T: Priced + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<&T> = None;

    for item in items {
        match best {
            Some(current) if item.price() >= current.price() => {}
            _ => best = Some(item),
        }
    }

    best.map(|b| StoreQuote::new(b.store_name(), b.price()))
}

/// Returns the cheapest store along with the spread to the most expensive one.
pub fn recommend<'a, T, I>(items: I) -> Option<Recommendation>
where
    T: Priced + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: Clone,
{
    let iter = items.into_iter();
    let winner = cheapest(iter.clone())?;

    let highest = iter.clone().map(|i| i.price()).max()?;
    let stores_compared = iter.count();

    Some(Recommendation {
        max_savings: highest - winner.price,
        store_name: winner.store_name,
        price: winner.price,
        stores_compared,
    })
}
