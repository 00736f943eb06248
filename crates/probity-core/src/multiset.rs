//! Order-independent comparison of sequences

use tracing::debug;

use crate::equality::{deep_equal, key_equal};
use crate::error::{AssertError, AssertResult, Side};
use crate::value::Value;

/// Distinct values and how often each was recorded
///
/// Keys are told apart with [`key_equal`], the relation a hash map keyed by
/// the values themselves would use.
#[derive(Debug, Default)]
struct FrequencyTable<'a> {
    entries: Vec<(&'a Value, usize)>,
}

impl<'a> FrequencyTable<'a> {
    fn record(&mut self, value: &'a Value) {
        match self.entries.iter_mut().find(|(key, _)| key_equal(key, value)) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value, 1)),
        }
    }

    fn distinct(&self) -> usize {
        self.entries.len()
    }
}

/// Assert that `got` holds the elements of `want`, ignoring order
///
/// Both operands must be arrays or slices, in any combination. Every
/// element must be comparable. The check passes when the number of distinct
/// `want` elements equals the number of distinct `got` elements that match
/// some `want` element; per-value counts are not compared, so
/// `got = ["a", "b"]` matches `want = ["a", "a"]`.
pub fn equals_ignoring_order(got: &Value, want: &Value) -> AssertResult<()> {
    let got_items = sequence_items(got, Side::Observed)?;
    let want_items = sequence_items(want, Side::Expected)?;

    if got_items.is_empty() && want_items.is_empty() {
        return Ok(());
    }

    ensure_comparable(got_items, Side::Observed)?;
    ensure_comparable(want_items, Side::Expected)?;

    let mut want_counts = FrequencyTable::default();
    let mut matching_counts = FrequencyTable::default();

    for want_item in want_items {
        want_counts.record(want_item);
        for got_item in got_items {
            if deep_equal(want_item, got_item) {
                matching_counts.record(got_item);
            }
        }
    }

    let want_count = want_counts.distinct();
    let matching_count = matching_counts.distinct();
    debug!(want_count, matching_count, "Compared sequences ignoring order");

    if want_count != matching_count {
        return Err(AssertError::mismatch(format!(
            "No of matching elements must be equal, want = {}, got = {}",
            want_count, matching_count
        )));
    }
    Ok(())
}

fn sequence_items(value: &Value, side: Side) -> AssertResult<&[Value]> {
    value.elements().ok_or_else(|| {
        AssertError::invalid(format!(
            "unsupported argument type for {} value, expected array or slice, found {}",
            side,
            value.kind_name()
        ))
    })
}

fn ensure_comparable(items: &[Value], side: Side) -> AssertResult<()> {
    match items.iter().find(|item| !item.is_comparable()) {
        Some(item) => Err(AssertError::invalid(format!(
            "{} sequence holds elements of non-comparable kind {}",
            side,
            item.kind_name()
        ))),
        None => Ok(()),
    }
}
