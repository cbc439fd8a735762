use crate::{
    InvocationRecord,
    matcher::{Description, Matcher},
};

/// Checks the calls selected by `call_filter` against `count`.
///
/// Returns `None` when `count` accepts the filtered calls. Otherwise returns
/// the failure message, `Expected <count description>, but <count mismatch>`,
/// rendered entirely by the count matcher.
pub(crate) fn mismatch_message<C, M>(
    records: &[InvocationRecord],
    call_filter: &C,
    count: &M,
) -> Option<String>
where
    C: Matcher<InvocationRecord> + ?Sized,
    M: Matcher<[InvocationRecord]> + ?Sized,
{
    let calls: Vec<InvocationRecord> = records
        .iter()
        .filter(|record| call_filter.matches(record))
        .cloned()
        .collect();

    if count.matches(&calls) {
        return None;
    }

    let mut description = Description::new();
    description
        .append_text("Expected ")
        .append_description_of::<[InvocationRecord], M>(count)
        .append_text(", but ");
    count.describe_mismatch(&calls, &mut description);
    Some(description.into_string())
}
