pub(crate) mod collect_sorted;
pub(crate) mod combine;
pub(crate) mod count;
pub(crate) mod global_sort;
pub(crate) mod joins;
pub(crate) mod keyed;
pub(crate) mod secondary_sort;
pub(crate) mod stateless;
pub(crate) mod values;
