//! Ordering of joined records before they are returned.

use std::cmp::Reverse;

use crate::filters::SortBy;
use crate::video::VideoRecord;

/// Orders records for output. Ties keep their incoming order; `Relevance`
/// leaves the upstream order untouched.
pub fn sort_records(records: &mut [VideoRecord], sort_by: SortBy) {
    match sort_by {
        SortBy::Relevance => {}
        SortBy::Views => records.sort_by_key(|r| Reverse(r.view_count)),
        SortBy::Subscribers => records.sort_by_key(|r| Reverse(r.subscriber_count)),
    }
}
