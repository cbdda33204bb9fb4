use log::{debug, error};

use crate::core::posting_list::SegmentPostingDescriptor;
use crate::index::{PostingChain, SegmentInfo, TermDictionary};
use crate::{DictKey, PostingError};

/// Fetches the posting of `key` in one segment.
///
/// A truncate chain reports the statistics of the main chain of the same
/// segment, or of the bitmap chain when the main chain is missing. A segment
/// without the truncate chain is served by its main chain.
pub(crate) fn fetch_segment_posting(
    dictionary: &dyn TermDictionary,
    segment: &SegmentInfo,
    key: DictKey,
    chain: &PostingChain,
) -> crate::Result<Option<SegmentPostingDescriptor>> {
    let PostingChain::Truncate(truncate_name) = chain else {
        return dictionary.lookup(segment, key, chain);
    };

    let Some(truncated) = dictionary.lookup(segment, key, chain)? else {
        debug!("segment {} has no truncate chain '{}', using the main chain", segment.segment_id, truncate_name);
        return dictionary.lookup(segment, key, &PostingChain::Main);
    };
    let stats = match dictionary.lookup(segment, key, &PostingChain::Main)? {
        Some(main) => main.main_chain_stats(),
        None => match dictionary.lookup(segment, key, &PostingChain::Bitmap)? {
            Some(bitmap) => bitmap.main_chain_stats(),
            None => {
                error!(
                    "segment {} has truncate chain '{}' for key {} but neither a main nor a bitmap chain",
                    segment.segment_id, truncate_name, key
                );
                return Err(PostingError::MissingMainChain {
                    truncate_name: truncate_name.clone(),
                    segment: segment.segment_id,
                });
            }
        },
    };
    Ok(Some(truncated.with_main_chain_stats(stats)))
}
