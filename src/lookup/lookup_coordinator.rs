use std::sync::Arc;

use futures::executor::block_on;
use futures::future::try_join_all;
use log::{debug, trace, warn};
use measure_time::debug_time;

use crate::common::{shared_multi_thread_executor, Executor};
use crate::config::{HighFrequencyPolicy, LookupConfig};
use crate::core::posting_list::SegmentPostingDescriptor;
use crate::core::stream::{
    BufferedPostingStream, CompositePostingStream, DynamicPostingStream, FilteredPostingStream, TermPostingStream,
};
use crate::index::{
    validate_ranges, FilterFactory, IndexKind, PostingChain, SegmentInfo, SegmentRegistry, Term, TermDictionary,
    TermHasher,
};
use crate::lookup::segment_fetch::fetch_segment_posting;
use crate::lookup::{LookupOptions, PostingType};
use crate::DictKey;

/// Turns terms of one index into posting streams over the segments the
/// registry publishes.
pub struct LookupCoordinator {
    index_name: String,
    kind: IndexKind,
    hasher: TermHasher,
    config: LookupConfig,
    dictionary: Arc<dyn TermDictionary>,
    registry: Arc<SegmentRegistry>,
    executor: Arc<Executor>,
    filter_factory: Option<Arc<dyn FilterFactory>>,
}

impl LookupCoordinator {
    pub fn new(
        index_name: impl Into<String>,
        kind: IndexKind,
        dictionary: Arc<dyn TermDictionary>,
        registry: Arc<SegmentRegistry>,
        config: LookupConfig,
    ) -> crate::Result<Self> {
        config.validate()?;
        let executor = if config.is_parallel() {
            shared_multi_thread_executor(config.fetch_threads)?
        } else {
            Arc::new(Executor::single_thread())
        };
        Ok(LookupCoordinator {
            index_name: index_name.into(),
            kind,
            hasher: TermHasher::new(kind),
            config,
            dictionary,
            registry,
            executor,
            filter_factory: None,
        })
    }

    /// Fans fetches out on `executor` instead of the one picked from the config.
    pub fn with_executor(mut self, executor: Arc<Executor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_filter_factory(mut self, filter_factory: Arc<dyn FilterFactory>) -> Self {
        self.filter_factory = Some(filter_factory);
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Blocking form of [`LookupCoordinator::lookup_async`].
    pub fn lookup(&self, term: &Term, options: &LookupOptions) -> crate::Result<Option<TermPostingStream>> {
        block_on(self.lookup_async(term, options))
    }

    /// Builds the stream of `term`.
    ///
    /// Returns `Ok(None)` when the term resolves to nothing. Any failed
    /// segment fetch fails the whole lookup. Dropping the future abandons
    /// the lookup, fetches already running finish on their own.
    pub async fn lookup_async(
        &self,
        term: &Term,
        options: &LookupOptions,
    ) -> crate::Result<Option<TermPostingStream>> {
        debug_time!("lookup of '{}' in index '{}'", term.word(), self.index_name);
        validate_ranges(term.hint_ranges())?;
        if term.index_name() != self.index_name {
            debug!("term of index '{}' looked up in index '{}'", term.index_name(), self.index_name);
            return Ok(None);
        }
        let Some(key) = self.hasher.hash_term(term) else {
            debug!("'{}' does not resolve to a {:?} term", term.word(), self.kind);
            return Ok(None);
        };

        let chain = self.classify(term, key, options);
        let snapshot = self.registry.snapshot();
        let segments: Vec<SegmentInfo> =
            snapshot.segments().iter().filter(|segment| term.selects(&segment.doc_range())).copied().collect();
        trace!(
            "key {} uses {:?}, {} of {} segments selected",
            key,
            chain,
            segments.len(),
            snapshot.segments().len()
        );

        let descriptors = self.fetch_descriptors(&segments, key, &chain).await?;
        let dynamic_stream = match snapshot.building() {
            Some(building) if options.include_building && term.selects(&building.doc_range()) => {
                building.lookup(key).filter(|stream| !stream.is_empty())
            }
            _ => None,
        };
        self.assemble(term, descriptors, dynamic_stream)
    }

    fn classify(&self, term: &Term, key: DictKey, options: &LookupOptions) -> PostingChain {
        let wants_bitmap = options.posting_type == PostingType::Bitmap
            || self.config.high_frequency_policy == HighFrequencyPolicy::BitmapOnly;
        if wants_bitmap && self.dictionary.is_high_frequency(key) {
            return PostingChain::Bitmap;
        }
        match term.truncate_name() {
            Some(truncate_name) if self.config.enable_truncate => PostingChain::Truncate(truncate_name.to_string()),
            _ => PostingChain::Main,
        }
    }

    /// Fetches every segment's posting, in segment creation order, dropping
    /// segments where the term has no docs.
    async fn fetch_descriptors(
        &self,
        segments: &[SegmentInfo],
        key: DictKey,
        chain: &PostingChain,
    ) -> crate::Result<Vec<SegmentPostingDescriptor>> {
        let fetched: Vec<Option<SegmentPostingDescriptor>> =
            if self.executor.is_single_thread() || segments.len() < self.config.min_parallel_segments {
                segments
                    .iter()
                    .map(|segment| fetch_segment_posting(self.dictionary.as_ref(), segment, key, chain))
                    .collect::<crate::Result<_>>()?
            } else {
                let pending = segments.iter().map(|&segment| {
                    let dictionary = self.dictionary.clone();
                    let chain = chain.clone();
                    self.executor.spawn(move || fetch_segment_posting(dictionary.as_ref(), &segment, key, &chain))
                });
                try_join_all(pending).await?
            };
        Ok(fetched.into_iter().flatten().filter(|descriptor| !descriptor.is_empty()).collect())
    }

    fn assemble(
        &self,
        term: &Term,
        descriptors: Vec<SegmentPostingDescriptor>,
        dynamic_stream: Option<DynamicPostingStream>,
    ) -> crate::Result<Option<TermPostingStream>> {
        let static_stream =
            if descriptors.is_empty() { None } else { Some(BufferedPostingStream::new(descriptors)?) };
        let stream: TermPostingStream = match (static_stream, dynamic_stream) {
            (None, None) => {
                debug!("'{}' has no postings in index '{}'", term.word(), self.index_name);
                return Ok(None);
            }
            (Some(static_stream), None) => static_stream.into(),
            (static_stream, dynamic_stream) => CompositePostingStream::new(static_stream, dynamic_stream).into(),
        };

        if !self.kind.needs_inner_filter() {
            return Ok(Some(stream));
        }
        let filter = self.filter_factory.as_ref().and_then(|factory| factory.create_filter(term));
        Ok(Some(match filter {
            Some(filter) => FilteredPostingStream::new(stream, filter).into(),
            None => {
                warn!(
                    "no attribute filter for '{}' in {:?} index '{}', docs are returned unchecked",
                    term.word(),
                    self.kind,
                    self.index_name
                );
                stream
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::Rng;

    use super::*;
    use crate::common::constants::NULL_TERM_KEY;
    use crate::core::posting_list::{ChainStats, CompressMode, FormatOptions, PostingRegionWriter};
    use crate::core::stream::PostingStream;
    use crate::index::{
        BuildingSegmentIndex, DocIdRange, DynamicIndex, MemoryAttributeValues, MemoryTermDictionary,
        RangeFilterFactory, SegmentId, SegmentSnapshot,
    };
    use crate::{DocId, LoggerConfig, PostingError};

    /// Dictionary that counts lookups and can fail one segment.
    #[derive(Default)]
    struct ProbeDictionary {
        inner: MemoryTermDictionary,
        lookups: AtomicUsize,
        failing_segment: Option<SegmentId>,
    }

    impl TermDictionary for ProbeDictionary {
        fn lookup(
            &self,
            segment: &SegmentInfo,
            key: DictKey,
            chain: &PostingChain,
        ) -> crate::Result<Option<SegmentPostingDescriptor>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.failing_segment == Some(segment.segment_id) {
                return Err(PostingError::FetchFailed(format!("segment {} is unreadable", segment.segment_id)));
            }
            self.inner.lookup(segment, key, chain)
        }

        fn is_high_frequency(&self, key: DictKey) -> bool {
            self.inner.is_high_frequency(key)
        }
    }

    fn init_logger() {
        LoggerConfig::new(std::env::temp_dir(), "debug", false, true, true).init().unwrap();
    }

    fn term(word: &str) -> Term {
        Term::builder().index_name("body").word(word).build()
    }

    fn key_of(word: &str) -> DictKey {
        TermHasher::new(IndexKind::Normal).hash_term(&term(word)).unwrap()
    }

    fn posting(segment: &SegmentInfo, docs: &[u32]) -> SegmentPostingDescriptor {
        let format = FormatOptions { has_term_freq: true, ..Default::default() };
        let mut writer = PostingRegionWriter::new(format, CompressMode::Bitpacked).unwrap();
        for &docid in docs {
            writer.add(docid, 2, 0, 0, &[]).unwrap();
        }
        writer.into_descriptor(segment.base_docid, segment.doc_count)
    }

    fn segments(layout: &[(DocId, u32)]) -> Vec<SegmentInfo> {
        layout
            .iter()
            .enumerate()
            .map(|(segment_id, &(base_docid, doc_count))| SegmentInfo::new(segment_id as SegmentId, base_docid, doc_count))
            .collect()
    }

    fn registry(segments: &[SegmentInfo], building: Option<Arc<dyn DynamicIndex>>) -> Arc<SegmentRegistry> {
        Arc::new(SegmentRegistry::new(SegmentSnapshot::new(segments.to_vec(), building).unwrap()))
    }

    fn coordinator(dictionary: Arc<ProbeDictionary>, registry: Arc<SegmentRegistry>) -> LookupCoordinator {
        LookupCoordinator::new("body", IndexKind::Normal, dictionary, registry, LookupConfig::default()).unwrap()
    }

    fn parallel_executor() -> Arc<Executor> {
        Arc::new(Executor::multi_thread(4, "lookup-test-").unwrap())
    }

    fn docids(stream: Option<TermPostingStream>) -> Vec<DocId> {
        stream.map(|mut stream| stream.collect_docids().unwrap()).unwrap_or_default()
    }

    #[test]
    fn test_three_segment_lookup() {
        init_logger();
        let segments = segments(&[(0, 100), (100, 200), (300, 50)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let key = key_of("rust");
        dictionary.inner.insert(&segments[0], key, PostingChain::Main, posting(&segments[0], &[5])).unwrap();
        dictionary.inner.insert(&segments[2], key, PostingChain::Main, posting(&segments[2], &[2])).unwrap();

        let coordinator = coordinator(dictionary.clone(), registry(&segments, None));
        let mut stream = coordinator.lookup(&term("rust"), &LookupOptions::default()).unwrap().unwrap();
        assert!(matches!(stream, TermPostingStream::BufferedPostingStream(_)));
        assert_eq!(stream.seek(0).unwrap(), Some(5));
        assert_eq!(stream.seek(6).unwrap(), Some(302));
        assert_eq!(stream.seek(400).unwrap(), None);
        assert_eq!(stream.term_stats().doc_freq, 2);
        assert_eq!(stream.term_stats().total_term_freq, 4);
        assert_eq!(dictionary.lookups.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        init_logger();
        let mut rng = rand::thread_rng();
        let mut layout = Vec::new();
        let mut base_docid = 0;
        for _ in 0..16 {
            let doc_count = rng.gen_range(1..3_000u32);
            layout.push((base_docid, doc_count));
            base_docid += DocId::from(doc_count);
        }
        let segments = segments(&layout);
        let dictionary = Arc::new(ProbeDictionary::default());
        let words = ["alpha", "beta", "gamma"];
        for segment in &segments {
            for word in words {
                if rng.gen_bool(0.2) {
                    continue;
                }
                let docs: Vec<u32> = (0..segment.doc_count).filter(|_| rng.gen_bool(0.1)).collect();
                dictionary.inner.insert(segment, key_of(word), PostingChain::Main, posting(segment, &docs)).unwrap();
            }
        }

        let registry = registry(&segments, None);
        let sequential = coordinator(dictionary.clone(), registry.clone());
        let config = LookupConfig { min_parallel_segments: 1, ..Default::default() };
        let parallel = LookupCoordinator::new("body", IndexKind::Normal, dictionary, registry, config)
            .unwrap()
            .with_executor(parallel_executor());

        for word in words {
            let hint = vec![DocIdRange::new(base_docid / 4, base_docid / 2)];
            for term in [term(word), Term::builder().index_name("body").word(word).hint_ranges(hint).build()] {
                let left = sequential.lookup(&term, &LookupOptions::default()).unwrap();
                let right = parallel.lookup(&term, &LookupOptions::default()).unwrap();
                assert_eq!(left.as_ref().map(|s| s.term_stats()), right.as_ref().map(|s| s.term_stats()));
                assert_eq!(docids(left), docids(right));
            }
        }
    }

    #[test]
    fn test_invalid_ranges_fail_before_fetching() {
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let coordinator = coordinator(dictionary.clone(), registry(&segments, None));
        let term = Term::builder()
            .index_name("body")
            .word("rust")
            .hint_ranges(vec![DocIdRange::new(50, 80), DocIdRange::new(10, 20)])
            .build();
        let result = coordinator.lookup(&term, &LookupOptions::default());
        assert!(matches!(result, Err(PostingError::InvalidRange(_))));
        assert_eq!(dictionary.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_hint_ranges_skip_segments() {
        let segments = segments(&[(0, 100), (100, 100), (200, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let key = key_of("rust");
        for segment in &segments {
            dictionary.inner.insert(segment, key, PostingChain::Main, posting(segment, &[1])).unwrap();
        }
        let coordinator = coordinator(dictionary.clone(), registry(&segments, None));
        let term = Term::builder()
            .index_name("body")
            .word("rust")
            .hint_ranges(vec![DocIdRange::new(150, 160)])
            .build();
        let stream = coordinator.lookup(&term, &LookupOptions::default()).unwrap();
        assert_eq!(docids(stream), vec![101]);
        assert_eq!(dictionary.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolution_misses_are_empty() {
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        dictionary.inner.insert(&segments[0], key_of("rust"), PostingChain::Main, posting(&segments[0], &[1])).unwrap();
        let registry = registry(&segments, None);
        let coordinator = coordinator(dictionary.clone(), registry.clone());

        let other_index = Term::builder().index_name("title").word("rust").build();
        assert!(coordinator.lookup(&other_index, &LookupOptions::default()).unwrap().is_none());
        assert!(coordinator.lookup(&term("missing"), &LookupOptions::default()).unwrap().is_none());

        let range = LookupCoordinator::new("body", IndexKind::Range, dictionary, registry, LookupConfig::default())
            .unwrap();
        assert!(range.lookup(&term("not-a-number"), &LookupOptions::default()).unwrap().is_none());
    }

    #[test]
    fn test_null_term() {
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        dictionary.inner.insert(&segments[0], NULL_TERM_KEY, PostingChain::Main, posting(&segments[0], &[3, 4])).unwrap();
        let coordinator = coordinator(dictionary, registry(&segments, None));
        let null_term = Term::builder().index_name("body").is_null(true).build();
        assert_eq!(docids(coordinator.lookup(&null_term, &LookupOptions::default()).unwrap()), vec![3, 4]);
    }

    #[test]
    fn test_truncate_chain_reports_main_stats() {
        let segments = segments(&[(0, 1_000), (1_000, 1_000), (2_000, 1_000)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let key = key_of("rust");
        let top = PostingChain::Truncate("top".to_string());
        let main_docs: Vec<u32> = (0..500).collect();
        // segment 0: truncate and main chain
        dictionary.inner.insert(&segments[0], key, top.clone(), posting(&segments[0], &[7, 9])).unwrap();
        dictionary.inner.insert(&segments[0], key, PostingChain::Main, posting(&segments[0], &main_docs)).unwrap();
        // segment 1: main chain only
        dictionary.inner.insert(&segments[1], key, PostingChain::Main, posting(&segments[1], &[4])).unwrap();
        // segment 2: truncate and bitmap chain
        dictionary.inner.insert(&segments[2], key, top.clone(), posting(&segments[2], &[1])).unwrap();
        let bitmap = posting(&segments[2], &[1]).with_main_chain_stats(ChainStats::new(300, 300));
        dictionary.inner.insert(&segments[2], key, PostingChain::Bitmap, bitmap).unwrap();

        let coordinator = coordinator(dictionary, registry(&segments, None));
        let term = Term::builder().index_name("body").word("rust").truncate_name("top").build();
        let stream = coordinator.lookup(&term, &LookupOptions::default()).unwrap().unwrap();
        assert_eq!(stream.term_stats().doc_freq, 500 + 1 + 300);
        assert_eq!(docids(Some(stream)), vec![7, 9, 1_004, 2_001]);
    }

    #[test]
    fn test_truncate_disabled_uses_main_chain() {
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let key = key_of("rust");
        dictionary.inner.insert(&segments[0], key, PostingChain::Truncate("top".to_string()), posting(&segments[0], &[7])).unwrap();
        dictionary.inner.insert(&segments[0], key, PostingChain::Main, posting(&segments[0], &[5, 7])).unwrap();
        let config = LookupConfig { enable_truncate: false, ..Default::default() };
        let coordinator =
            LookupCoordinator::new("body", IndexKind::Normal, dictionary, registry(&segments, None), config).unwrap();
        let term = Term::builder().index_name("body").word("rust").truncate_name("top").build();
        assert_eq!(docids(coordinator.lookup(&term, &LookupOptions::default()).unwrap()), vec![5, 7]);
    }

    #[test]
    fn test_missing_main_chain_is_an_error() {
        init_logger();
        let segments = segments(&[(0, 100), (100, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let key = key_of("rust");
        dictionary.inner.insert(&segments[1], key, PostingChain::Truncate("top".to_string()), posting(&segments[1], &[3])).unwrap();
        let term = Term::builder().index_name("body").word("rust").truncate_name("top").build();

        let registry = registry(&segments, None);
        let sequential = coordinator(dictionary.clone(), registry.clone());
        match sequential.lookup(&term, &LookupOptions::default()) {
            Err(PostingError::MissingMainChain { truncate_name, segment }) => {
                assert_eq!(truncate_name, "top");
                assert_eq!(segment, 1);
            }
            other => panic!("unexpected lookup result {:?}", other.map(|stream| stream.is_some())),
        }

        let config = LookupConfig { min_parallel_segments: 1, ..Default::default() };
        let parallel = LookupCoordinator::new("body", IndexKind::Normal, dictionary, registry, config)
            .unwrap()
            .with_executor(parallel_executor());
        assert!(matches!(
            parallel.lookup(&term, &LookupOptions::default()),
            Err(PostingError::MissingMainChain { .. })
        ));
    }

    #[test]
    fn test_high_frequency_terms() {
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let key = key_of("the");
        dictionary.inner.insert(&segments[0], key, PostingChain::Main, posting(&segments[0], &[1, 2, 3])).unwrap();
        dictionary.inner.insert(&segments[0], key, PostingChain::Bitmap, posting(&segments[0], &[1, 2, 3, 4])).unwrap();
        dictionary.inner.mark_high_frequency(key);
        let registry = registry(&segments, None);

        let both = coordinator(dictionary.clone(), registry.clone());
        let bitmap_options = LookupOptions::builder().posting_type(PostingType::Bitmap).build();
        assert_eq!(docids(both.lookup(&term("the"), &LookupOptions::default()).unwrap()), vec![1, 2, 3]);
        assert_eq!(docids(both.lookup(&term("the"), &bitmap_options).unwrap()), vec![1, 2, 3, 4]);

        let config = LookupConfig { high_frequency_policy: HighFrequencyPolicy::BitmapOnly, ..Default::default() };
        let bitmap_only = LookupCoordinator::new("body", IndexKind::Normal, dictionary, registry, config).unwrap();
        assert_eq!(docids(bitmap_only.lookup(&term("the"), &LookupOptions::default()).unwrap()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_fetch_failure_aborts_lookup() {
        let segments = segments(&[(0, 100), (100, 100), (200, 100)]);
        let dictionary = ProbeDictionary { failing_segment: Some(1), ..Default::default() };
        for segment in &segments {
            dictionary.inner.insert(segment, key_of("rust"), PostingChain::Main, posting(segment, &[1])).unwrap();
        }
        let dictionary = Arc::new(dictionary);
        let registry = registry(&segments, None);

        let sequential = coordinator(dictionary.clone(), registry.clone());
        assert!(matches!(sequential.lookup(&term("rust"), &LookupOptions::default()), Err(PostingError::FetchFailed(_))));

        let config = LookupConfig { min_parallel_segments: 1, ..Default::default() };
        let parallel = LookupCoordinator::new("body", IndexKind::Normal, dictionary, registry, config)
            .unwrap()
            .with_executor(parallel_executor());
        assert!(matches!(parallel.lookup(&term("rust"), &LookupOptions::default()), Err(PostingError::FetchFailed(_))));
    }

    #[test]
    fn test_building_segment_merge() {
        init_logger();
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let key = key_of("rust");
        dictionary.inner.insert(&segments[0], key, PostingChain::Main, posting(&segments[0], &[10, 42])).unwrap();
        let building = Arc::new(BuildingSegmentIndex::new(100));
        building.add(key, 105).unwrap();
        building.add(key, 110).unwrap();
        building.delete(key, 110).unwrap();
        building.add(key_of("fresh"), 120).unwrap();
        let registry = registry(&segments, Some(building.clone() as Arc<dyn DynamicIndex>));
        let coordinator = coordinator(dictionary, registry);

        let mut stream = coordinator.lookup(&term("rust"), &LookupOptions::default()).unwrap().unwrap();
        assert!(matches!(stream, TermPostingStream::CompositePostingStream(_)));
        assert_eq!(stream.term_stats().doc_freq, 3);
        assert_eq!(stream.seek(0).unwrap(), Some(10));
        assert_eq!(stream.unpack().unwrap().term_freq, Some(2));
        assert_eq!(stream.seek(43).unwrap(), Some(105));
        assert!(!stream.unpack().unwrap().has_term_data());
        assert_eq!(stream.seek(106).unwrap(), None);

        let without_building = LookupOptions::builder().include_building(false).build();
        assert_eq!(docids(coordinator.lookup(&term("rust"), &without_building).unwrap()), vec![10, 42]);

        let mut fresh = coordinator.lookup(&term("fresh"), &LookupOptions::default()).unwrap().unwrap();
        assert_eq!(fresh.seek(0).unwrap(), Some(120));
        assert!(fresh.unpack().unwrap().matched);

        let before_building = Term::builder()
            .index_name("body")
            .word("fresh")
            .hint_ranges(vec![DocIdRange::new(0, 100)])
            .build();
        assert!(coordinator.lookup(&before_building, &LookupOptions::default()).unwrap().is_none());
    }

    #[test]
    fn test_spatial_terms_are_filtered() {
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let cell = Term::builder().index_name("geo").word("0,50").build();
        let key = TermHasher::new(IndexKind::Spatial).hash_term(&cell).unwrap();
        dictionary.inner.insert(&segments[0], key, PostingChain::Main, posting(&segments[0], &[1, 2, 3, 4])).unwrap();
        let values = MemoryAttributeValues::new(vec![(1, 10), (2, 80), (3, 50), (4, -1)]);
        let registry = registry(&segments, None);

        let spatial = LookupCoordinator::new("geo", IndexKind::Spatial, dictionary.clone(), registry.clone(), LookupConfig::default())
            .unwrap()
            .with_filter_factory(Arc::new(RangeFilterFactory::new(values.clone())));
        let stream = spatial.lookup(&cell, &LookupOptions::default()).unwrap();
        assert!(matches!(stream, Some(TermPostingStream::FilteredPostingStream(_))));
        assert_eq!(docids(stream), vec![1, 3]);

        let numeric = Term::builder().index_name("geo").word("7").build();
        let numeric_key = TermHasher::new(IndexKind::Range).hash_term(&numeric).unwrap();
        dictionary.inner.insert(&segments[0], numeric_key, PostingChain::Main, posting(&segments[0], &[2, 4])).unwrap();
        let range = LookupCoordinator::new("geo", IndexKind::Range, dictionary, registry, LookupConfig::default())
            .unwrap()
            .with_filter_factory(Arc::new(RangeFilterFactory::new(values)));
        let stream = range.lookup(&numeric, &LookupOptions::default()).unwrap();
        assert!(matches!(stream, Some(TermPostingStream::BufferedPostingStream(_))));
        assert_eq!(docids(stream), vec![2, 4]);
    }

    #[test]
    fn test_spatial_terms_without_filter_pass_through() {
        init_logger();
        let segments = segments(&[(0, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        let cell = Term::builder().index_name("geo").word("cell-17").build();
        let key = TermHasher::new(IndexKind::Spatial).hash_term(&cell).unwrap();
        dictionary.inner.insert(&segments[0], key, PostingChain::Main, posting(&segments[0], &[1, 2])).unwrap();
        let registry = registry(&segments, None);

        let without_factory =
            LookupCoordinator::new("geo", IndexKind::Spatial, dictionary.clone(), registry.clone(), LookupConfig::default())
                .unwrap();
        let stream = without_factory.lookup(&cell, &LookupOptions::default()).unwrap();
        assert!(matches!(stream, Some(TermPostingStream::BufferedPostingStream(_))));
        assert_eq!(docids(stream), vec![1, 2]);

        // the word is not a "low,high" pair, so the factory has no filter for it
        let values = MemoryAttributeValues::new(vec![(1, 10)]);
        let unparsable = LookupCoordinator::new("geo", IndexKind::Spatial, dictionary, registry, LookupConfig::default())
            .unwrap()
            .with_filter_factory(Arc::new(RangeFilterFactory::new(values)));
        assert_eq!(docids(unparsable.lookup(&cell, &LookupOptions::default()).unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_snapshot_is_taken_per_lookup() {
        let segments = segments(&[(0, 100), (100, 100)]);
        let dictionary = Arc::new(ProbeDictionary::default());
        for segment in &segments {
            dictionary.inner.insert(segment, key_of("rust"), PostingChain::Main, posting(segment, &[0])).unwrap();
        }
        let registry = registry(&segments[..1], None);
        let coordinator = coordinator(dictionary, registry.clone());
        let stream = coordinator.lookup(&term("rust"), &LookupOptions::default()).unwrap();

        registry.publish(SegmentSnapshot::new(segments.clone(), None).unwrap());
        assert_eq!(docids(stream), vec![0]);
        assert_eq!(docids(coordinator.lookup(&term("rust"), &LookupOptions::default()).unwrap()), vec![0, 100]);
    }
}
