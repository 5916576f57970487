//! File Reader
//!
//! Exposes a file's content as a lazy sequence of byte slices, walking the
//! entry's cluster chain and truncating the last slice to the entry's
//! declared size. A zero-size file never dereferences its head
//! cluster: some short-circuiting tools write a garbage head cluster for
//! empty files, and this reader must not follow it.

use crate::cluster::{ClusterChain, ClusterStore};
use crate::error::Result;
use crate::fat::FatTable;

/// A finite, lazy sequence of byte slices whose concatenation is exactly
/// `size` bytes of a file's content, in on-disk chain order.
pub struct FileReader<'a> {
    chain: Option<ClusterChain<'a>>,
    remaining: usize,
}

impl<'a> FileReader<'a> {
    /// `head` is the entry's first cluster; `size` its declared byte length.
    /// `size == 0` yields an empty sequence without ever calling into the
    /// chain iterator.
    pub fn new(store: &'a ClusterStore, fat: &'a FatTable, head: u32, size: u32, max_steps: usize) -> Self {
        let remaining = size as usize;
        let chain = if remaining == 0 {
            None
        } else {
            Some(ClusterChain::new(store, fat, head, max_steps))
        };
        Self { chain, remaining }
    }
}

impl<'a> Iterator for FileReader<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let chain = self.chain.as_mut()?;
        let cluster = match chain.next()? {
            Ok(bytes) => bytes,
            Err(e) => {
                self.remaining = 0;
                return Some(Err(e));
            }
        };
        let take = self.remaining.min(cluster.len());
        self.remaining -= take;
        Some(Ok(&cluster[..take]))
    }
}
