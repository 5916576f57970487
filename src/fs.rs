//! File System Facade
//!
//! Ties the BPB, FAT table, cluster storage, directory readers and file
//! reader together into the consumer-visible surface: `root`,
//! `read_directory`, `read_file`, `find`.

use crate::bpb::{BiosParameterBlock, FatVariant};
use crate::cluster::ClusterStore;
use crate::cursor::Image;
use crate::dir::{self, AssembledEntry, EntryIter};
use crate::error::{Error, Result};
use crate::fat::FatTable;

/// A directory, named by either the root (fixed region on FAT16, or a
/// cluster chain on FAT32) or a subdirectory's head cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirHandle {
    Root,
    Sub(u32),
}

/// The loaded volume: BPB geometry plus the tables needed to resolve
/// directories and files.
pub struct FileSystem {
    image: Image,
    bpb: BiosParameterBlock,
    fat: FatTable,
    clusters: ClusterStore,
    max_chain_steps: usize,
}

impl FileSystem {
    /// Decode the BPB at the start of `image` and load its FAT and cluster
    /// storage.
    pub fn open(image: Image) -> Result<Self> {
        let bpb = BiosParameterBlock::parse(&image.cursor(0))?;
        let fat = FatTable::new(image.clone(), &bpb);
        let clusters = ClusterStore::new(image.clone(), &bpb);
        let max_chain_steps = bpb.data_cluster_count().max(1);
        Ok(Self {
            image,
            bpb,
            fat,
            clusters,
            max_chain_steps,
        })
    }

    pub fn root(&self) -> DirHandle {
        DirHandle::Root
    }

    /// Enumerate a directory's entries in on-disk order.
    pub fn read_directory(&self, dir: DirHandle) -> Result<Vec<AssembledEntry>> {
        match dir {
            DirHandle::Root => match self.bpb.variant {
                FatVariant::Fat16 => {
                    let bytes = self
                        .image
                        .read(self.bpb.root_dir_offset(), self.bpb.root_dir_len())?;
                    EntryIter::over_fixed_root(bytes).collect()
                }
                FatVariant::Fat32 { root_cluster } => {
                    EntryIter::over_chain(&self.clusters, &self.fat, root_cluster, self.max_chain_steps)
                        .collect()
                }
            },
            DirHandle::Sub(cluster) => {
                EntryIter::over_chain(&self.clusters, &self.fat, cluster, self.max_chain_steps).collect()
            }
        }
    }

    /// Open `entry` as a directory. Errors with [`Error::NotADirectory`] if
    /// it isn't one.
    pub fn open_directory(&self, entry: &AssembledEntry) -> Result<DirHandle> {
        if !entry.is_directory() {
            return Err(Error::NotADirectory(entry.name.clone()));
        }
        Ok(DirHandle::Sub(entry.start_cluster))
    }

    /// Read `entry`'s content as a flattened byte vector. Errors with
    /// [`Error::NotAFile`] for a directory or volume label: the file reader
    /// is not valid for directories.
    pub fn read_file(&self, entry: &AssembledEntry) -> Result<Vec<u8>> {
        if entry.is_directory() || entry.is_volume_label() {
            return Err(Error::NotAFile(entry.name.clone()));
        }
        let reader = crate::file::FileReader::new(
            &self.clusters,
            &self.fat,
            entry.start_cluster,
            entry.size,
            self.max_chain_steps,
        );
        let mut out = Vec::with_capacity(entry.size as usize);
        for chunk in reader {
            out.extend_from_slice(chunk?);
        }
        Ok(out)
    }

    /// Resolve `path` (name components, compared case-insensitively)
    /// against `start`. Non-terminal components must resolve to a
    /// directory, or [`Error::NotADirectory`] is returned; a missing
    /// component is [`Error::NotFound`].
    pub fn find(&self, path: &[&str], start: DirHandle) -> Result<AssembledEntry> {
        let mut current = start;
        let mut components = path.iter().peekable();
        loop {
            let Some(&component) = components.next() else {
                return Err(Error::NotFound(String::new()));
            };
            let entries = self.read_directory(current)?;
            let entry = dir::find_entry(entries.into_iter().map(Ok), component)?;
            if components.peek().is_none() {
                return Ok(entry);
            }
            current = self.open_directory(&entry)?;
        }
    }

    /// Split a path on either `/` or `\`, discarding empty components.
    /// A two-character literal `"/\\"` would only match a path containing
    /// that exact substring, never splitting on either separator alone.
    pub fn split_path(path: &str) -> Vec<&str> {
        path.split(['/', '\\']).filter(|c| !c.is_empty()).collect()
    }
}
