//! Crate-level scenarios exercising the full `FileSystem` facade against
//! hand-built FAT16/FAT32 images: a FAT32 image with a subdirectory and a
//! multi-cluster file, a long file name spanning two fragments, a deleted
//! entry sitting between two live ones, a cyclic FAT chain, and an
//! end-of-directory terminator partway through a cluster.

use fatfs_rs::entry::Attributes;
use fatfs_rs::{Error, FileSystem, Image};

fn short_slot(name: &str, attr: u8, cluster: u32, size: u32) -> [u8; 32] {
    let mut slot = [0x20u8; 32];
    let (base, ext) = name.split_once('.').unwrap_or((name, ""));
    slot[0..base.len().min(8)].copy_from_slice(base.as_bytes());
    slot[8..8 + ext.len().min(3)].copy_from_slice(ext.as_bytes());
    slot[11] = attr;
    slot[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
    slot[26..28].copy_from_slice(&((cluster & 0xFFFF) as u16).to_le_bytes());
    slot[28..32].copy_from_slice(&size.to_le_bytes());
    slot
}

fn lfn_checksum(filename_raw: &[u8; 8], extension_raw: &[u8; 3]) -> u8 {
    let mut sum: u8 = 0;
    for &byte in filename_raw.iter().chain(extension_raw.iter()) {
        sum = ((sum & 1) << 7).wrapping_add(sum >> 1).wrapping_add(byte);
    }
    sum
}

fn lfn_slot(sequence_byte: u8, text: &str, checksum: u8) -> [u8; 32] {
    let mut units = [0xFFFFu16; 13];
    let encoded: Vec<u16> = text.encode_utf16().collect();
    units[..encoded.len()].copy_from_slice(&encoded);
    if encoded.len() < 13 {
        units[encoded.len()] = 0x0000;
    }

    let mut slot = [0u8; 32];
    slot[0] = sequence_byte;
    slot[11] = 0x0F;
    slot[13] = checksum;
    for (i, cu) in units[0..5].iter().enumerate() {
        slot[1 + i * 2..1 + i * 2 + 2].copy_from_slice(&cu.to_le_bytes());
    }
    for (i, cu) in units[5..11].iter().enumerate() {
        slot[14 + i * 2..14 + i * 2 + 2].copy_from_slice(&cu.to_le_bytes());
    }
    for (i, cu) in units[11..13].iter().enumerate() {
        slot[28 + i * 2..28 + i * 2 + 2].copy_from_slice(&cu.to_le_bytes());
    }
    slot
}

fn fat16_base(total_sectors: u16, fat_size: u16, root_entry_count: u16) -> Vec<u8> {
    let mut image = vec![0u8; 512];
    image[0x0B..0x0D].copy_from_slice(&512u16.to_le_bytes());
    image[0x0D] = 1; // sectors_per_cluster
    image[0x0E..0x10].copy_from_slice(&1u16.to_le_bytes()); // reserved_sector_count
    image[0x10] = 1; // num_fats
    image[0x11..0x13].copy_from_slice(&root_entry_count.to_le_bytes());
    image[0x13..0x15].copy_from_slice(&total_sectors.to_le_bytes());
    image[0x16..0x18].copy_from_slice(&fat_size.to_le_bytes());
    image
}

fn put_fat16_entry(image: &mut [u8], fat_offset: usize, cluster: u32, value: u16) {
    let pos = fat_offset + cluster as usize * 2;
    image[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
}

/// Scenario 2: a FAT32 image with `root_cluster=2`, cluster length 1024,
/// a subdirectory `DIR1` (cluster 3), and `A.BIN` (size 1500, head cluster
/// 4, chain 4->5->EOC) inside it.
#[test]
fn fat32_subdirectory_and_multi_cluster_file() {
    let reserved_sectors: u32 = 32;
    let fat_size_sectors: u32 = 1;
    let bytes_per_sector: u32 = 512;
    let sectors_per_cluster: u32 = 2; // cluster_len = 1024

    let fat_offset = (reserved_sectors * bytes_per_sector) as usize;
    let fat_len = (fat_size_sectors * bytes_per_sector) as usize;
    let data_offset = fat_offset + fat_len;
    let cluster_len = (bytes_per_sector * sectors_per_cluster) as usize;

    let mut image = vec![0u8; 512];
    image[0x0B..0x0D].copy_from_slice(&(bytes_per_sector as u16).to_le_bytes());
    image[0x0D] = sectors_per_cluster as u8;
    image[0x0E..0x10].copy_from_slice(&(reserved_sectors as u16).to_le_bytes());
    image[0x10] = 1; // num_fats
    // root_entry_count left at 0 -> FAT32
    image[0x20..0x24].copy_from_slice(&100u32.to_le_bytes()); // total_sectors_32
    image[0x24..0x28].copy_from_slice(&fat_size_sectors.to_le_bytes());
    image[0x2C..0x30].copy_from_slice(&2u32.to_le_bytes()); // root_cluster

    image.resize(data_offset + 4 * cluster_len, 0);

    let put_fat32_entry = |image: &mut Vec<u8>, cluster: u32, value: u32| {
        let pos = fat_offset + cluster as usize * 4;
        image[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
    };
    const EOC: u32 = 0x0FFFFFFF;
    put_fat32_entry(&mut image, 2, EOC); // root directory: single cluster
    put_fat32_entry(&mut image, 3, EOC); // DIR1: single cluster
    put_fat32_entry(&mut image, 4, 5);
    put_fat32_entry(&mut image, 5, EOC);

    let root_cluster_offset = data_offset;
    let dir1 = short_slot("DIR1", Attributes::DIRECTORY.bits(), 3, 0);
    image[root_cluster_offset..root_cluster_offset + 32].copy_from_slice(&dir1);

    let dir1_cluster_offset = data_offset + cluster_len;
    let a_bin = short_slot("A.BIN", Attributes::ARCHIVE.bits(), 4, 1500);
    image[dir1_cluster_offset..dir1_cluster_offset + 32].copy_from_slice(&a_bin);

    let cluster4_offset = data_offset + 2 * cluster_len;
    let cluster5_offset = data_offset + 3 * cluster_len;
    for i in 0..cluster_len {
        image[cluster4_offset + i] = (i % 251) as u8;
    }
    for i in 0..476 {
        image[cluster5_offset + i] = ((i + 17) % 251) as u8;
    }

    let fs = FileSystem::open(Image::whole(image)).unwrap();
    let entry = fs.find(&["dir1", "a.bin"], fs.root()).unwrap();
    assert_eq!(entry.name, "A.BIN");
    assert_eq!(entry.size, 1500);

    let bytes = fs.read_file(&entry).unwrap();
    assert_eq!(bytes.len(), 1500);
    assert_eq!(&bytes[..cluster_len], &image_pattern(cluster_len, 0)[..]);
}

fn image_pattern(len: usize, start: usize) -> Vec<u8> {
    (0..len).map(|i| ((i + start) % 251) as u8).collect()
}

/// Scenario 3: an LFN run of two fragments preceding a short entry. The
/// assembled name wins; the 8.3 alias is never exposed.
#[test]
fn lfn_name_replaces_short_alias() {
    let mut image = fat16_base(64, 1, 16);
    let fat_offset = 512usize;
    let root_offset = fat_offset + 512;
    let root_len = 16 * 32;
    let data_offset = root_offset + root_len;
    image.resize(data_offset + 512, 0);

    // cluster 2 is the file's sole cluster, terminated.
    let pos = fat_offset + 2 * 2;
    image[pos..pos + 2].copy_from_slice(&0xFFFFu16.to_le_bytes());

    let filename_raw = *b"LONGFI~1";
    let extension_raw = *b"TXT";
    let checksum = lfn_checksum(&filename_raw, &extension_raw);

    // "longfilename.txt" split as head (13 chars) + tail (3 chars); the
    // tail fragment carries the LAST_LONG_ENTRY bit and is written first.
    let tail = lfn_slot(0x42, "txt", checksum);
    let head = lfn_slot(0x01, "longfilename.", checksum);
    let short = short_slot("LONGFI~1.TXT", Attributes::ARCHIVE.bits(), 2, 5);

    image[root_offset..root_offset + 32].copy_from_slice(&tail);
    image[root_offset + 32..root_offset + 64].copy_from_slice(&head);
    image[root_offset + 64..root_offset + 96].copy_from_slice(&short);

    image[data_offset..data_offset + 5].copy_from_slice(b"HELLO");

    let fs = FileSystem::open(Image::whole(image)).unwrap();
    let entries = fs.read_directory(fs.root()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "longfilename.txt");
    assert_eq!(fs.read_file(&entries[0]).unwrap(), b"HELLO");
}

/// Scenario 4: a deleted entry between two live entries, with an LFN run
/// preceding the deleted slot. Both live entries are emitted in order; the
/// deleted slot is skipped and its preceding LFN run is discarded rather
/// than bleeding into the next live entry's name.
#[test]
fn deleted_entry_is_skipped_and_its_lfn_run_discarded() {
    let mut image = fat16_base(64, 1, 16);
    let fat_offset = 512usize;
    let root_offset = fat_offset + 512;
    let root_len = 16 * 32;
    let data_offset = root_offset + root_len;
    image.resize(data_offset + 2 * 512, 0);

    put_fat16_entry(&mut image, fat_offset, 2, 0xFFFF);
    put_fat16_entry(&mut image, fat_offset, 3, 0xFFFF);

    let filename_raw = *b"TEMP~1  ";
    let extension_raw = *b"TXT";
    let checksum = lfn_checksum(&filename_raw, &extension_raw);
    let lfn = lfn_slot(0x41, "temp.txt", checksum);
    let mut deleted = short_slot("TEMP~1.TXT", Attributes::ARCHIVE.bits(), 2, 1);
    deleted[0] = 0xE5;
    let first = short_slot("FIRST.TXT", Attributes::ARCHIVE.bits(), 2, 1);
    let second = short_slot("SECOND.TXT", Attributes::ARCHIVE.bits(), 3, 1);

    image[root_offset..root_offset + 32].copy_from_slice(&lfn);
    image[root_offset + 32..root_offset + 64].copy_from_slice(&deleted);
    image[root_offset + 64..root_offset + 96].copy_from_slice(&first);
    image[root_offset + 96..root_offset + 128].copy_from_slice(&second);

    let fs = FileSystem::open(Image::whole(image)).unwrap();
    let entries = fs.read_directory(fs.root()).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["FIRST.TXT", "SECOND.TXT"]);
}

/// Scenario 5: a FAT cycle (cluster 2 -> 3 -> 2) is detected within a
/// bounded number of steps rather than looping forever.
#[test]
fn chain_cycle_is_reported_as_corrupt() {
    // total_sectors = reserved(1) + fat(1) + root(1) + data(4) = 7
    let mut image = fat16_base(7, 1, 16);
    let fat_offset = 512usize;
    let root_offset = fat_offset + 512;
    let root_len = 16 * 32;
    let data_offset = root_offset + root_len;
    image.resize(data_offset + 2 * 512, 0);

    put_fat16_entry(&mut image, fat_offset, 2, 3);
    put_fat16_entry(&mut image, fat_offset, 3, 2);

    let file_entry = short_slot("BIG.BIN", Attributes::ARCHIVE.bits(), 2, 5120);
    image[root_offset..root_offset + 32].copy_from_slice(&file_entry);

    let fs = FileSystem::open(Image::whole(image)).unwrap();
    let entries = fs.read_directory(fs.root()).unwrap();
    let err = fs.read_file(&entries[0]).unwrap_err();
    assert!(matches!(err, Error::CorruptChain(_)));
}

/// Scenario 6: an end-of-directory terminator partway through a cluster
/// hides every slot after it, even ones whose raw bytes would otherwise
/// decode as a live entry.
#[test]
fn end_of_directory_terminator_hides_trailing_slots() {
    let mut image = fat16_base(64, 1, 16);
    let fat_offset = 512usize;
    let root_offset = fat_offset + 512;
    let root_len = 16 * 32;
    let data_offset = root_offset + root_len;
    image.resize(data_offset + 512, 0);

    put_fat16_entry(&mut image, fat_offset, 2, 0xFFFF);

    let first = short_slot("FIRST.TXT", Attributes::ARCHIVE.bits(), 2, 1);
    let trailing = short_slot("SHOULD.NOT", Attributes::ARCHIVE.bits(), 2, 1);
    image[root_offset..root_offset + 32].copy_from_slice(&first);
    // slot 1 stays zeroed: end-of-directory.
    image[root_offset + 64..root_offset + 96].copy_from_slice(&trailing);

    let fs = FileSystem::open(Image::whole(image)).unwrap();
    let entries = fs.read_directory(fs.root()).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["FIRST.TXT"]);
}
