use crate::{DocId, Field, InvertedIndex, Posting};
use anyhow::{bail, Context, Result};
use blake2::digest::consts::U5;
use blake2::{Blake2b, Digest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

type Blake2b40 = Blake2b<U5>;

/// Bucket holding `term`'s postings: the 40-bit blake2b digest, big-endian, modulo `num_buckets`.
pub fn bucket_id(term: &str, num_buckets: u32) -> u32 {
    let digest = Blake2b40::digest(term.as_bytes());
    let value = digest.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    (value % u64::from(num_buckets.max(1))) as u32
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldMeta {
    pub field: Field,
    pub num_terms: u32,
    pub num_buckets: u32,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn df(&self) -> PathBuf { self.root.join("df.bin") }
    fn locs(&self) -> PathBuf { self.root.join("posting_locs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
    pub fn bucket(&self, bucket: u32) -> PathBuf { self.postings_dir().join(format!("{bucket:03}.postings.bin")) }
}

fn save_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn load_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let value = bincode::deserialize(&buf).with_context(|| format!("decoding {}", path.display()))?;
    Ok(value)
}

pub fn save_df(paths: &IndexPaths, df: &HashMap<String, u32>) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_bincode(&paths.df(), df)
}

pub fn load_df(paths: &IndexPaths) -> Result<HashMap<String, u32>> {
    load_bincode(&paths.df())
}

/// Where one term's encoded posting list sits inside its bucket file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLoc {
    pub bucket: u32,
    pub offset: u64,
    pub len: u64,
}

pub fn save_posting_locs(paths: &IndexPaths, locs: &HashMap<String, PostingLoc>) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_bincode(&paths.locs(), locs)
}

pub fn load_posting_locs(paths: &IndexPaths) -> Result<HashMap<String, PostingLoc>> {
    load_bincode(&paths.locs())
}

/// Decode a single posting list, reading only its bytes from the bucket file.
pub fn read_posting_slice(paths: &IndexPaths, loc: &PostingLoc) -> Result<Vec<Posting>> {
    let path = paths.bucket(loc.bucket);
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let file_len = f.metadata()?.len();
    match loc.offset.checked_add(loc.len) {
        Some(end) if end <= file_len => {}
        _ => bail!("posting range {}+{} outside {} ({file_len} bytes)", loc.offset, loc.len, path.display()),
    }
    f.seek(SeekFrom::Start(loc.offset))?;
    let len = usize::try_from(loc.len)?;
    let mut buf = vec![0u8; len];
    f.read_exact(&mut buf)
        .with_context(|| format!("reading {len} bytes at {} in {}", loc.offset, path.display()))?;
    let postings = bincode::deserialize(&buf).with_context(|| format!("decoding postings in {}", path.display()))?;
    Ok(postings)
}

pub fn save_field_meta(paths: &IndexPaths, meta: &FieldMeta) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_field_meta(paths: &IndexPaths) -> Result<FieldMeta> {
    let path = paths.meta();
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: FieldMeta = serde_json::from_str(&buf)?;
    if meta.version != FORMAT_VERSION {
        bail!("unsupported index version {} in {}", meta.version, path.display());
    }
    Ok(meta)
}

/// Write an in-memory field index in the bucketed on-disk layout read by `DiskIndex`.
///
/// Each bucket file is the concatenation of its terms' bincode-encoded posting lists;
/// `posting_locs.bin` records the byte range of every term.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, num_buckets: u32) -> Result<()> {
    let mut buckets: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for term in index.postings.keys() {
        buckets.entry(bucket_id(term, num_buckets)).or_default().push(term.as_str());
    }
    create_dir_all(paths.postings_dir())?;
    let mut locs: HashMap<String, PostingLoc> = HashMap::with_capacity(index.postings.len());
    for (bucket, mut terms) in buckets {
        terms.sort_unstable();
        let path = paths.bucket(bucket);
        let mut f = BufWriter::new(File::create(&path).with_context(|| format!("creating {}", path.display()))?);
        let mut offset = 0u64;
        for term in terms {
            let bytes = bincode::serialize(&index.postings[term])?;
            f.write_all(&bytes)?;
            let len = bytes.len() as u64;
            locs.insert(term.to_string(), PostingLoc { bucket, offset, len });
            offset += len;
        }
        f.flush()?;
    }
    save_posting_locs(paths, &locs)?;
    save_df(paths, &index.df)?;
    let meta = FieldMeta { field: index.field, num_terms: index.num_terms() as u32, num_buckets, version: FORMAT_VERSION };
    save_field_meta(paths, &meta)
}

pub struct StatsPaths {
    pub root: PathBuf,
}

impl StatsPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn doc_length(&self) -> PathBuf { self.root.join("doc_length.bin") }
    pub fn page_views(&self) -> PathBuf { self.root.join("page_views.bin") }
    pub fn page_rank(&self) -> PathBuf { self.root.join("page_rank.bin") }
    pub fn titles(&self) -> PathBuf { self.root.join("titles.bin") }
}

pub fn save_table<V: Serialize>(path: &Path, table: &HashMap<DocId, V>) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    save_bincode(path, table)
}

pub fn load_table<V: DeserializeOwned>(path: &Path) -> Result<HashMap<DocId, V>> {
    load_bincode(path)
}

/// Write vectors in the word2vec binary format.
pub fn save_word_vectors(path: &Path, entries: &[(String, Vec<f32>)]) -> Result<()> {
    let dim = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    f.write_all(format!("{} {}\n", entries.len(), dim).as_bytes())?;
    for (word, vector) in entries {
        if vector.len() != dim {
            bail!("vector for {word:?} has {} dims, expected {dim}", vector.len());
        }
        f.write_all(word.as_bytes())?;
        f.write_all(b" ")?;
        for x in vector {
            f.write_all(&x.to_le_bytes())?;
        }
        f.write_all(b"\n")?;
    }
    Ok(())
}

/// Read a word2vec binary file: `"<count> <dim>\n"`, then `word ` + `dim` little-endian f32 per entry.
pub fn load_word_vectors(path: &Path) -> Result<Vec<(String, Vec<f32>)>> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;

    let header_end = buf.iter().position(|&b| b == b'\n').context("missing word2vec header")?;
    let header = std::str::from_utf8(&buf[..header_end])?;
    let mut parts = header.split_whitespace();
    let count: usize = parts.next().context("missing vocabulary size")?.parse()?;
    let dim: usize = parts.next().context("missing vector size")?.parse()?;

    let vector_bytes = dim
        .checked_mul(4)
        .with_context(|| format!("vector size {dim} too large in {}", path.display()))?;

    let mut pos = header_end + 1;
    // Every entry takes at least one word byte, a space and its vector.
    let mut entries = Vec::with_capacity(count.min(buf.len() / vector_bytes.saturating_add(2)));
    for _ in 0..count {
        while buf.get(pos) == Some(&b'\n') {
            pos += 1;
        }
        let word_len = buf
            .get(pos..)
            .unwrap_or_default()
            .iter()
            .position(|&b| b == b' ')
            .with_context(|| format!("truncated entry {} in {}", entries.len(), path.display()))?;
        let word = String::from_utf8(buf[pos..pos + word_len].to_vec())?;
        pos += word_len + 1;
        let bytes = pos
            .checked_add(vector_bytes)
            .and_then(|end| buf.get(pos..end))
            .with_context(|| format!("truncated vector for {word:?} in {}", path.display()))?;
        let vector = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        pos += vector_bytes;
        entries.push((word, vector));
    }
    Ok(entries)
}
