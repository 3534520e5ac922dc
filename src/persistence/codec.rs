//! Binary encode/decode for the MVEC (brute-force) and MHNS (proximity
//! graph) variants.
//!
//! Layout (both variants share the header through `model_id`):
//!
//! ```text
//! magic(4) format_version(u16) dimensions(i32) chunk_count(i32) model_hash(i64)
//! model_id(len-prefixed utf8) chunks_json_len(i32) chunks_json
//! MVEC: vectors (chunk_count * dimensions * f32)
//! MHNS: graph_blob_len(i32) graph_blob
//! ```
//!
//! All integers are big-endian; strings are length-prefixed UTF-8 with a
//! `u16` length.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{CodevecError, Result};
#[cfg(feature = "hnsw")]
use crate::index::hnsw::graph::{HnswGraph, Layer};
#[cfg(feature = "hnsw")]
use crate::index::hnsw::HnswIndex;
use crate::index::brute_force::BruteForceIndex;
use crate::index::Index;
use crate::model::{Chunk, IndexConfig};
#[cfg(feature = "hnsw")]
use smallvec::SmallVec;

use super::format::{
    model_hash, ChunkJson, FORMAT_VERSION, MAGIC_MHNS, MAGIC_MVEC, MAX_SUPPORTED_FORMAT_VERSION,
};

fn write_string(w: &mut impl Write, s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    w.write_u16::<BigEndian>(bytes.len() as u16)?;
    w.write_all(bytes)?;
    Ok(())
}

fn read_string(r: &mut impl Read) -> Result<String> {
    let len = r.read_u16::<BigEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| CodevecError::Json(serde_json::Error::io(
        std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    )))
}

fn write_header(w: &mut impl Write, magic: [u8; 4], config: &IndexConfig, chunks: &[Chunk]) -> Result<()> {
    w.write_all(&magic)?;
    w.write_u16::<BigEndian>(FORMAT_VERSION)?;
    w.write_i32::<BigEndian>(config.dimensions as i32)?;
    w.write_i32::<BigEndian>(chunks.len() as i32)?;
    w.write_i64::<BigEndian>(model_hash(&config.model_id))?;
    write_string(w, &config.model_id)?;

    let wire: Vec<ChunkJson> = chunks.iter().map(ChunkJson::from).collect();
    let json_bytes = serde_json::to_vec(&wire)?;
    w.write_i32::<BigEndian>(json_bytes.len() as i32)?;
    w.write_all(&json_bytes)?;
    Ok(())
}

struct Header {
    dimensions: usize,
    chunk_count: usize,
    model_id: String,
    chunks: Vec<Chunk>,
}

fn read_header(r: &mut impl Read) -> Result<Header> {
    let format_version = r.read_u16::<BigEndian>()?;
    if format_version > MAX_SUPPORTED_FORMAT_VERSION {
        log::warn!(
            "refusing to load format_version {} (this build supports up to {})",
            format_version,
            MAX_SUPPORTED_FORMAT_VERSION,
        );
        return Err(CodevecError::UnsupportedFormatVersion {
            found: format_version,
            supported: MAX_SUPPORTED_FORMAT_VERSION,
        });
    }
    let dimensions = r.read_i32::<BigEndian>()? as usize;
    let chunk_count = r.read_i32::<BigEndian>()? as usize;
    let _model_hash = r.read_i64::<BigEndian>()?;
    let model_id = read_string(r)?;
    let json_len = r.read_i32::<BigEndian>()? as usize;
    let mut json_bytes = vec![0u8; json_len];
    r.read_exact(&mut json_bytes)?;
    let wire: Vec<ChunkJson> = serde_json::from_slice(&json_bytes)?;
    let chunks: Vec<Chunk> = wire.into_iter().map(Chunk::from).collect();
    Ok(Header {
        dimensions,
        chunk_count,
        model_id,
        chunks,
    })
}

/// Writes a brute-force index in MVEC format.
pub fn save_brute_force(index: &BruteForceIndex, w: &mut impl Write) -> Result<()> {
    let entries = index.entries();
    let chunks: Vec<Chunk> = entries.iter().map(|e| e.chunk.clone()).collect();
    let config = IndexConfig::new(index.model_id(), index.dimensions());
    write_header(w, MAGIC_MVEC, &config, &chunks)?;
    for entry in &entries {
        for &f in &entry.vector {
            w.write_f32::<BigEndian>(f)?;
        }
    }
    Ok(())
}

fn load_brute_force(r: &mut impl Read, header: Header) -> Result<BruteForceIndex> {
    let mut index = BruteForceIndex::new(IndexConfig::new(header.model_id, header.dimensions));
    for chunk in header.chunks {
        let mut vector = vec![0f32; header.dimensions];
        for f in &mut vector {
            *f = r.read_f32::<BigEndian>()?;
        }
        index.add(chunk, vector)?;
    }
    let _ = header.chunk_count;
    Ok(index)
}

/// Writes a proximity-graph index in MHNS format.
#[cfg(feature = "hnsw")]
pub fn save_graph(index: &HnswIndex, w: &mut impl Write) -> Result<()> {
    let entries = index.entries();
    let chunks: Vec<Chunk> = entries.iter().map(|e| e.chunk.clone()).collect();
    let config = IndexConfig::new(index.model_id(), index.dimensions());
    write_header(w, MAGIC_MHNS, &config, &chunks)?;

    let graph = index.graph();
    let blob = encode_graph_blob(graph, &chunks)?;
    w.write_i32::<BigEndian>(blob.len() as i32)?;
    w.write_all(&blob)?;
    Ok(())
}

/// Internal graph-blob layout: `num_nodes(u32)` followed by the node
/// vectors in SoA order (`num_nodes * dimension` `f32`s), then
/// `num_layers(u32)` and per layer `num_nodes(u32)` followed by each
/// node's neighbor list (`count(u16)` + `count` `u32`s), then
/// `layer_assignments` (`num_nodes` bytes), `entry_point(i64, -1 if
/// none)`, and an id table of length-prefixed chunk ids in position
/// order (redundant with the outer chunk JSON, kept for self-contained
/// graph images).
#[cfg(feature = "hnsw")]
fn encode_graph_blob(graph: &HnswGraph, chunks: &[Chunk]) -> Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    let dimension = graph.dimension();
    buf.write_u32::<BigEndian>(graph.num_nodes() as u32)?;
    for &f in graph.vectors_raw() {
        buf.write_f32::<BigEndian>(f)?;
    }
    let _ = dimension;

    let layers = graph.layers();
    buf.write_u32::<BigEndian>(layers.len() as u32)?;
    for layer in layers {
        let all = layer.all_neighbors();
        buf.write_u32::<BigEndian>(all.len() as u32)?;
        for neighbors in all {
            buf.write_u16::<BigEndian>(neighbors.len() as u16)?;
            for &n in neighbors.iter() {
                buf.write_u32::<BigEndian>(n)?;
            }
        }
    }
    let assignments = graph.layer_assignments();
    buf.write_u32::<BigEndian>(assignments.len() as u32)?;
    buf.write_all(assignments)?;
    match graph.entry_point() {
        Some(e) => buf.write_i64::<BigEndian>(e as i64)?,
        None => buf.write_i64::<BigEndian>(-1)?,
    }
    buf.write_u32::<BigEndian>(chunks.len() as u32)?;
    for c in chunks {
        write_string(&mut buf, &c.id)?;
    }
    Ok(buf)
}

#[cfg(feature = "hnsw")]
fn decode_graph_blob(blob: &[u8], dimension: usize, params: crate::model::HnswParams) -> Result<HnswGraph> {
    let mut r = std::io::Cursor::new(blob);
    let num_nodes = r.read_u32::<BigEndian>()? as usize;
    let mut vectors = vec![0f32; num_nodes * dimension];
    for f in &mut vectors {
        *f = r.read_f32::<BigEndian>()?;
    }
    let num_layers = r.read_u32::<BigEndian>()? as usize;
    let mut layers = Vec::with_capacity(num_layers);
    for _ in 0..num_layers {
        let num_nodes = r.read_u32::<BigEndian>()? as usize;
        let mut neighbors: Vec<SmallVec<[u32; 16]>> = Vec::with_capacity(num_nodes);
        for _ in 0..num_nodes {
            let count = r.read_u16::<BigEndian>()? as usize;
            let mut list: SmallVec<[u32; 16]> = SmallVec::with_capacity(count);
            for _ in 0..count {
                list.push(r.read_u32::<BigEndian>()?);
            }
            neighbors.push(list);
        }
        layers.push(Layer::from_raw(neighbors));
    }
    let num_assignments = r.read_u32::<BigEndian>()? as usize;
    let mut layer_assignments = vec![0u8; num_assignments];
    r.read_exact(&mut layer_assignments)?;
    let entry_raw = r.read_i64::<BigEndian>()?;
    let entry_point = if entry_raw < 0 { None } else { Some(entry_raw as u32) };

    // Remaining bytes are the id table; positions are implied by order and
    // are reconstructed by the caller alongside chunk json, so we only need
    // to consume them here for length validation.
    let id_count = r.read_u32::<BigEndian>()? as usize;
    for _ in 0..id_count {
        read_string(&mut r)?;
    }

    Ok(HnswGraph::from_parts(
        vectors,
        dimension,
        num_assignments,
        layers,
        layer_assignments,
        params,
        entry_point,
    ))
}

#[cfg(feature = "hnsw")]
fn load_graph(r: &mut impl Read, header: Header) -> Result<HnswIndex> {
    let blob_len = r.read_i32::<BigEndian>()? as usize;
    let mut blob = vec![0u8; blob_len];
    r.read_exact(&mut blob)?;
    let _ = header.chunk_count;

    let config = IndexConfig::new(header.model_id, header.dimensions);
    let graph = decode_graph_blob(&blob, header.dimensions, config.hnsw)?;
    Ok(HnswIndex::from_parts(config, header.chunks, graph))
}

/// Peeks the first 4 bytes of `r` to detect the format, then decodes.
pub fn load(r: &mut impl Read) -> Result<Box<dyn Index>> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic == MAGIC_MVEC {
        let header = read_header(r)?;
        Ok(Box::new(load_brute_force(r, header)?))
    } else if magic == MAGIC_MHNS {
        #[cfg(feature = "hnsw")]
        {
            let header = read_header(r)?;
            Ok(Box::new(load_graph(r, header)?))
        }
        #[cfg(not(feature = "hnsw"))]
        {
            Err(CodevecError::InvalidMagic { found: magic })
        }
    } else {
        log::warn!("refusing to load stream with unrecognized magic {:?}", magic);
        Err(CodevecError::InvalidMagic { found: magic })
    }
}
