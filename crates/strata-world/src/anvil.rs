use crate::coordinates::{chunk_coords_in_region, coords_in_chunk, region_coords};
use crate::error::DecodeError;
use crate::layer::{plane_shape, Layer};
use crate::palette::{MaterialPalette, VOID_ID};

use fastanvil::{Chunk, CurrentJavaChunk, Region};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;
use strata_core::geometry::BoundingBox;
use strata_core::glam::{IVec2, IVec3};
use strata_core::units::{ChunkUnits, RegionUnits, VoxelUnits};
use strata_core::{SmallKeyHashMap, SmallKeyHashSet};

/// The canonical default material: what a cell holds when no storage backs it.
pub const VOID_MATERIAL: &str = "meta:void";

/// Tunables for the base-snapshot decode.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Planes at or below this occupancy density encode sparse. A size/speed tradeoff, nothing
    /// more.
    pub sparse_density_threshold: f64,
    /// Materials folded into [`VOID_MATERIAL`] before density counting and palette
    /// registration. Without the fold, near-duplicate "air" variants would read as occupancy.
    pub void_aliases: Vec<String>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            sparse_density_threshold: 0.5,
            void_aliases: vec![
                "minecraft:air".to_owned(),
                "minecraft:cave_air".to_owned(),
                "minecraft:void_air".to_owned(),
            ],
        }
    }
}

/// Decodes paged region storage into per-voxel palette codes for one bounding box.
///
/// Region files and parsed chunks are memoized per decoder instance, so a chunk is decoded at
/// most once per pass. A decoder is meant to live for one reconstruction request; concurrent
/// requests get their own instances and therefore need no cache synchronization.
pub struct AnvilDecoder {
    source_path: PathBuf,
    sparse_density_threshold: f64,
    void_aliases: SmallKeyHashSet<String>,
    regions: SmallKeyHashMap<RegionUnits<IVec2>, Option<Region<File>>>,
    chunks: SmallKeyHashMap<(RegionUnits<IVec2>, ChunkUnits<IVec2>), Option<CurrentJavaChunk>>,
}

impl AnvilDecoder {
    pub fn new(source_path: impl Into<PathBuf>, config: &DecodeConfig) -> Self {
        Self {
            source_path: source_path.into(),
            sparse_density_threshold: config.sparse_density_threshold,
            void_aliases: config.void_aliases.iter().cloned().collect(),
            regions: SmallKeyHashMap::default(),
            chunks: SmallKeyHashMap::default(),
        }
    }

    /// Reads every voxel of `bounds` and returns one encoded [`Layer`] per y-plane plus the
    /// palette the layers index into.
    ///
    /// The scan is y-major, then z, then x, and the palette registers materials in
    /// first-encountered order, so identical inputs always produce identical palettes. Cells
    /// without backing storage (missing region file, absent chunk, y outside the stored column)
    /// decode as void.
    pub fn decode(
        &mut self,
        bounds: &BoundingBox,
    ) -> Result<(Vec<Layer>, MaterialPalette), DecodeError> {
        let shape = plane_shape(bounds);
        let mut palette = MaterialPalette::new(VOID_MATERIAL);
        let mut layers = Vec::with_capacity(bounds.y_extent() as usize);
        for y in bounds.y_range() {
            let mut codes = Vec::with_capacity(bounds.plane_area());
            let mut occupied = 0usize;
            for z in bounds.z_range() {
                for x in bounds.x_range() {
                    let p = VoxelUnits(IVec3::new(x, y, z));
                    let code = match self.material_at(p)? {
                        Some(material) => palette.get_or_insert(material),
                        None => VOID_ID,
                    };
                    if code != VOID_ID {
                        occupied += 1;
                    }
                    codes.push(code);
                }
            }
            let layer = Layer::from_scan(codes, &shape, self.sparse_density_threshold);
            log::debug!(
                "decoded plane y = {}: {}/{} cells occupied, {}",
                y,
                occupied,
                bounds.plane_area(),
                if layer.is_sparse() { "sparse" } else { "dense" }
            );
            layers.push(layer);
        }
        Ok((layers, palette))
    }

    /// The folded material at `p`, or `None` for void (including every unbacked-storage case).
    fn material_at(&mut self, p: VoxelUnits<IVec3>) -> Result<Option<&str>, DecodeError> {
        self.ensure_chunk(p)?;

        let key = (region_coords(p), chunk_coords_in_region(p));
        let Self {
            chunks,
            void_aliases,
            ..
        } = self;
        let Some(chunk) = chunks.get(&key).and_then(|c| c.as_ref()) else {
            return Ok(None);
        };
        let VoxelUnits(local) = coords_in_chunk(p);
        let Some(block) = chunk.block(local.x as usize, local.y as isize, local.z as usize)
        else {
            return Ok(None);
        };
        let name = block.name();
        if name == VOID_MATERIAL || void_aliases.contains(name) {
            Ok(None)
        } else {
            Ok(Some(name))
        }
    }

    fn ensure_chunk(&mut self, p: VoxelUnits<IVec3>) -> Result<(), DecodeError> {
        let key = (region_coords(p), chunk_coords_in_region(p));
        if self.chunks.contains_key(&key) {
            return Ok(());
        }
        let parsed = self.parse_chunk(key.0, key.1)?;
        self.chunks.insert(key, parsed);
        Ok(())
    }

    fn parse_chunk(
        &mut self,
        region_coords: RegionUnits<IVec2>,
        chunk_coords: ChunkUnits<IVec2>,
    ) -> Result<Option<CurrentJavaChunk>, DecodeError> {
        let Some(region) = self.region_at(region_coords)? else {
            return Ok(None);
        };
        let ChunkUnits(c) = chunk_coords;
        let Some(bytes) = region.read_chunk(c.x as usize, c.y as usize)? else {
            return Ok(None);
        };
        Ok(Some(fastnbt::from_bytes(&bytes)?))
    }

    /// Cached region, opened from file on first miss. A missing file is cached as `None` so the
    /// filesystem is asked about it only once per pass.
    fn region_at(
        &mut self,
        coords: RegionUnits<IVec2>,
    ) -> Result<Option<&mut Region<File>>, DecodeError> {
        if !self.regions.contains_key(&coords) {
            let opened = self.open_region(coords)?;
            self.regions.insert(coords, opened);
        }
        Ok(self.regions.get_mut(&coords).and_then(|r| r.as_mut()))
    }

    fn open_region(&self, coords: RegionUnits<IVec2>) -> Result<Option<Region<File>>, DecodeError> {
        let RegionUnits(c) = coords;
        let path = self.source_path.join(format!("r.{}.{}.mca", c.x, c.y));
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                log::debug!("no region file at {:?}, reading as void", path);
                return Ok(None);
            }
            Err(source) => return Err(DecodeError::Io { path, source }),
        };
        Ok(Some(Region::from_stream(file)?))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
