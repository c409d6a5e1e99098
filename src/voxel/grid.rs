//! Dense voxel grid with incremental face visibility

use std::fmt;
use std::time::Instant;

use glam::IVec3;
use rayon::prelude::*;

use crate::core::{Error, Result};
use super::face::{FaceDirection, FaceSet};
use super::policy::VisibilityPolicy;
use super::slope;
use super::voxel::{Voxel, VoxelType};

/// Grid dimensions in voxels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }

    pub const fn cubic(side: u32) -> Self {
        Self::new(side, side, side)
    }

    /// Total number of voxels, or None on overflow
    pub fn checked_volume(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.depth as usize)
    }

    pub fn volume(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Voxels in one z slab
    pub fn slab_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, p: IVec3) -> bool {
        p.x >= 0 && p.y >= 0 && p.z >= 0
            && (p.x as u32) < self.width
            && (p.y as u32) < self.height
            && (p.z as u32) < self.depth
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.width as i32, self.height as i32, self.depth as i32)
    }

    /// Linear index in z, y, x order (x fastest). `p` must be inside.
    #[inline]
    pub fn index(&self, p: IVec3) -> usize {
        debug_assert!(self.contains(p), "voxel {p} outside grid {self}");
        (p.z as usize * self.height as usize + p.y as usize) * self.width as usize + p.x as usize
    }

    /// Inverse of [`GridSize::index`]
    pub fn coord(&self, index: usize) -> IVec3 {
        let w = self.width as usize;
        let h = self.height as usize;
        IVec3::new((index % w) as i32, ((index / w) % h) as i32, (index / (w * h)) as i32)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// Receives one notification per voxel whose stored state changed
pub trait VoxelObserver {
    fn voxel_changed(&mut self, p: IVec3);
}

impl<F: FnMut(IVec3)> VoxelObserver for F {
    fn voxel_changed(&mut self, p: IVec3) {
        self(p)
    }
}

/// Coordinates touched by a single `set_voxel`: the voxel itself and up to
/// six recomputed neighbors
#[derive(Clone, Copy, Debug, Default)]
pub struct ChangedVoxels {
    coords: [IVec3; 7],
    len: usize,
}

impl ChangedVoxels {
    fn push(&mut self, p: IVec3) {
        self.coords[self.len] = p;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[IVec3] {
        &self.coords[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn contains(&self, p: IVec3) -> bool {
        self.as_slice().contains(&p)
    }
}

const fn neighborhood_26() -> [IVec3; 26] {
    let mut out = [IVec3::ZERO; 26];
    let mut i = 0;
    let mut z = -1;
    while z <= 1 {
        let mut y = -1;
        while y <= 1 {
            let mut x = -1;
            while x <= 1 {
                if x != 0 || y != 0 || z != 0 {
                    out[i] = IVec3::new(x, y, z);
                    i += 1;
                }
                x += 1;
            }
            y += 1;
        }
        z += 1;
    }
    out
}

/// Full axis + diagonal neighborhood used by the hidden-voxel pass
const NEIGHBORHOOD_26: [IVec3; 26] = neighborhood_26();

/// Dense `depth x height x width` array of voxels.
///
/// Created once per world; never resized. Writes through [`VoxelGrid::set_voxel`]
/// keep `visible_faces` up to date for the written voxel and its neighbors.
/// Bulk writes through [`VoxelGrid::set_raw`] do not, and must be followed by
/// [`VoxelGrid::compute_all_visible_faces`].
#[derive(Clone)]
pub struct VoxelGrid {
    size: GridSize,
    voxels: Vec<Voxel>,
    policy: VisibilityPolicy,
}

impl VoxelGrid {
    /// Create a grid filled with `Undefined`
    pub fn new(size: GridSize) -> Result<Self> {
        Self::filled(size, Voxel::UNDEFINED)
    }

    /// Create a grid with every voxel set to `init`
    pub fn filled(size: GridSize, init: Voxel) -> Result<Self> {
        let len = Self::validate(size)?;
        Ok(Self {
            size,
            voxels: vec![init; len],
            policy: VisibilityPolicy::default(),
        })
    }

    /// Wrap existing voxel records (z, y, x order)
    pub fn from_voxels(size: GridSize, voxels: Vec<Voxel>) -> Result<Self> {
        let len = Self::validate(size)?;
        if voxels.len() != len {
            return Err(Error::Truncated { expected: len, found: voxels.len() });
        }
        Ok(Self {
            size,
            voxels,
            policy: VisibilityPolicy::default(),
        })
    }

    fn validate(size: GridSize) -> Result<usize> {
        match size.checked_volume() {
            Some(len) if len > 0 && size.as_ivec3().min_element() > 0
                && size.width <= i32::MAX as u32
                && size.height <= i32::MAX as u32
                && size.depth <= i32::MAX as u32 => Ok(len),
            _ => Err(Error::InvalidDimensions(size)),
        }
    }

    /// Replace the visibility policy.
    ///
    /// Stored face masks are not recomputed; call
    /// [`VoxelGrid::compute_all_visible_faces`] afterwards.
    pub fn with_policy(mut self, policy: VisibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: VisibilityPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> &VisibilityPolicy {
        &self.policy
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn contains(&self, p: IVec3) -> bool {
        self.size.contains(p)
    }

    /// Voxel at `p`, or None outside the grid
    #[inline]
    pub fn get(&self, p: IVec3) -> Option<Voxel> {
        if self.contains(p) {
            Some(self.voxels[self.size.index(p)])
        } else {
            None
        }
    }

    /// Voxel at `p`. Callers bounds-check with [`VoxelGrid::contains`] first.
    ///
    /// # Panics
    /// Panics if `p` is outside the grid.
    #[inline]
    pub fn voxel_at(&self, p: IVec3) -> Voxel {
        self.voxels[self.size.index(p)]
    }

    /// All voxel records in z, y, x order
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Write without recomputing visibility or notifying anyone.
    /// Intended for bulk generation; returns false outside the grid.
    pub fn set_raw(&mut self, p: IVec3, voxel: Voxel) -> bool {
        if !self.contains(p) {
            return false;
        }
        let index = self.size.index(p);
        self.voxels[index] = voxel;
        true
    }

    /// Visible faces of the voxel at `p` under the grid's policy.
    ///
    /// A face is visible when the neighbor it looks at does not hide it.
    /// Neighbors outside the grid follow `boundary_faces_visible`.
    /// Empty voxels are never rendered and always report no faces.
    pub fn compute_visible_faces(&self, p: IVec3) -> FaceSet {
        let Some(voxel) = self.get(p) else {
            return FaceSet::NONE;
        };
        if voxel.is_empty() {
            return FaceSet::NONE;
        }

        let mut faces = FaceSet::NONE;
        for face in FaceDirection::ALL {
            let visible = match self.get(p + face.offset()) {
                Some(neighbor) => !self.policy.hides_face(neighbor, face),
                None => self.policy.boundary_faces_visible,
            };
            if visible {
                faces.insert(face);
            }
        }
        faces
    }

    /// Whether the cell at `p` darkens adjacent face corners
    #[inline]
    pub fn is_occluder(&self, p: IVec3) -> bool {
        match self.get(p) {
            Some(voxel) => self.policy.is_opaque(voxel),
            None => self.policy.boundary_occludes,
        }
    }

    /// Write `voxel` and refresh visibility around it.
    ///
    /// See [`VoxelGrid::set_voxel_with`].
    pub fn set_voxel(&mut self, p: IVec3, voxel: Voxel) -> ChangedVoxels {
        self.set_voxel_with(p, voxel, &mut |_: IVec3| {})
    }

    /// Write `voxel`, recompute its visible faces and those of its six
    /// non-Empty neighbors, and notify `observer` once per updated coordinate.
    ///
    /// The incoming `visible_faces` field is ignored. Writes outside the grid
    /// are dropped and report no changes.
    pub fn set_voxel_with<O>(&mut self, p: IVec3, voxel: Voxel, observer: &mut O) -> ChangedVoxels
    where
        O: VoxelObserver + ?Sized,
    {
        let mut changed = ChangedVoxels::default();
        if !self.contains(p) {
            return changed;
        }

        let index = self.size.index(p);
        self.voxels[index] = voxel;
        let faces = self.compute_visible_faces(p);
        self.voxels[index].set_visible_faces(faces);
        changed.push(p);

        for face in FaceDirection::ALL {
            let n = p + face.offset();
            match self.get(n) {
                Some(neighbor) if !neighbor.is_empty() => {
                    let faces = self.compute_visible_faces(n);
                    let n_index = self.size.index(n);
                    self.voxels[n_index].set_visible_faces(faces);
                    changed.push(n);
                }
                _ => {}
            }
        }

        for p in changed.iter() {
            observer.voxel_changed(p);
        }
        changed
    }

    /// Recompute `visible_faces` for every voxel, in parallel over z slabs
    pub fn compute_all_visible_faces(&mut self) {
        let start = Instant::now();
        let size = self.size;
        let mut faces = vec![FaceSet::NONE; self.voxels.len()];

        faces
            .par_chunks_mut(size.slab_len())
            .enumerate()
            .for_each(|(z, slab)| {
                for y in 0..size.height as i32 {
                    for x in 0..size.width as i32 {
                        let i = y as usize * size.width as usize + x as usize;
                        slab[i] = self.compute_visible_faces(IVec3::new(x, y, z as i32));
                    }
                }
            });

        self.voxels
            .par_iter_mut()
            .zip(faces.par_iter())
            .for_each(|(voxel, faces)| voxel.set_visible_faces(*faces));

        log::info!("Computed visible faces for {} grid in {:.1}ms ({} faces)",
            size, start.elapsed().as_secs_f64() * 1000.0, self.visible_face_count());
    }

    /// Sum of visible faces over all voxels
    pub fn visible_face_count(&self) -> usize {
        self.voxels.par_iter().map(|v| v.visible_faces().len()).sum()
    }

    /// A voxel is exposed if it is Empty or touches an Empty voxel in its
    /// 26-neighborhood
    fn is_exposed(&self, p: IVec3) -> bool {
        if self.voxel_at(p).is_empty() {
            return true;
        }
        NEIGHBORHOOD_26
            .iter()
            .any(|offset| self.get(p + *offset).is_some_and(|n| n.is_empty()))
    }

    /// Overwrite every voxel that cannot be seen from any Empty voxel with
    /// `Undefined`. Returns the number of voxels overwritten.
    ///
    /// Scans from the top slab down and stops at the first slab with no
    /// exposed voxel; everything below it is treated as hidden. This assumes
    /// no overhang exposes a lower slab once a whole slab is hidden.
    pub fn undefine_hidden_voxels(&mut self) -> usize {
        let start = Instant::now();
        let size = self.size;
        let slab_len = size.slab_len();
        let mut exposed = vec![false; self.voxels.len()];

        for z in (0..size.depth as i32).rev() {
            let begin = z as usize * slab_len;
            let slab = &mut exposed[begin..begin + slab_len];

            let any_exposed = slab
                .par_chunks_mut(size.width as usize)
                .enumerate()
                .map(|(y, row)| {
                    let mut any = false;
                    for (x, cell) in row.iter_mut().enumerate() {
                        *cell = self.is_exposed(IVec3::new(x as i32, y as i32, z));
                        any |= *cell;
                    }
                    any
                })
                .reduce(|| false, |a, b| a || b);

            if !any_exposed {
                break;
            }
        }

        let undefined: usize = self
            .voxels
            .par_chunks_mut(slab_len)
            .zip(exposed.par_chunks(slab_len))
            .map(|(voxels, exposed)| {
                let mut count = 0;
                for (voxel, &seen) in voxels.iter_mut().zip(exposed) {
                    if !seen && !voxel.is_undefined() {
                        *voxel = Voxel::UNDEFINED;
                        count += 1;
                    }
                }
                count
            })
            .sum();

        log::info!("Undefined {} hidden voxels in {:.1}ms",
            undefined, start.elapsed().as_secs_f64() * 1000.0);
        undefined
    }

    /// Pick a shape and rotation for every Slope voxel from the Rock voxels
    /// around it on the same level. Returns the number of slopes reshaped.
    pub fn assign_slope_dirs(&mut self) -> usize {
        let start = Instant::now();
        let size = self.size;
        let mut shapes: Vec<Option<(u8, u8)>> = vec![None; self.voxels.len()];

        shapes
            .par_chunks_mut(size.slab_len())
            .enumerate()
            .for_each(|(z, slab)| {
                for y in 0..size.height as i32 {
                    for x in 0..size.width as i32 {
                        let p = IVec3::new(x, y, z as i32);
                        if self.voxel_at(p).voxel_type() != VoxelType::Slope {
                            continue;
                        }
                        let rock = slope::rock_neighbors(self, p);
                        slab[y as usize * size.width as usize + x as usize] = slope::shape_for(rock);
                    }
                }
            });

        let mut reshaped = 0;
        for (voxel, shape) in self.voxels.iter_mut().zip(shapes) {
            if let Some((slope_type, dir)) = shape {
                voxel.set_slope(slope_type, dir);
                reshaped += 1;
            }
        }

        log::info!("Assigned {} slope shapes in {:.1}ms",
            reshaped, start.elapsed().as_secs_f64() * 1000.0);
        reshaped
    }
}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("size", &self.size)
            .field("policy", &self.policy)
            .finish()
    }
}
