use crate::{Interval, Ray, Vec3};

/// Minimum thickness of a box along any axis.
const MIN_EXTENT: f32 = 0.0001;

/// One of the three coordinate axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in tie-break order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of the axis (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Axis-Aligned Bounding Box used by the acceleration structure.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Boxes built from points are padded so that planar geometry still gets a
/// nonzero volume; `Aabb::EMPTY` is the explicit empty box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));
        Self::new(x, y, z)
    }

    /// Smallest (padded) box containing every point; `EMPTY` for no points.
    pub fn enclosing(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::EMPTY;
        };
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self::from_points(min, max)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis.
    pub fn axis_interval(&self, axis: Axis) -> Interval {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    fn with_axis_interval(mut self, axis: Axis, interval: Interval) -> Self {
        match axis {
            Axis::X => self.x = interval,
            Axis::Y => self.y = interval,
            Axis::Z => self.z = interval,
        }
        self
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True for a box that contains no point at all.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method. A zero direction component divides to ±infinity,
    /// so parallel rays are accepted or rejected by the sign of the slab
    /// distances; a NaN from `0 * inf` leaves the running interval untouched.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in Axis::ALL {
            let slab = self.axis_interval(axis);
            let origin = r.origin[axis.index()];
            let adinv = 1.0 / r.direction[axis.index()];

            let mut t0 = (slab.min - origin) * adinv;
            let mut t1 = (slab.max - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    /// Test if the forward half of a ray passes through this box.
    pub fn intersects(&self, r: &Ray) -> bool {
        self.hit(r, Interval::FORWARD)
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Volume of the box; zero for empty boxes.
    pub fn volume(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.x.size() * self.y.size() * self.z.size()
    }

    /// Ratio of shared volume to combined volume, in `[0, 1]`.
    ///
    /// Zero when the boxes are disjoint or only touch along any axis.
    pub fn overlap_fraction(a: &Aabb, b: &Aabb) -> f32 {
        let x = a.x.intersection(&b.x);
        let y = a.y.intersection(&b.y);
        let z = a.z.intersection(&b.z);
        if x.is_empty() || y.is_empty() || z.is_empty() {
            return 0.0;
        }

        let shared = x.size() * y.size() * z.size();
        let combined = a.volume() + b.volume() - shared;
        if combined <= 0.0 || shared <= 0.0 {
            return 0.0;
        }
        (shared / combined).clamp(0.0, 1.0)
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }

    /// Returns the axis with the longest extent; ties favour X, then Y, then Z.
    pub fn longest_axis(&self) -> Axis {
        self.longest_axis_excluding([false; 3]).unwrap_or(Axis::X)
    }

    /// Longest axis whose entry in `used` is still false, same tie order.
    ///
    /// Returns `None` once all three axes are used.
    pub fn longest_axis_excluding(&self, used: [bool; 3]) -> Option<Axis> {
        let mut best: Option<(Axis, f32)> = None;
        for axis in Axis::ALL.into_iter().filter(|a| !used[a.index()]) {
            let size = self.axis_interval(axis).size();
            match best {
                Some((_, best_size)) if size <= best_size => {}
                _ => best = Some((axis, size)),
            }
        }
        best.map(|(axis, _)| axis)
    }

    /// Cut the box in two halves at the midpoint of `axis`.
    ///
    /// Returns `(lower, upper)`; both halves include the cut plane.
    pub fn split(&self, axis: Axis) -> (Aabb, Aabb) {
        let interval = self.axis_interval(axis);
        let mid = interval.midpoint();
        let lower = self.with_axis_interval(axis, Interval::new(interval.min, mid));
        let upper = self.with_axis_interval(axis, Interval::new(mid, interval.max));
        (lower, upper)
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.midpoint(), self.y.midpoint(), self.z.midpoint())
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
